use crate::error::StoreError;
use crate::models::{StudentInput, StudentRecord};
use crate::schema;
use chrono::{NaiveDateTime, Utc};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use tracing::{debug, info};

/// The `students` table. Ranges and labels are enforced here as well as by the CLI, so rows that
/// bypass the argument parser (CSV imports) are still rejected.
const CREATE_STUDENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS students (
    student_id INTEGER PRIMARY KEY CHECK (student_id > 0),
    school_satisfaction REAL NOT NULL CHECK (school_satisfaction BETWEEN 1.0 AND 5.0),
    attendance_rate REAL NOT NULL CHECK (attendance_rate BETWEEN 0.0 AND 100.0),
    failed_courses INTEGER NOT NULL CHECK (failed_courses BETWEEN 0 AND 10),
    commute_time INTEGER NOT NULL CHECK (commute_time BETWEEN 1 AND 120),
    disciplinary_incidents INTEGER NOT NULL CHECK (disciplinary_incidents BETWEEN 0 AND 10),
    homework_completion REAL NOT NULL CHECK (homework_completion BETWEEN 0.0 AND 100.0),
    family_income TEXT NOT NULL CHECK (family_income IN ('low', 'medium', 'high')),
    promotion_status TEXT NOT NULL CHECK (promotion_status IN ('Promoted', 'At Risk of Dropout')),
    prediction_date TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#;

/// The store for student records, backed by a single `sqlite3` file.
///
/// Every operation opens its own connection and drops it before returning.
#[derive(Debug, Clone)]
pub struct RecordStore {
    database_url: String,
}

impl RecordStore {
    /// Opens the store located at `database_url`, creating the `students` table if it does not
    /// exist yet.
    pub fn open(database_url: impl Into<String>) -> Result<Self, StoreError> {
        let store = Self {
            database_url: database_url.into(),
        };

        let mut conn = store.connect()?;
        conn.batch_execute(CREATE_STUDENTS_TABLE)?;
        info!(database_url = %store.database_url, "record store ready");

        Ok(store)
    }

    /// The location this store was opened with.
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    fn connect(&self) -> Result<SqliteConnection, StoreError> {
        SqliteConnection::establish(&self.database_url).map_err(|source| StoreError::Connection {
            url: self.database_url.clone(),
            source,
        })
    }

    /// Classifies `input` and writes it, replacing any record with the same student ID. The
    /// prediction date is the current UTC time.
    pub fn upsert(&self, input: &StudentInput) -> Result<StudentRecord, StoreError> {
        self.upsert_at(input, Utc::now().naive_utc())
    }

    /// Like [`RecordStore::upsert`], but stamps the record with `prediction_date`.
    pub fn upsert_at(
        &self,
        input: &StudentInput,
        prediction_date: NaiveDateTime,
    ) -> Result<StudentRecord, StoreError> {
        let record = StudentRecord::evaluate(input, prediction_date);

        let mut conn = self.connect()?;

        // If a record with this ID already exists, it is replaced wholesale.
        diesel::replace_into(schema::students::table)
            .values(&record)
            .execute(&mut conn)?;

        debug!(
            student_id = record.student_id,
            status = %record.promotion_status,
            "stored student record"
        );

        Ok(record)
    }

    /// Retrieves every record, most recent prediction first.
    pub fn list_all(&self) -> Result<Vec<StudentRecord>, StoreError> {
        use schema::students::dsl::*;

        let mut conn = self.connect()?;

        let records = students
            .order((prediction_date.desc(), student_id.desc()))
            .select(StudentRecord::as_select())
            .load(&mut conn)?;

        Ok(records)
    }

    /// Retrieves the record for a single student, if there is one.
    pub fn get(&self, id: i32) -> Result<Option<StudentRecord>, StoreError> {
        use schema::students::dsl::*;

        let mut conn = self.connect()?;

        let record = students
            .find(id)
            .select(StudentRecord::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(record)
    }

    /// Returns the total number of stored records.
    pub fn count(&self) -> Result<usize, StoreError> {
        use schema::students::dsl::*;

        let mut conn = self.connect()?;

        let total: i64 = students.count().get_result(&mut conn)?;
        Ok(total as usize)
    }

    /// Removes and returns the record for a student. Deleting a student with no record is not an
    /// error and returns `None`.
    pub fn delete(&self, id: i32) -> Result<Option<StudentRecord>, StoreError> {
        use schema::students::dsl::*;

        let mut conn = self.connect()?;

        let deleted = diesel::delete(students.filter(student_id.eq(id)))
            .returning(StudentRecord::as_returning())
            .get_result(&mut conn)
            .optional()?;

        match &deleted {
            Some(_) => info!(student_id = id, "deleted student record"),
            None => debug!(student_id = id, "no record to delete"),
        }

        Ok(deleted)
    }

    /// Removes every record, returning how many were removed.
    pub fn clear(&self) -> Result<usize, StoreError> {
        let mut conn = self.connect()?;

        let removed = diesel::delete(schema::students::table).execute(&mut conn)?;
        info!(removed, "cleared record store");

        Ok(removed)
    }
}
