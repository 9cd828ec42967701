use clap::Parser;
use dropout::cli::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match dropout::load_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    dropout::init_logging(&settings.log.filter);

    // Store errors are reported, never panicked on.
    match dropout::run(cli.command, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
