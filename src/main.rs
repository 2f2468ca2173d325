use std::process::ExitCode;

fn main() -> ExitCode {
    energy_desk::logging::init();

    match energy_desk::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(code = err.exit_code(), "{err}");
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
