use std::process::ExitCode;

fn main() -> ExitCode {
    match seird::runner::run() {
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}
