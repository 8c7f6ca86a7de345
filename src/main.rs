use std::process::ExitCode;

fn main() -> ExitCode {
    match chronografy::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if !err.is_silent() {
                eprintln!("{err}");
            }
            ExitCode::from(err.exit_code())
        }
    }
}
