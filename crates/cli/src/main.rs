use std::process::ExitCode;

fn main() -> ExitCode {
    cardline_cli::run()
}
