use catalog_common::error_message;
use replica_catalog::cli;
use std::process::ExitCode;

pub fn main() -> ExitCode {
    match cli::process_command() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error_message!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
