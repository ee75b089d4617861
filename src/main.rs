use std::process::ExitCode;

use terracreds::cli::{self, output};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match cli::run_cli().await {
        Ok(code) => code,
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
