use clap::Parser;
use std::process::ExitCode;

use azure_openai_check::cli::Cli;
use azure_openai_check::logging;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let _log_guard = logging::init();

    match azure_openai_check::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
