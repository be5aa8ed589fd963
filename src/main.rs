mod browser;
mod canvas;
mod cli;
mod date_range;
mod error;
mod logging;
mod model;
mod orchestrator;

use clap::Parser;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // `time` only reads the local offset while the process is single-threaded.
    let local_offset = time::UtcOffset::current_local_offset().ok();

    dotenvy::dotenv().ok();
    let args = cli::Cli::parse();
    logging::init(args.log_file.as_deref());

    let outcome = cli::run(args, local_offset).await;
    std::process::exit(outcome.exit_code());
}
