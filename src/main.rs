use clap::Parser;
use color_eyre::Result;
use cwrouter::{
    init_errors,
    logging,
    App,
    Args,
};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_errors()?;
    let args = Args::parse();
    logging::log_init(args.verbose)?;

    Ok(App::new(args).run().await.into())
}
