use clap::Parser;
use color_eyre::Result;
use tracing_subscriber::prelude::*;

use plumb::{
    config::{Args, ShellConfig},
    input::InputReader,
    session::Session,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let (writer, _guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(
        &args.log_dir,
        "plumb.log",
    ));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(writer))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_error::ErrorLayer::default())
        .init();

    color_eyre::install()?;

    let config = ShellConfig::load(args.config.as_deref())?;
    tracing::trace!(?config, "loaded configuration");

    let show_prompt = !args.no_prompt;
    let mut session = Session::new(&config, show_prompt);

    if show_prompt {
        println!("Welcome to plumb! Type 'exit' to quit.\n");
    }

    let mut input = InputReader::stdin();
    let mut stdout = std::io::stdout();

    session.run(&mut input, &mut stdout).await
}
