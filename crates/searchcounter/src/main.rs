use clap::Parser;
use searchcounter::commands::execute;
use searchcounter::{Cli, CounterConfig};
use searchcounter_logging::SubscriberBuilder;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => CounterConfig::load(path)?,
        None => CounterConfig::default(),
    };
    config.apply_cli(&cli);

    let _log_guard = SubscriberBuilder::new()
        .with_config(config.log.clone())
        .init()?;

    let stdout = std::io::stdout();
    execute(&cli.command, &config, &mut stdout.lock())?;

    Ok(())
}
