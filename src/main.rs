use userboard::cli::CliArgs;
use userboard::{App, AppConfig};

#[tokio::main]
async fn main() -> userboard::Result<()> {
    let args = CliArgs::parse()?;
    if args.help {
        return Ok(());
    }

    let config = AppConfig::load(args.config_path().map(|p| p.as_path()))?;

    // RUST_LOG wins over the configured level
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    log::info!(
        "Starting userboard {} ({:?} store)",
        env!("CARGO_PKG_VERSION"),
        config.store.backend
    );

    let app = App::from_config(config).await?;
    app.start().await
}
