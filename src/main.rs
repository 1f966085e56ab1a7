use anyhow::Result;
use clap::Parser;
use storefront_cart::{
    cli::{Args, CliApp},
    utils::Config,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::from_env()?;
    let config = match &args.cart_file {
        Some(path) => config.with_cart_file(path.clone()),
        None => config,
    };

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Config: successfully loaded for {} environment", config.environment);
    tracing::info!("🛒 Cart CLI starting, cart file {}", config.cart_file.display());

    let mut app = CliApp::new(config).await.map_err(|e| {
        tracing::error!("Failed to start cart CLI: {}", e);
        e
    })?;
    app.run(args).await?;

    tracing::info!("🛒 Cart CLI stopped");
    Ok(())
}
