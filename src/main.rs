use anyhow::Result;
use skylight::config::PlatformConfig;
use skylight::platform::{HeadlessPlatform, Platform};
use skylight::util::logging::{MAIN, TIME_FORMAT};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Initialize logging
    // RUST_LOG wins; otherwise info everywhere and debug for skylight
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,skylight=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::new(TIME_FORMAT.to_string()))
        .with_ansi(false)
        .init();

    let config = PlatformConfig::from_env();
    tracing::info!("[{}] Starting with {:?}", MAIN, config);

    // Headless platform: scripted display session, no real display server
    let mut app = HeadlessPlatform::new(config);

    app.initialize()?;
    let result = app.run();
    app.shutdown();

    result
}
