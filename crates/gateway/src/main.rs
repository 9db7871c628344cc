//! CAN-box Gateway - Main Entry Point

use gateway::{init_logging, supervise, Settings};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load()?;
    init_logging(&settings)?;

    info!("=== CAN-box gateway v{} ===", env!("CARGO_PKG_VERSION"));
    info!(
        "Profile {:?}, bus {:?}",
        settings.profile, settings.bus.kind
    );

    supervise(&settings).await?;

    Ok(())
}
