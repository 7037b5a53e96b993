use std::sync::Arc;

use anyhow::Result;
use common::{config::AppConfig, logging};
use raffle_api::RestStorefrontClient;
use storefront::{Gateway, PrizeStore};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging("info");
    let config = AppConfig::load()?;

    let client = Arc::new(RestStorefrontClient::from_config(&config.api)?);
    let store = PrizeStore::new(Gateway::new(client), config.store.clone());
    info!(
        base_url = %config.api.base_url,
        interval = config.store.refresh_interval_secs,
        "storefront started"
    );
    store.run().await?;
    Ok(())
}
