use std::sync::Arc;

use stockroom::ShopError;
use stockroom::command::handle_line;
use stockroom::config::fetch_config;
use stockroom::snapshot::JsonFileStore;
use stockroom::{Shop, ShopStats};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), ShopError> {
    // Logs go to stderr; stdout carries one reply per command line.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let config = fetch_config()?;
    let store = JsonFileStore::from_config(&config);
    let shop = Arc::new(Shop::open(store)?);

    let ShopStats {
        products,
        orders,
        index_height,
    } = shop.stats();
    info!(
        data_dir = %config.data_dir.display(),
        products,
        orders,
        index_height,
        "Shop ready"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        // Snapshot I/O is blocking.
        let shop = Arc::clone(&shop);
        let reply = tokio::task::spawn_blocking(move || handle_line(&shop, &line))
            .await
            .map_err(|e| ShopError::Io(std::io::Error::other(e)))?;

        let mut json = serde_json::to_string(&reply)?;
        json.push('\n');
        stdout.write_all(json.as_bytes()).await?;
        stdout.flush().await?;
    }

    Ok(())
}
