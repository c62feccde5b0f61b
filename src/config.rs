//! Application configuration loaded from environment variables.
//!
//! - `STOCKROOM_DATA_DIR`: directory holding the snapshot files (default `.`)
//! - `STOCKROOM_PRODUCTS_FILE`: product snapshot file name (default `products.json`)
//! - `STOCKROOM_ORDERS_FILE`: order snapshot file name (default `orders.json`)
//! - `STOCKROOM_SEQUENCES_FILE`: id high-water mark file name (default `sequences.json`)
//!
//! Empty values are treated as unset.

use std::path::PathBuf;

use crate::snapshot::file::{DEFAULT_ORDERS_FILE, DEFAULT_PRODUCTS_FILE, DEFAULT_SEQUENCES_FILE};

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopConfig {
    pub data_dir: PathBuf,
    pub products_file: String,
    pub orders_file: String,
    pub sequences_file: String,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            products_file: DEFAULT_PRODUCTS_FILE.to_string(),
            orders_file: DEFAULT_ORDERS_FILE.to_string(),
            sequences_file: DEFAULT_SEQUENCES_FILE.to_string(),
        }
    }
}

/// Loads the application configuration from environment variables.
///
/// # Errors
///
/// Returns [`ShopError::Config`](crate::ShopError::Config) if a file name
/// contains a path separator or two collections would share one file.
pub fn fetch_config() -> crate::Result<ShopConfig> {
    let defaults = ShopConfig::default();

    let data_dir = non_empty_var("STOCKROOM_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or(defaults.data_dir);
    let products_file =
        non_empty_var("STOCKROOM_PRODUCTS_FILE").unwrap_or(defaults.products_file);
    let orders_file = non_empty_var("STOCKROOM_ORDERS_FILE").unwrap_or(defaults.orders_file);
    let sequences_file =
        non_empty_var("STOCKROOM_SEQUENCES_FILE").unwrap_or(defaults.sequences_file);

    let files = [
        ("STOCKROOM_PRODUCTS_FILE", &products_file),
        ("STOCKROOM_ORDERS_FILE", &orders_file),
        ("STOCKROOM_SEQUENCES_FILE", &sequences_file),
    ];
    for (i, (var, name)) in files.iter().enumerate() {
        if name.contains(['/', '\\']) {
            return Err(crate::ShopError::Config(format!(
                "{var} must be a file name, got {name:?}"
            )));
        }
        if let Some((other, _)) = files[..i].iter().find(|(_, earlier)| earlier == name) {
            return Err(crate::ShopError::Config(format!(
                "{other} and {var} cannot share the snapshot file {name:?}"
            )));
        }
    }

    Ok(ShopConfig {
        data_dir,
        products_file,
        orders_file,
        sequences_file,
    })
}

/// Returns the value of an environment variable if it exists and is non-empty.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}
