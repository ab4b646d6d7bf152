#![cfg(not(tarpaulin_include))]

use datavista::app;
use datavista::dataset::DATASET_FILE;
use datavista::store::CredentialStore;

/// Main entry point for the dashboard server.
///
/// Initializes logging and the credential store, then serves the
/// application on the default address.
///
/// # Returns
/// * `Result<(), Box<dyn std::error::Error>>` - Success or error object
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let store = CredentialStore::open_default();
    store.initialize()?;

    app::run("127.0.0.1:3000", store, DATASET_FILE).await
}
