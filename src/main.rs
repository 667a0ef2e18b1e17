use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use libroteca::cli::{run_shell, ShellNavigator};
use libroteca::client::ApiClient;
use libroteca::identity::{Route, SessionStore};

const API_URL_POR_DEFECTO: &str = "https://backend-node-khgr.onrender.com/api";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    fmt().with_env_filter(filter).init();

    // Startup banner at info level so something always prints at default verbosity
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    let api_url = std::env::var("LIBROTECA_API_URL").unwrap_or_else(|_| API_URL_POR_DEFECTO.to_string());
    let state_dir = std::env::var("LIBROTECA_STATE_DIR").unwrap_or_else(|_| ".libroteca".to_string());
    info!(
        target: "libroteca",
        "libroteca starting: RUST_LOG='{}', api_url='{}', state_dir='{}'",
        rust_log, api_url, state_dir
    );

    let store = Arc::new(SessionStore::open(&PathBuf::from(&state_dir)));
    let nav = Arc::new(ShellNavigator::new(Route::Home));
    let client = ApiClient::new(&api_url, store.clone(), nav.clone())?;

    run_shell(client, store, nav).await
}
