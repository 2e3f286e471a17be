pub mod serve;

// re-export
pub use serve::serve;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use derive_more::Deref;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::{
    config::AppConfig, store_client::RecordStoreClient, templ_manager::TemplateManager, Result,
};

// ###################################
// ->  Structs
// ###################################
pub struct App {
    pub app_state: AppState,
    pub listener: TcpListener,
}
impl App {
    pub fn new(app_state: AppState, listener: TcpListener) -> Self {
        App {
            app_state,
            listener,
        }
    }

    pub async fn build_from_config(config: &AppConfig) -> Result<Self> {
        let tm = TemplateManager::init();

        // Without credentials the app still serves; the intake handler
        // answers 500 until both variables are present.
        let store_client = config
            .store_config
            .credentials()
            .map(|(api_key, base_id)| {
                RecordStoreClient::new(
                    &config.store_config.url,
                    &base_id,
                    &config.store_config.table,
                    api_key,
                    config.store_config.timeout(),
                )
            })
            .transpose()?;
        if store_client.is_none() {
            warn!(
                "{:<20} - Record store credentials missing, intake disabled",
                "build_from_config"
            );
        }

        let app_state = AppState::new(store_client, tm);

        let addr = SocketAddr::from((config.net_config.host, config.net_config.app_port));
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind the listening socket on {addr}"))?;
        let addr = listener.local_addr()?;
        info!("{:<20} - {}", "Listening on:", addr);

        let app = App::new(app_state, listener);
        Ok(app)
    }
}

pub struct InternalState {
    pub store_client: Option<RecordStoreClient>,
    pub templ_mgr: TemplateManager,
}

/// Application state containing all global data.
/// It implements `Deref` to easily access the fields on `InternalState`
/// Uses an `Arc` so it can be cloned around.
#[derive(Clone, Deref)]
pub struct AppState(Arc<InternalState>);

impl AppState {
    pub fn new(store_client: Option<RecordStoreClient>, templ_mgr: TemplateManager) -> Self {
        AppState(Arc::new(InternalState {
            store_client,
            templ_mgr,
        }))
    }
}
