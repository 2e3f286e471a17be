//!*
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::OnceLock,
    time::Duration,
};

use anyhow::Result;
use leadomat::{
    init_dbg_tracing, templ_manager::TemplateManager, App, AppState, RecordStoreClient,
};
use secrecy::SecretString;
use tokio::net::TcpListener;
use tracing::info;
use wiremock::MockServer;

pub const TEST_STORE_BASE_ID: &str = "appTESTBASE";
pub const TEST_STORE_TABLE: &str = "signups";

pub struct TestApp {
    pub addr: SocketAddr,
    pub store_server: MockServer,
    pub http_client: reqwest::Client,
}

/// Trying to bind port 0 will trigger an OS scan for an available port
/// which will then be bound to the application.
const TEST_SOCK_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 0);

fn _init_test_subscriber() {
    static SUBSCRIBER: OnceLock<()> = OnceLock::new();
    SUBSCRIBER.get_or_init(|| {
        init_dbg_tracing();
    });
}

impl TestApp {
    /// Spawns the app with a wiremock server standing in for the record
    /// store, returning the *socket address* on which it is listening.
    pub async fn spawn() -> Result<Self> {
        TestApp::spawn_inner(true).await
    }

    /// Spawns the app with the store credentials missing, the way the app
    /// comes up when STORE_API_KEY / STORE_BASE_ID are unset.
    pub async fn spawn_without_store_credentials() -> Result<Self> {
        TestApp::spawn_inner(false).await
    }

    async fn spawn_inner(store_configured: bool) -> Result<Self> {
        // _init_test_subscriber();

        let store_server = MockServer::start().await;

        let store_client = if store_configured {
            Some(RecordStoreClient::new(
                store_server.uri(),
                TEST_STORE_BASE_ID,
                TEST_STORE_TABLE,
                SecretString::from("test-store-key".to_string()),
                Duration::from_millis(200),
            )?)
        } else {
            None
        };

        let app_state = AppState::new(store_client, TemplateManager::init());

        let listener = TcpListener::bind(&TEST_SOCK_ADDR).await?;
        let addr = listener.local_addr()?;
        info!("Listening on {addr}");

        tokio::spawn(leadomat::serve(App::new(app_state, listener)));

        Ok(TestApp {
            addr,
            store_server,
            http_client: reqwest::Client::new(),
        })
    }

    pub async fn post_subscribe(&self, body: &serde_json::Value) -> Result<reqwest::Response> {
        let res = self
            .http_client
            .post(format!("http://{}/api/subscribe", self.addr))
            .json(body)
            .send()
            .await?;
        Ok(res)
    }

    /// The path the store client hits on the mock server.
    pub fn store_table_path(&self) -> String {
        format!("/v0/{TEST_STORE_BASE_ID}/{TEST_STORE_TABLE}")
    }
}
