//! Store connection shared by `import`, `update` and the wizard
//!
//! A failed or skipped login is not fatal: the client stays unauthenticated
//! and the batch operations run in simulation mode.

use clap::Args;
use pbaudit_core::config::StoreConfig;
use pbaudit_store::StoreClient;
use tracing::{info, warn};

use crate::output::OutputFormatter;

/// Connection overrides for commands that talk to the store
#[derive(Debug, Clone, Default, Args)]
pub struct ConnectionArgs {
    /// PocketBase base URL
    #[arg(long)]
    pub url: Option<String>,
    /// Identity used for password authentication
    #[arg(long)]
    pub email: Option<String>,
    /// Password for --email
    #[arg(long)]
    pub password: Option<String>,
    /// Collection holding the audit records
    #[arg(long)]
    pub collection: Option<String>,
}

impl ConnectionArgs {
    /// Store settings with the flags applied on top of `base`
    pub fn apply(&self, base: &StoreConfig) -> StoreConfig {
        let mut store = base.clone();
        if let Some(url) = &self.url {
            store.url = url.clone();
        }
        if let Some(email) = &self.email {
            store.email = email.clone();
        }
        if let Some(password) = &self.password {
            store.password = password.clone();
        }
        if let Some(collection) = &self.collection {
            store.collection = collection.clone();
        }
        store
    }
}

/// How a connection attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connection {
    Authenticated,
    /// Credentials were rejected or the store was unreachable
    Failed,
    NoCredentials,
}

/// Builds a client for `store`, authenticating when credentials are set
pub async fn open(store: &StoreConfig) -> (StoreClient, Connection) {
    let mut client = StoreClient::new(store.url.as_str());

    if !store.has_credentials() {
        warn!(url = %store.url, "No store credentials configured");
        return (client, Connection::NoCredentials);
    }

    if client.authenticate(&store.email, &store.password).await {
        info!(url = %store.url, collection = %store.collection, "Connected to store");
        (client, Connection::Authenticated)
    } else {
        (client, Connection::Failed)
    }
}

/// Like [`open`], reporting the outcome through `formatter`
pub async fn connect(store: &StoreConfig, formatter: &dyn OutputFormatter) -> StoreClient {
    let (client, connection) = open(store).await;
    match connection {
        Connection::Authenticated => formatter.success(&format!("Connected to {}", store.url)),
        Connection::Failed => formatter.warn("Connection failed; running in simulation mode"),
        Connection::NoCredentials => {
            formatter.warn("No credentials configured; running in simulation mode")
        }
    }
    client
}
