//! # Store Connections
//!
//! Every long-lived worker owns exactly one connection to the store, and a
//! connection in subscribed mode cannot issue other commands — so this
//! module hands out fresh connections on demand instead of pooling.
//!
//! Two authentication paths exist on purpose. The coordinator connects
//! without a credential and then issues an explicit `AUTH`, so a connect
//! failure and an authentication failure surface as distinct fatal errors.
//! Workers embed the credential in their connection URL instead: a pub/sub
//! connection authenticates during its handshake and offers no later
//! opportunity to send `AUTH`.

use std::time::Duration;

use anyhow::{Context, Result};
use redis::aio::{MultiplexedConnection, PubSub};
use redis::Client;
use tokio::net::TcpStream;

/// How the agent reaches the store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Store host name or address.
    pub host: String,
    /// Store TCP port.
    pub port: u16,
    /// Optional credential for `AUTH`.
    pub credential: Option<String>,
}

impl StoreConfig {
    /// Bundles the connection parameters.
    pub fn new(host: String, port: u16, credential: Option<String>) -> Self {
        Self {
            host,
            port,
            credential,
        }
    }

    /// Connection URL carrying the credential, if any.
    fn url(&self) -> String {
        match &self.credential {
            Some(cred) => format!("redis://:{}@{}:{}/", cred, self.host, self.port),
            None => format!("redis://{}:{}/", self.host, self.port),
        }
    }

    /// Connection URL without any credential.
    fn bare_url(&self) -> String {
        format!("redis://{}:{}/", self.host, self.port)
    }

    /// The URL as safe to log: the credential is masked.
    pub fn masked_url(&self) -> String {
        match &self.credential {
            Some(_) => format!("redis://*@{}:{}/", self.host, self.port),
            None => self.bare_url(),
        }
    }

    /// Opens an authenticated command connection (workers, response
    /// delivery).
    pub async fn connect(&self) -> Result<MultiplexedConnection> {
        let client = Client::open(self.url()).context("invalid store URL")?;
        client
            .get_multiplexed_async_connection()
            .await
            .with_context(|| format!("failed to connect to {}", self.masked_url()))
    }

    /// Opens an unauthenticated command connection. Pair with
    /// [`authenticate`](Self::authenticate).
    pub async fn connect_bare(&self) -> Result<MultiplexedConnection> {
        let client = Client::open(self.bare_url()).context("invalid store URL")?;
        client
            .get_multiplexed_async_connection()
            .await
            .with_context(|| format!("failed to connect to {}", self.bare_url()))
    }

    /// Issues `AUTH` on `conn` when a credential was supplied; a no-op
    /// otherwise.
    pub async fn authenticate(&self, conn: &mut MultiplexedConnection) -> Result<()> {
        if let Some(cred) = &self.credential {
            redis::cmd("AUTH")
                .arg(cred)
                .query_async::<()>(conn)
                .await
                .context("AUTH rejected by the store")?;
        }
        Ok(())
    }

    /// Opens an authenticated pub/sub connection. The caller subscribes and
    /// then owns the connection for its lifetime.
    pub async fn pubsub(&self) -> Result<PubSub> {
        let client = Client::open(self.url()).context("invalid store URL")?;
        client
            .get_async_pubsub()
            .await
            .with_context(|| format!("failed to open pub/sub connection to {}", self.masked_url()))
    }
}

/// Whether `host:port` currently accepts TCP connections.
///
/// One bounded attempt, no retries; the coordinator supplies the polling
/// loop and its own indicator feedback.
pub async fn reachable(host: &str, port: u16, timeout: Duration) -> bool {
    matches!(
        tokio::time::timeout(timeout, TcpStream::connect((host, port))).await,
        Ok(Ok(_))
    )
}
