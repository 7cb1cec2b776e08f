//! `SketchroomServer` builder and accept loop.
//!
//! Ties the layers together: transport → protocol → registry → room.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use sketchroom_protocol::JsonCodec;
use sketchroom_room::SessionRegistry;
use sketchroom_transport::{Transport, WebSocketTransport};
use sketchroom_words::{WordBank, WordProvider};
use tracing::{debug, error, info};

use crate::handler::handle_connection;
use crate::{ServerConfig, SketchroomError};

/// Shared server state handed to each connection task.
pub(crate) struct ServerState {
    pub(crate) registry: SessionRegistry,
    pub(crate) codec: JsonCodec,
    pub(crate) config: ServerConfig,
}

/// Builder for configuring and starting a Sketchroom server.
///
/// # Example
///
/// ```rust,no_run
/// use sketchroom::prelude::*;
///
/// # async fn run() -> Result<(), SketchroomError> {
/// let server = SketchroomServer::builder()
///     .bind("0.0.0.0:8080")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct SketchroomServerBuilder {
    config: ServerConfig,
    words: Option<Arc<dyn WordProvider>>,
}

impl SketchroomServerBuilder {
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            words: None,
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind = addr.to_string();
        self
    }

    /// Word source for every room. Defaults to the built-in bank.
    pub fn words(mut self, words: Arc<dyn WordProvider>) -> Self {
        self.words = Some(words);
        self
    }

    /// Binds the listener and creates the registry.
    pub async fn build(self) -> Result<SketchroomServer, SketchroomError> {
        let config = self.config.validated();
        let words = self
            .words
            .unwrap_or_else(|| Arc::new(WordBank::builtin()) as Arc<dyn WordProvider>);
        let registry = SessionRegistry::new(config.session.clone(), words)
            .with_channel_size(config.room_channel);

        let transport = WebSocketTransport::bind(&config.bind).await?;

        let state = Arc::new(ServerState {
            registry,
            codec: JsonCodec,
            config,
        });
        Ok(SketchroomServer { transport, state })
    }
}

impl Default for SketchroomServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Sketchroom server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct SketchroomServer {
    transport: WebSocketTransport,
    state: Arc<ServerState>,
}

impl SketchroomServer {
    pub fn builder() -> SketchroomServerBuilder {
        SketchroomServerBuilder::new()
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// The live-room registry, for inspection.
    pub fn registry(&self) -> &SessionRegistry {
        &self.state.registry
    }

    /// Accepts connections until the process is terminated.
    pub async fn run(self) -> Result<(), SketchroomError> {
        self.run_until(std::future::pending()).await
    }

    /// Accepts connections until `shutdown` resolves, then shuts down
    /// every room.
    pub async fn run_until(
        mut self,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), SketchroomError> {
        info!(addr = ?self.transport.local_addr().ok(), "sketchroom server running");
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!(rooms = self.state.registry.len(), "shutdown requested");
                    break;
                }
                accepted = self.transport.accept() => match accepted {
                    Ok(conn) => {
                        let state = Arc::clone(&self.state);
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(conn, state).await {
                                debug!(error = %e, "connection ended with error");
                            }
                        });
                    }
                    Err(e) => error!(error = %e, "accept failed"),
                },
            }
        }

        self.state.registry.shutdown_all().await;
        info!("sketchroom server stopped");
        Ok(())
    }
}
