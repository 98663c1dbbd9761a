//! Extension client: the connection to the running daemon.
//!
//! The transport is kept behind the [`ExtensionClient`] trait so the query
//! runner only ever sees `query(sql) -> QueryResult`. The production
//! implementation speaks the framed protocol over a Unix domain socket.

use crate::protocol::{framing, Message, QueryResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::net::UnixStream;
use tracing::debug;

/// Errors from the client transport. Query-level failures are not errors
/// here; they arrive in-band as a non-zero status on the result.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Failed to connect to extension socket at {path}: {source}")]
    Connect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Transport failure while querying the daemon: {0}")]
    Transport(#[from] anyhow::Error),
}

/// Anything that can run a query against the remote daemon.
#[async_trait]
pub trait ExtensionClient {
    /// Send a query and block until the daemon responds. No timeout is
    /// applied; an unresponsive daemon stalls the call.
    async fn query(&mut self, sql: &str) -> Result<QueryResult, ClientError>;
}

/// Client backed by a Unix domain socket connection.
pub struct SocketClient {
    stream: UnixStream,
}

impl SocketClient {
    /// Connect to the extension socket at the given path. The socket must
    /// already be bound and listening; this never creates it.
    pub async fn connect(path: &Path) -> Result<Self, ClientError> {
        debug!("Connecting to extension socket at {}", path.display());
        let stream = UnixStream::connect(path)
            .await
            .map_err(|source| ClientError::Connect {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self { stream })
    }
}

#[async_trait]
impl ExtensionClient for SocketClient {
    async fn query(&mut self, sql: &str) -> Result<QueryResult, ClientError> {
        debug!("Sending query: {}", sql);
        let message = Message::Query {
            sql: sql.to_string(),
        };
        framing::write_message(&mut self.stream, &message).await?;

        let result: QueryResult = framing::read_message(&mut self.stream).await?;
        debug!(
            "Received result: status {} ({} rows)",
            result.status.code,
            result.response.len()
        );
        Ok(result)
    }
}
