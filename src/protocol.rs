//! Wire types for talking to an osquery-compatible extension endpoint.
//!
//! The endpoint speaks length-prefixed JSON over a Unix domain socket. The
//! response shape mirrors osquery's extension responses: an integer status
//! (0 = success) with a message, plus the result rows.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One result record: column name to value.
///
/// A BTreeMap keeps column display order deterministic (alphabetical), which
/// the renderer relies on.
pub type Row = BTreeMap<String, String>;

/// Status attached to every extension response. Code 0 means success; any
/// other code carries a human-readable failure message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionStatus {
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

impl ExtensionStatus {
    /// A successful status.
    pub fn ok() -> Self {
        Self {
            code: 0,
            message: "OK".to_string(),
        }
    }

    /// A failure status with the given code and message.
    pub fn failure(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Result of one query: a status paired with an ordered row sequence.
///
/// When `status.code` is non-zero the rows are meaningless and must not be
/// displayed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    pub status: ExtensionStatus,
    #[serde(default)]
    pub response: Vec<Row>,
}

impl QueryResult {
    /// A successful result carrying the given rows.
    pub fn rows(response: Vec<Row>) -> Self {
        Self {
            status: ExtensionStatus::ok(),
            response,
        }
    }

    /// A failed result with no rows.
    pub fn error(code: i32, message: impl Into<String>) -> Self {
        Self {
            status: ExtensionStatus::failure(code, message),
            response: Vec::new(),
        }
    }
}

/// Message sent from the client to the daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// Run a SQL query and return the result.
    Query { sql: String },
}

/// Framing for messages: length-prefixed JSON.
/// Format: 4 bytes (big-endian u32) length + JSON payload
pub mod framing {
    use anyhow::{anyhow, Result};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    /// Write a length-prefixed message.
    pub async fn write_message<W, T>(writer: &mut W, message: &T) -> Result<()>
    where
        W: AsyncWriteExt + Unpin,
        T: serde::Serialize,
    {
        let json = serde_json::to_vec(message)?;
        let len = json.len() as u32;
        writer.write_all(&len.to_be_bytes()).await?;
        writer.write_all(&json).await?;
        writer.flush().await?;
        Ok(())
    }

    /// Read a length-prefixed message.
    pub async fn read_message<R, T>(reader: &mut R) -> Result<T>
    where
        R: AsyncReadExt + Unpin,
        T: serde::de::DeserializeOwned,
    {
        let mut len_buf = [0u8; 4];
        reader.read_exact(&mut len_buf).await?;
        let len = u32::from_be_bytes(len_buf) as usize;

        // Sanity check: max 1MB message
        if len > 1_000_000 {
            return Err(anyhow!("Message too large: {} bytes", len));
        }

        let mut buf = vec![0u8; len];
        reader.read_exact(&mut buf).await?;
        let message = serde_json::from_slice(&buf)?;
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_ok() {
        let status = ExtensionStatus::ok();
        assert_eq!(status.code, 0);
        assert_eq!(status.message, "OK");
    }

    #[test]
    fn test_result_error_has_no_rows() {
        let result = QueryResult::error(1, "no such table: profiles");
        assert_eq!(result.status.code, 1);
        assert!(result.response.is_empty());
    }

    #[test]
    fn test_result_serialization() {
        let mut row = Row::new();
        row.insert("name".to_string(), "adunham".to_string());
        row.insert("uid".to_string(), "501".to_string());
        let result = QueryResult::rows(vec![row]);

        let json = serde_json::to_string(&result).unwrap();
        let parsed: QueryResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.status.code, 0);
        assert_eq!(parsed.response.len(), 1);
        assert_eq!(parsed.response[0]["name"], "adunham");
    }

    #[test]
    fn test_message_tagging() {
        let message = Message::Query {
            sql: "SELECT 1;".to_string(),
        };
        let json = serde_json::to_string(&message).unwrap();
        assert!(json.contains(r#""type":"query""#));
        let Message::Query { sql } = serde_json::from_str(&json).unwrap();
        assert_eq!(sql, "SELECT 1;");
    }

    #[tokio::test]
    async fn test_framing_round_trip() {
        let mut buf = Vec::new();
        let result = QueryResult::rows(vec![Row::new()]);
        framing::write_message(&mut buf, &result).await.unwrap();

        let mut reader = buf.as_slice();
        let parsed: QueryResult = framing::read_message(&mut reader).await.unwrap();
        assert_eq!(parsed.response.len(), 1);
    }

    #[tokio::test]
    async fn test_framing_rejects_oversized_message() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&u32::MAX.to_be_bytes());
        let mut reader = buf.as_slice();
        let result = framing::read_message::<_, QueryResult>(&mut reader).await;
        assert!(result.is_err());
    }
}
