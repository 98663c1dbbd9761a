//! Query runner: sends one query and renders the result.
//!
//! Output goes to a caller-supplied writer so the binary can hand it stdout
//! while tests capture it in a buffer.

use crate::client::ExtensionClient;
use crate::protocol::Row;
use anyhow::Result;
use std::io::Write;

/// Separator printed between rows.
const SEPARATOR_WIDTH: usize = 80;

/// Run `query` against the daemon behind `client` and render the result.
///
/// A non-zero status prints a single error line and nothing else. Otherwise
/// each row is printed as `column => value` lines under a separator, with one
/// trailing separator after the last row. Query-level failures are not
/// process failures; only transport errors propagate.
pub async fn run<C, W>(client: &mut C, query: &str, out: &mut W) -> Result<()>
where
    C: ExtensionClient,
    W: Write,
{
    let result = client.query(query).await?;

    if result.status.code != 0 {
        writeln!(out, "Error running the query: {}", result.status.message)?;
        return Ok(());
    }

    render_rows(&result.response, out)?;
    Ok(())
}

fn render_rows<W: Write>(rows: &[Row], out: &mut W) -> Result<(), std::io::Error> {
    let separator = "=".repeat(SEPARATOR_WIDTH);
    for row in rows {
        writeln!(out, "{}", separator)?;
        for (column, value) in row {
            writeln!(out, "{} => {}", column, value)?;
        }
    }
    if !rows.is_empty() {
        writeln!(out, "{}", separator)?;
    }
    Ok(())
}
