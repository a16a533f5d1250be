//! Format renderers.
//!
//! Every renderer pulls rows from a [`RowSource`] and writes them to a byte
//! sink. Streaming renderers format each row into a private buffer and write
//! it in one piece, so a cancellation or a failure between rows never leaves a
//! half-written line behind. The table renderer buffers the entire source
//! first, because header unification needs the full batch.

mod csv;
mod delimited;
mod json;
mod table;

pub use self::csv::CsvRenderer;
pub use delimited::DelimitedRenderer;
pub use json::JsonRenderer;
pub use table::TableRenderer;

use std::io::Write;

use async_trait::async_trait;
use gridview_types::Row;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{OutputConfig, OutputError, OutputFormat, RowSource, visible_columns};

/// Serializes a row source to a sink.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Render every row of `source` into `sink`, returning the number of rows
    /// written.
    ///
    /// # Errors
    ///
    /// [`OutputError::StreamCancelled`] when `cancel` fires; rows written
    /// before that stay written. Sink failures end the render immediately.
    async fn render(
        &self,
        source: &mut dyn RowSource,
        sink: &mut (dyn Write + Send),
        cancel: &CancellationToken,
    ) -> Result<usize, OutputError>;
}

/// The renderer selected by `config.format`.
#[must_use]
pub fn renderer_for(config: &OutputConfig) -> Box<dyn Renderer> {
    debug!("rendering as {}", config.format);
    match config.format {
        OutputFormat::Table => Box::new(TableRenderer::from_config(config)),
        OutputFormat::Csv => Box::new(CsvRenderer::from_config(config)),
        OutputFormat::Json => Box::new(JsonRenderer::from_config(config)),
        OutputFormat::Delimited => Box::new(DelimitedRenderer::from_config(config)),
    }
}

/// Pull the next visible row, checking the token first.
async fn next_visible(
    source: &mut dyn RowSource,
    cancel: &CancellationToken,
    include_hidden: bool,
) -> Result<Option<Row>, OutputError> {
    if cancel.is_cancelled() {
        return Err(OutputError::StreamCancelled);
    }
    let row = source.next_row(cancel).await?;
    Ok(row.map(|r| visible_columns(r, include_hidden)))
}

/// Write one finished line.
fn emit(sink: &mut (dyn Write + Send), line: &[u8]) -> Result<(), OutputError> {
    sink.write_all(line)?;
    Ok(())
}
