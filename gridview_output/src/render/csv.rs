use std::io::Write;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::{Renderer, emit, next_visible};
use crate::{OutputConfig, OutputError, RowSource};

/// CSV with RFC 4180 quoting. The header line comes from the first row, so an empty
/// result writes nothing at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvRenderer {
    single_line: bool,
    include_hidden: bool,
}

impl CsvRenderer {
    /// Create a renderer with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take line mode and verbosity from `config`.
    #[must_use]
    pub const fn from_config(config: &OutputConfig) -> Self {
        Self {
            single_line: config.single_line,
            include_hidden: config.verbose,
        }
    }
}

fn record<I, S>(fields: I) -> Result<Vec<u8>, OutputError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<[u8]>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(fields)?;
    writer.into_inner().map_err(|e| OutputError::RenderIo(e.into_error()))
}

#[async_trait]
impl Renderer for CsvRenderer {
    async fn render(
        &self,
        source: &mut dyn RowSource,
        sink: &mut (dyn Write + Send),
        cancel: &CancellationToken,
    ) -> Result<usize, OutputError> {
        let mut count = 0;
        let mut header_written = false;
        while let Some(row) = next_visible(source, cancel, self.include_hidden).await? {
            let mut line = Vec::new();
            if !header_written {
                line = record(row.iter().map(|c| c.name.as_str()))?;
                header_written = true;
            }
            let cells = row.iter().map(|c| {
                if self.single_line {
                    c.single_line()
                } else {
                    c.text()
                }
            });
            line.extend(record(cells)?);
            emit(sink, &line)?;
            count += 1;
        }
        Ok(count)
    }
}
