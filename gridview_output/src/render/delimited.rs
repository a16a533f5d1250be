use std::io::Write;

use async_trait::async_trait;
use gridview_types::Column;
use itertools::Itertools;
use tokio_util::sync::CancellationToken;

use super::{Renderer, emit, next_visible};
use crate::{OutputConfig, OutputError, RowSource};

/// One line per row, cells joined by a delimiter. No header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimitedRenderer {
    delimiter: String,
    single_line: bool,
    include_hidden: bool,
}

impl DelimitedRenderer {
    /// Create a renderer joining cells with `delimiter`.
    pub fn new(delimiter: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
            single_line: false,
            include_hidden: false,
        }
    }

    /// Take delimiter, line mode and verbosity from `config`.
    #[must_use]
    pub fn from_config(config: &OutputConfig) -> Self {
        Self {
            delimiter: config.delimiter.clone(),
            single_line: config.single_line,
            include_hidden: config.verbose,
        }
    }

    /// Collapse line breaks inside cells.
    #[must_use]
    pub const fn single_line(mut self, single_line: bool) -> Self {
        self.single_line = single_line;
        self
    }

    fn cell(&self, col: &Column) -> String {
        if self.single_line {
            col.single_line()
        } else {
            col.text()
        }
    }
}

impl Default for DelimitedRenderer {
    fn default() -> Self {
        Self::new(OutputConfig::DEFAULT_DELIMITER)
    }
}

#[async_trait]
impl Renderer for DelimitedRenderer {
    async fn render(
        &self,
        source: &mut dyn RowSource,
        sink: &mut (dyn Write + Send),
        cancel: &CancellationToken,
    ) -> Result<usize, OutputError> {
        let mut count = 0;
        while let Some(row) = next_visible(source, cancel, self.include_hidden).await? {
            let mut line = row.iter().map(|c| self.cell(c)).join(&self.delimiter);
            line.push('\n');
            emit(sink, line.as_bytes())?;
            count += 1;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BatchSource;
    use gridview_types::TypeTag;

    #[tokio::test]
    async fn test_joins_with_delimiter() {
        let rows = vec![
            vec![Column::new("a", TypeTag::Int32, 1), Column::new("b", TypeTag::String, "x\ny")],
            vec![Column::new("a", TypeTag::Int32, 2), Column::nil("b")],
        ];
        let mut out = Vec::new();
        let n = DelimitedRenderer::new("|")
            .render(&mut BatchSource::new(rows.clone()), &mut out, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(n, 2);
        assert_eq!(String::from_utf8(out).unwrap(), "1|x\ny\n2|-\n");

        let mut out = Vec::new();
        DelimitedRenderer::new("|")
            .single_line(true)
            .render(&mut BatchSource::new(rows), &mut out, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1|x y\n2|-\n");
    }

    #[tokio::test]
    async fn test_hidden_columns_dropped() {
        let rows = vec![vec![
            Column::key(TypeTag::Int32, 1),
            Column::key_type(TypeTag::Int32),
        ]];
        let mut out = Vec::new();
        DelimitedRenderer::default()
            .render(&mut BatchSource::new(rows), &mut out, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(out, b"1\n");
    }
}
