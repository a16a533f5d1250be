use std::io::Write;

use async_trait::async_trait;
use gridview_types::Column;
use gridview_types::sentinel::NOT_DECODED;
use serde_json::{Map, Value as JsonValue};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{Renderer, emit, next_visible};
use crate::{OutputConfig, OutputError, RowSource};

/// One JSON object per line, keyed by column name.
///
/// A column whose JSON projection fails is written as the not-decoded
/// sentinel string; the stream carries on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonRenderer {
    include_hidden: bool,
}

impl JsonRenderer {
    /// Create a renderer with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take verbosity from `config`.
    #[must_use]
    pub const fn from_config(config: &OutputConfig) -> Self {
        Self {
            include_hidden: config.verbose,
        }
    }
}

fn row_object(row: &[Column]) -> JsonValue {
    let map: Map<String, JsonValue> = row
        .iter()
        .map(|col| {
            let value = col.to_json().unwrap_or_else(|err| {
                debug!("{}: {err}", col.name);
                JsonValue::String(NOT_DECODED.to_owned())
            });
            (col.name.clone(), value)
        })
        .collect();
    JsonValue::Object(map)
}

#[async_trait]
impl Renderer for JsonRenderer {
    async fn render(
        &self,
        source: &mut dyn RowSource,
        sink: &mut (dyn Write + Send),
        cancel: &CancellationToken,
    ) -> Result<usize, OutputError> {
        let mut count = 0;
        while let Some(row) = next_visible(source, cancel, self.include_hidden).await? {
            let mut line = serde_json::to_vec(&row_object(&row))?;
            line.push(b'\n');
            emit(sink, &line)?;
            count += 1;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BatchSource;
    use gridview_types::{TypeTag, Value};
    use serde_json::json;

    #[tokio::test]
    async fn test_one_object_per_line() {
        let rows = vec![
            vec![
                Column::new("n", TypeTag::Int32, 1),
                Column::new("doc", TypeTag::Json, Value::Json(r#"{"a": [1, 2]}"#.into())),
            ],
            vec![
                Column::new("n", TypeTag::Int32, 2),
                Column::new("doc", TypeTag::Json, Value::Json("{broken".into())),
            ],
        ];
        let mut out = Vec::new();
        let n = JsonRenderer::new()
            .render(&mut BatchSource::new(rows), &mut out, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(n, 2);
        let lines: Vec<JsonValue> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines[0], json!({"n": 1, "doc": {"a": [1, 2]}}));
        assert_eq!(lines[1], json!({"n": 2, "doc": "*"}));
    }
}
