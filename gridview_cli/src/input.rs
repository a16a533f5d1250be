//! JSON document input: one document per non-blank line.

use std::path::Path;

use gridview_output::OutputError;
use gridview_output::source::RowSender;
use gridview_types::{Column, Row, TypeTag, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Boxed line reader over a file or stdin.
pub type LineReader = Box<dyn AsyncBufRead + Unpin + Send>;

/// Open `path`, or stdin when there is none.
pub async fn open(path: Option<&Path>) -> Result<LineReader, OutputError> {
    match path {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .map_err(|e| OutputError::upstream(format!("{}: {e}", path.display())))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(BufReader::new(tokio::io::stdin()))),
    }
}

/// An entry keyed by its document number, the document as the value.
pub fn document_row(number: i64, document: String) -> Row {
    vec![
        Column::key(TypeTag::Int64, number),
        Column::key_type(TypeTag::Int64),
        Column::primary(TypeTag::Json, Value::Json(document)),
        Column::primary_type(TypeTag::Json),
    ]
}

async fn next_document<R>(lines: &mut tokio::io::Lines<R>) -> Result<Option<String>, OutputError>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let line = lines
            .next_line()
            .await
            .map_err(|e| OutputError::upstream(format!("reading input: {e}")))?;
        match line {
            Some(l) if l.trim().is_empty() => continue,
            other => return Ok(other),
        }
    }
}

/// Read every document into memory.
pub async fn read_documents<R>(reader: R) -> Result<Vec<Row>, OutputError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut rows = Vec::new();
    while let Some(doc) = next_document(&mut lines).await? {
        rows.push(document_row(rows.len() as i64 + 1, doc));
    }
    debug!("read {} documents", rows.len());
    Ok(rows)
}

/// Feed documents into `tx` from a background task as they are read.
///
/// The task yields the number of documents delivered.
pub fn spawn_reader<R>(
    reader: R,
    tx: RowSender,
    cancel: CancellationToken,
) -> JoinHandle<Result<u64, OutputError>>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = reader.lines();
        let mut count = 0_u64;
        loop {
            let doc = match next_document(&mut lines).await {
                Ok(Some(doc)) => doc,
                Ok(None) => break,
                Err(err) => {
                    let _ = tx.fail(OutputError::upstream(err.to_string()), &cancel).await;
                    return Err(err);
                }
            };
            count += 1;
            tx.send(document_row(count as i64, doc), &cancel).await?;
        }
        debug!("input exhausted after {count} documents");
        Ok(count)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridview_output::stream_channel;
    use gridview_output::source::collect_rows;

    #[tokio::test]
    async fn test_blank_lines_skipped() {
        let input: &[u8] = b"{\"a\":1}\n\n  \n[1,2]\n";
        let rows = read_documents(input).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][0].text(), "2");
        assert_eq!(rows[1][2].text(), "[1,2]");
    }

    #[tokio::test]
    async fn test_streamed_reader_delivers_all() {
        let cancel = CancellationToken::new();
        let (tx, mut source) = stream_channel(1);
        let input: &'static [u8] = b"1\n2\n3\n";
        let handle = spawn_reader(input, tx, cancel.clone());
        let rows = collect_rows(&mut source, &cancel).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(handle.await.unwrap().unwrap(), 3);
    }
}
