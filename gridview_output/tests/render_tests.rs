// gridview_output/tests/render_tests.rs

use rstest::rstest;
use std::io::Write;
use std::sync::OnceLock;

use gridview_output::render::{CsvRenderer, DelimitedRenderer, JsonRenderer, TableRenderer};
use gridview_output::{
    BatchSource, OutputConfig, OutputError, OutputFormat, Renderer, make_table, renderer_for,
    stream_channel,
};
use gridview_types::sentinel::NIL;
use gridview_types::{Column, Decimal, Row, TypeTag, Value};
use tokio_util::sync::CancellationToken;

fn init_test_logger() {
    static INIT: OnceLock<()> = OnceLock::new();
    let _ = INIT.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn keyed_json(key: i64, raw: &str) -> Row {
    vec![
        Column::key(TypeTag::Int64, key),
        Column::primary(TypeTag::Json, Value::Json(raw.to_owned())),
    ]
}

fn decimal_row() -> Row {
    vec![Column::new(
        "amount",
        TypeTag::JavaDecimal,
        Decimal::new(100, 10),
    )]
}

async fn render_to_string(
    renderer: &dyn Renderer,
    rows: Vec<Row>,
) -> Result<String, Box<dyn std::error::Error>> {
    let mut out = Vec::new();
    renderer
        .render(&mut BatchSource::new(rows), &mut out, &CancellationToken::new())
        .await?;
    Ok(String::from_utf8(out)?)
}

#[test]
fn test_heterogeneous_json_rows_unify() {
    init_test_logger();

    let table = make_table(
        vec![keyed_json(1, r#"{"x":1,"y":2}"#), keyed_json(2, r#"{"z":3}"#)],
        false,
    );

    assert_eq!(table.header, vec!["__key", "x", "y", "z"]);
    let cells: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|r| r.iter().map(Column::text).collect())
        .collect();
    assert_eq!(cells[0], vec!["1", "1", "2", NIL]);
    assert_eq!(cells[1], vec!["2", NIL, NIL, "3"]);
}

#[tokio::test]
async fn test_heterogeneous_json_rows_as_table() -> Result<(), Box<dyn std::error::Error>> {
    init_test_logger();

    let text = render_to_string(
        &TableRenderer::new(),
        vec![keyed_json(1, r#"{"x":1,"y":2}"#), keyed_json(2, r#"{"z":3}"#)],
    )
    .await?;
    let expected = "\
┌───────┬───┬───┬───┐
│ __key │ x │ y │ z │
├───────┼───┼───┼───┤
│     1 │ 1 │ 2 │ - │
│     2 │ - │ - │ 3 │
└───────┴───┴───┴───┘
";
    assert_eq!(text, expected);
    Ok(())
}

#[rstest]
#[case(OutputFormat::Delimited, "1.00E-8\n")]
#[case(OutputFormat::Csv, "amount\n1.00E-8\n")]
#[case(OutputFormat::Json, "{\"amount\":\"1.00E-8\"}\n")]
#[tokio::test]
async fn test_decimal_text_is_stable_across_formats(
    #[case] format: OutputFormat,
    #[case] expected: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    init_test_logger();

    let renderer = renderer_for(&OutputConfig::new(format));
    let text = render_to_string(renderer.as_ref(), vec![decimal_row()]).await?;
    assert_eq!(text, expected);
    Ok(())
}

#[rstest]
#[case(OutputFormat::Csv)]
#[case(OutputFormat::Json)]
#[case(OutputFormat::Delimited)]
#[case(OutputFormat::Table)]
#[tokio::test]
async fn test_empty_input_writes_nothing(
    #[case] format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    init_test_logger();

    let renderer = renderer_for(&OutputConfig::new(format));
    assert_eq!(render_to_string(renderer.as_ref(), Vec::new()).await?, "");
    Ok(())
}

/// A sink that fires the token once it has seen `limit` complete lines.
struct CancellingSink {
    buf: Vec<u8>,
    cancel: CancellationToken,
    limit: usize,
}

impl Write for CancellingSink {
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        self.buf.extend_from_slice(data);
        if self.buf.iter().filter(|b| **b == b'\n').count() >= self.limit {
            self.cancel.cancel();
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[rstest]
#[case(Box::new(DelimitedRenderer::default()) as Box<dyn Renderer>)]
#[case(Box::new(JsonRenderer::new()) as Box<dyn Renderer>)]
#[case(Box::new(CsvRenderer::new()) as Box<dyn Renderer>)]
#[tokio::test]
async fn test_cancellation_stops_after_whole_rows(#[case] renderer: Box<dyn Renderer>) {
    init_test_logger();

    const K: usize = 3;
    let cancel = CancellationToken::new();
    let (tx, mut source) = stream_channel(1);
    let producer = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            for n in 0_i64.. {
                tx.send(vec![Column::new("n", TypeTag::Int64, n)], &cancel).await?;
            }
            Ok::<_, OutputError>(())
        })
    };

    let mut sink = CancellingSink {
        buf: Vec::new(),
        cancel: cancel.clone(),
        limit: K,
    };
    let result = renderer.render(&mut source, &mut sink, &cancel).await;

    assert!(matches!(result, Err(OutputError::StreamCancelled)));
    let text = String::from_utf8(sink.buf).unwrap();
    assert!(text.ends_with('\n'));
    assert_eq!(text.lines().count(), K);
    assert!(matches!(
        producer.await.unwrap(),
        Err(OutputError::StreamCancelled)
    ));
}

#[tokio::test]
async fn test_table_cancelled_while_buffering_writes_nothing() {
    init_test_logger();

    let cancel = CancellationToken::new();
    let (tx, mut source) = stream_channel(1);
    let producer = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            for n in 0_i64..3 {
                tx.send(vec![Column::new("n", TypeTag::Int64, n)], &cancel).await?;
            }
            cancel.cancel();
            Ok::<_, OutputError>(())
        })
    };

    let mut out = Vec::new();
    let result = TableRenderer::new().render(&mut source, &mut out, &cancel).await;

    assert!(matches!(result, Err(OutputError::StreamCancelled)));
    assert!(out.is_empty());
    producer.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_csv_header_from_first_row_only() -> Result<(), Box<dyn std::error::Error>> {
    init_test_logger();

    let rows = vec![
        vec![Column::new("a", TypeTag::Int32, 1)],
        vec![Column::new("a", TypeTag::Int32, 2)],
    ];
    let text = render_to_string(&CsvRenderer::new(), rows).await?;
    assert_eq!(text, "a\n1\n2\n");
    Ok(())
}

#[tokio::test]
async fn test_verbose_keeps_type_columns() -> Result<(), Box<dyn std::error::Error>> {
    init_test_logger();

    let row = vec![
        Column::key(TypeTag::String, "k1"),
        Column::key_type(TypeTag::String),
        Column::primary(TypeTag::Int32, 5),
        Column::primary_type(TypeTag::Int32),
    ];
    let quiet = renderer_for(&OutputConfig::csv());
    let verbose = renderer_for(&OutputConfig::csv().with_verbose(true));
    assert_eq!(
        render_to_string(quiet.as_ref(), vec![row.clone()]).await?,
        "__key,this\nk1,5\n"
    );
    assert_eq!(
        render_to_string(verbose.as_ref(), vec![row]).await?,
        "__key,__key_type,this,this_type\nk1,STRING,5,INT32\n"
    );
    Ok(())
}
