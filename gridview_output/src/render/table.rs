use std::io::Write;

use async_trait::async_trait;
use gridview_types::TypeTag;
use itertools::Itertools;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::{Renderer, emit, next_visible};
use crate::{OutputConfig, OutputError, RowSource, UnifiedTable, make_table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

/// A bordered grid.
///
/// Buffers the whole source before writing anything: the header is only known
/// once every row has been seen. Memory use grows with the result size.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRenderer {
    max_column_width: Option<usize>,
    single_line: bool,
    include_hidden: bool,
}

impl TableRenderer {
    /// Create a renderer with unbounded column widths.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the width cap, line mode and verbosity from `config`.
    #[must_use]
    pub const fn from_config(config: &OutputConfig) -> Self {
        Self {
            max_column_width: config.max_column_width,
            single_line: config.single_line,
            include_hidden: config.verbose,
        }
    }

    /// Cap column widths; longer cells wrap onto continuation lines.
    #[must_use]
    pub const fn max_column_width(mut self, width: Option<usize>) -> Self {
        self.max_column_width = width;
        self
    }

    /// Lay out a unified table as text.
    #[must_use]
    pub fn layout(&self, table: &UnifiedTable) -> String {
        let texts: Vec<Vec<String>> = table
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|c| if self.single_line { c.single_line() } else { c.text() })
                    .collect()
            })
            .collect();

        let widths: Vec<usize> = table
            .header
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let cells = || texts.iter().filter_map(|row| row.get(i));
                let widest = cells()
                    .flat_map(|t| t.lines())
                    .map(UnicodeWidthStr::width)
                    .fold(h.width(), usize::max);
                // Never cap below the widest single char.
                let widest_char = cells()
                    .flat_map(|t| t.chars())
                    .filter_map(UnicodeWidthChar::width)
                    .fold(1, usize::max);
                self.max_column_width
                    .map_or(widest, |cap| widest.min(cap.max(widest_char)))
                    .max(1)
            })
            .collect();

        let aligns: Vec<Align> = (0..table.header.len())
            .map(|i| {
                let tag = table
                    .rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|c| c.tag)
                    .find(|t| *t != TypeTag::Nil);
                match tag {
                    Some(t) if t.is_numeric() => Align::Right,
                    _ => Align::Left,
                }
            })
            .collect();

        let mut out = String::new();
        out.push_str(&border('┌', '┬', '┐', &widths));
        let header_aligns = vec![Align::Left; widths.len()];
        out.push_str(&grid_line(&table.header, &widths, &header_aligns));
        out.push_str(&border('├', '┼', '┤', &widths));
        for row in &texts {
            out.push_str(&grid_line(row, &widths, &aligns));
        }
        out.push_str(&border('└', '┴', '┘', &widths));
        out
    }
}

fn border(left: char, mid: char, right: char, widths: &[usize]) -> String {
    let inner = widths.iter().map(|w| "─".repeat(w + 2)).join(&mid.to_string());
    format!("{left}{inner}{right}\n")
}

/// One logical row; as many physical lines as its tallest cell needs.
fn grid_line<S: AsRef<str>>(cells: &[S], widths: &[usize], aligns: &[Align]) -> String {
    let wrapped: Vec<Vec<String>> = widths
        .iter()
        .enumerate()
        .map(|(i, w)| wrap(cells.get(i).map_or("", |c| c.as_ref()), *w))
        .collect();
    let height = wrapped.iter().map(Vec::len).max().unwrap_or(1);

    let mut out = String::new();
    for line in 0..height {
        out.push('│');
        for (i, &w) in widths.iter().enumerate() {
            let part = wrapped[i].get(line).map_or("", String::as_str);
            let fill = " ".repeat(w.saturating_sub(part.width()));
            out.push(' ');
            match aligns.get(i).copied().unwrap_or(Align::Left) {
                Align::Left => {
                    out.push_str(part);
                    out.push_str(&fill);
                }
                Align::Right => {
                    out.push_str(&fill);
                    out.push_str(part);
                }
            }
            out.push_str(" │");
        }
        out.push('\n');
    }
    out
}

/// Break `text` at line breaks, then into pieces at most `width` terminal
/// columns wide. A single char wider than `width` gets a piece of its own.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for line in text.split('\n') {
        let mut piece = String::new();
        let mut used = 0;
        for ch in line.trim_end_matches('\r').chars() {
            let w = ch.width().unwrap_or(0);
            if used + w > width && !piece.is_empty() {
                lines.push(std::mem::take(&mut piece));
                used = 0;
            }
            piece.push(ch);
            used += w;
        }
        lines.push(piece);
    }
    lines
}

#[async_trait]
impl Renderer for TableRenderer {
    async fn render(
        &self,
        source: &mut dyn RowSource,
        sink: &mut (dyn Write + Send),
        cancel: &CancellationToken,
    ) -> Result<usize, OutputError> {
        let mut rows = Vec::new();
        while let Some(row) = next_visible(source, cancel, self.include_hidden).await? {
            rows.push(row);
        }
        if rows.is_empty() {
            return Ok(0);
        }
        debug!("laying out {} buffered rows", rows.len());
        let table = make_table(rows, self.include_hidden);
        emit(sink, self.layout(&table).as_bytes())?;
        Ok(table.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BatchSource;
    use gridview_types::Column;
    use rstest::rstest;

    fn table(rows: Vec<gridview_types::Row>) -> UnifiedTable {
        make_table(rows, false)
    }

    #[test]
    fn test_layout_aligns_numbers_right() {
        let t = table(vec![
            vec![Column::new("id", TypeTag::Int32, 1), Column::new("name", TypeTag::String, "ann")],
            vec![Column::new("id", TypeTag::Int32, 22), Column::new("name", TypeTag::String, "bo")],
        ]);
        let expected = "\
┌────┬──────┐
│ id │ name │
├────┼──────┤
│  1 │ ann  │
│ 22 │ bo   │
└────┴──────┘
";
        assert_eq!(TableRenderer::new().layout(&t), expected);
    }

    #[test]
    fn test_layout_wraps_long_cells() {
        let t = table(vec![vec![Column::new("s", TypeTag::String, "abcdefg")]]);
        let expected = "\
┌─────┐
│ s   │
├─────┤
│ abc │
│ def │
│ g   │
└─────┘
";
        assert_eq!(TableRenderer::new().max_column_width(Some(3)).layout(&t), expected);
    }

    #[test]
    fn test_layout_pads_wide_chars_by_display_width() {
        let t = table(vec![
            vec![Column::new("name", TypeTag::String, "日本語")],
            vec![Column::new("name", TypeTag::String, "abc")],
        ]);
        let expected = "\
┌────────┐
│ name   │
├────────┤
│ 日本語 │
│ abc    │
└────────┘
";
        assert_eq!(TableRenderer::new().layout(&t), expected);
    }

    #[test]
    fn test_layout_cap_never_splits_a_wide_char() {
        let t = table(vec![vec![Column::new("s", TypeTag::String, "日本")]]);
        let expected = "\
┌────┐
│ s  │
├────┤
│ 日 │
│ 本 │
└────┘
";
        assert_eq!(TableRenderer::new().max_column_width(Some(1)).layout(&t), expected);
    }

    #[rstest]
    #[case("abc", 5, vec!["abc"])]
    #[case("abcdef", 3, vec!["abc", "def"])]
    #[case("a\nbc", 5, vec!["a", "bc"])]
    #[case("", 4, vec![""])]
    #[case("héllo", 2, vec!["hé", "ll", "o"])]
    #[case("日本語", 4, vec!["日本", "語"])]
    #[case("a日b", 2, vec!["a", "日", "b"])]
    fn test_wrap(#[case] text: &str, #[case] width: usize, #[case] expected: Vec<&str>) {
        assert_eq!(wrap(text, width), expected);
    }

    #[tokio::test]
    async fn test_render_empty_writes_nothing() {
        let mut out = Vec::new();
        let n = TableRenderer::new()
            .render(&mut BatchSource::default(), &mut out, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(n, 0);
        assert!(out.is_empty());
    }
}
