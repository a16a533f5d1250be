//! Header unification.
//!
//! Rows coming out of a query rarely share one field set: composite values
//! break out into sub-columns and different objects carry different fields.
//! [`make_table`] reconciles a finished batch of such rows into one header and
//! rewrites every row to exactly that header.

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::debug;

use gridview_types::{Column, IDENTITY_NAMES, NAME_KEY, NAME_KEY_TYPE, NAME_VALUE, NAME_VALUE_TYPE, Row};

use crate::OrderedSet;

/// Columns only shown in verbose mode.
pub const HIDDEN_NAMES: [&str; 2] = [NAME_KEY_TYPE, NAME_VALUE_TYPE];

/// A header and rows rewritten to it.
///
/// Every row has `header.len()` columns, named after the header entry at the
/// same position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnifiedTable {
    /// Display names, identity columns first.
    pub header: Vec<String>,
    /// Rows in input order.
    pub rows: Vec<Row>,
}

impl UnifiedTable {
    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Whether a column is dropped under the given verbosity.
#[must_use]
pub fn is_hidden(name: &str, include_hidden: bool) -> bool {
    !include_hidden && HIDDEN_NAMES.contains(&name)
}

/// Drop the hidden columns of a row unless `include_hidden` is set.
#[must_use]
pub fn visible_columns(row: Row, include_hidden: bool) -> Row {
    if include_hidden {
        return row;
    }
    row.into_iter()
        .filter(|c| !is_hidden(&c.name, false))
        .collect()
}

/// Unify the header of a finished batch of rows.
///
/// Composite columns other than the key are replaced by their sub-columns,
/// named `parent.child` (or `parent` for an unnamed sub-column); a composite
/// that cannot be broken out becomes a single not-decoded cell. The header
/// lists the identity columns present first, then every other name in
/// first-seen order. Missing cells are filled with nil, and the `this.` prefix
/// is dropped from the displayed names unless that would repeat a name.
#[must_use]
pub fn make_table(rows: Vec<Row>, include_hidden: bool) -> UnifiedTable {
    if rows.is_empty() {
        return UnifiedTable::default();
    }

    let mut names = OrderedSet::new();
    let mut working: Vec<IndexMap<String, Column>> = Vec::with_capacity(rows.len());
    for row in rows {
        let mut cells = IndexMap::with_capacity(row.len());
        for col in row {
            if is_hidden(&col.name, include_hidden) {
                continue;
            }
            if col.name == NAME_KEY || !col.is_flattenable() {
                names.add(col.name.clone());
                cells.insert(col.name.clone(), col);
                continue;
            }
            break_out(col, &mut names, &mut cells);
        }
        working.push(cells);
    }

    let mut header: Vec<String> = IDENTITY_NAMES
        .iter()
        .filter(|name| names.delete(**name))
        .map(|name| (*name).to_owned())
        .collect();
    header.extend(names.into_items());

    let shown = display_names(&header);
    let rows = working
        .into_iter()
        .map(|mut cells| {
            header
                .iter()
                .zip(&shown)
                .map(|(name, display)| {
                    let mut col = cells
                        .shift_remove(name)
                        .unwrap_or_else(|| Column::nil(name.as_str()));
                    col.name.clone_from(display);
                    col
                })
                .collect()
        })
        .collect();

    UnifiedTable { header: shown, rows }
}

fn break_out(col: Column, names: &mut OrderedSet<String>, cells: &mut IndexMap<String, Column>) {
    match col.flatten() {
        Ok(subs) => {
            for mut sub in subs {
                sub.name = if sub.name.is_empty() {
                    col.name.clone()
                } else {
                    format!("{}.{}", col.name, sub.name)
                };
                names.add(sub.name.clone());
                cells.insert(sub.name.clone(), sub);
            }
            // Placeholder only; the parent name joins the header through real cells.
            cells
                .entry(col.name.clone())
                .or_insert_with(|| Column::skip(col.name.as_str()));
        }
        Err(err) => {
            debug!("{}: {err}", col.name);
            names.add(col.name.clone());
            cells.insert(col.name.clone(), Column::not_decoded(col.name.as_str()));
        }
    }
}

/// Header names as shown: `this.` is dropped unless the short name is already
/// a header name of its own.
fn display_names(header: &[String]) -> Vec<String> {
    let taken: HashSet<&str> = header.iter().map(String::as_str).collect();
    header
        .iter()
        .map(|name| {
            let short = display_name(name);
            if short != name.as_str() && taken.contains(short) {
                name.clone()
            } else {
                short.to_owned()
            }
        })
        .collect()
}

fn display_name(name: &str) -> &str {
    name.strip_prefix(NAME_VALUE)
        .and_then(|rest| rest.strip_prefix('.'))
        .filter(|rest| !rest.is_empty())
        .unwrap_or(name)
}
