//! Tabular rendering for gridview.
//!
//! Rows of tagged [`Column`](gridview_types::Column)s flow from a
//! [`RowSource`] into one of four renderers (bordered table, CSV, JSON lines,
//! delimited text). The table renderer first reconciles heterogeneous rows into
//! one header with [`make_table`].

mod config;
mod error;
mod ordered_set;
pub mod render;
pub mod source;
mod table;

pub use crate::config::*;
pub use crate::error::*;
pub use crate::ordered_set::*;
pub use crate::render::{Renderer, renderer_for};
pub use crate::source::{BatchSource, RowSource, StreamedSource, stream_channel};
pub use crate::table::*;
