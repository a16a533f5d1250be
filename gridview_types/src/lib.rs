//! Value model and type-tag registry for gridview.
//!
//! Values reach this crate carrying nothing but a runtime [`TypeTag`]. The
//! registry turns any tagged value into single-line text, a JSON value, or a
//! list of sub-columns, and the [`decode`] module turns composite encodings
//! (compact, portable, embedded JSON) into ordered [`Column`] lists.

pub mod codec;
mod column;
pub mod decode;
mod error;
mod format;
mod registry;
pub mod sentinel;
mod tag;
mod value;

pub use crate::column::*;
pub use crate::error::*;
pub use crate::tag::*;
pub use crate::value::*;
