//! Placeholder strings shown in place of a value.

/// An absent value.
pub const NIL: &str = "-";

/// A value elided on purpose, e.g. a composite after its fields were broken out.
pub const SKIP: &str = ">";

/// A value whose decoding failed.
pub const NOT_DECODED: &str = "*";

/// A value whose type tag is not known to this build.
pub const UNKNOWN: &str = "UNKNOWN";
