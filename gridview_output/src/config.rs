//! Output configuration.
//!
//! `OutputConfig` selects the renderer and the knobs it honours. Every field
//! has a default, so a config file only needs the keys it wants to change:
//!
//! ```ignore
//! use gridview_output::{OutputConfig, OutputFormat};
//! let cfg = OutputConfig::new(OutputFormat::Csv).with_verbose(true);
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::OutputError;

/// Which renderer to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Bordered grid; buffers the whole result.
    #[default]
    Table,
    /// RFC 4180 CSV with a header line.
    Csv,
    /// One JSON object per line.
    Json,
    /// One line per row, columns joined by a delimiter.
    Delimited,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Table => "table",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Delimited => "delimited",
        })
    }
}

/// Rendering options.
///
/// - format: which renderer to use.
/// - delimiter: column separator of the delimited renderer.
/// - single_line: collapse line breaks inside delimited and table cells.
/// - quiet: suppress non-data output such as the row count footer.
/// - verbose: keep the hidden key-type and value-type columns.
/// - max_column_width: cap for table column widths; longer cells wrap.
/// - channel_capacity: rows buffered between a streaming producer and the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Which renderer to use.
    pub format: OutputFormat,
    /// Column separator for [`OutputFormat::Delimited`].
    pub delimiter: String,
    /// Collapse line breaks to spaces.
    pub single_line: bool,
    /// Suppress non-data output.
    pub quiet: bool,
    /// Include hidden system columns.
    pub verbose: bool,
    /// Maximum table column width; `None` means unbounded.
    pub max_column_width: Option<usize>,
    /// Bound of the streaming row channel.
    pub channel_capacity: usize,
}

impl OutputConfig {
    /// Default delimiter of the delimited renderer.
    pub const DEFAULT_DELIMITER: &'static str = "\t";

    /// Default bound of the streaming row channel.
    pub const DEFAULT_CHANNEL_CAPACITY: usize = 1;

    /// Create a configuration for `format`, everything else defaulted.
    #[must_use]
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            delimiter: Self::DEFAULT_DELIMITER.to_owned(),
            single_line: false,
            quiet: false,
            verbose: false,
            max_column_width: None,
            channel_capacity: Self::DEFAULT_CHANNEL_CAPACITY,
        }
    }

    /// Convenience: CSV output.
    #[must_use]
    pub fn csv() -> Self {
        Self::new(OutputFormat::Csv)
    }

    /// Convenience: JSON-lines output.
    #[must_use]
    pub fn json() -> Self {
        Self::new(OutputFormat::Json)
    }

    /// Convenience: delimited output with the given separator.
    #[must_use]
    pub fn delimited(delimiter: impl Into<String>) -> Self {
        Self::new(OutputFormat::Delimited).with_delimiter(delimiter)
    }

    /// Set the format.
    #[must_use]
    pub const fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Set single-line mode.
    #[must_use]
    pub const fn with_single_line(mut self, single_line: bool) -> Self {
        self.single_line = single_line;
        self
    }

    /// Set quiet mode.
    #[must_use]
    pub const fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Set verbose mode.
    #[must_use]
    pub const fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set the table column width cap.
    #[must_use]
    pub const fn with_max_column_width(mut self, width: Option<usize>) -> Self {
        self.max_column_width = width;
        self
    }

    /// Set the streaming channel bound.
    #[must_use]
    pub const fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Load a configuration from a JSON file. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read, is not valid JSON, or fails
    /// [`OutputConfig::validate`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, OutputError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| OutputError::config(format!("{}: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| OutputError::config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values renderers rely on.
    ///
    /// # Errors
    ///
    /// Fails on a zero channel capacity or width cap, and on an empty
    /// delimiter for delimited output.
    pub fn validate(&self) -> Result<(), OutputError> {
        if self.channel_capacity == 0 {
            return Err(OutputError::config("channel_capacity must be at least 1"));
        }
        if self.max_column_width == Some(0) {
            return Err(OutputError::config("max_column_width must be at least 1"));
        }
        if self.format == OutputFormat::Delimited && self.delimiter.is_empty() {
            return Err(OutputError::config("delimiter must not be empty"));
        }
        Ok(())
    }
}

impl Default for OutputConfig {
    /// Table output, tab delimiter, hidden columns dropped.
    fn default() -> Self {
        Self::new(OutputFormat::default())
    }
}
