use std::path::PathBuf;

use clap::Parser;
use gridview_output::{OutputConfig, OutputError, OutputFormat};

/// gridview - render JSON documents as a table, CSV, JSON lines or delimited text
#[derive(Parser, Debug)]
#[command(name = "gridview")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// File with one JSON document per line; reads stdin when absent
    pub input: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long, value_enum)]
    pub format: Option<FormatArg>,

    /// Column separator for delimited output
    #[arg(short = 'd', long)]
    pub delimiter: Option<String>,

    /// Collapse line breaks inside cells
    #[arg(long, default_value_t = false)]
    pub single_line: bool,

    /// Suppress everything but the rendered data
    #[arg(short = 'q', long, default_value_t = false)]
    pub quiet: bool,

    /// Include the key and value type columns
    #[arg(short = 'v', long, default_value_t = false)]
    pub verbose: bool,

    /// Maximum table column width
    #[arg(long)]
    pub max_width: Option<usize>,

    /// JSON file with output settings; flags take precedence
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Render rows while the input is still being read
    #[arg(long, default_value_t = false)]
    pub stream: bool,
}

impl Args {
    /// Merge the config file (if any) with the flags into one configuration.
    pub fn to_config(&self) -> Result<OutputConfig, OutputError> {
        let mut config = match &self.config {
            Some(path) => OutputConfig::load(path)?,
            None => OutputConfig::default(),
        };
        if let Some(format) = self.format {
            config = config.with_format(format.into());
        }
        if let Some(delimiter) = &self.delimiter {
            config = config.with_delimiter(delimiter.as_str());
        }
        if self.max_width.is_some() {
            config = config.with_max_column_width(self.max_width);
        }
        let single_line = config.single_line || self.single_line;
        let quiet = config.quiet || self.quiet;
        let verbose = config.verbose || self.verbose;
        let config = config
            .with_single_line(single_line)
            .with_quiet(quiet)
            .with_verbose(verbose);
        config.validate()?;
        Ok(config)
    }
}

/// Command-line argument wrapper for OutputFormat
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FormatArg {
    /// Bordered table
    #[value(name = "table")]
    Table,
    /// Comma separated values
    #[value(name = "csv")]
    Csv,
    /// One JSON object per line
    #[value(name = "json")]
    Json,
    /// Delimiter separated values
    #[value(name = "delimited")]
    Delimited,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Table => OutputFormat::Table,
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Delimited => OutputFormat::Delimited,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&["gridview"], OutputFormat::Table)]
    #[case(&["gridview", "--format", "csv"], OutputFormat::Csv)]
    #[case(&["gridview", "-f", "json", "rows.jsonl"], OutputFormat::Json)]
    #[case(&["gridview", "--format", "delimited"], OutputFormat::Delimited)]
    fn test_format_flag(#[case] argv: &[&str], #[case] expected: OutputFormat) {
        let args = Args::try_parse_from(argv.iter().copied()).unwrap();
        assert_eq!(args.to_config().unwrap().format, expected);
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::try_parse_from([
            "gridview",
            "--delimiter",
            ";",
            "--single-line",
            "--quiet",
            "--verbose",
            "--max-width",
            "20",
            "--stream",
            "in.jsonl",
        ])
        .unwrap();
        let config = args.to_config().unwrap();
        assert_eq!(config.delimiter, ";");
        assert!(config.single_line && config.quiet && config.verbose);
        assert_eq!(config.max_column_width, Some(20));
        assert!(args.stream);
        assert_eq!(args.input, Some(PathBuf::from("in.jsonl")));
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(
            &mut file,
            br#"{"format": "json", "quiet": true, "channel_capacity": 4}"#,
        )
        .unwrap();
        let path = file.path().to_str().unwrap();
        let args =
            Args::try_parse_from(["gridview", "--config", path, "--format", "csv", "-v"]).unwrap();
        assert_eq!(
            args.to_config().unwrap(),
            OutputConfig::csv()
                .with_quiet(true)
                .with_verbose(true)
                .with_channel_capacity(4)
        );
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(Args::try_parse_from(["gridview", "--format", "xml"]).is_err());
    }

    #[test]
    fn test_zero_width_rejected() {
        let args = Args::try_parse_from(["gridview", "--max-width", "0"]).unwrap();
        assert!(args.to_config().is_err());
    }
}
