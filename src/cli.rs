use crate::config::{CliOverrides, Config};
use crate::error::Result;
use crate::logging::LogFormat;
use clap::{CommandFactory, Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dngmeta")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract camera make and model from a tree of DNG raw images")]
#[command(
    long_about = "dngmeta walks a directory tree, decodes every file ending in .dng and \
                  writes one CSV row per file with the camera make and model reported \
                  by the raw decoder. Files that cannot be decoded get empty fields."
)]
#[command(after_help = "EXAMPLES:\n  \
    dngmeta\n  \
    dngmeta -r ~/photos/raw -o cameras.csv\n  \
    dngmeta -r ~/photos/raw --exclude thumbs,previews --dry-run\n  \
    dngmeta --models cameras.csv")]
pub struct Cli {
    /// Root directory to scan [default: /datasets/MITAdobeFiveK/raw/fivek_dataset/raw_photos]
    #[arg(
        short = 'r',
        long = "root_dir",
        visible_alias = "root-dir",
        env = "DNGMETA_ROOT_DIR",
        value_parser = non_empty_path
    )]
    pub root_dir: Option<PathBuf>,

    /// Output CSV path [default: ./data/camera_models.csv]
    #[arg(short, long, env = "DNGMETA_OUTFILE", value_parser = non_empty_path)]
    pub outfile: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Directory patterns to skip (comma-separated regexes)
    #[arg(short, long, value_delimiter = ',')]
    pub exclude: Option<Vec<String>>,

    /// Maximum directory depth to descend
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Follow symbolic links while walking
    #[arg(long)]
    pub follow_links: bool,

    /// Decode files on a worker pool (requires the `parallel` feature)
    #[arg(long)]
    pub parallel: bool,

    /// Create missing parent directories of the output file
    #[arg(long)]
    pub create_dirs: bool,

    /// Output format for reports
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Format of diagnostic logs on stderr
    #[arg(long, value_enum, default_value_t = LogFormatArg::Pretty)]
    pub log_format: LogFormatArg,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// List the files that would be processed without decoding them
    #[arg(long)]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,

    /// Print the unique camera models found in an existing CSV
    #[arg(long, value_name = "CSV", value_parser = non_empty_path)]
    pub models: Option<PathBuf>,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Json,
}

impl From<&LogFormatArg> for LogFormat {
    fn from(arg: &LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_root_dir(self.root_dir.clone())
            .with_outfile(self.outfile.clone())
            .with_exclude(self.exclude.clone())
            .with_max_depth(self.max_depth)
            .with_follow_links(self.follow_links.then_some(true))
            .with_parallel(self.parallel.then_some(true))
            .with_create_dirs(self.create_dirs.then_some(true))
    }

    pub fn show_progress(&self) -> bool {
        !self.quiet && matches!(self.output_format, OutputFormat::Human)
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Usage line printed after fatal errors.
    pub fn usage() -> String {
        Self::command().render_usage().to_string()
    }
}

pub fn non_empty_path(s: &str) -> std::result::Result<PathBuf, String> {
    if s.trim().is_empty() {
        return Err("path must not be empty".to_string());
    }
    Ok(PathBuf::from(s))
}
