use crate::error::{DngMetaError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_ROOT_DIR: &str = "/datasets/MITAdobeFiveK/raw/fivek_dataset/raw_photos";
pub const DEFAULT_OUTFILE: &str = "./data/camera_models.csv";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub scan: ScanConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanConfig {
    pub root_dir: PathBuf,
    pub follow_links: bool,
    /// Unlimited when absent.
    pub max_depth: Option<usize>,
    /// Regexes matched against directory paths; matching directories are not entered.
    pub exclude_patterns: Vec<String>,
    pub parallel: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub outfile: PathBuf,
    /// Create missing parent directories of `outfile` instead of failing.
    pub create_dirs: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from(DEFAULT_ROOT_DIR),
            follow_links: false,
            max_depth: None,
            exclude_patterns: Vec::new(),
            parallel: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            outfile: PathBuf::from(DEFAULT_OUTFILE),
            create_dirs: false,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DngMetaError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| DngMetaError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| DngMetaError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["dngmeta.toml", ".dngmeta.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        tracing::debug!(path = default_path, "loading configuration file");
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref root_dir) = cli_args.root_dir {
            self.scan.root_dir = root_dir.clone();
        }

        if let Some(ref outfile) = cli_args.outfile {
            self.output.outfile = outfile.clone();
        }

        if let Some(ref exclude) = cli_args.exclude {
            self.scan.exclude_patterns.extend(exclude.clone());
        }

        if let Some(max_depth) = cli_args.max_depth {
            self.scan.max_depth = Some(max_depth);
        }

        if let Some(follow_links) = cli_args.follow_links {
            self.scan.follow_links = follow_links;
        }

        if let Some(parallel) = cli_args.parallel {
            self.scan.parallel = parallel;
        }

        if let Some(create_dirs) = cli_args.create_dirs {
            self.output.create_dirs = create_dirs;
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| DngMetaError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| DngMetaError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.scan.root_dir.as_os_str().is_empty() {
            return Err(DngMetaError::InvalidArguments {
                message: "Root directory must not be empty".to_string(),
            });
        }

        if self.output.outfile.as_os_str().is_empty() {
            return Err(DngMetaError::InvalidArguments {
                message: "Output file must not be empty".to_string(),
            });
        }

        if self.scan.max_depth == Some(0) {
            return Err(DngMetaError::Config {
                message: "Maximum directory depth must be greater than 0".to_string(),
            });
        }

        self.compile_exclude_patterns()?;

        Ok(())
    }

    pub fn compile_exclude_patterns(&self) -> Result<Vec<Regex>> {
        self.scan
            .exclude_patterns
            .iter()
            .map(|pattern| Regex::new(pattern).map_err(DngMetaError::from))
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub root_dir: Option<PathBuf>,
    pub outfile: Option<PathBuf>,
    pub exclude: Option<Vec<String>>,
    pub max_depth: Option<usize>,
    pub follow_links: Option<bool>,
    pub parallel: Option<bool>,
    pub create_dirs: Option<bool>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root_dir(mut self, root_dir: Option<PathBuf>) -> Self {
        self.root_dir = root_dir;
        self
    }

    pub fn with_outfile(mut self, outfile: Option<PathBuf>) -> Self {
        self.outfile = outfile;
        self
    }

    pub fn with_exclude(mut self, exclude: Option<Vec<String>>) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_follow_links(mut self, follow_links: Option<bool>) -> Self {
        self.follow_links = follow_links;
        self
    }

    pub fn with_parallel(mut self, parallel: Option<bool>) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_create_dirs(mut self, create_dirs: Option<bool>) -> Self {
        self.create_dirs = create_dirs;
        self
    }
}
