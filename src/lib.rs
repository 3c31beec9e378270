pub mod cli;
pub mod config;
pub mod decoder;
pub mod error;
pub mod extractor;
pub mod logging;
pub mod scanner;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, OutputConfig, ScanConfig};
pub use error::{DngMetaError, Result, UserFriendlyError};

// Core functionality re-exports
pub use decoder::{CameraIdentity, DecodeStage, RawDecoder, RawloaderDecoder};
pub use extractor::{CsvWriter, Extraction, MetadataExtractor, ScanProgress, ScanReport};
pub use scanner::{file_id, is_dng_file, DngFile, DngScanner, FileFilter};
pub use ui::{GracefulShutdown, OutputFormatter, OutputMode, ProgressManager};

use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Main library interface: scan a tree of DNG files and write the camera CSV.
pub struct DngMeta {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
}

impl DngMeta {
    /// Create a new instance with the provided configuration
    pub fn new(
        config: Config,
        output_mode: OutputMode,
        verbose: u8,
        quiet: bool,
        show_progress: bool,
    ) -> Result<Self> {
        Ok(Self {
            config,
            output_formatter: OutputFormatter::new(output_mode, verbose, quiet),
            progress_manager: ProgressManager::new(show_progress && !quiet),
            shutdown: GracefulShutdown::new()?,
        })
    }

    /// Create an instance for testing (no signal handler registration)
    #[cfg(test)]
    pub fn new_for_test(config: Config) -> Self {
        Self {
            config,
            output_formatter: OutputFormatter::new(OutputMode::Plain, 0, true),
            progress_manager: ProgressManager::new(false),
            shutdown: GracefulShutdown::new_for_test(),
        }
    }

    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Self::new(
            config,
            output_mode,
            cli_args.verbosity_level(),
            cli_args.quiet,
            cli_args.show_progress(),
        )
    }

    /// Scan the configured root and write one CSV row per DNG file.
    ///
    /// Per-file decode failures end up as rows with empty metadata; only
    /// traversal, output and cancellation errors abort the run.
    pub fn generate_camera_info(&self) -> Result<ScanReport> {
        if self.config.scan.parallel {
            #[cfg(feature = "parallel")]
            {
                return self.generate_parallel_with(RawloaderDecoder::new);
            }

            #[cfg(not(feature = "parallel"))]
            {
                tracing::warn!("parallel decoding requested but the `parallel` feature is not enabled; running sequentially");
                self.output_formatter
                    .warning("Built without the `parallel` feature, decoding sequentially");
            }
        }

        self.generate_with_decoder(RawloaderDecoder::new())
    }

    /// Sequential run with a caller-supplied decoder.
    pub fn generate_with_decoder<D: RawDecoder>(&self, decoder: D) -> Result<ScanReport> {
        let root = &self.config.scan.root_dir;
        let outfile = &self.config.output.outfile;

        self.output_formatter
            .start_operation(&format!("Scanning {} for DNG files", root.display()));
        tracing::info!(root = %root.display(), outfile = %outfile.display(), "starting scan");

        let scanner = DngScanner::new(&self.config.scan)?;
        let files = scanner.scan(root)?;
        let mut writer = self.open_writer()?;

        let mut extractor = MetadataExtractor::new(decoder);
        let mut progress = ScanProgress::new();
        let spinner = self.progress_manager.create_scan_spinner();

        for file in files {
            let file = match file {
                Ok(file) => file,
                Err(e) => {
                    writer.flush()?;
                    spinner.abandon();
                    tracing::error!(rows = writer.rows_written(), error = %e, "traversal failed");
                    return Err(e);
                }
            };

            if let Err(e) = self.shutdown.check_shutdown() {
                writer.flush()?;
                spinner.abandon_with_message("Cancelled");
                tracing::info!(rows = writer.rows_written(), "scan cancelled");
                return Err(e);
            }

            let extraction = extractor.extract(&file.path);
            log_extraction(&file, &extraction);

            writer.write_row(&file.file_id, &extraction)?;
            progress.record(&file, &extraction);
            ui::progress::update_scan_progress(&spinner, &progress);
        }

        writer.finish()?;

        ui::progress::finish_progress_with_summary(
            &spinner,
            &format!("Processed {} files", progress.files_matched),
            progress.elapsed(),
        );
        tracing::info!(
            files = progress.files_matched,
            decoded = progress.files_decoded,
            failed = progress.failures.len(),
            files_per_second = progress.files_per_second(),
            "scan finished"
        );

        Ok(progress.into_report(root.clone(), outfile.clone()))
    }

    /// Parallel run: collect the eligible paths, decode them on the rayon
    /// pool with one decoder per worker, then write rows in traversal order.
    #[cfg(feature = "parallel")]
    pub fn generate_parallel_with<D, F>(&self, make_decoder: F) -> Result<ScanReport>
    where
        D: RawDecoder,
        F: Fn() -> D + Sync + Send,
    {
        use rayon::prelude::*;
        use std::sync::atomic::Ordering;

        let root = &self.config.scan.root_dir;
        let outfile = &self.config.output.outfile;

        self.output_formatter
            .start_operation(&format!("Scanning {} for DNG files", root.display()));
        tracing::info!(root = %root.display(), outfile = %outfile.display(), "starting parallel scan");

        let scanner = DngScanner::new(&self.config.scan)?;
        let files = scanner.collect(root)?;
        let mut writer = self.open_writer()?;

        let mut progress = ScanProgress::new();
        let bar = self.progress_manager.create_file_progress(files.len() as u64);
        let running = self.shutdown.running_flag();

        let extractions: Vec<Option<Extraction>> = files
            .par_iter()
            .map_init(
                || MetadataExtractor::new(make_decoder()),
                |extractor, file| {
                    if !running.load(Ordering::SeqCst) {
                        return None;
                    }
                    let extraction = extractor.extract(&file.path);
                    bar.inc(1);
                    Some(extraction)
                },
            )
            .collect();

        for (file, extraction) in files.iter().zip(extractions) {
            let Some(extraction) = extraction else {
                writer.flush()?;
                bar.abandon_with_message("Cancelled");
                tracing::info!(rows = writer.rows_written(), "scan cancelled");
                return Err(DngMetaError::Cancelled);
            };

            log_extraction(file, &extraction);
            writer.write_row(&file.file_id, &extraction)?;
            progress.record(file, &extraction);
        }

        writer.finish()?;

        ui::progress::finish_progress_with_summary(
            &bar,
            &format!("Processed {} files", progress.files_matched),
            progress.elapsed(),
        );
        tracing::info!(
            files = progress.files_matched,
            decoded = progress.files_decoded,
            failed = progress.failures.len(),
            files_per_second = progress.files_per_second(),
            "scan finished"
        );

        Ok(progress.into_report(root.clone(), outfile.clone()))
    }

    /// Walk the tree without decoding or touching the output file.
    pub fn dry_run(&self) -> Result<Vec<DngFile>> {
        let scanner = DngScanner::new(&self.config.scan)?;
        let files = scanner.collect(&self.config.scan.root_dir)?;
        tracing::debug!(files = files.len(), "dry run finished");
        Ok(files)
    }

    fn open_writer(&self) -> Result<CsvWriter<BufWriter<File>>> {
        let outfile = &self.config.output.outfile;
        if self.config.output.create_dirs {
            CsvWriter::create_with_parents(outfile)
        } else {
            CsvWriter::create(outfile)
        }
    }

    /// Write the default configuration as a starting point.
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        Config::default().save_to_file(output_path)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn is_running(&self) -> bool {
        self.shutdown.is_running()
    }

    pub fn request_shutdown(&self) {
        self.shutdown.request_shutdown();
    }

    pub fn handle_error(&self, error: &DngMetaError, usage: Option<&str>) {
        self.output_formatter.print_user_friendly_error(error, usage);
    }
}

fn log_extraction(file: &DngFile, extraction: &Extraction) {
    match extraction {
        Extraction::Decoded(identity) => {
            tracing::debug!(
                file_id = %file.file_id,
                make = %identity.make,
                model = %identity.model,
                "decoded"
            );
        }
        Extraction::Failed { stage, reason } => {
            tracing::debug!(
                path = %file.display_path(),
                %stage,
                %reason,
                "decode failed, writing empty metadata"
            );
        }
    }
}

/// Sorted unique `make_model` identifiers from a CSV written by a previous run.
pub fn camera_models_from_csv<P: AsRef<Path>>(path: P) -> Result<BTreeSet<String>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;

    extractor::unique_models_from_csv(&content).ok_or_else(|| DngMetaError::InvalidArguments {
        message: format!(
            "{} is not a camera CSV (expected a header with make and model columns)",
            path.display()
        ),
    })
}

pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
