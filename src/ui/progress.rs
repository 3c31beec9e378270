use crate::extractor::ScanProgress;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub struct ProgressManager {
    enabled: bool,
}

impl ProgressManager {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Spinner for the scan; the total is unknown because the walk is lazy.
    pub fn create_scan_spinner(&self) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] {pos:>7} files {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        pb.set_message("Scanning for DNG files...");
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    /// Bar for the parallel path, where the file count is known up front.
    pub fn create_file_progress(&self, total_files: u64) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(total_files);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>7}/{len:7} files {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
        );
        pb.set_message("Decoding files...");
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new(true)
    }
}

pub fn update_scan_progress(pb: &ProgressBar, progress: &ScanProgress) {
    pb.set_position(progress.files_matched as u64);

    match progress.current_file {
        Some(ref current_file) => {
            let failed = progress.failures.len();
            if failed > 0 {
                pb.set_message(format!("{} ({} failed)", current_file, failed));
            } else {
                pb.set_message(current_file.clone());
            }
        }
        None => pb.set_message("Scanning for DNG files..."),
    }
}

pub fn finish_progress_with_summary(pb: &ProgressBar, message: &str, duration: Duration) {
    let final_message = format!("{} (completed in {})", message, format_duration(duration));
    pb.finish_with_message(final_message);
}

pub(crate) fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", duration.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::DecodeStage;
    use crate::extractor::Extraction;
    use crate::scanner::DngFile;
    use std::path::PathBuf;

    #[test]
    fn test_progress_manager_creation() {
        let manager = ProgressManager::new(true);
        assert!(manager.enabled);

        let disabled_manager = ProgressManager::new(false);
        assert!(!disabled_manager.enabled);
    }

    #[test]
    fn test_disabled_progress_bars() {
        let manager = ProgressManager::new(false);
        assert!(manager.create_scan_spinner().is_hidden());
        assert!(manager.create_file_progress(10).is_hidden());
    }

    #[test]
    fn test_update_scan_progress() {
        let pb = ProgressBar::hidden();
        let mut progress = ScanProgress::new();

        update_scan_progress(&pb, &progress);
        assert_eq!(pb.position(), 0);

        let file = DngFile::new(PathBuf::from("/raw/a0001.dng"));
        progress.record(
            &file,
            &Extraction::Failed {
                stage: DecodeStage::Open,
                reason: "gone".to_string(),
            },
        );
        update_scan_progress(&pb, &progress);
        assert_eq!(pb.position(), 1);
        assert_eq!(pb.message(), "a0001 (1 failed)");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(30)), "30s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_secs(3661)), "61m 1s");
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
    }
}
