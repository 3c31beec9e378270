use crate::error::{DngMetaError, UserFriendlyError};
use crate::extractor::ScanReport;
use crate::scanner::DngFile;
use crate::ui::progress::format_duration;
use console::{style, Emoji, Term};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static CAMERA: Emoji = Emoji("📷 ", "> ");

pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = match mode {
            OutputMode::Human => Term::stdout().features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    pub fn success(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Success, message),
                OutputMode::Json => self.print_json_message("success", message),
                OutputMode::Plain => println!("SUCCESS: {}", message),
            }
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Json => self.print_json_message("warning", message),
                OutputMode::Plain => println!("WARNING: {}", message),
            }
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", CAMERA, style(operation).bold());
                    } else {
                        println!("> {}", operation);
                    }
                }
                OutputMode::Json => self.print_json_message("operation_start", operation),
                OutputMode::Plain => println!("STARTING: {}", operation),
            }
        }
    }

    /// Fatal errors go to stderr, followed by the suggestion and `usage`.
    pub fn print_user_friendly_error(&self, error: &DngMetaError, usage: Option<&str>) {
        self.error(&error.user_message());

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human if self.use_colors => {
                    eprintln!(
                        "{}{}",
                        INFO,
                        style(format!("Suggestion: {}", suggestion)).cyan()
                    );
                }
                OutputMode::Json => {
                    eprintln!(
                        "{}",
                        serde_json::json!({
                            "type": "suggestion",
                            "message": suggestion
                        })
                    );
                }
                _ => eprintln!("Suggestion: {}", suggestion),
            }
        }

        if let Some(usage) = usage {
            if self.mode != OutputMode::Json {
                eprintln!();
                eprintln!("{}", usage);
            }
        }
    }

    pub fn print_scan_report(&self, report: &ScanReport) {
        match self.mode {
            OutputMode::Human => {
                if !self.quiet {
                    self.print_human_report(report);
                }
            }
            OutputMode::Json => {
                let json_output =
                    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string());
                println!("{}", json_output);
            }
            OutputMode::Plain => self.print_plain_report(report),
        }
    }

    pub fn print_dry_run(&self, files: &[DngFile]) {
        match self.mode {
            OutputMode::Json => {
                let entries: Vec<_> = files
                    .iter()
                    .map(|f| {
                        serde_json::json!({
                            "file_id": f.file_id,
                            "path": f.display_path(),
                        })
                    })
                    .collect();
                self.print_json_object(&serde_json::json!({
                    "type": "dry_run",
                    "files": entries,
                }));
            }
            _ => {
                for file in files {
                    println!("{}\t{}", file.file_id, file.display_path());
                }
            }
        }
    }

    pub fn print_models<'a, I>(&self, models: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        match self.mode {
            OutputMode::Json => {
                let models: Vec<&str> = models.into_iter().collect();
                self.print_json_object(&serde_json::json!({
                    "type": "camera_models",
                    "models": models,
                }));
            }
            _ => {
                for model in models {
                    println!("{}", model);
                }
            }
        }
    }

    pub fn print_header(&self, title: &str) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                println!();
                if self.use_colors {
                    println!("{} {}", CAMERA, style(title).bold().cyan());
                } else {
                    println!("=== {} ===", title);
                }
                println!();
            }
            OutputMode::Json => {}
            OutputMode::Plain => {
                println!("=== {} ===", title);
            }
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => {
                println!("{}", "-".repeat(60));
            }
            OutputMode::Json => {}
        }
    }

    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        if self.use_colors {
            let (emoji, styled) = match msg_type {
                MessageType::Success => (&CHECKMARK, style(message).green().bold()),
                MessageType::Error => (&CROSS, style(message).red().bold()),
                MessageType::Warning => (&WARNING, style(message).yellow().bold()),
                MessageType::Info => (&INFO, style(message).cyan()),
            };

            match msg_type {
                MessageType::Error => eprintln!("{}{}", emoji, styled),
                _ => println!("{}{}", emoji, styled),
            }
        } else {
            let prefix = match msg_type {
                MessageType::Success => "✓",
                MessageType::Error => "✗",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };

            match msg_type {
                MessageType::Error => eprintln!("{} {}", prefix, message),
                _ => println!("{} {}", prefix, message),
            }
        }
    }

    /// Status messages go to stderr in JSON mode; stdout carries a single document.
    fn print_json_message(&self, level: &str, message: &str) {
        let obj = serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        });
        eprintln!("{}", obj);
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn highlight(&self, value: String) -> String {
        if self.use_colors {
            style(value).cyan().bold().to_string()
        } else {
            value
        }
    }

    fn print_human_report(&self, report: &ScanReport) {
        self.print_header("Camera Scan Report");

        println!("  Root directory:  {}", report.root_dir.display());
        println!("  Output file:     {}", report.outfile.display());
        println!(
            "  Started at:      {}",
            report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        println!(
            "  DNG files:       {}",
            self.highlight(report.files_matched.to_string())
        );
        println!(
            "  Decoded:         {}",
            self.highlight(report.files_decoded.to_string())
        );
        if report.has_failures() {
            println!(
                "  Failed:          {}",
                self.highlight(report.failures.len().to_string())
            );
        }
        println!(
            "  Time taken:      {}",
            self.highlight(format_duration(report.duration))
        );

        if !report.camera_models.is_empty() {
            println!();
            println!("Camera models:");
            for (model, count) in &report.camera_models {
                println!("  {}: {} files", model, count);
            }
        }

        if report.has_failures() && self.verbose_level >= 1 {
            println!();
            println!("Files written with empty metadata:");
            for failure in &report.failures {
                println!(
                    "  - {} ({} failed: {})",
                    failure.path.display(),
                    failure.stage,
                    failure.reason
                );
            }
        }

        println!();
        self.print_separator();
        self.success(&format!(
            "Wrote {} rows to {}",
            report.files_matched,
            report.outfile.display()
        ));
    }

    fn print_plain_report(&self, report: &ScanReport) {
        println!("REPORT: Scan completed");
        println!("Root: {}", report.root_dir.display());
        println!("Outfile: {}", report.outfile.display());
        println!("Files: {}", report.files_matched);
        println!("Decoded: {}", report.files_decoded);
        println!("Failed: {}", report.failures.len());
        println!("Models: {}", report.camera_models.len());
        println!("Duration: {:?}", report.duration);
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatter_creation() {
        let formatter = OutputFormatter::new(OutputMode::Plain, 1, false);
        assert_eq!(formatter.mode, OutputMode::Plain);
        assert_eq!(formatter.verbose_level, 1);
        assert!(!formatter.use_colors);
    }

    #[test]
    fn test_quiet_mode() {
        let formatter = OutputFormatter::new(OutputMode::Human, 2, true);
        assert_eq!(formatter.verbose_level, 0);
        assert!(formatter.quiet);
        assert!(!formatter.use_colors);
    }

    #[test]
    fn test_should_show_message() {
        let formatter = OutputFormatter::new(OutputMode::Human, 1, false);
        assert!(formatter.should_show_message(0));
        assert!(formatter.should_show_message(1));
        assert!(!formatter.should_show_message(2));

        let quiet_formatter = OutputFormatter::new(OutputMode::Human, 2, true);
        assert!(!quiet_formatter.should_show_message(0));
    }

    #[test]
    fn test_highlight_without_colors() {
        let formatter = OutputFormatter::new(OutputMode::Plain, 0, false);
        assert_eq!(formatter.highlight("42".to_string()), "42");
    }
}
