use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use dngmeta::{
    camera_models_from_csv, logging, Cli, DngMeta, DngMetaError, OutputFormat, OutputFormatter,
    OutputMode, UserFriendlyError,
};
use std::collections::BTreeSet;
use std::path::Path;
use std::process;

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // clap renders the message together with the usage line
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
        }
    };

    logging::init(cli.verbose, cli.quiet, (&cli.log_format).into());

    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    if let Some(ref csv) = cli.models {
        return handle_models(&cli, csv);
    }

    let app = match DngMeta::from_cli(&cli) {
        Ok(app) => app,
        Err(e) => {
            print_startup_error(&cli, &e);
            return 1;
        }
    };

    if cli.dry_run {
        return handle_dry_run(&app);
    }

    match app.generate_camera_info() {
        Ok(report) => {
            app.output_formatter().print_scan_report(&report);
            0
        }
        Err(DngMetaError::Cancelled) => {
            app.output_formatter()
                .warning("Scan cancelled; rows written so far were kept");
            130
        }
        Err(e) => {
            app.handle_error(&e, Some(&Cli::usage()));
            1
        }
    }
}

fn formatter_for(cli: &Cli) -> OutputFormatter {
    let mode = match cli.output_format {
        OutputFormat::Human => OutputMode::Human,
        OutputFormat::Json => OutputMode::Json,
        OutputFormat::Plain => OutputMode::Plain,
    };
    OutputFormatter::new(mode, cli.verbosity_level(), cli.quiet)
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "dngmeta.toml".to_string());

    match DngMeta::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  dngmeta --config {}", config_path);
            0
        }
        Err(e) => {
            eprintln!(
                "Failed to generate configuration file: {}",
                e.user_message()
            );
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn load_models(csv: &Path) -> anyhow::Result<BTreeSet<String>> {
    camera_models_from_csv(csv)
        .with_context(|| format!("Failed to read camera models from {}", csv.display()))
}

fn handle_models(cli: &Cli, csv: &Path) -> i32 {
    match load_models(csv) {
        Ok(models) => {
            formatter_for(cli).print_models(models.iter().map(String::as_str));
            0
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

fn handle_dry_run(app: &DngMeta) -> i32 {
    let formatter = app.output_formatter();
    formatter.info("DRY RUN MODE - no files will be decoded and no CSV will be written");

    match app.dry_run() {
        Ok(files) => {
            formatter.print_dry_run(&files);
            formatter.info(&format!(
                "{} DNG files would be written to {}",
                files.len(),
                app.config().output.outfile.display()
            ));
            0
        }
        Err(e) => {
            app.handle_error(&e, Some(&Cli::usage()));
            1
        }
    }
}

fn print_startup_error(cli: &Cli, error: &DngMetaError) {
    formatter_for(cli).print_user_friendly_error(error, Some(&Cli::usage()));
}
