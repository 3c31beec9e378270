use crate::decoder::DecodeStage;
use crate::extractor::Extraction;
use crate::scanner::DngFile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedFile {
    pub path: PathBuf,
    pub file_id: String,
    pub stage: DecodeStage,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub root_dir: PathBuf,
    pub outfile: PathBuf,
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
    pub files_matched: usize,
    pub files_decoded: usize,
    pub failures: Vec<FailedFile>,
    /// Rows per `make_model` key, sorted by key.
    pub camera_models: BTreeMap<String, usize>,
}

impl ScanReport {
    pub fn unique_models(&self) -> Vec<&str> {
        self.camera_models.keys().map(String::as_str).collect()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Accumulates per-file outcomes while the scan runs.
#[derive(Debug, Clone)]
pub struct ScanProgress {
    pub files_matched: usize,
    pub files_decoded: usize,
    pub current_file: Option<String>,
    pub failures: Vec<FailedFile>,
    camera_models: BTreeMap<String, usize>,
    started_at: DateTime<Utc>,
    start_time: Instant,
}

impl ScanProgress {
    pub fn new() -> Self {
        Self {
            files_matched: 0,
            files_decoded: 0,
            current_file: None,
            failures: Vec::new(),
            camera_models: BTreeMap::new(),
            started_at: Utc::now(),
            start_time: Instant::now(),
        }
    }

    pub fn record(&mut self, file: &DngFile, extraction: &Extraction) {
        self.files_matched += 1;
        self.current_file = Some(file.file_id.clone());

        match extraction {
            Extraction::Decoded(identity) => {
                self.files_decoded += 1;
                *self.camera_models.entry(identity.model_key()).or_insert(0) += 1;
            }
            Extraction::Failed { stage, reason } => {
                self.failures.push(FailedFile {
                    path: file.path.clone(),
                    file_id: file.file_id.clone(),
                    stage: *stage,
                    reason: reason.clone(),
                });
            }
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn files_per_second(&self) -> f64 {
        let secs = self.elapsed().as_secs_f64();
        if secs > 0.0 {
            self.files_matched as f64 / secs
        } else {
            0.0
        }
    }

    pub fn into_report(self, root_dir: PathBuf, outfile: PathBuf) -> ScanReport {
        ScanReport {
            root_dir,
            outfile,
            started_at: self.started_at,
            duration: self.start_time.elapsed(),
            files_matched: self.files_matched,
            files_decoded: self.files_decoded,
            failures: self.failures,
            camera_models: self.camera_models,
        }
    }
}

impl Default for ScanProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique `make_model` keys from a CSV previously written by this tool.
///
/// Rows without a `make` and `model` (failed decodes) still contribute the
/// key `_`, mirroring how the columns read back.
pub fn unique_models_from_csv(content: &str) -> Option<BTreeSet<String>> {
    let mut lines = content.lines();
    let header: Vec<&str> = lines.next()?.split(',').collect();
    let make_idx = header.iter().position(|h| *h == "make")?;
    let model_idx = header.iter().position(|h| *h == "model")?;

    let models = lines
        .filter(|line| !line.is_empty())
        .map(|line| {
            let fields: Vec<&str> = line.split(',').collect();
            let make = fields.get(make_idx).copied().unwrap_or("");
            let model = fields.get(model_idx).copied().unwrap_or("");
            format!("{}_{}", make, model).replace(' ', "_")
        })
        .collect();

    Some(models)
}
