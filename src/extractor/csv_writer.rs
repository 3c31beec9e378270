use crate::error::{DngMetaError, Result};
use crate::extractor::Extraction;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

pub const CSV_HEADER: &str = "file_id,make,normalized_make,model,normalized_model";

/// One output line, newline included. Values are written as-is.
pub fn format_row(file_id: &str, extraction: &Extraction) -> String {
    format!("{},{}\n", file_id, extraction.csv_fields())
}

/// Writes the camera CSV: a fixed header followed by one line per file.
///
/// Each row is handed to the underlying writer as a single `write_all`, so an
/// interrupted run leaves whole lines behind.
pub struct CsvWriter<W: Write> {
    writer: W,
    target: String,
    rows_written: usize,
}

impl CsvWriter<BufWriter<File>> {
    /// Truncates (or creates) `path` and writes the header.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let target = path.display().to_string();

        let file = File::create(path).map_err(|source| DngMetaError::OutputFile {
            path: target.clone(),
            source,
        })?;

        Self::with_target(BufWriter::new(file), target)
    }

    /// Like [`CsvWriter::create`], but creates missing parent directories first.
    pub fn create_with_parents<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| DngMetaError::OutputFile {
                path: path.display().to_string(),
                source,
            })?;
        }
        Self::create(path)
    }
}

impl<W: Write> CsvWriter<W> {
    pub fn new(writer: W) -> Result<Self> {
        Self::with_target(writer, "<stream>".to_string())
    }

    fn with_target(writer: W, target: String) -> Result<Self> {
        let mut csv = Self {
            writer,
            target,
            rows_written: 0,
        };
        csv.write_line(&format!("{}\n", CSV_HEADER))?;
        Ok(csv)
    }

    pub fn write_row(&mut self, file_id: &str, extraction: &Extraction) -> Result<()> {
        self.write_line(&format_row(file_id, extraction))?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    pub fn flush(&mut self) -> Result<()> {
        let target = &self.target;
        self.writer
            .flush()
            .map_err(|source| DngMetaError::OutputFile {
                path: target.clone(),
                source,
            })
    }

    /// Flushes and hands back the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.writer)
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        let target = &self.target;
        self.writer
            .write_all(line.as_bytes())
            .map_err(|source| DngMetaError::OutputFile {
                path: target.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::{CameraIdentity, DecodeStage};
    use tempfile::TempDir;

    fn decoded() -> Extraction {
        Extraction::Decoded(CameraIdentity::new(
            "Canon",
            "Canon",
            "EOS 5D",
            "Canon EOS 5D",
        ))
    }

    fn failed() -> Extraction {
        Extraction::Failed {
            stage: DecodeStage::Open,
            reason: "missing".to_string(),
        }
    }

    #[test]
    fn test_format_row() {
        assert_eq!(format_row("X", &decoded()), "X,Canon,Canon,EOS 5D,Canon EOS 5D\n");
        assert_eq!(format_row("Y", &failed()), "Y,,,,\n");
    }

    #[test]
    fn test_header_only_stream() {
        let csv = CsvWriter::new(Vec::new()).unwrap();
        assert_eq!(csv.rows_written(), 0);

        let bytes = csv.finish().unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), format!("{}\n", CSV_HEADER));
    }

    #[test]
    fn test_rows_follow_header_in_order() {
        let mut csv = CsvWriter::new(Vec::new()).unwrap();
        csv.write_row("X", &decoded()).unwrap();
        csv.write_row("Y", &failed()).unwrap();
        assert_eq!(csv.rows_written(), 2);

        let text = String::from_utf8(csv.finish().unwrap()).unwrap();
        assert_eq!(
            text,
            "file_id,make,normalized_make,model,normalized_model\n\
             X,Canon,Canon,EOS 5D,Canon EOS 5D\n\
             Y,,,,\n"
        );
    }

    #[test]
    fn test_create_truncates_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("camera_models.csv");
        fs::write(&path, "stale content that should disappear\n").unwrap();

        let mut csv = CsvWriter::create(&path).unwrap();
        csv.write_row("X", &decoded()).unwrap();
        csv.finish().unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(!text.contains("stale"));
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn test_create_fails_for_missing_parent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("no/such/dir/out.csv");

        let result = CsvWriter::create(&path);
        assert!(matches!(result, Err(DngMetaError::OutputFile { .. })));
    }

    #[test]
    fn test_create_with_parents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data/camera_models.csv");

        CsvWriter::create_with_parents(&path).unwrap().finish().unwrap();
        assert!(path.exists());
    }
}
