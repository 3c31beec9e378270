use crate::decoder::{CameraIdentity, RawDecoder};
use crate::error::{DngMetaError, Result};
use rawloader::RawImage;
use std::fs::File;
use std::path::{Path, PathBuf};

/// `RawDecoder` backed by the `rawloader` crate.
///
/// Holds the decoded image between `unpack` and the next `recycle`, so a
/// single instance owns at most one file's data at a time.
#[derive(Default)]
pub struct RawloaderDecoder {
    opened: Option<PathBuf>,
    image: Option<RawImage>,
}

impl RawloaderDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opened_path(&self) -> Option<&Path> {
        self.opened.as_deref()
    }
}

impl RawDecoder for RawloaderDecoder {
    fn recycle(&mut self) {
        self.opened = None;
        self.image = None;
    }

    fn open_file(&mut self, path: &Path) -> Result<()> {
        let metadata = File::open(path)
            .and_then(|file| file.metadata())
            .map_err(|e| DngMetaError::Decode {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        if !metadata.is_file() {
            return Err(DngMetaError::Decode {
                path: path.display().to_string(),
                reason: "not a regular file".to_string(),
            });
        }

        self.opened = Some(path.to_path_buf());
        Ok(())
    }

    fn unpack(&mut self) -> Result<()> {
        let path = self.opened.as_ref().ok_or_else(|| DngMetaError::Decode {
            path: String::new(),
            reason: "unpack called before open_file".to_string(),
        })?;

        let image = rawloader::decode_file(path).map_err(|e| DngMetaError::Decode {
            path: path.display().to_string(),
            reason: format!("{:?}", e),
        })?;

        self.image = Some(image);
        Ok(())
    }

    fn identity(&self) -> Option<CameraIdentity> {
        self.image.as_ref().map(|image| CameraIdentity {
            make: image.make.clone(),
            normalized_make: image.clean_make.clone(),
            model: image.model.clone(),
            normalized_model: image.clean_model.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_open_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let mut decoder = RawloaderDecoder::new();

        let result = decoder.open_file(&temp_dir.path().join("missing.dng"));
        assert!(matches!(result, Err(DngMetaError::Decode { .. })));
        assert!(decoder.opened_path().is_none());
    }

    #[test]
    fn test_open_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("folder.dng");
        fs::create_dir(&dir).unwrap();

        let mut decoder = RawloaderDecoder::new();
        assert!(decoder.open_file(&dir).is_err());
    }

    #[test]
    fn test_unpack_without_open_fails() {
        let mut decoder = RawloaderDecoder::new();
        assert!(decoder.unpack().is_err());
        assert!(decoder.identity().is_none());
    }

    #[test]
    fn test_unpack_rejects_non_raw_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("fake.dng");
        fs::write(&path, b"this is plainly not a raw container").unwrap();

        let mut decoder = RawloaderDecoder::new();
        decoder.open_file(&path).unwrap();
        assert_eq!(decoder.opened_path(), Some(path.as_path()));

        assert!(decoder.unpack().is_err());
        assert!(decoder.identity().is_none());
    }

    #[test]
    fn test_recycle_clears_state() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.dng");
        fs::write(&path, b"x").unwrap();

        let mut decoder = RawloaderDecoder::new();
        decoder.open_file(&path).unwrap();
        decoder.recycle();

        assert!(decoder.opened_path().is_none());
        assert!(decoder.unpack().is_err());
    }
}
