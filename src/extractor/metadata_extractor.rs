use crate::decoder::{CameraIdentity, DecodeStage, RawDecoder};
use crate::error::DngMetaError;
use std::path::Path;

/// Outcome of running one file through the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Decoded(CameraIdentity),
    Failed { stage: DecodeStage, reason: String },
}

impl Extraction {
    pub fn identity(&self) -> Option<&CameraIdentity> {
        match self {
            Extraction::Decoded(identity) => Some(identity),
            Extraction::Failed { .. } => None,
        }
    }

    pub fn is_decoded(&self) -> bool {
        matches!(self, Extraction::Decoded(_))
    }

    /// The four comma-joined metadata columns. Failures render as empty
    /// columns, matching a decoder that reported empty strings.
    pub fn csv_fields(&self) -> String {
        match self {
            Extraction::Decoded(identity) => format!(
                "{},{},{},{}",
                identity.make, identity.normalized_make, identity.model, identity.normalized_model
            ),
            Extraction::Failed { .. } => ",,,".to_string(),
        }
    }
}

/// Drives a single decoder serially across files.
///
/// The extractor owns its decoder for the whole run; every call recycles
/// it before use.
pub struct MetadataExtractor<D: RawDecoder> {
    decoder: D,
}

impl<D: RawDecoder> MetadataExtractor<D> {
    pub fn new(decoder: D) -> Self {
        Self { decoder }
    }

    pub fn extract(&mut self, path: &Path) -> Extraction {
        self.decoder.recycle();

        if let Err(e) = self.decoder.open_file(path) {
            return failed(DecodeStage::Open, e);
        }

        if let Err(e) = self.decoder.unpack() {
            return failed(DecodeStage::Unpack, e);
        }

        match self.decoder.identity() {
            Some(identity) => Extraction::Decoded(identity),
            None => Extraction::Failed {
                stage: DecodeStage::Unpack,
                reason: "decoder reported success without metadata".to_string(),
            },
        }
    }

    pub fn into_decoder(self) -> D {
        self.decoder
    }
}

fn failed(stage: DecodeStage, error: DngMetaError) -> Extraction {
    let reason = match error {
        DngMetaError::Decode { reason, .. } => reason,
        other => other.to_string(),
    };
    Extraction::Failed { stage, reason }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::Result;
    use std::collections::HashMap;
    use std::path::PathBuf;

    /// Decoder stub keyed by file name.
    #[derive(Default)]
    pub(crate) struct FakeDecoder {
        pub identities: HashMap<String, CameraIdentity>,
        pub unopenable: Vec<String>,
        pub recycles: usize,
        opened: Option<PathBuf>,
        unpacked: Option<CameraIdentity>,
    }

    impl FakeDecoder {
        pub(crate) fn with_identity(mut self, name: &str, identity: CameraIdentity) -> Self {
            self.identities.insert(name.to_string(), identity);
            self
        }

        pub(crate) fn with_unopenable(mut self, name: &str) -> Self {
            self.unopenable.push(name.to_string());
            self
        }

        fn name_of(path: &Path) -> String {
            path.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default()
        }
    }

    impl RawDecoder for FakeDecoder {
        fn recycle(&mut self) {
            self.recycles += 1;
            self.opened = None;
            self.unpacked = None;
        }

        fn open_file(&mut self, path: &Path) -> Result<()> {
            if self.unopenable.contains(&Self::name_of(path)) {
                return Err(DngMetaError::Decode {
                    path: path.display().to_string(),
                    reason: "cannot open".to_string(),
                });
            }
            self.opened = Some(path.to_path_buf());
            Ok(())
        }

        fn unpack(&mut self) -> Result<()> {
            let path = self.opened.as_ref().ok_or_else(|| DngMetaError::Decode {
                path: String::new(),
                reason: "not opened".to_string(),
            })?;
            match self.identities.get(&Self::name_of(path)) {
                Some(identity) => {
                    self.unpacked = Some(identity.clone());
                    Ok(())
                }
                None => Err(DngMetaError::Decode {
                    path: path.display().to_string(),
                    reason: "unsupported file".to_string(),
                }),
            }
        }

        fn identity(&self) -> Option<CameraIdentity> {
            self.unpacked.clone()
        }
    }

    fn canon() -> CameraIdentity {
        CameraIdentity::new("Canon", "Canon", "EOS 5D", "Canon EOS 5D")
    }

    #[test]
    fn test_successful_extraction_fields() {
        let decoder = FakeDecoder::default().with_identity("X.dng", canon());
        let mut extractor = MetadataExtractor::new(decoder);

        let extraction = extractor.extract(Path::new("/raw/X.dng"));
        assert!(extraction.is_decoded());
        assert_eq!(extraction.identity(), Some(&canon()));
        assert_eq!(extraction.csv_fields(), "Canon,Canon,EOS 5D,Canon EOS 5D");
    }

    #[test]
    fn test_open_failure_yields_empty_fields() {
        let decoder = FakeDecoder::default()
            .with_identity("Y.dng", canon())
            .with_unopenable("Y.dng");
        let mut extractor = MetadataExtractor::new(decoder);

        let extraction = extractor.extract(Path::new("/raw/Y.dng"));
        assert_eq!(
            extraction,
            Extraction::Failed {
                stage: DecodeStage::Open,
                reason: "cannot open".to_string()
            }
        );
        assert_eq!(extraction.csv_fields(), ",,,");
    }

    #[test]
    fn test_unpack_failure_yields_empty_fields() {
        let mut extractor = MetadataExtractor::new(FakeDecoder::default());

        let extraction = extractor.extract(Path::new("/raw/broken.dng"));
        assert!(matches!(
            extraction,
            Extraction::Failed {
                stage: DecodeStage::Unpack,
                ..
            }
        ));
        assert_eq!(extraction.csv_fields(), ",,,");
    }

    #[test]
    fn test_decoder_is_recycled_before_each_file() {
        let decoder = FakeDecoder::default().with_identity("a.dng", canon());
        let mut extractor = MetadataExtractor::new(decoder);

        assert!(extractor.extract(Path::new("a.dng")).is_decoded());
        // A failing file must not inherit the previous file's metadata.
        assert!(!extractor.extract(Path::new("b.dng")).is_decoded());

        let decoder = extractor.into_decoder();
        assert_eq!(decoder.recycles, 2);
    }

    #[test]
    fn test_empty_metadata_is_still_decoded() {
        let decoder = FakeDecoder::default().with_identity("e.dng", CameraIdentity::default());
        let mut extractor = MetadataExtractor::new(decoder);

        let extraction = extractor.extract(Path::new("e.dng"));
        assert!(extraction.is_decoded());
        assert_eq!(extraction.csv_fields(), ",,,");
    }
}
