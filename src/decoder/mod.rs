//! Seam between the scan loop and the raw-image decoding library.
//!
//! A decoder follows a three-step lifecycle per file: `recycle` drops
//! anything left from the previous file, `open_file` binds a path, and
//! `unpack` parses the container. Camera identity is only available after a
//! successful `unpack`.

pub mod raw_decoder;

pub use raw_decoder::RawloaderDecoder;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// The four camera identification strings reported by the decoder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraIdentity {
    pub make: String,
    pub normalized_make: String,
    pub model: String,
    pub normalized_model: String,
}

impl CameraIdentity {
    pub fn new<S: Into<String>>(make: S, normalized_make: S, model: S, normalized_model: S) -> Self {
        Self {
            make: make.into(),
            normalized_make: normalized_make.into(),
            model: model.into(),
            normalized_model: normalized_model.into(),
        }
    }

    /// `make_model` with spaces replaced by underscores, e.g. `Canon_EOS_5D`.
    pub fn model_key(&self) -> String {
        format!("{}_{}", self.make, self.model).replace(' ', "_")
    }
}

/// Where in the lifecycle a file was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeStage {
    Open,
    Unpack,
}

impl fmt::Display for DecodeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeStage::Open => write!(f, "open"),
            DecodeStage::Unpack => write!(f, "unpack"),
        }
    }
}

pub trait RawDecoder {
    /// Discards any state left over from the previous file.
    fn recycle(&mut self);

    fn open_file(&mut self, path: &Path) -> Result<()>;

    /// Parses the file bound by `open_file`. Calling this without a prior
    /// successful open is an error.
    fn unpack(&mut self) -> Result<()>;

    /// Identity of the last successfully unpacked file, if any.
    fn identity(&self) -> Option<CameraIdentity>;
}

impl<D: RawDecoder + ?Sized> RawDecoder for Box<D> {
    fn recycle(&mut self) {
        (**self).recycle()
    }

    fn open_file(&mut self, path: &Path) -> Result<()> {
        (**self).open_file(path)
    }

    fn unpack(&mut self) -> Result<()> {
        (**self).unpack()
    }

    fn identity(&self) -> Option<CameraIdentity> {
        (**self).identity()
    }
}
