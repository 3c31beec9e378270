pub mod dng_scanner;
pub mod file_filter;

pub use dng_scanner::{DngFile, DngFiles, DngScanner};
pub use file_filter::{file_id, is_dng_file, FileFilter, DNG_SUFFIX};
