pub mod csv_writer;
pub mod metadata_extractor;
pub mod report;

pub use csv_writer::{format_row, CsvWriter, CSV_HEADER};
pub use metadata_extractor::{Extraction, MetadataExtractor};
pub use report::{unique_models_from_csv, FailedFile, ScanProgress, ScanReport};
