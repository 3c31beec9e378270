use crate::config::ScanConfig;
use crate::error::{DngMetaError, Result};
use crate::scanner::file_filter::{self, FileFilter};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// A file accepted by the `.dng` filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DngFile {
    pub path: PathBuf,
    pub file_id: String,
}

impl DngFile {
    pub fn new(path: PathBuf) -> Self {
        let file_id = file_filter::file_id(&path.to_string_lossy()).to_string();
        Self { path, file_id }
    }

    pub fn display_path(&self) -> String {
        self.path.display().to_string()
    }
}

pub struct DngScanner {
    filter: FileFilter,
    follow_links: bool,
    max_depth: Option<usize>,
}

impl DngScanner {
    pub fn new(config: &ScanConfig) -> Result<Self> {
        let filter = FileFilter::new(config)?;
        if filter.has_exclusions() {
            tracing::debug!(patterns = ?config.exclude_patterns, "excluding directories");
        }

        Ok(Self {
            filter,
            follow_links: config.follow_links,
            max_depth: config.max_depth,
        })
    }

    /// Starts a lazy recursive walk under `root`.
    ///
    /// Entries are yielded in the order the filesystem reports them. Any
    /// traversal error is yielded as `Err` and the caller is expected to stop.
    pub fn scan<P: AsRef<Path>>(&self, root: P) -> Result<DngFiles<'_>> {
        let root_path = root.as_ref();

        if !root_path.exists() {
            return Err(DngMetaError::InvalidPath {
                path: format!("{} does not exist", root_path.display()),
            });
        }

        if !root_path.is_dir() {
            return Err(DngMetaError::InvalidPath {
                path: format!("{} is not a directory", root_path.display()),
            });
        }

        let mut walker = WalkDir::new(root_path).follow_links(self.follow_links);
        if let Some(max_depth) = self.max_depth {
            walker = walker.max_depth(max_depth);
        }

        let entries = walker
            .into_iter()
            .filter_entry(move |entry| self.should_traverse(entry));

        Ok(DngFiles {
            entries: Box::new(entries),
            filter: &self.filter,
        })
    }

    /// Runs the whole walk eagerly, stopping at the first traversal error.
    pub fn collect<P: AsRef<Path>>(&self, root: P) -> Result<Vec<DngFile>> {
        self.scan(root)?.collect()
    }

    fn should_traverse(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }

        self.filter.should_traverse_directory(entry.path())
    }
}

pub struct DngFiles<'a> {
    entries: Box<dyn Iterator<Item = walkdir::Result<DirEntry>> + 'a>,
    filter: &'a FileFilter,
}

impl Iterator for DngFiles<'_> {
    type Item = Result<DngFile>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(err) => return Some(Err(err.into())),
            };

            // Unfollowed links report their own type, so check the target too.
            if entry.file_type().is_dir() || (entry.path_is_symlink() && entry.path().is_dir()) {
                continue;
            }

            if !self.filter.is_dng_file(entry.path()) {
                continue;
            }

            return Some(Ok(DngFile::new(entry.into_path())));
        }
    }
}
