use crate::config::ScanConfig;
use crate::error::Result;
use regex::Regex;
use std::path::Path;

pub const DNG_SUFFIX: &str = ".dng";

/// Returns true when the last four characters of `path` are exactly `.dng`.
///
/// The comparison is case-sensitive and paths shorter than the suffix are
/// never eligible.
pub fn is_dng_file(path: &str) -> bool {
    path.ends_with(DNG_SUFFIX)
}

/// Derives the CSV row key from a path: the final component (split on either
/// `/` or `\`) with its four-character extension removed.
pub fn file_id(path: &str) -> &str {
    let name = match path.rfind(['/', '\\']) {
        Some(pos) => &path[pos + 1..],
        None => path,
    };

    match name.char_indices().rev().nth(DNG_SUFFIX.len() - 1) {
        Some((end, _)) => &name[..end],
        None => "",
    }
}

#[derive(Default)]
pub struct FileFilter {
    exclude_patterns: Vec<Regex>,
}

impl FileFilter {
    pub fn new(config: &ScanConfig) -> Result<Self> {
        let exclude_patterns = config
            .exclude_patterns
            .iter()
            .map(|pattern| Regex::new(pattern))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self { exclude_patterns })
    }

    pub fn is_dng_file(&self, path: &Path) -> bool {
        is_dng_file(&path.to_string_lossy())
    }

    pub fn should_traverse_directory(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        !self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.is_match(&path_str))
    }

    pub fn has_exclusions(&self) -> bool {
        !self.exclude_patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dng_suffix_detection() {
        assert!(is_dng_file("/a/b/img1.dng"));
        assert!(is_dng_file("img2.dng"));
        assert!(is_dng_file(".dng"));

        assert!(!is_dng_file("/a/b/img1.DNG"));
        assert!(!is_dng_file("/a/b/img1.Dng"));
        assert!(!is_dng_file("/a/b/img1.jpg"));
        assert!(!is_dng_file("/a/b/img1.dng.txt"));
        assert!(!is_dng_file("/a/b/dng"));
    }

    #[test]
    fn test_short_paths_are_not_eligible() {
        assert!(!is_dng_file(""));
        assert!(!is_dng_file("d"));
        assert!(!is_dng_file("dng"));
        assert!(!is_dng_file(".dn"));
    }

    #[test]
    fn test_file_id_extraction() {
        assert_eq!(file_id("/a/b/img1.dng"), "img1");
        assert_eq!(file_id("img2.dng"), "img2");
        assert_eq!(file_id("C:\\photos\\a0001-jmac_DSC1459.dng"), "a0001-jmac_DSC1459");
        assert_eq!(file_id("mixed/sep\\inner.dng"), "inner");
        assert_eq!(file_id("dir\\sub/last.dng"), "last");
    }

    #[test]
    fn test_file_id_keeps_inner_dots() {
        assert_eq!(file_id("/raw/shot.v2.dng"), "shot.v2");
        assert_eq!(file_id("/raw/.dng"), "");
    }

    #[test]
    fn test_file_id_with_multibyte_names() {
        assert_eq!(file_id("/raw/café.dng"), "café");
        assert_eq!(file_id("/raw/写真.dng"), "写真");
    }

    #[test]
    fn test_file_id_of_short_name() {
        assert_eq!(file_id("/raw/abc"), "");
        assert_eq!(file_id(""), "");
    }

    #[test]
    fn test_exclude_patterns() {
        let config = ScanConfig {
            exclude_patterns: vec![r"thumbnails$".to_string(), r"/\.cache".to_string()],
            ..ScanConfig::default()
        };
        let filter = FileFilter::new(&config).unwrap();

        assert!(filter.has_exclusions());
        assert!(!filter.should_traverse_directory(Path::new("/raw/thumbnails")));
        assert!(!filter.should_traverse_directory(Path::new("/raw/.cache/x")));
        assert!(filter.should_traverse_directory(Path::new("/raw/2011")));
    }

    #[test]
    fn test_default_filter_traverses_everything() {
        let filter = FileFilter::default();
        assert!(!filter.has_exclusions());
        assert!(filter.should_traverse_directory(Path::new("/raw/.hidden")));
        assert!(filter.is_dng_file(Path::new("/raw/.hidden/a.dng")));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let config = ScanConfig {
            exclude_patterns: vec!["(".to_string()],
            ..ScanConfig::default()
        };
        assert!(FileFilter::new(&config).is_err());
    }
}
