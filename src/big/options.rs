//! Extraction settings and output path resolution.

use std::path::{Component, Path, PathBuf};

use super::error::{BigError, Result};
use super::structures::is_path_separator;

/// What to do when an output file already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overwrite {
    /// Replace it. Duplicate paths inside one archive resolve to the last entry.
    #[default]
    Always,
    /// Leave it and skip the entry
    Never,
}

/// Settings for one extraction pass
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Directory the output root is placed in
    pub output_dir: PathBuf,
    /// Put files under a directory named after the archive's file stem
    pub archive_dir: bool,
    pub overwrite: Overwrite,
    /// Entries extracted concurrently; 0 is treated as 1
    pub jobs: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            archive_dir: true,
            overwrite: Overwrite::Always,
            jobs: 1,
        }
    }
}

impl ExtractOptions {
    /// Directory that entry paths are resolved against.
    pub fn output_root(&self, archive_path: &Path) -> PathBuf {
        match archive_path.file_stem() {
            Some(stem) if self.archive_dir => self.output_dir.join(stem),
            _ => self.output_dir.clone(),
        }
    }
}

/// Join an entry path onto `root`.
///
/// Both `/` and `\` separate components. Empty and `.` components are
/// dropped. Anything that could land outside `root` (`..`, a root or drive
/// prefix) is rejected, as is a path naming no file.
pub fn resolve_output_path(root: &Path, entry_path: &str) -> Result<PathBuf> {
    let unsafe_path = || BigError::UnsafePath(entry_path.to_string());

    if entry_path.is_empty() || entry_path.ends_with(is_path_separator) {
        return Err(unsafe_path());
    }

    let mut output = root.to_path_buf();
    let mut depth = 0usize;
    for part in entry_path.split(is_path_separator) {
        if part.is_empty() || part == "." {
            continue;
        }
        let mut components = Path::new(part).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => output.push(name),
            _ => return Err(unsafe_path()),
        }
        depth += 1;
    }

    if depth == 0 {
        return Err(unsafe_path());
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_root() {
        let options = ExtractOptions {
            output_dir: PathBuf::from("out"),
            ..Default::default()
        };
        assert_eq!(
            options.output_root(Path::new("/games/CLASH.big")),
            PathBuf::from("out/CLASH")
        );

        let flat = ExtractOptions {
            archive_dir: false,
            ..options
        };
        assert_eq!(
            flat.output_root(Path::new("/games/CLASH.big")),
            PathBuf::from("out")
        );
    }

    #[test]
    fn test_resolve_nested() {
        let path = resolve_output_path(Path::new("root"), "data/art/tank.tga").unwrap();
        assert_eq!(path, PathBuf::from("root/data/art/tank.tga"));
    }

    #[test]
    fn test_resolve_without_separator() {
        let path = resolve_output_path(Path::new("root"), "a.txt").unwrap();
        assert_eq!(path, PathBuf::from("root/a.txt"));
    }

    #[test]
    fn test_resolve_backslashes_and_leading_slash() {
        let path = resolve_output_path(Path::new("root"), "/data\\audio\\./boom.wav").unwrap();
        assert_eq!(path, PathBuf::from("root/data/audio/boom.wav"));
    }

    #[test]
    fn test_resolve_rejects_escapes() {
        for bad in ["../evil", "data/../../evil", "..", "", "/", "data/", "./."] {
            let err = resolve_output_path(Path::new("root"), bad).unwrap_err();
            assert!(matches!(err, BigError::UnsafePath(_)), "{bad:?} accepted");
        }
    }
}
