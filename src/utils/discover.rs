//! Log directory discovery for `--logdir`.
//!
//! Walks each directory recursively and picks every regular file whose
//! file name contains `log`. Results are sorted per directory so runs are
//! repeatable.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Files found under the requested directories, plus anything that could not be read.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Discovery {
    pub files: Vec<String>,
    pub errors: Vec<(String, String)>,
}

/// True when the file name (not the directory part) mentions `log`.
pub fn looks_like_log(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.contains("log"))
}

fn walk(dir: &Path, found: &mut Vec<PathBuf>, errors: &mut Vec<(String, String)>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "Cannot read log directory");
            errors.push((dir.display().to_string(), e.to_string()));
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        match entry.file_type() {
            Ok(kind) if kind.is_dir() => walk(&path, found, errors),
            Ok(kind) if kind.is_file() && looks_like_log(&path) => found.push(path),
            Ok(_) => {}
            Err(e) => errors.push((path.display().to_string(), e.to_string())),
        }
    }
}

/// Collect log files under every directory in `dirs`.
pub fn find_log_files<P: AsRef<Path>>(dirs: &[P]) -> Discovery {
    let mut discovery = Discovery::default();

    for dir in dirs {
        let dir = dir.as_ref();
        let mut found = Vec::new();
        walk(dir, &mut found, &mut discovery.errors);
        found.sort();
        debug!(dir = %dir.display(), files = found.len(), "Discovered log files");
        discovery
            .files
            .extend(found.into_iter().map(|p| p.display().to_string()));
    }

    discovery
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    #[test]
    fn test_find_log_files_recursive() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("archive");
        fs::create_dir(&nested).unwrap();
        File::create(dir.path().join("auth.log")).unwrap();
        File::create(dir.path().join("fail2ban.log.1")).unwrap();
        File::create(dir.path().join("notes.txt")).unwrap();
        File::create(nested.join("auth.log.2.gz")).unwrap();

        let discovery = find_log_files(&[dir.path()]);
        assert!(discovery.errors.is_empty());

        let names: Vec<String> = discovery
            .files
            .iter()
            .map(|f| Path::new(f).file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["auth.log.2.gz", "auth.log", "fail2ban.log.1"]);
    }

    #[test]
    fn test_missing_directory_is_reported() {
        let discovery = find_log_files(&["/nonexistent/logs"]);
        assert!(discovery.files.is_empty());
        assert_eq!(discovery.errors.len(), 1);
        assert_eq!(discovery.errors[0].0, "/nonexistent/logs");
    }

    #[test]
    fn test_looks_like_log() {
        assert!(looks_like_log(Path::new("/var/log/auth.log")));
        assert!(looks_like_log(Path::new("syslog")));
        assert!(!looks_like_log(Path::new("/var/log/messages")));
    }
}
