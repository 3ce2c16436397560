use chrono::Local;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SaveOutcome {
    /// Copy of the previous file, when one existed and backups were requested.
    pub backup_path: Option<PathBuf>,
    pub final_path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("could not create backup of {path}: {reason}")]
    BackupCreate { path: PathBuf, reason: String },
    #[error("target has no parent directory: {0}")]
    NoParent(PathBuf),
}

/// Write `contents` to `target` through a temporary sibling file and a rename,
/// optionally keeping a timestamped `.bak` copy of the file being replaced.
pub fn write_atomically(
    target: &Path,
    contents: &[u8],
    keep_backup: bool,
) -> Result<SaveOutcome, BackupError> {
    let parent = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        Some(_) => Path::new("."),
        None => return Err(BackupError::NoParent(target.to_path_buf())),
    };
    fs::create_dir_all(parent)?;

    let backup_path = if keep_backup && target.exists() {
        let candidate = backup_path_for(target);
        fs::copy(target, &candidate).map_err(|err| BackupError::BackupCreate {
            path: target.to_path_buf(),
            reason: err.to_string(),
        })?;
        Some(candidate)
    } else {
        None
    };

    let temp_path = temp_path_for(target);
    let written = write_temp(&temp_path, contents).and_then(|()| replace_file(&temp_path, target));
    if let Err(err) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(BackupError::Io(err));
    }

    Ok(SaveOutcome {
        backup_path,
        final_path: target.to_path_buf(),
    })
}

fn write_temp(temp_path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(temp_path)?;
    file.write_all(contents)?;
    file.sync_all()
}

#[cfg(target_os = "windows")]
fn replace_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
            fs::remove_file(to)?;
            fs::rename(from, to)
        }
        other => other,
    }
}

#[cfg(not(target_os = "windows"))]
fn replace_file(from: &Path, to: &Path) -> io::Result<()> {
    fs::rename(from, to)
}

/// `English.txt` becomes `English.txt.bak.20240131120000`.
fn backup_path_for(target: &Path) -> PathBuf {
    let timestamp = Local::now().format("%Y%m%d%H%M%S");
    let mut name = target.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".bak.{timestamp}"));
    target.with_file_name(name)
}

fn temp_path_for(target: &Path) -> PathBuf {
    let mut name = target.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".tmp.{}", std::process::id()));
    target.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn keeps_backup_of_replaced_file() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("English.txt");
        fs::write(&target, b"old").unwrap();

        let outcome = write_atomically(&target, b"new", true).unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"new");
        let backup = outcome.backup_path.expect("backup created");
        assert_eq!(fs::read(&backup).unwrap(), b"old");
        assert!(backup
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("English.txt.bak."));
    }

    #[test]
    fn no_backup_for_new_file_or_when_disabled() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("nested").join("Deutsch.txt");

        let outcome = write_atomically(&target, b"first", true).unwrap();
        assert!(outcome.backup_path.is_none());

        let outcome = write_atomically(&target, b"second", false).unwrap();
        assert!(outcome.backup_path.is_none());
        assert_eq!(fs::read(&target).unwrap(), b"second");

        let leftovers = fs::read_dir(target.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn failed_write_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("English.txt");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("occupied"), b"x").unwrap();

        assert!(matches!(
            write_atomically(&target, b"new", false),
            Err(BackupError::Io(_))
        ));

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["English.txt".to_string()]);
    }
}
