//! On-disk persistence: two separate JSON Lines stores, one for users
//! and one for files, matching the original's `nm_save_users` /
//! `nm_save_files` split.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::NameServerError;
use crate::metadata::FileMetadata;

#[derive(Serialize, Deserialize)]
struct UserRecord {
    username: String,
}

/// Loads the users store at `path`. Returns an empty list if the file
/// does not yet exist (first run).
pub fn load_users(path: &Path) -> Result<Vec<String>, NameServerError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let reader = BufReader::new(fs::File::open(path)?);
    let mut users = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: UserRecord =
            serde_json::from_str(&line).map_err(|e| NameServerError::Persistence(e.to_string()))?;
        users.push(record.username);
    }
    Ok(users)
}

/// Overwrites the users store at `path` with `users`, one JSON record
/// per line.
pub fn save_users(path: &Path, users: &[String]) -> Result<(), NameServerError> {
    let mut out = String::new();
    for username in users {
        let record = UserRecord { username: username.clone() };
        out.push_str(&serde_json::to_string(&record).map_err(|e| NameServerError::Persistence(e.to_string()))?);
        out.push('\n');
    }
    fs::write(path, out)?;
    Ok(())
}

/// Loads the files store at `path`. Returns an empty list if the file
/// does not yet exist (first run).
pub fn load_files(path: &Path) -> Result<Vec<FileMetadata>, NameServerError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let reader = BufReader::new(fs::File::open(path)?);
    let mut files = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: FileMetadata =
            serde_json::from_str(&line).map_err(|e| NameServerError::Persistence(e.to_string()))?;
        files.push(record);
    }
    Ok(files)
}

/// Overwrites the files store at `path` with `files`, one JSON record
/// per line.
pub fn save_files(path: &Path, files: &[FileMetadata]) -> Result<(), NameServerError> {
    let mut out = String::new();
    for file in files {
        out.push_str(&serde_json::to_string(file).map_err(|e| NameServerError::Persistence(e.to_string()))?);
        out.push('\n');
    }
    fs::write(path, out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn users_round_trip_through_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.jsonl");
        save_users(&path, &["alice".to_string(), "bob".to_string()]).unwrap();
        let loaded = load_users(&path).unwrap();
        assert_eq!(loaded, vec!["alice".to_string(), "bob".to_string()]);
    }

    #[test]
    fn missing_users_file_loads_as_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.jsonl");
        assert!(load_users(&path).unwrap().is_empty());
    }

    #[test]
    fn files_round_trip_through_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("files.jsonl");
        let meta = FileMetadata::new("a.txt", "alice", "127.0.0.1", 9001);
        save_files(&path, std::slice::from_ref(&meta)).unwrap();
        let loaded = load_files(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].filename, "a.txt");
        assert_eq!(loaded[0].owner, "alice");
    }
}
