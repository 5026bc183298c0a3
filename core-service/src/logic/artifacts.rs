//! Artifact integrity
//!
//! An optional `manifest.json` next to the artifacts pins the SHA-256 of
//! each file. Every listed file must exist and match; unlisted files are
//! not checked.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constants::MANIFEST_FILE;
use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// File name → lowercase hex SHA-256
    pub files: BTreeMap<String, String>,
}

/// SHA-256 of a file, lowercase hex
pub fn compute_file_hash(path: &Path) -> CoreResult<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

impl Manifest {
    /// Hash the given files of `dir`
    pub fn build(dir: &Path, names: &[&str]) -> CoreResult<Self> {
        let mut files = BTreeMap::new();
        for name in names {
            files.insert(name.to_string(), compute_file_hash(&dir.join(name))?);
        }
        Ok(Self { files })
    }

    pub fn read(path: &Path) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| CoreError::Manifest(e.to_string()))
    }

    pub fn verify(&self, dir: &Path) -> CoreResult<()> {
        for (name, expected) in &self.files {
            if name.contains("..") || Path::new(name).is_absolute() {
                return Err(CoreError::Manifest(format!("path `{}` escapes the artifact directory", name)));
            }
            let actual = compute_file_hash(&dir.join(name))?;
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(CoreError::Integrity {
                    file: name.clone(),
                    expected: expected.clone(),
                    actual,
                });
            }
            log::debug!("Artifact {} verified", name);
        }
        Ok(())
    }
}

/// Verify `dir` against its manifest, if it has one
///
/// Returns the number of files checked.
pub fn verify_artifacts(dir: &Path) -> CoreResult<usize> {
    let path = dir.join(MANIFEST_FILE);
    if !path.exists() {
        log::warn!("No {} in {}, artifacts not verified", MANIFEST_FILE, dir.display());
        return Ok(0);
    }
    let manifest = Manifest::read(&path)?;
    manifest.verify(dir)?;
    log::info!("Verified {} artifacts against {}", manifest.files.len(), MANIFEST_FILE);
    Ok(manifest.files.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_compute_file_hash() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "abc").unwrap();
        assert_eq!(
            compute_file_hash(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_verify_round_trip_and_tamper() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("model.json"), "{}").unwrap();
        let manifest = Manifest::build(dir.path(), &["model.json"]).unwrap();
        fs::write(
            dir.path().join(MANIFEST_FILE),
            serde_json::to_string(&manifest).unwrap(),
        )
        .unwrap();

        assert_eq!(verify_artifacts(dir.path()).unwrap(), 1);

        fs::write(dir.path().join("model.json"), "{ }").unwrap();
        match verify_artifacts(dir.path()) {
            Err(CoreError::Integrity { file, .. }) => assert_eq!(file, "model.json"),
            other => panic!("expected integrity error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_manifest_is_not_an_error() {
        let dir = tempdir().unwrap();
        assert_eq!(verify_artifacts(dir.path()).unwrap(), 0);
    }

    #[test]
    fn test_manifest_rejects_escaping_paths() {
        let dir = tempdir().unwrap();
        let manifest = Manifest {
            files: BTreeMap::from([("../secret".to_string(), "00".to_string())]),
        };
        assert!(matches!(manifest.verify(dir.path()), Err(CoreError::Manifest(_))));
    }

    #[test]
    fn test_listed_file_missing() {
        let dir = tempdir().unwrap();
        let manifest = Manifest {
            files: BTreeMap::from([("heroes.jsonl".to_string(), "00".to_string())]),
        };
        assert!(matches!(manifest.verify(dir.path()), Err(CoreError::Io(_))));
    }
}
