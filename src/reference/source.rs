use crate::error::GrowthResult;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Raw table bytes plus where they were read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceResource {
    /// Human-readable location, used in error messages.
    pub location: String,
    pub bytes: Vec<u8>,
}

/// Byte source for reference tables, keyed by file stem.
pub trait ReferenceSource: Send + Sync {
    /// `Ok(None)` when nothing exists under `stem`.
    fn fetch(&self, stem: &str) -> GrowthResult<Option<ReferenceResource>>;
}

/// Tables stored as files under a directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    extensions: Vec<String>,
}

impl DirectorySource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self::with_extensions(root, vec!["csv".to_string(), "txt".to_string(), "tsv".to_string()])
    }

    pub fn with_extensions<P: AsRef<Path>>(root: P, extensions: Vec<String>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            extensions,
        }
    }

    fn candidates(&self, stem: &str) -> Vec<PathBuf> {
        let dirs = [self.root.clone(), self.root.join("lms")];
        dirs.iter()
            .flat_map(|dir| {
                self.extensions
                    .iter()
                    .map(move |ext| dir.join(format!("{}.{}", stem, ext.trim_start_matches('.'))))
            })
            .collect()
    }
}

impl ReferenceSource for DirectorySource {
    fn fetch(&self, stem: &str) -> GrowthResult<Option<ReferenceResource>> {
        for path in self.candidates(stem) {
            match std::fs::read(&path) {
                Ok(bytes) => {
                    return Ok(Some(ReferenceResource {
                        location: path.display().to_string(),
                        bytes,
                    }))
                }
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(None)
    }
}

/// Tables held in memory, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    tables: HashMap<String, Vec<u8>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, stem: &str, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(stem, contents);
        self
    }

    pub fn insert(&mut self, stem: &str, contents: impl Into<Vec<u8>>) {
        self.tables.insert(stem.to_string(), contents.into());
    }
}

impl ReferenceSource for InMemorySource {
    fn fetch(&self, stem: &str) -> GrowthResult<Option<ReferenceResource>> {
        Ok(self.tables.get(stem).map(|bytes| ReferenceResource {
            location: format!("memory:{}", stem),
            bytes: bytes.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_source_resolves_extensions_and_subdir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("lms")).unwrap();
        std::fs::write(dir.path().join("a.txt"), "0,1,2,0.1\n").unwrap();
        std::fs::write(dir.path().join("lms").join("b.csv"), "0,1,3,0.1\n").unwrap();

        let source = DirectorySource::new(dir.path());
        let a = source.fetch("a").unwrap().unwrap();
        assert_eq!(a.bytes, b"0,1,2,0.1\n");
        assert_eq!(a.location, dir.path().join("a.txt").display().to_string());

        let b = source.fetch("b").unwrap().unwrap();
        assert_eq!(b.bytes, b"0,1,3,0.1\n");
        assert_eq!(b.location, dir.path().join("lms").join("b.csv").display().to_string());

        assert!(source.fetch("c").unwrap().is_none());
    }

    #[test]
    fn test_in_memory_source() {
        let source = InMemorySource::new().with_table("wfa_0_5y_male_lms", "0,1,3.3,0.15");
        let resource = source.fetch("wfa_0_5y_male_lms").unwrap().unwrap();
        assert_eq!(resource.location, "memory:wfa_0_5y_male_lms");
        assert!(source.fetch("wfa_0_5y_female_lms").unwrap().is_none());
    }
}
