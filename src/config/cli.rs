use crate::core::Storage;
use crate::utils::error::Result;
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};

/// Filesystem storage that scans the input folder. Listed paths already carry the
/// folder, so reads and writes use paths as given, relative to the working directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }
}

impl Storage for LocalStorage {
    async fn list_files(&self, pattern: &str) -> Result<Vec<String>> {
        let base = Pattern::escape(&self.base_path.to_string_lossy());
        let full_pattern = Path::new(&base).join(pattern);
        // station exports mix .xml and .XML
        let options = MatchOptions {
            case_sensitive: false,
            ..MatchOptions::new()
        };

        let mut files = Vec::new();
        for entry in glob::glob_with(&full_pattern.to_string_lossy(), options)? {
            match entry {
                Ok(path) if path.is_file() => files.push(path.to_string_lossy().into_owned()),
                Ok(_) => {}
                Err(e) => tracing::warn!("Cannot read {}: {}", e.path().display(), e.error()),
            }
        }
        files.sort();
        Ok(files)
    }

    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let data = tokio::fs::read(path).await?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(path);

        if let Some(parent) = full_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        tokio::fs::write(full_path, data).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_list_files_matches_pattern_case_insensitively() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("b.xml"), "<a/>").unwrap();
        std::fs::write(temp_dir.path().join("A.XML"), "<a/>").unwrap();
        std::fs::write(temp_dir.path().join("notes.txt"), "x").unwrap();
        std::fs::create_dir(temp_dir.path().join("dir.xml")).unwrap();

        let storage = LocalStorage::new(temp_dir.path());
        let files = storage.list_files("*.xml").await.unwrap();

        let names: Vec<String> = files
            .iter()
            .map(|f| Path::new(f).file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["A.XML".to_string(), "b.xml".to_string()]);
    }

    #[tokio::test]
    async fn test_write_overwrites_and_creates_parent() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());
        let output = temp_dir.path().join("out").join("report.xlsx");
        let output = output.to_string_lossy();

        storage.write_file(&output, b"first").await.unwrap();
        storage.write_file(&output, b"second").await.unwrap();

        let data = storage.read_file(&output).await.unwrap();
        assert_eq!(data, b"second");
    }

    #[tokio::test]
    async fn test_relative_folder_reads_listed_files() {
        // created under the working directory so the folder can be named relatively
        let temp_dir = TempDir::new_in(".").unwrap();
        let folder = PathBuf::from(temp_dir.path().file_name().unwrap());
        std::fs::write(temp_dir.path().join("a.xml"), "<a/>").unwrap();

        let storage = LocalStorage::new(folder.clone());
        let files = storage.list_files("*.xml").await.unwrap();
        assert_eq!(files.len(), 1);
        assert!(Path::new(&files[0]).starts_with(&folder));

        let data = storage.read_file(&files[0]).await.unwrap();
        assert_eq!(data, b"<a/>");
    }
}
