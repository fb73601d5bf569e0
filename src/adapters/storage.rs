use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Filesystem storage rooted at `base_path`; "-" maps to stdin/stdout.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        Path::new(&self.base_path).join(path)
    }
}

impl Storage for LocalStorage {
    fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        if path == "-" {
            let mut data = Vec::new();
            std::io::stdin().read_to_end(&mut data)?;
            return Ok(data);
        }

        let data = fs::read(self.resolve(path))?;
        Ok(data)
    }

    fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        if path == "-" {
            std::io::stdout().write_all(data)?;
            return Ok(());
        }

        let full_path = self.resolve(path);

        // 確保目錄存在
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}
