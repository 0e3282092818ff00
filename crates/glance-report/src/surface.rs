//! Display surfaces for the full report

use glance_core::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Somewhere a rendered document can be opened
pub trait ReportSurface {
    /// Open a document and return a locator for it (path, URL or id)
    fn open(&mut self, title: &str, document: &str) -> Result<String>;
}

/// Writes each opened document to `report-{n}.html` in a directory
#[derive(Debug, Clone)]
pub struct FileSurface {
    dir: PathBuf,
    next: usize,
}

impl FileSurface {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            next: 1,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ReportSurface for FileSurface {
    fn open(&mut self, title: &str, document: &str) -> Result<String> {
        fs::create_dir_all(&self.dir)?;

        let mut path = self.dir.join(format!("report-{}.html", self.next));
        while path.exists() {
            self.next += 1;
            path = self.dir.join(format!("report-{}.html", self.next));
        }
        self.next += 1;

        fs::write(&path, document)?;
        log::info!("Opened '{}' at {}", title, path.display());
        Ok(path.to_string_lossy().to_string())
    }
}

/// Keeps opened documents in memory
#[derive(Debug, Default, Clone)]
pub struct MemorySurface {
    documents: Vec<(String, String)>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opened `(title, document)` pairs, oldest first
    pub fn documents(&self) -> &[(String, String)] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl ReportSurface for MemorySurface {
    fn open(&mut self, title: &str, document: &str) -> Result<String> {
        self.documents.push((title.to_string(), document.to_string()));
        Ok(format!("memory:{}", self.documents.len()))
    }
}
