//! In-memory asset maps built from multi-file bundles

use glance_core::{GlanceError, Result};
use std::collections::HashMap;
use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::Arc;

/// Immutable binary blob
pub type Blob = Arc<[u8]>;

/// Mapping from normalized relative path to blob
#[derive(Debug, Clone, Default)]
pub struct AssetMap {
    entries: HashMap<String, Blob>,
}

impl AssetMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every file under a directory, keyed by its `/`-separated relative path
    pub fn from_directory<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(GlanceError::BundleError(format!(
                "Not a directory: {}",
                dir.display()
            )));
        }

        let mut map = Self::new();
        Self::scan_directory(&mut map, dir, "")?;
        Ok(map)
    }

    fn scan_directory(map: &mut AssetMap, dir: &Path, prefix: &str) -> Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();

            if path.is_dir() {
                Self::scan_directory(map, &path, &format!("{}{}/", prefix, name))?;
            } else if path.is_file() {
                let bytes = fs::read(&path)?;
                map.insert(format!("{}{}", prefix, name), bytes);
            }
        }

        Ok(())
    }

    /// Load every file entry of a zip archive, keyed by its entry name
    pub fn from_zip(bytes: &[u8]) -> Result<Self> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| GlanceError::BundleError(format!("Failed to open zip: {}", e)))?;

        let mut map = Self::new();
        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| GlanceError::BundleError(format!("Failed to read zip entry: {}", e)))?;
            if file.is_dir() {
                continue;
            }

            let name = file.name().to_string();
            if name.starts_with("__MACOSX/") {
                continue;
            }

            let mut data = Vec::new();
            file.read_to_end(&mut data)?;
            map.insert(name, data);
        }

        Ok(map)
    }

    /// Insert a blob under a key
    pub fn insert(&mut self, key: impl Into<String>, bytes: impl Into<Blob>) {
        self.entries.insert(key.into(), bytes.into());
    }

    pub fn get(&self, key: &str) -> Option<&Blob> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Keys in sorted order
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the scene file in the bundle
    ///
    /// Returns the first `.gltf` or `.glb` key in sorted order, together with
    /// its directory prefix (with trailing `/`, empty at the top level).
    pub fn find_root(&self) -> Option<(String, String)> {
        self.keys()
            .into_iter()
            .find(|key| {
                let lower = key.to_ascii_lowercase();
                lower.ends_with(".gltf") || lower.ends_with(".glb")
            })
            .map(|key| (key.to_string(), root_path_of(key)))
    }
}

/// Directory prefix of a bundle key, including the trailing `/`
pub fn root_path_of(key: &str) -> String {
    match key.rfind('/') {
        Some(idx) => key[..=idx].to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("glance_test_{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_insert_and_get() {
        let mut map = AssetMap::new();
        map.insert("scene/duck.bin", vec![1u8, 2, 3]);
        assert!(map.contains("scene/duck.bin"));
        assert_eq!(map.get("scene/duck.bin").unwrap().as_ref(), &[1, 2, 3]);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_from_directory_uses_relative_keys() {
        let dir = temp_dir();
        fs::create_dir_all(dir.join("textures")).unwrap();
        fs::write(dir.join("duck.gltf"), b"{}").unwrap();
        fs::write(dir.join("textures").join("wood.png"), b"png").unwrap();

        let map = AssetMap::from_directory(&dir).unwrap();
        assert_eq!(map.keys(), vec!["duck.gltf", "textures/wood.png"]);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_from_directory_rejects_file() {
        let dir = temp_dir();
        let file = dir.join("a.txt");
        fs::write(&file, b"x").unwrap();
        assert!(matches!(
            AssetMap::from_directory(&file),
            Err(GlanceError::BundleError(_))
        ));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_from_zip() {
        let mut buf = Vec::new();
        {
            let mut writer = zip::ZipWriter::new(Cursor::new(&mut buf));
            let options = zip::write::SimpleFileOptions::default();
            writer.add_directory("model/", options).unwrap();
            writer.start_file("model/scene.gltf", options).unwrap();
            writer.write_all(b"{}").unwrap();
            writer.start_file("__MACOSX/model/._scene.gltf", options).unwrap();
            writer.write_all(b"junk").unwrap();
            writer.finish().unwrap();
        }

        let map = AssetMap::from_zip(&buf).unwrap();
        assert_eq!(map.keys(), vec!["model/scene.gltf"]);
    }

    #[test]
    fn test_from_zip_rejects_garbage() {
        assert!(matches!(
            AssetMap::from_zip(b"not a zip"),
            Err(GlanceError::BundleError(_))
        ));
    }

    #[test]
    fn test_find_root() {
        let mut map = AssetMap::new();
        map.insert("pack/textures/a.png", vec![0u8]);
        map.insert("pack/Scene.GLB", vec![0u8]);
        let (key, root_path) = map.find_root().unwrap();
        assert_eq!(key, "pack/Scene.GLB");
        assert_eq!(root_path, "pack/");

        let mut flat = AssetMap::new();
        flat.insert("duck.gltf", vec![0u8]);
        assert_eq!(flat.find_root().unwrap().1, "");

        assert!(AssetMap::new().find_root().is_none());
    }
}
