use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use async_trait::async_trait;
use tokio::fs;

use crate::kernel::constants::MANIFEST_EXTENSION;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::manifest::PluginManifest;
use crate::plugin_system::unit::{PluginKind, PluginUnit};

/// Somewhere plugin metadata can be discovered from
#[async_trait]
pub trait ManifestSource: Send + Sync {
    /// Produces one unit per manifest found.
    ///
    /// A manifest that cannot be read or parsed still yields a unit, in the
    /// `Invalid` state and carrying the parse error, so it shows up in reports.
    async fn discover(&self) -> Result<Vec<PluginUnit>, PluginSystemError>;

    /// Short human-readable description used in logs
    fn describe(&self) -> String;
}

/// Finds `*.json` manifests below a directory
#[derive(Debug, Clone)]
pub struct DirectoryManifestSource {
    root: PathBuf,
    recursive: bool,
}

impl DirectoryManifestSource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            recursive: true,
        }
    }

    /// Only look at the top-level directory
    pub fn non_recursive(mut self) -> Self {
        self.recursive = false;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn scan_directory_boxed<'a>(
        &'a self,
        dir: PathBuf,
        found: &'a mut Vec<PathBuf>,
    ) -> Pin<Box<dyn Future<Output = Result<(), PluginSystemError>> + Send + 'a>> {
        Box::pin(self.scan_directory_inner(dir, found))
    }

    async fn scan_directory_inner(&self, dir: PathBuf, found: &mut Vec<PathBuf>) -> Result<(), PluginSystemError> {
        let mut entries = fs::read_dir(&dir).await.map_err(|source| PluginSystemError::Discovery {
            path: dir.clone(),
            source,
        })?;

        let mut subdirs = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|source| PluginSystemError::Discovery {
            path: dir.clone(),
            source,
        })? {
            let path = entry.path();
            let metadata = match fs::metadata(&path).await {
                Ok(meta) => meta,
                Err(e) => {
                    log::warn!("Failed to get metadata for {}: {}", path.display(), e);
                    continue;
                }
            };

            if metadata.is_dir() {
                subdirs.push(path);
            } else if metadata.is_file() && is_manifest_file(&path) {
                found.push(path);
            }
        }

        if self.recursive {
            subdirs.sort();
            for subdir in subdirs {
                if let Err(e) = self.scan_directory_boxed(subdir.clone(), found).await {
                    log::warn!("Error scanning subdirectory {}: {}", subdir.display(), e);
                }
            }
        }
        Ok(())
    }
}

fn is_manifest_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(MANIFEST_EXTENSION))
}

/// Reads and parses a single manifest file
pub async fn load_manifest(path: &Path) -> Result<PluginManifest, PluginSystemError> {
    let content = fs::read_to_string(path).await.map_err(|e| PluginSystemError::ManifestError {
        path: path.to_path_buf(),
        message: format!("Failed to read manifest: {}", e),
        source: Some(Box::new(e)),
    })?;
    PluginManifest::from_json_str(&content, path)
}

/// Builds a unit for the manifest at `path`, or an invalid unit named after
/// the file stem if the manifest is unusable
pub async fn load_unit(path: &Path) -> PluginUnit {
    match load_manifest(path).await {
        Ok(manifest) => {
            let kind = PluginKind::from_manifest(&manifest);
            PluginUnit::from_manifest(manifest, kind)
        }
        Err(e) => {
            log::warn!("Error loading manifest from {}: {}", path.display(), e);
            let name = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or("unknown");
            PluginUnit::invalid(name, e.to_string())
        }
    }
}

#[async_trait]
impl ManifestSource for DirectoryManifestSource {
    async fn discover(&self) -> Result<Vec<PluginUnit>, PluginSystemError> {
        let metadata = fs::metadata(&self.root).await.map_err(|source| PluginSystemError::Discovery {
            path: self.root.clone(),
            source,
        })?;
        if !metadata.is_dir() {
            return Err(PluginSystemError::Discovery {
                path: self.root.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
            });
        }

        let mut paths = Vec::new();
        self.scan_directory_boxed(self.root.clone(), &mut paths).await?;
        // Directory iteration order is platform dependent; keep discovery stable.
        paths.sort();

        let mut units = Vec::with_capacity(paths.len());
        for path in paths {
            log::debug!("Reading plugin manifest {}", path.display());
            units.push(load_unit(&path).await);
        }
        Ok(units)
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}
