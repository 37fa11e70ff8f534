//! Temporary filesystem roots for backup tests.

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A throwaway directory tree laid out like a deployed back office.
///
/// ```text
/// <tmp>/assets/<tenant>/...
/// <tmp>/backups/<tenant>/...
/// <tmp>/scratch/
/// ```
///
/// The whole tree is removed when the value is dropped.
pub struct TestFs {
    root: TempDir,
    pub assets: PathBuf,
    pub backups: PathBuf,
    pub scratch: PathBuf,
}

impl TestFs {
    pub fn new() -> std::io::Result<Self> {
        let root = tempfile::Builder::new().prefix("backoffice-test").tempdir()?;
        let assets = root.path().join("assets");
        let backups = root.path().join("backups");
        let scratch = root.path().join("scratch");

        std::fs::create_dir_all(&assets)?;
        std::fs::create_dir_all(&backups)?;
        std::fs::create_dir_all(&scratch)?;

        Ok(Self {
            root,
            assets,
            backups,
            scratch,
        })
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Returns the asset directory of a tenant (not created).
    pub fn tenant_assets(&self, tenant: &str) -> PathBuf {
        self.assets.join(tenant)
    }

    /// Writes an asset file for a tenant, creating parent directories.
    ///
    /// # Arguments
    /// - `tenant` - Owning tenant id
    /// - `relative` - Path relative to the tenant's asset root, e.g. `"images/logo.png"`
    /// - `bytes` - File contents
    ///
    /// # Returns
    /// - `Ok(PathBuf)` - Absolute path of the written file
    /// - `Err(io::Error)` - Failed to create directories or write the file
    pub fn write_asset(
        &self,
        tenant: &str,
        relative: &str,
        bytes: &[u8],
    ) -> std::io::Result<PathBuf> {
        let path = self.tenant_assets(tenant).join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, bytes)?;
        Ok(path)
    }

    /// Reads an asset file of a tenant.
    pub fn read_asset(&self, tenant: &str, relative: &str) -> std::io::Result<Vec<u8>> {
        std::fs::read(self.tenant_assets(tenant).join(relative))
    }
}
