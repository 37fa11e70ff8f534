use chrono::Utc;
use futures::future::try_join_all;

use crate::server::{
    data::document::DocumentRepository,
    error::backup::BackupError,
    model::{
        backup::{BackupFile, DATA_MEMBER, DB_MEMBER},
        snapshot::{Snapshot, ENTITY_TYPES},
        tenant::TenantId,
    },
    service::backup::{close_scratch, modified_at, unique_archive_path, BackupService},
    util::archive::ArchiveBuilder,
};

impl BackupService<'_> {
    /// Exports the whole dataset and asset directory of a tenant into a new archive.
    ///
    /// Reads every managed collection concurrently, writes the snapshot and the packed
    /// asset tree into a staging directory, then packs both into
    /// `<backups>/<tenant>/backup_<YYYYMMDDHHMMSS>.<ext>`. The staging directory is removed
    /// on every exit path.
    ///
    /// # Returns
    /// - `Ok(BackupFile)` - The finished archive
    /// - `Err(BackupError::DbRead)` - Reading a collection failed
    /// - `Err(BackupError::Archive)` - Packing assets or writing the archive failed
    /// - `Err(BackupError::Timeout)` - A step exceeded the step timeout
    pub async fn export(&self, tenant: &TenantId) -> Result<BackupFile, BackupError> {
        let _lock = self.locks.acquire(tenant).await;
        tracing::info!("Exporting backup for tenant {}", tenant);

        let snapshot = self
            .timed("read collections", self.read_snapshot(tenant))
            .await?;

        let staging = self.scratch_dir("export", tenant)?;
        let db_path = staging.path().join(DB_MEMBER);
        let data_path = staging.path().join(DATA_MEMBER);

        let json = snapshot
            .to_json_bytes()
            .map_err(|e| BackupError::io("serialize snapshot")(e.into()))?;
        self.timed("write snapshot", async {
            tokio::fs::write(&db_path, json)
                .await
                .map_err(BackupError::io("write snapshot"))
        })
        .await?;

        self.timed(
            "pack assets",
            ArchiveBuilder::new()
                .tree(self.settings.tenant_assets(tenant))
                .write_to(&data_path),
        )
        .await?;

        let dir = self.settings.tenant_backups(tenant);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(BackupError::io("create backup directory"))?;

        let stem = format!("backup_{}", Utc::now().format("%Y%m%d%H%M%S"));
        let path = unique_archive_path(&dir, &stem, self.settings.archive_extension());

        self.timed(
            "write archive",
            ArchiveBuilder::new()
                .file(DB_MEMBER, &db_path)
                .file(DATA_MEMBER, &data_path)
                .write_to(&path),
        )
        .await?;

        close_scratch(staging);

        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(BackupError::io("stat archive"))?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        tracing::info!(
            "Exported {} records of tenant {} to {} ({} bytes)",
            snapshot.len(),
            tenant,
            filename,
            metadata.len()
        );

        Ok(BackupFile {
            url: BackupFile::public_url(tenant, &filename),
            filename,
            size: metadata.len(),
            created_at: modified_at(&metadata),
            path,
        })
    }

    /// Reads every managed collection of a tenant.
    ///
    /// The reads run concurrently; the first failure aborts the rest.
    pub(super) async fn read_snapshot(&self, tenant: &TenantId) -> Result<Snapshot, BackupError> {
        let repo = DocumentRepository::new(self.db);

        let collections = try_join_all(ENTITY_TYPES.iter().map(|entity_type| {
            let repo = &repo;
            async move {
                repo.find_all_by_tenant(tenant.as_str(), entity_type)
                    .await
                    .map(|documents| (*entity_type, documents))
                    .map_err(|source| BackupError::DbRead {
                        entity_type: entity_type.to_string(),
                        source,
                    })
            }
        }))
        .await?;

        let mut snapshot = Snapshot::new();
        for (entity_type, documents) in collections {
            snapshot.insert(
                entity_type,
                documents.into_iter().map(Snapshot::export_record).collect(),
            );
        }

        Ok(snapshot)
    }
}
