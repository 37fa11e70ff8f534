use futures::{future::try_join_all, Stream, StreamExt};
use sea_orm::{DbErr, TransactionTrait};
use std::{collections::BTreeMap, fmt::Display, path::Path};
use tokio::io::AsyncWriteExt;

use crate::server::{
    data::document::DocumentRepository,
    error::backup::{BackupError, ExtractionError, ReplacePhase, UploadError},
    model::{
        backup::{RestoreSummary, RewriteMode, DATA_MEMBER, DB_MEMBER},
        snapshot::{Snapshot, ENTITY_TYPES},
        tenant::TenantId,
    },
    service::{
        backup::{close_scratch, BackupService},
        refs::RefService,
    },
    util::{
        archive::unpack_file,
        relocate::move_or_copy_tree,
        rewrite::{find_tenant_id, rewrite_structural, rewrite_text, snapshot_tenant_id},
    },
};

/// Label of replace failures that are not tied to one entity type.
const WHOLE_DATASET: &str = "dataset";

impl BackupService<'_> {
    /// Restores an uploaded archive as the complete dataset of a tenant.
    ///
    /// The archive may come from any tenant; its tenant identifiers are rewritten to
    /// `tenant` according to the configured rewrite mode. Steps, in order:
    ///
    /// 1. Reject the upload unless `filename` has an accepted extension
    /// 2. Stream the upload into a fresh scratch directory and extract it
    /// 3. Extract the nested asset archive and parse the rewritten snapshot
    /// 4. In one transaction, delete every managed collection of the tenant, then insert
    ///    every snapshot record
    /// 5. Increment the ref of every managed collection
    /// 6. Replace the tenant's asset directory with the extracted assets
    ///
    /// Refs are bumped as soon as the transaction commits, so clients learn about the new
    /// records even when relocating assets fails afterwards. An `AssetCopy` error leaves
    /// the restored records and bumped refs in place next to the previous asset tree.
    ///
    /// # Arguments
    /// - `tenant` - Tenant receiving the dataset
    /// - `filename` - Client-supplied file name, used for the extension check only
    /// - `body` - Upload contents
    ///
    /// # Returns
    /// - `Ok(RestoreSummary)` - Restored record counts per entity type and asset file count
    /// - `Err(BackupError::Upload)` - Unsupported file name or unreadable upload
    /// - `Err(BackupError::Extraction)` - Broken archive, missing member, or invalid snapshot
    /// - `Err(BackupError::DbReplace)` - Replacing the dataset failed; nothing was changed
    /// - `Err(BackupError::AssetCopy)` - Assets could not be relocated
    /// - `Err(BackupError::Timeout)` - A step exceeded the step timeout
    pub async fn import<S, B, E>(
        &self,
        tenant: &TenantId,
        filename: &str,
        body: S,
    ) -> Result<RestoreSummary, BackupError>
    where
        S: Stream<Item = Result<B, E>>,
        B: AsRef<[u8]>,
        E: Display,
    {
        self.check_extension(filename)?;

        let _lock = self.locks.acquire(tenant).await;
        tracing::info!("Restoring backup '{}' for tenant {}", filename, tenant);

        let scratch = self.scratch_dir("import", tenant)?;
        let upload_path = scratch.path().join("upload");
        let archive_dir = scratch.path().join("archive");
        let assets_dir = scratch.path().join("assets");

        self.timed("receive upload", save_upload(body, &upload_path))
            .await?;
        self.timed("extract archive", unpack_file(&upload_path, &archive_dir))
            .await?;

        for member in [DB_MEMBER, DATA_MEMBER] {
            if !archive_dir.join(member).is_file() {
                return Err(ExtractionError::MissingMember(member).into());
            }
        }

        let assets = self
            .timed(
                "extract assets",
                unpack_file(&archive_dir.join(DATA_MEMBER), &assets_dir),
            )
            .await?;

        let text = self
            .timed("read snapshot", read_snapshot_text(&archive_dir.join(DB_MEMBER)))
            .await?;
        let snapshot = self.rewrite_snapshot(&text, tenant)?;

        let restored = self
            .timed("replace dataset", self.replace_dataset(tenant, &snapshot))
            .await?;

        self.timed("update refs", async {
            RefService::new(self.db)
                .rise_many(tenant, &ENTITY_TYPES)
                .await
                .map_err(BackupError::RefUpdate)
        })
        .await?;

        self.timed(
            "relocate assets",
            move_or_copy_tree(&assets_dir, &self.settings.tenant_assets(tenant)),
        )
        .await?;

        close_scratch(scratch);

        tracing::info!(
            "Restored {} records and {} asset files for tenant {}",
            restored.values().sum::<u64>(),
            assets,
            tenant
        );

        Ok(RestoreSummary { restored, assets })
    }

    /// Parses the snapshot text and assigns it to `tenant`.
    fn rewrite_snapshot(&self, text: &str, tenant: &TenantId) -> Result<Snapshot, ExtractionError> {
        match self.settings.rewrite_mode {
            RewriteMode::Text => match find_tenant_id(text) {
                Some(old) => {
                    tracing::debug!("Rewriting tenant '{}' to '{}' in backup text", old, tenant);
                    Snapshot::from_json_str(&rewrite_text(text, old, tenant.as_str())?)
                }
                None => Snapshot::from_json_str(text),
            },
            RewriteMode::Structural => {
                let mut snapshot = Snapshot::from_json_str(text)?;
                let old = snapshot_tenant_id(&snapshot);
                let changed = rewrite_structural(&mut snapshot, old.as_deref(), tenant.as_str());
                tracing::debug!("Reassigned {} records to tenant {}", changed, tenant);
                Ok(snapshot)
            }
        }
    }

    /// Replaces every managed collection of a tenant inside one transaction.
    ///
    /// All deletes finish before the first insert starts. Any failure rolls the whole
    /// replace back.
    async fn replace_dataset(
        &self,
        tenant: &TenantId,
        snapshot: &Snapshot,
    ) -> Result<BTreeMap<String, u64>, BackupError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|source| replace_error(WHOLE_DATASET, ReplacePhase::Begin, source))?;

        let repo = DocumentRepository::new(&txn);
        let result = async {
            try_join_all(ENTITY_TYPES.iter().map(|entity_type| {
                let repo = &repo;
                async move {
                    repo.delete_all_by_tenant(tenant.as_str(), entity_type)
                        .await
                        .map_err(|source| replace_error(entity_type, ReplacePhase::Delete, source))
                }
            }))
            .await?;

            let counts = try_join_all(ENTITY_TYPES.iter().map(|entity_type| {
                let repo = &repo;
                async move {
                    repo.bulk_create(tenant.as_str(), entity_type, snapshot.records(entity_type))
                        .await
                        .map(|count| (entity_type.to_string(), count))
                        .map_err(|source| replace_error(entity_type, ReplacePhase::Create, source))
                }
            }))
            .await?;

            Ok::<_, BackupError>(counts.into_iter().collect::<BTreeMap<_, _>>())
        }
        .await;

        match result {
            Ok(restored) => {
                txn.commit()
                    .await
                    .map_err(|source| replace_error(WHOLE_DATASET, ReplacePhase::Commit, source))?;
                Ok(restored)
            }
            Err(e) => {
                if let Err(rollback) = txn.rollback().await {
                    tracing::error!("Failed to roll back restore of tenant {}: {}", tenant, rollback);
                }
                Err(e)
            }
        }
    }
}

fn replace_error(entity_type: &str, phase: ReplacePhase, source: DbErr) -> BackupError {
    BackupError::DbReplace {
        entity_type: entity_type.to_string(),
        phase,
        source,
    }
}

/// Streams an upload to disk.
async fn save_upload<S, B, E>(body: S, path: &Path) -> Result<u64, BackupError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    let mut body = std::pin::pin!(body);
    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(BackupError::io("store upload"))?;

    let mut size = 0;
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| UploadError::Multipart(e.to_string()))?;
        file.write_all(chunk.as_ref())
            .await
            .map_err(BackupError::io("store upload"))?;
        size += chunk.as_ref().len() as u64;
    }

    file.flush().await.map_err(BackupError::io("store upload"))?;

    Ok(size)
}

async fn read_snapshot_text(path: &Path) -> Result<String, ExtractionError> {
    let bytes = tokio::fs::read(path).await?;

    String::from_utf8(bytes)
        .map_err(|_| ExtractionError::InvalidSnapshot("database dump is not UTF-8".to_string()))
}
