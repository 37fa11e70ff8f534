use futures::{stream, Stream};
use sea_orm::DbErr;
use serde_json::json;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    time::Duration,
};
use test_utils::{builder::TestBuilder, factory, fs::TestFs};
use walkdir::WalkDir;

use crate::server::{
    error::backup::{BackupError, ExtractionError, ReplacePhase, UploadError},
    model::{
        backup::{BackupSettings, RewriteMode},
        snapshot::Snapshot,
        tenant::TenantId,
    },
    service::{
        backup::{lock::TenantLocks, BackupService},
        refs::RefService,
    },
    util::archive::ArchiveBuilder,
};


fn settings(fs: &TestFs, rewrite_mode: RewriteMode) -> BackupSettings {
    BackupSettings {
        assets_dir: fs.assets.clone(),
        backups_dir: fs.backups.clone(),
        scratch_dir: fs.scratch.clone(),
        extensions: vec!["tdb".to_string()],
        rewrite_mode,
        step_timeout: Duration::from_secs(30),
        max_upload_bytes: 64 * 1024 * 1024,
    }
}

fn tenant(id: &str) -> TenantId {
    TenantId::parse(id).unwrap()
}

/// Wraps bytes as a single-chunk upload body.
fn upload(bytes: Vec<u8>) -> impl Stream<Item = Result<Vec<u8>, std::io::Error>> {
    stream::iter(vec![Ok(bytes)])
}

/// Builds an archive from a raw `db` member and an optional asset directory.
async fn archive_bytes(db_json: &str, assets: Option<&Path>) -> Vec<u8> {
    let data = match assets {
        Some(dir) => ArchiveBuilder::new().tree(dir),
        None => ArchiveBuilder::new(),
    }
    .into_bytes()
    .await
    .unwrap();

    ArchiveBuilder::new()
        .bytes("db", db_json.as_bytes().to_vec())
        .bytes("data", data)
        .into_bytes()
        .await
        .unwrap()
}

/// Every file below `root` keyed by relative path.
fn asset_files(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    if !root.exists() {
        return BTreeMap::new();
    }

    WalkDir::new(root)
        .into_iter()
        .map(Result::unwrap)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let relative = entry.path().strip_prefix(root).unwrap().to_path_buf();
            (relative, std::fs::read(entry.path()).unwrap())
        })
        .collect()
}

fn scratch_is_empty(fs: &TestFs) -> bool {
    std::fs::read_dir(&fs.scratch).unwrap().next().is_none()
}
