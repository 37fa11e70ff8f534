//! Zip archive codec.
//!
//! Backups are zip containers. `ArchiveBuilder` collects named entries (in-memory bytes,
//! single files, or whole directory trees) and writes them either to disk or to memory.
//! `unpack_file` extracts an archive into a directory and refuses any archive with an
//! entry that would land outside of it.
//!
//! All zip work is synchronous and runs on tokio's blocking pool.

use std::{
    fs::{self, File},
    io::{self, BufReader, Cursor, Seek, Write},
    path::{Path, PathBuf},
};
use walkdir::WalkDir;
use zip::{write::SimpleFileOptions, CompressionMethod, ZipArchive, ZipWriter};

use crate::server::error::backup::{ArchiveError, ExtractionError};

/// Suffix of an archive that is still being written.
const PARTIAL_SUFFIX: &str = ".partial";

enum ArchiveEntry {
    Bytes { name: String, bytes: Vec<u8> },
    File { name: String, path: PathBuf },
    /// Contents of a directory added at the archive root.
    Tree { root: PathBuf },
}

/// Collects entries and writes them as one zip archive.
///
/// # Example
///
/// ```rust,ignore
/// let data = ArchiveBuilder::new().tree(&tenant_assets).into_bytes().await?;
///
/// ArchiveBuilder::new()
///     .bytes("db", snapshot_json)
///     .bytes("data", data)
///     .write_to(&archive_path)
///     .await?;
/// ```
#[derive(Default)]
pub struct ArchiveBuilder {
    entries: Vec<ArchiveEntry>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry holding the given bytes.
    pub fn bytes(mut self, name: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.entries.push(ArchiveEntry::Bytes {
            name: name.into(),
            bytes,
        });
        self
    }

    /// Adds an entry streamed from a file on disk.
    pub fn file(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.entries.push(ArchiveEntry::File {
            name: name.into(),
            path: path.into(),
        });
        self
    }

    /// Adds every file and directory below `root`, named by their path relative to it.
    ///
    /// Empty directories are kept as directory entries. A missing `root` adds nothing.
    pub fn tree(mut self, root: impl Into<PathBuf>) -> Self {
        self.entries.push(ArchiveEntry::Tree { root: root.into() });
        self
    }

    /// Writes the archive to `dest`.
    ///
    /// The archive is written to `<dest>.partial`, finalized and fsynced, then renamed to
    /// `dest`, so a reader never sees a truncated archive under the final name. The partial
    /// file is removed when any step fails.
    ///
    /// # Returns
    /// - `Ok(())` - Archive is complete at `dest`
    /// - `Err(ArchiveError)` - Reading an input or writing the archive failed
    pub async fn write_to(self, dest: &Path) -> Result<(), ArchiveError> {
        let dest = dest.to_path_buf();
        tokio::task::spawn_blocking(move || self.write_to_blocking(&dest)).await?
    }

    /// Writes the archive into memory.
    pub async fn into_bytes(self) -> Result<Vec<u8>, ArchiveError> {
        tokio::task::spawn_blocking(move || {
            let cursor = write_archive(Cursor::new(Vec::new()), &self.entries)?;
            Ok(cursor.into_inner())
        })
        .await?
    }

    fn write_to_blocking(&self, dest: &Path) -> Result<(), ArchiveError> {
        let partial = partial_path(dest);

        let result = write_partial(&self.entries, &partial, dest);
        if result.is_err() {
            if let Err(e) = fs::remove_file(&partial) {
                if e.kind() != io::ErrorKind::NotFound {
                    tracing::warn!(
                        "Failed to remove partial archive {}: {}",
                        partial.display(),
                        e
                    );
                }
            }
        }

        result
    }
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}

fn write_partial(entries: &[ArchiveEntry], partial: &Path, dest: &Path) -> Result<(), ArchiveError> {
    let file = File::create(partial)?;
    let file = write_archive(file, entries)?;
    file.sync_all()?;
    fs::rename(partial, dest)?;

    Ok(())
}

fn write_archive<W: Write + Seek>(writer: W, entries: &[ArchiveEntry]) -> Result<W, ArchiveError> {
    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in entries {
        match entry {
            ArchiveEntry::Bytes { name, bytes } => {
                zip.start_file(name.as_str(), options)?;
                zip.write_all(bytes)?;
            }
            ArchiveEntry::File { name, path } => {
                let mut file = File::open(path)?;
                zip.start_file(name.as_str(), options)?;
                io::copy(&mut file, &mut zip)?;
            }
            ArchiveEntry::Tree { root } => write_tree(&mut zip, root, options)?,
        }
    }

    Ok(zip.finish()?)
}

fn write_tree<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    root: &Path,
    options: SimpleFileOptions,
) -> Result<(), ArchiveError> {
    if !root.exists() {
        return Ok(());
    }

    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let name = entry_name(relative);

        if entry.file_type().is_dir() {
            zip.add_directory(format!("{}/", name), options)?;
        } else if entry.file_type().is_file() {
            let mut file = File::open(entry.path())?;
            zip.start_file(name, options)?;
            io::copy(&mut file, zip)?;
        } else {
            tracing::debug!("Skipping non-regular file {}", entry.path().display());
        }
    }

    Ok(())
}

/// Archive entry name of a relative path, always `/`-separated.
fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Extracts an archive file into `dest`, creating it if needed.
///
/// Every entry name is checked before anything is written: an absolute name or one that
/// climbs out with `..` rejects the whole archive.
///
/// # Returns
/// - `Ok(usize)` - Number of extracted files, directories not counted
/// - `Err(ExtractionError::Malformed)` - Not a readable zip archive
/// - `Err(ExtractionError::UnsafePath)` - An entry escapes `dest`
/// - `Err(ExtractionError::Io)` - Writing an extracted file failed
pub async fn unpack_file(archive: &Path, dest: &Path) -> Result<usize, ExtractionError> {
    let archive = archive.to_path_buf();
    let dest = dest.to_path_buf();

    tokio::task::spawn_blocking(move || unpack_blocking(&archive, &dest)).await?
}

fn unpack_blocking(archive: &Path, dest: &Path) -> Result<usize, ExtractionError> {
    let mut zip = ZipArchive::new(BufReader::new(File::open(archive)?))?;

    let mut targets = Vec::with_capacity(zip.len());
    for index in 0..zip.len() {
        let entry = zip.by_index_raw(index)?;
        let Some(relative) = entry.enclosed_name().map(|path| path.to_path_buf()) else {
            return Err(ExtractionError::UnsafePath(entry.name().to_string()));
        };
        targets.push((relative, entry.is_dir()));
    }

    fs::create_dir_all(dest)?;

    let mut files = 0;
    for (index, (relative, is_dir)) in targets.into_iter().enumerate() {
        let outpath = dest.join(relative);

        if is_dir {
            fs::create_dir_all(&outpath)?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut entry = zip.by_index(index)?;
        let mut outfile = File::create(&outpath)?;
        io::copy(&mut entry, &mut outfile)?;
        files += 1;
    }

    Ok(files)
}
