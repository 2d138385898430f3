//! Output directory ownership: hash-gated atomic writes and orphan cleanup.
//!
//! ## `write_file` protocol
//!
//! 1. Validate the path is relative and stays inside the output directory.
//! 2. Take the per-path lock and mark the path touched.
//! 3. SHA-256 the LF-normalised content and the current on-disk bytes.
//! 4. Identical → `Skipped`, nothing is written.
//! 5. Write to `<path>.folio.tmp`, then rename onto the final path.
//!
//! ## `finalize`
//!
//! Every file that existed when [`FileManager::initialize`] ran and was not
//! touched since is an orphan and gets deleted. Directories left empty are
//! pruned up to the output root.
//!
//! Files of an (entry, locale) pair whose export failed are kept: the pair
//! registers its file stem with [`FileManager::protect_stem`] and every
//! known file with that stem survives reconciliation.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use sha2::{Digest, Sha256};
use walkdir::{DirEntry, WalkDir};

use folio_core::Outcome;

use crate::error::{io_err, SyncError};
use crate::stats::{orphan_key, Stats};

const TMP_SUFFIX: &str = ".folio.tmp";

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Outcome of an individual file write. Paths are relative to the output
/// directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file did not exist before.
    Created { path: PathBuf },
    /// The file existed with different content.
    Updated { path: PathBuf },
    /// Content matches what is already on disk.
    Skipped { path: PathBuf },
}

impl WriteOutcome {
    pub fn outcome(&self) -> Outcome {
        match self {
            WriteOutcome::Created { .. } => Outcome::Created,
            WriteOutcome::Updated { .. } => Outcome::Updated,
            WriteOutcome::Skipped { .. } => Outcome::Skipped,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            WriteOutcome::Created { path }
            | WriteOutcome::Updated { path }
            | WriteOutcome::Skipped { path } => path,
        }
    }
}

/// What reconciliation removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinalizeReport {
    pub deleted: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

// ---------------------------------------------------------------------------
// FileManager
// ---------------------------------------------------------------------------

/// Mediates every filesystem write of a run.
///
/// Safe to share across concurrent entry pipelines: writes to different
/// paths proceed in parallel, writes to the same path are serialized.
#[derive(Debug)]
pub struct FileManager {
    root: PathBuf,
    dry_run: bool,
    known: BTreeSet<PathBuf>,
    touched: Mutex<BTreeSet<PathBuf>>,
    protected: Mutex<BTreeSet<String>>,
    owners: Mutex<BTreeMap<PathBuf, String>>,
    default_locale: Option<String>,
    locks: Mutex<HashMap<PathBuf, Arc<tokio::sync::Mutex<()>>>>,
    finalized: AtomicBool,
}

impl FileManager {
    pub fn new(root: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            root: root.into(),
            dry_run,
            known: BTreeSet::new(),
            touched: Mutex::new(BTreeSet::new()),
            protected: Mutex::new(BTreeSet::new()),
            owners: Mutex::new(BTreeMap::new()),
            default_locale: None,
            locks: Mutex::new(HashMap::new()),
            finalized: AtomicBool::new(false),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Locale label for orphans whose file name carries no `@locale` suffix.
    pub fn set_default_locale(&mut self, code: impl Into<String>) {
        self.default_locale = Some(code.into());
    }

    /// Create the output directory and snapshot the files already in it.
    ///
    /// A missing or empty directory yields an empty snapshot. Dot-files are
    /// never part of the snapshot, so `.gitignore` and friends survive
    /// reconciliation.
    pub async fn initialize(&mut self) -> Result<(), SyncError> {
        if !self.dry_run {
            tokio::fs::create_dir_all(&self.root)
                .await
                .map_err(|e| io_err(&self.root, e))?;
        }
        let root = self.root.clone();
        self.known = tokio::task::spawn_blocking(move || snapshot_files(&root))
            .await
            .map_err(|err| io_err(&self.root, std::io::Error::other(err)))??;
        tracing::debug!(
            root = %self.root.display(),
            known = self.known.len(),
            "output directory initialized"
        );
        Ok(())
    }

    /// Paths (relative) present when the directory was initialized.
    pub fn known_paths(&self) -> &BTreeSet<PathBuf> {
        &self.known
    }

    /// Paths (relative) written or confirmed this run.
    pub fn touched_paths(&self) -> BTreeSet<PathBuf> {
        self.touched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Keep every known file whose stem is `stem` (`{id}{locale-suffix}`)
    /// through [`finalize`](Self::finalize).
    pub fn protect_stem(&self, stem: impl Into<String>) {
        self.protected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(stem.into());
    }

    /// Keep `relative` through [`finalize`](Self::finalize) without writing
    /// it. Paths that fail validation are ignored.
    pub fn keep(&self, relative: &Path) {
        if let Ok(relative) = validate_relative(relative) {
            self.mark_touched(&relative);
        }
    }

    /// Attribute files in `directory` to `content_type` in orphan stats.
    pub fn claim_directory(&self, directory: &Path, content_type: &str) {
        if let Ok(directory) = validate_relative(directory) {
            self.owners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(directory, content_type.to_string());
        }
    }

    /// Write `content` to `relative` under the output directory unless the
    /// file already holds exactly that content.
    ///
    /// The path counts as touched even when the write fails, so the previous
    /// version is kept rather than reconciled away.
    pub async fn write_file(
        &self,
        relative: &Path,
        content: &str,
    ) -> Result<WriteOutcome, SyncError> {
        let relative = validate_relative(relative)?;
        let lock = self.path_lock(&relative);
        let _guard = lock.lock().await;
        self.mark_touched(&relative);

        let path = self.root.join(&relative);

        // Normalise line endings to LF before hashing and writing.
        let normalized = content.replace("\r\n", "\n");
        let digest = sha256_hex(normalized.as_bytes());

        let existed = match tokio::fs::read(&path).await {
            Ok(current) => {
                if sha256_hex(&current) == digest {
                    tracing::debug!("unchanged: {}", path.display());
                    return Ok(WriteOutcome::Skipped { path: relative });
                }
                true
            }
            Err(err) if err.kind() == ErrorKind::NotFound => false,
            Err(err) => return Err(io_err(&path, err)),
        };

        let outcome = if existed {
            WriteOutcome::Updated { path: relative }
        } else {
            WriteOutcome::Created { path: relative }
        };

        if self.dry_run {
            tracing::info!("[dry-run] would write: {}", path.display());
            return Ok(outcome);
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_err(parent, e))?;
        }

        let tmp = PathBuf::from(format!("{}{TMP_SUFFIX}", path.display()));
        tokio::fs::write(&tmp, normalized.as_bytes())
            .await
            .map_err(|e| io_err(&tmp, e))?;

        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(io_err(&path, e));
        }

        tracing::debug!("wrote: {}", path.display());
        Ok(outcome)
    }

    /// Delete every previously-known path that was not touched this run.
    ///
    /// Must only be called once every entry's write has completed or failed.
    /// A deletion failure is recorded as `failed` and does not stop the rest.
    pub async fn finalize(&self, stats: &Stats) -> Result<FinalizeReport, SyncError> {
        if self.finalized.swap(true, Ordering::SeqCst) {
            return Err(SyncError::AlreadyFinalized);
        }

        let touched = self.touched_paths();
        let protected = self
            .protected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let owners = self
            .owners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let default_locale = self.default_locale.as_deref();
        let mut report = FinalizeReport::default();

        for relative in self.known.difference(&touched) {
            let path = self.root.join(relative);
            let stem = relative.file_stem().and_then(|stem| stem.to_str());
            if stem.is_some_and(|stem| protected.contains(stem)) {
                tracing::debug!("kept after failed export: {}", path.display());
                continue;
            }

            let owner = relative
                .parent()
                .and_then(|dir| owners.get(dir))
                .map(String::as_str);
            let key = orphan_key(relative, owner, default_locale);

            if self.dry_run {
                tracing::info!("[dry-run] would delete: {}", path.display());
                stats.record(key, Outcome::Deleted);
                report.deleted.push(relative.clone());
                continue;
            }

            match tokio::fs::remove_file(&path).await {
                Ok(()) => {
                    tracing::info!("deleted orphan: {}", path.display());
                    stats.record(key, Outcome::Deleted);
                    report.deleted.push(relative.clone());
                    self.prune_empty_parents(&path).await;
                }
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    tracing::debug!("orphan already gone: {}", path.display());
                }
                Err(err) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to delete orphan"
                    );
                    stats.record(key, Outcome::Failed);
                    report.failed.push(relative.clone());
                }
            }
        }

        Ok(report)
    }

    fn path_lock(&self, relative: &Path) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks
            .entry(relative.to_path_buf())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    fn mark_touched(&self, relative: &Path) {
        self.touched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(relative.to_path_buf());
    }

    async fn prune_empty_parents(&self, deleted: &Path) {
        let mut current = deleted.parent();
        while let Some(dir) = current {
            if dir == self.root || !dir.starts_with(&self.root) {
                break;
            }
            // remove_dir fails on non-empty directories, which ends the walk.
            if tokio::fs::remove_dir(dir).await.is_err() {
                break;
            }
            current = dir.parent();
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn sha256_hex(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    hex::encode(h.finalize())
}

/// Reject absolute paths and anything that climbs out of the output root.
fn validate_relative(path: &Path) -> Result<PathBuf, SyncError> {
    let mut clean = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                return Err(SyncError::Path {
                    path: path.to_path_buf(),
                    reason: "parent directory components are not allowed",
                })
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(SyncError::Path {
                    path: path.to_path_buf(),
                    reason: "output paths must be relative",
                })
            }
        }
    }
    if clean.as_os_str().is_empty() {
        return Err(SyncError::Path {
            path: path.to_path_buf(),
            reason: "empty path",
        });
    }
    Ok(clean)
}

/// Relative paths of every regular, non-hidden file under `root`.
fn snapshot_files(root: &Path) -> Result<BTreeSet<PathBuf>, SyncError> {
    let mut files = BTreeSet::new();
    if !root.exists() {
        return Ok(files);
    }

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

    for entry in walker {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(root).to_path_buf();
            io_err(path, err.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(root) {
            files.insert(relative.to_path_buf());
        }
    }
    Ok(files)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
