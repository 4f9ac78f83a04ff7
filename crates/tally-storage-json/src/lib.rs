//! tally-storage-json
//!
//! Single-file JSON persistence for commitments, obligations, billers and
//! mirrored ledger entries. Every mutation rewrites the whole file through a
//! temporary file and a rename, so a batch is either fully on disk or not at all.

use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex, MutexGuard,
    },
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use tally_core::{
    storage::{BillerDirectory, LedgerBridge, ObligationStore},
    CoreError,
};
use tally_domain::{
    BillerConfig, BillingCycle, Commitment, Identifiable, LedgerEntry, LedgerEntryRequest,
    NamedEntity, Obligation,
};

pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;
const DATA_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S%.3f";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default = "Snapshot::current_version")]
    schema_version: u32,
    #[serde(default)]
    commitments: Vec<Commitment>,
    #[serde(default)]
    obligations: Vec<Obligation>,
    #[serde(default)]
    billers: Vec<BillerConfig>,
    #[serde(default)]
    ledger_entries: Vec<LedgerEntry>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            commitments: Vec::new(),
            obligations: Vec::new(),
            billers: Vec::new(),
            ledger_entries: Vec::new(),
        }
    }
}

impl Snapshot {
    fn current_version() -> u32 {
        SNAPSHOT_SCHEMA_VERSION
    }
}

/// Filesystem-backed JSON store implementing every engine collaborator.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
    backup_seq: AtomicU64,
    state: Mutex<Snapshot>,
}

impl JsonStore {
    /// Opens (or lazily creates) the data file at `path`. Backups of previous
    /// versions go to a `backups` directory next to it.
    pub fn open(path: PathBuf) -> Result<Self, CoreError> {
        Self::with_retention(path, DEFAULT_RETENTION)
    }

    pub fn with_retention(path: PathBuf, retention: usize) -> Result<Self, CoreError> {
        let parent = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        fs::create_dir_all(&parent)?;
        let backups_dir = parent.join("backups");
        let snapshot = if path.exists() {
            load_snapshot(&path)?
        } else {
            Snapshot::default()
        };
        if snapshot.schema_version > SNAPSHOT_SCHEMA_VERSION {
            return Err(CoreError::Storage(format!(
                "{} was written by a newer schema (v{})",
                path.display(),
                snapshot.schema_version
            )));
        }
        Ok(Self {
            path,
            backups_dir,
            retention: retention.max(1),
            backup_seq: AtomicU64::new(0),
            state: Mutex::new(snapshot),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backups_dir(&self) -> &Path {
        &self.backups_dir
    }

    /// Validates and stores a biller configuration, replacing one with the same id.
    pub fn register_biller(&self, biller: BillerConfig) -> Result<(), CoreError> {
        biller
            .validate()
            .map_err(|err| CoreError::Validation(err.to_string()))?;
        self.mutate(|snapshot| {
            snapshot.billers.retain(|existing| existing.id() != biller.id());
            snapshot.billers.push(biller);
            Ok(())
        })
    }

    pub fn list_billers(&self) -> Result<Vec<BillerConfig>, CoreError> {
        let mut billers = self.lock()?.billers.clone();
        billers.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(billers)
    }

    pub fn ledger_entries(&self) -> Result<Vec<LedgerEntry>, CoreError> {
        Ok(self.lock()?.ledger_entries.clone())
    }

    /// Backup files, newest first.
    pub fn list_backups(&self) -> Result<Vec<PathBuf>, CoreError> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some(DATA_EXTENSION) {
                entries.push(path);
            }
        }
        entries.sort();
        entries.reverse();
        Ok(entries)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Snapshot>, CoreError> {
        self.state
            .lock()
            .map_err(|_| CoreError::Storage("json store lock poisoned".into()))
    }

    /// Applies `op` to a copy of the data set and only adopts it once the
    /// copy is on disk.
    fn mutate<T>(
        &self,
        op: impl FnOnce(&mut Snapshot) -> Result<T, CoreError>,
    ) -> Result<T, CoreError> {
        let mut guard = self.lock()?;
        let mut next = guard.clone();
        let result = op(&mut next)?;
        self.write_snapshot(&next)?;
        *guard = next;
        Ok(result)
    }

    fn write_snapshot(&self, snapshot: &Snapshot) -> Result<(), CoreError> {
        if self.path.exists() {
            self.backup_existing_file()?;
        }
        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|err| CoreError::Serde(err.to_string()))?;
        let tmp = tmp_path(&self.path);
        write_file(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        debug!(
            "wrote {} commitment(s) and {} obligation(s) to {}",
            snapshot.commitments.len(),
            snapshot.obligations.len(),
            self.path.display()
        );
        Ok(())
    }

    fn backup_existing_file(&self) -> Result<(), CoreError> {
        fs::create_dir_all(&self.backups_dir)?;
        let stem = self
            .path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("tally");
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT);
        // Writes within the same millisecond keep distinct, ordered names.
        let seq = self.backup_seq.fetch_add(1, Ordering::SeqCst);
        let backup = self
            .backups_dir
            .join(format!("{stem}_{timestamp}_{seq:06}.{DATA_EXTENSION}"));
        fs::copy(&self.path, &backup)?;
        self.prune_backups()
    }

    fn prune_backups(&self) -> Result<(), CoreError> {
        for stale in self.list_backups()?.into_iter().skip(self.retention) {
            if let Err(err) = fs::remove_file(&stale) {
                warn!("failed to prune backup {}: {}", stale.display(), err);
            }
        }
        Ok(())
    }
}

impl ObligationStore for JsonStore {
    fn save_commitment(&self, commitment: &Commitment) -> Result<(), CoreError> {
        self.mutate(|snapshot| {
            match snapshot
                .commitments
                .iter_mut()
                .find(|existing| existing.id == commitment.id)
            {
                Some(existing) => *existing = commitment.clone(),
                None => snapshot.commitments.push(commitment.clone()),
            }
            Ok(())
        })
    }

    fn load_commitment(&self, id: Uuid) -> Result<Option<Commitment>, CoreError> {
        Ok(self
            .lock()?
            .commitments
            .iter()
            .find(|commitment| commitment.id == id)
            .cloned())
    }

    fn list_commitments(&self, party_id: Option<Uuid>) -> Result<Vec<Commitment>, CoreError> {
        Ok(self
            .lock()?
            .commitments
            .iter()
            .filter(|commitment| party_id.is_none() || commitment.party_id == party_id)
            .cloned()
            .collect())
    }

    fn delete_commitment(&self, id: Uuid) -> Result<bool, CoreError> {
        if self.load_commitment(id)?.is_none() {
            return Ok(false);
        }
        self.mutate(|snapshot| {
            snapshot.commitments.retain(|commitment| commitment.id != id);
            snapshot
                .obligations
                .retain(|obligation| obligation.commitment_id != id);
            Ok(true)
        })
    }

    fn save_obligations_batch(
        &self,
        commitment_id: Uuid,
        obligations: &[Obligation],
    ) -> Result<(), CoreError> {
        self.mutate(|snapshot| {
            if !snapshot
                .commitments
                .iter()
                .any(|commitment| commitment.id == commitment_id)
            {
                return Err(CoreError::Storage(format!(
                    "commitment {commitment_id} must be saved before its obligations"
                )));
            }
            if let Some(stray) = obligations
                .iter()
                .find(|obligation| obligation.commitment_id != commitment_id)
            {
                return Err(CoreError::Storage(format!(
                    "obligation {} belongs to commitment {}, not {}",
                    stray.id, stray.commitment_id, commitment_id
                )));
            }
            snapshot.obligations.extend(obligations.iter().cloned());
            Ok(())
        })
    }

    fn load_obligations(&self, commitment_id: Uuid) -> Result<Vec<Obligation>, CoreError> {
        let mut rows: Vec<Obligation> = self
            .lock()?
            .obligations
            .iter()
            .filter(|obligation| obligation.commitment_id == commitment_id)
            .cloned()
            .collect();
        rows.sort_by_key(|obligation| obligation.number);
        Ok(rows)
    }

    fn load_obligation(&self, id: Uuid) -> Result<Option<Obligation>, CoreError> {
        Ok(self
            .lock()?
            .obligations
            .iter()
            .find(|obligation| obligation.id == id)
            .cloned())
    }

    fn update_obligation(
        &self,
        id: Uuid,
        paid: bool,
        extra_amount: f64,
        paid_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Obligation>, CoreError> {
        if self.load_obligation(id)?.is_none() {
            return Ok(None);
        }
        self.mutate(|snapshot| {
            Ok(snapshot
                .obligations
                .iter_mut()
                .find(|obligation| obligation.id == id)
                .map(|obligation| {
                    obligation.paid = paid;
                    obligation.extra_amount = extra_amount;
                    obligation.paid_at = paid_at;
                    obligation.clone()
                }))
        })
    }
}

impl BillerDirectory for JsonStore {
    fn billing_cycle(&self, biller_id: Uuid) -> Result<Option<BillingCycle>, CoreError> {
        Ok(self
            .lock()?
            .billers
            .iter()
            .find(|biller| biller.id == biller_id)
            .map(|biller| biller.cycle))
    }
}

impl LedgerBridge for JsonStore {
    fn record_entry(&self, entry: &LedgerEntryRequest) -> Result<Uuid, CoreError> {
        let id = Uuid::new_v4();
        self.mutate(|snapshot| {
            snapshot.ledger_entries.push(LedgerEntry {
                id,
                request: entry.clone(),
            });
            Ok(id)
        })
    }

    /// Records the whole batch with a single file rewrite.
    fn record_entries(&self, entries: &[LedgerEntryRequest]) -> Result<Vec<Uuid>, CoreError> {
        self.mutate(|snapshot| {
            Ok(entries
                .iter()
                .map(|entry| {
                    let id = Uuid::new_v4();
                    snapshot.ledger_entries.push(LedgerEntry {
                        id,
                        request: entry.clone(),
                    });
                    id
                })
                .collect())
        })
    }
}

fn load_snapshot(path: &Path) -> Result<Snapshot, CoreError> {
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data)
        .map_err(|err| CoreError::Serde(format!("{}: {}", path.display(), err)))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_file(path: &Path, data: &str) -> Result<(), CoreError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    Ok(())
}
