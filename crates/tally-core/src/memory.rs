//! In-process implementation of every collaborator seam, used by tests and
//! by embedders that do not need durability.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use tally_domain::{
    BillerConfig, BillingCycle, Commitment, LedgerEntry, LedgerEntryRequest, Obligation,
};

use crate::{
    storage::{BillerDirectory, LedgerBridge, ObligationStore},
    CoreError,
};

#[derive(Debug, Default)]
struct MemoryState {
    commitments: HashMap<Uuid, Commitment>,
    obligations: HashMap<Uuid, Obligation>,
    billers: HashMap<Uuid, BillerConfig>,
    ledger: Vec<LedgerEntry>,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<MemoryState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_biller(&self, biller: BillerConfig) -> Result<(), CoreError> {
        biller
            .validate()
            .map_err(|err| CoreError::Validation(err.to_string()))?;
        self.lock()?.billers.insert(biller.id, biller);
        Ok(())
    }

    /// Snapshot of every ledger entry recorded so far, in insertion order.
    pub fn ledger_entries(&self) -> Result<Vec<LedgerEntry>, CoreError> {
        Ok(self.lock()?.ledger.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, CoreError> {
        self.state
            .lock()
            .map_err(|_| CoreError::Storage("in-memory store lock poisoned".into()))
    }
}

impl ObligationStore for InMemoryStore {
    fn save_commitment(&self, commitment: &Commitment) -> Result<(), CoreError> {
        self.lock()?
            .commitments
            .insert(commitment.id, commitment.clone());
        Ok(())
    }

    fn load_commitment(&self, id: Uuid) -> Result<Option<Commitment>, CoreError> {
        Ok(self.lock()?.commitments.get(&id).cloned())
    }

    fn list_commitments(&self, party_id: Option<Uuid>) -> Result<Vec<Commitment>, CoreError> {
        let state = self.lock()?;
        Ok(state
            .commitments
            .values()
            .filter(|c| party_id.is_none() || c.party_id == party_id)
            .cloned()
            .collect())
    }

    fn delete_commitment(&self, id: Uuid) -> Result<bool, CoreError> {
        let mut state = self.lock()?;
        let removed = state.commitments.remove(&id).is_some();
        state.obligations.retain(|_, o| o.commitment_id != id);
        Ok(removed)
    }

    fn save_obligations_batch(
        &self,
        commitment_id: Uuid,
        obligations: &[Obligation],
    ) -> Result<(), CoreError> {
        if let Some(stray) = obligations
            .iter()
            .find(|o| o.commitment_id != commitment_id)
        {
            return Err(CoreError::Storage(format!(
                "obligation {} belongs to commitment {}, not {}",
                stray.id, stray.commitment_id, commitment_id
            )));
        }
        let mut state = self.lock()?;
        if !state.commitments.contains_key(&commitment_id) {
            return Err(CoreError::Storage(format!(
                "commitment {commitment_id} must be saved before its obligations"
            )));
        }
        for obligation in obligations {
            state.obligations.insert(obligation.id, obligation.clone());
        }
        Ok(())
    }

    fn load_obligations(&self, commitment_id: Uuid) -> Result<Vec<Obligation>, CoreError> {
        let state = self.lock()?;
        let mut rows: Vec<Obligation> = state
            .obligations
            .values()
            .filter(|o| o.commitment_id == commitment_id)
            .cloned()
            .collect();
        rows.sort_by_key(|o| o.number);
        Ok(rows)
    }

    fn load_obligation(&self, id: Uuid) -> Result<Option<Obligation>, CoreError> {
        Ok(self.lock()?.obligations.get(&id).cloned())
    }

    fn update_obligation(
        &self,
        id: Uuid,
        paid: bool,
        extra_amount: f64,
        paid_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Obligation>, CoreError> {
        let mut state = self.lock()?;
        Ok(state.obligations.get_mut(&id).map(|obligation| {
            obligation.paid = paid;
            obligation.extra_amount = extra_amount;
            obligation.paid_at = paid_at;
            obligation.clone()
        }))
    }
}

impl BillerDirectory for InMemoryStore {
    fn billing_cycle(&self, biller_id: Uuid) -> Result<Option<BillingCycle>, CoreError> {
        Ok(self.lock()?.billers.get(&biller_id).map(|b| b.cycle))
    }
}

impl LedgerBridge for InMemoryStore {
    fn record_entry(&self, entry: &LedgerEntryRequest) -> Result<Uuid, CoreError> {
        let id = Uuid::new_v4();
        self.lock()?.ledger.push(LedgerEntry {
            id,
            request: entry.clone(),
        });
        Ok(id)
    }

    fn record_entries(&self, entries: &[LedgerEntryRequest]) -> Result<Vec<Uuid>, CoreError> {
        let mut state = self.lock()?;
        Ok(entries
            .iter()
            .map(|entry| {
                let id = Uuid::new_v4();
                state.ledger.push(LedgerEntry {
                    id,
                    request: entry.clone(),
                });
                id
            })
            .collect())
    }
}
