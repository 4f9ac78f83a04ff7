//! Collaborator seams: persistence, biller configuration and the cash ledger.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use tally_domain::{BillingCycle, Commitment, LedgerEntryRequest, Obligation};

use crate::CoreError;

/// Abstraction over persistence backends for commitment headers and obligation rows.
pub trait ObligationStore: Send + Sync {
    /// Inserts or replaces a commitment header.
    fn save_commitment(&self, commitment: &Commitment) -> Result<(), CoreError>;
    fn load_commitment(&self, id: Uuid) -> Result<Option<Commitment>, CoreError>;
    /// Lists commitment headers, optionally restricted to one party.
    fn list_commitments(&self, party_id: Option<Uuid>) -> Result<Vec<Commitment>, CoreError>;
    /// Removes a commitment together with all of its obligations. Returns
    /// whether a commitment was removed.
    fn delete_commitment(&self, id: Uuid) -> Result<bool, CoreError>;

    /// Persists all obligations of a commitment as one atomic batch: either
    /// every row is stored or none is.
    fn save_obligations_batch(
        &self,
        commitment_id: Uuid,
        obligations: &[Obligation],
    ) -> Result<(), CoreError>;
    /// Obligations of a commitment ordered by their sequence number.
    fn load_obligations(&self, commitment_id: Uuid) -> Result<Vec<Obligation>, CoreError>;
    fn load_obligation(&self, id: Uuid) -> Result<Option<Obligation>, CoreError>;
    /// Replaces the settlement fields of one obligation. Returns the updated
    /// row, or `None` when the id does not resolve.
    fn update_obligation(
        &self,
        id: Uuid,
        paid: bool,
        extra_amount: f64,
        paid_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Obligation>, CoreError>;
}

/// Read-only access to cyclical biller configuration.
pub trait BillerDirectory: Send + Sync {
    fn billing_cycle(&self, biller_id: Uuid) -> Result<Option<BillingCycle>, CoreError>;
}

/// Records the monetary side-effect of an obligation in the cash ledger.
pub trait LedgerBridge: Send + Sync {
    /// Records one entry and returns its identifier.
    fn record_entry(&self, entry: &LedgerEntryRequest) -> Result<Uuid, CoreError>;

    /// Records a batch of entries, returning their identifiers in input order.
    /// Backends that can write the batch in one step should override this.
    fn record_entries(&self, entries: &[LedgerEntryRequest]) -> Result<Vec<Uuid>, CoreError> {
        entries.iter().map(|entry| self.record_entry(entry)).collect()
    }
}
