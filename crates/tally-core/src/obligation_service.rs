//! Settlement and listing of individual obligations.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use tally_domain::Obligation;

use crate::{storage::ObligationStore, time::Clock, CoreError};

pub struct ObligationService {
    store: Arc<dyn ObligationStore>,
    clock: Arc<dyn Clock>,
}

impl ObligationService {
    pub fn new(store: Arc<dyn ObligationStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Replaces the paid flag and extra amount of an obligation. Any transition
    /// is allowed; `paid_at` follows the paid flag.
    pub fn settle(&self, id: Uuid, paid: bool, extra_amount: f64) -> Result<Obligation, CoreError> {
        if !extra_amount.is_finite() {
            return Err(CoreError::Validation(format!(
                "extra amount must be a finite number, got {extra_amount}"
            )));
        }
        let mut obligation = self.get(id)?;
        let was_paid = obligation.paid;
        obligation.apply_settlement(paid, extra_amount, self.clock.now());
        let updated = self
            .store
            .update_obligation(
                id,
                obligation.paid,
                obligation.extra_amount,
                obligation.paid_at,
            )
            .map_err(|err| err.in_context(format!("updating obligation {id}")))?
            .ok_or(CoreError::ObligationNotFound(id))?;
        if was_paid != paid {
            info!(
                "obligation {} of commitment {} marked {}",
                updated.number,
                updated.commitment_id,
                if paid { "paid" } else { "unpaid" }
            );
        }
        Ok(updated)
    }

    pub fn get(&self, id: Uuid) -> Result<Obligation, CoreError> {
        self.store
            .load_obligation(id)
            .map_err(|err| err.in_context(format!("loading obligation {id}")))?
            .ok_or(CoreError::ObligationNotFound(id))
    }

    /// Obligations of a commitment ordered by sequence number.
    pub fn list(&self, commitment_id: Uuid) -> Result<Vec<Obligation>, CoreError> {
        let exists = self
            .store
            .load_commitment(commitment_id)
            .map_err(|err| err.in_context(format!("loading commitment {commitment_id}")))?
            .is_some();
        if !exists {
            return Err(CoreError::CommitmentNotFound(commitment_id));
        }
        self.store.load_obligations(commitment_id).map_err(|err| {
            err.in_context(format!("loading obligations of commitment {commitment_id}"))
        })
    }
}
