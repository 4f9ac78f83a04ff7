//! Commitment lifecycle: validation, schedule generation, persistence and
//! ledger mirroring.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use tally_domain::{
    BillingCycle, Commitment, CommitmentKind, CommitmentRequest, CommitmentSummary, Displayable,
    LedgerEntryRequest, Obligation,
};

use crate::{
    amounts::{AmountNormalizer, NormalizedAmounts, RawAmounts, RECURRING_HORIZON},
    billing_cycle::BillingCycleResolver,
    schedule::ScheduleGenerator,
    status::StatusAggregator,
    storage::{BillerDirectory, LedgerBridge, ObligationStore},
    time::Clock,
    CoreError,
};

/// Tunables resolved once at configuration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleSettings {
    pub recurring_horizon: u32,
    /// Ledger category used for mirrored card installments whose commitment
    /// carries no category of its own.
    pub ledger_category: Option<Uuid>,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            recurring_horizon: RECURRING_HORIZON,
            ledger_category: None,
        }
    }
}

struct SchedulePlan {
    amounts: NormalizedAmounts,
    first_due: NaiveDate,
}

/// Creates, replaces and reads commitments together with their obligation schedule.
pub struct CommitmentService {
    store: Arc<dyn ObligationStore>,
    billers: Arc<dyn BillerDirectory>,
    ledger: Option<Arc<dyn LedgerBridge>>,
    clock: Arc<dyn Clock>,
    normalizer: AmountNormalizer,
    ledger_category: Option<Uuid>,
}

impl CommitmentService {
    pub fn new(
        store: Arc<dyn ObligationStore>,
        billers: Arc<dyn BillerDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            billers,
            ledger: None,
            clock,
            normalizer: AmountNormalizer::default(),
            ledger_category: None,
        }
    }

    /// Mirrors every generated card-installment obligation into `ledger`.
    pub fn with_ledger(mut self, ledger: Arc<dyn LedgerBridge>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn with_settings(mut self, settings: ScheduleSettings) -> Self {
        self.normalizer = AmountNormalizer::new(settings.recurring_horizon);
        self.ledger_category = settings.ledger_category;
        self
    }

    /// Parses a commitment kind label received at the boundary.
    pub fn parse_kind(label: &str) -> Result<CommitmentKind, CoreError> {
        Ok(label.parse::<CommitmentKind>()?)
    }

    /// Validates the request, generates its schedule and persists header plus
    /// obligations. Nothing is written when validation fails.
    pub fn create(&self, request: &CommitmentRequest) -> Result<CommitmentSummary, CoreError> {
        let plan = self.plan(request)?;
        let now = self.clock.now();
        let commitment = build_commitment(Uuid::new_v4(), request, &plan.amounts, now, now);
        let obligations = self.materialize(&commitment, &plan)?;
        self.persist(&commitment, Some(obligations.as_slice()))?;
        info!(
            "commitment {} {} created with {} obligation(s)",
            commitment.id,
            commitment.display_label(),
            obligations.len()
        );
        Ok(StatusAggregator::summarize(commitment, &obligations))
    }

    /// Replaces a commitment header as a whole. The schedule is generated only
    /// when the commitment has no obligations yet; an existing schedule is
    /// left untouched even if amounts or count changed.
    pub fn update(
        &self,
        id: Uuid,
        request: &CommitmentRequest,
    ) -> Result<CommitmentSummary, CoreError> {
        let existing = self
            .store
            .load_commitment(id)
            .map_err(|err| err.in_context(format!("loading commitment {id}")))?
            .ok_or(CoreError::CommitmentNotFound(id))?;
        let plan = self.plan(request)?;
        let commitment = build_commitment(
            id,
            request,
            &plan.amounts,
            existing.created_at,
            self.clock.now(),
        );
        let current = self.obligations_of(id)?;
        let obligations = if current.is_empty() {
            let generated = self.materialize(&commitment, &plan)?;
            self.persist(&commitment, Some(generated.as_slice()))?;
            info!(
                "commitment {} updated, generated {} obligation(s)",
                id,
                generated.len()
            );
            generated
        } else {
            self.persist(&commitment, None)?;
            debug!(
                "commitment {} already has {} obligation(s); schedule left unchanged",
                id,
                current.len()
            );
            current
        };
        Ok(StatusAggregator::summarize(commitment, &obligations))
    }

    pub fn get(&self, id: Uuid) -> Result<CommitmentSummary, CoreError> {
        let commitment = self
            .store
            .load_commitment(id)
            .map_err(|err| err.in_context(format!("loading commitment {id}")))?
            .ok_or(CoreError::CommitmentNotFound(id))?;
        let obligations = self.obligations_of(id)?;
        Ok(StatusAggregator::summarize(commitment, &obligations))
    }

    /// Lists commitment summaries ordered by start date, then creation time.
    pub fn list(&self, party_id: Option<Uuid>) -> Result<Vec<CommitmentSummary>, CoreError> {
        let mut commitments = self
            .store
            .list_commitments(party_id)
            .map_err(|err| err.in_context("listing commitments"))?;
        commitments.sort_by_key(|c| (c.start_date, c.created_at));
        commitments
            .into_iter()
            .map(|commitment| {
                let obligations = self.obligations_of(commitment.id)?;
                Ok(StatusAggregator::summarize(commitment, &obligations))
            })
            .collect()
    }

    /// Deletes a commitment and, by cascade, all of its obligations.
    pub fn delete(&self, id: Uuid) -> Result<(), CoreError> {
        let removed = self
            .store
            .delete_commitment(id)
            .map_err(|err| err.in_context(format!("deleting commitment {id}")))?;
        if !removed {
            return Err(CoreError::CommitmentNotFound(id));
        }
        info!("commitment {} deleted", id);
        Ok(())
    }

    fn plan(&self, request: &CommitmentRequest) -> Result<SchedulePlan, CoreError> {
        validate_request(request)?;
        let amounts = self
            .normalizer
            .normalize(request.kind, &RawAmounts::from(request))?;
        let cycle = if request.kind.requires_biller() {
            Some(self.billing_cycle(request)?)
        } else {
            None
        };
        let first_due = BillingCycleResolver::resolve(request.start_date, cycle).ok_or_else(|| {
            CoreError::Validation(format!(
                "start date {} has no due date in range",
                request.start_date
            ))
        })?;
        Ok(SchedulePlan { amounts, first_due })
    }

    fn billing_cycle(&self, request: &CommitmentRequest) -> Result<BillingCycle, CoreError> {
        let biller_id = request.biller_id.ok_or_else(|| {
            CoreError::BillerConfigMissing(format!("{} requires a biller", request.kind))
        })?;
        self.billers
            .billing_cycle(biller_id)
            .map_err(|err| err.in_context(format!("loading biller {biller_id}")))?
            .ok_or_else(|| {
                CoreError::BillerConfigMissing(format!(
                    "biller {biller_id} has no billing configuration"
                ))
            })
    }

    fn materialize(
        &self,
        commitment: &Commitment,
        plan: &SchedulePlan,
    ) -> Result<Vec<Obligation>, CoreError> {
        let mut obligations =
            ScheduleGenerator::generate(commitment.id, &plan.amounts, plan.first_due)?;
        let Some(ledger) = self
            .ledger
            .as_ref()
            .filter(|_| commitment.kind.mirrors_to_ledger())
        else {
            return Ok(obligations);
        };
        let category = commitment
            .category_id
            .or(self.ledger_category)
            .ok_or_else(|| CoreError::LedgerCategoryMissing(commitment.title.clone()))?;
        let count = obligations.len() as u32;
        let entries: Vec<LedgerEntryRequest> = obligations
            .iter()
            .map(|obligation| {
                LedgerEntryRequest::installment(
                    &commitment.title,
                    obligation.number,
                    count,
                    obligation.due_date,
                    category,
                    obligation.amount,
                )
            })
            .collect();
        let entry_ids = ledger.record_entries(&entries).map_err(|err| {
            warn!(
                "ledger mirroring failed for commitment {}: {}",
                commitment.id, err
            );
            err.in_context(format!(
                "mirroring {} obligation(s) of commitment {}",
                count, commitment.id
            ))
        })?;
        if entry_ids.len() != obligations.len() {
            return Err(CoreError::Storage(format!(
                "ledger returned {} id(s) for {} obligation(s) of commitment {}",
                entry_ids.len(),
                count,
                commitment.id
            )));
        }
        for (obligation, entry_id) in obligations.iter_mut().zip(entry_ids) {
            obligation.ledger_entry_id = Some(entry_id);
        }
        debug!(
            "mirrored {} obligation(s) of commitment {} into the ledger",
            count, commitment.id
        );
        Ok(obligations)
    }

    fn persist(
        &self,
        commitment: &Commitment,
        obligations: Option<&[Obligation]>,
    ) -> Result<(), CoreError> {
        self.store
            .save_commitment(commitment)
            .map_err(|err| err.in_context(format!("saving commitment {}", commitment.id)))?;
        if let Some(batch) = obligations {
            self.store
                .save_obligations_batch(commitment.id, batch)
                .map_err(|err| {
                    err.in_context(format!(
                        "saving obligations of commitment {}",
                        commitment.id
                    ))
                })?;
        }
        Ok(())
    }

    fn obligations_of(&self, id: Uuid) -> Result<Vec<Obligation>, CoreError> {
        self.store
            .load_obligations(id)
            .map_err(|err| err.in_context(format!("loading obligations of commitment {id}")))
    }
}

fn validate_request(request: &CommitmentRequest) -> Result<(), CoreError> {
    if request.title.trim().is_empty() {
        return Err(CoreError::Validation("commitment title is required".into()));
    }
    if let Some(interest) = request.interest {
        if !interest.rate.is_finite() || interest.rate < 0.0 {
            return Err(CoreError::Validation(format!(
                "interest rate must be a non-negative number, got {}",
                interest.rate
            )));
        }
    }
    Ok(())
}

fn build_commitment(
    id: Uuid,
    request: &CommitmentRequest,
    amounts: &NormalizedAmounts,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> Commitment {
    Commitment {
        id,
        party_id: request.party_id,
        title: request.title.trim().to_string(),
        kind: request.kind,
        total_amount: amounts.total,
        unit_amount: amounts.unit_amount,
        unit_count: amounts.unit_count,
        start_date: request.start_date,
        biller_id: request.biller_id,
        category_id: request.category_id,
        interest: request.interest,
        recurrence_interval_months: amounts.recurrence_interval_months,
        created_at,
        updated_at,
    }
}
