//! Cyclical biller (credit card) configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::common::{Identifiable, NamedEntity};

/// Closing and due day of a biller's monthly statement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BillingCycle {
    pub closing_day: u32,
    pub due_day: u32,
}

impl BillingCycle {
    pub fn new(closing_day: u32, due_day: u32) -> Self {
        Self {
            closing_day,
            due_day,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BillerConfigError {
    #[error("biller name is required")]
    NameRequired,
    #[error("closing day must be between 1 and 31, got {0}")]
    InvalidClosingDay(u32),
    #[error("due day must be between 1 and 31, got {0}")]
    InvalidDueDay(u32),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BillerConfig {
    pub id: Uuid,
    pub name: String,
    pub cycle: BillingCycle,
}

impl BillerConfig {
    /// Builds a validated biller configuration.
    pub fn new(
        name: impl Into<String>,
        closing_day: u32,
        due_day: u32,
    ) -> Result<Self, BillerConfigError> {
        let config = Self {
            id: Uuid::new_v4(),
            name: name.into().trim().to_string(),
            cycle: BillingCycle::new(closing_day, due_day),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), BillerConfigError> {
        if self.name.trim().is_empty() {
            return Err(BillerConfigError::NameRequired);
        }
        if !(1..=31).contains(&self.cycle.closing_day) {
            return Err(BillerConfigError::InvalidClosingDay(self.cycle.closing_day));
        }
        if !(1..=31).contains(&self.cycle.due_day) {
            return Err(BillerConfigError::InvalidDueDay(self.cycle.due_day));
        }
        Ok(())
    }
}

impl Identifiable for BillerConfig {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for BillerConfig {
    fn name(&self) -> &str {
        &self.name
    }
}
