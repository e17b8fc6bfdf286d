//! Invoice status lifecycle rules.
//!
//! ```text
//! pending ──► paid
//!    │  ▲       ▲
//!    ▼  │       │
//!  overdue ─────┘
//! ```
//!
//! `paid` is terminal. Overdue is set by the caller's business rule; nothing
//! here is timed.

use serde::{Deserialize, Serialize};

use billdesk_core::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    #[default]
    Pending,
    Paid,
    Overdue,
}

impl InvoiceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
        }
    }
}

impl core::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of asking for a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTransition {
    /// Already in the requested status: nothing to persist, no side effects.
    Unchanged(InvoiceStatus),
    Change {
        from: InvoiceStatus,
        to: InvoiceStatus,
    },
}

impl StatusTransition {
    /// Whether committing this transition must settle the customer ledger.
    pub fn settles_payment(&self) -> bool {
        matches!(
            self,
            StatusTransition::Change {
                to: InvoiceStatus::Paid,
                ..
            }
        )
    }
}

/// Decide whether `from → to` is allowed.
pub fn plan_transition(from: InvoiceStatus, to: InvoiceStatus) -> DomainResult<StatusTransition> {
    use InvoiceStatus::*;

    if from == to {
        return Ok(StatusTransition::Unchanged(from));
    }

    match (from, to) {
        (Pending, Paid) | (Pending, Overdue) | (Overdue, Paid) | (Overdue, Pending) => {
            Ok(StatusTransition::Change { from, to })
        }
        (Paid, _) => Err(DomainError::invariant(format!(
            "invoice is already paid and cannot move to {to}"
        ))),
        _ => Err(DomainError::invariant(format!(
            "status change {from} -> {to} is not allowed"
        ))),
    }
}
