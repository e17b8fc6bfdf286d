use serde::{Deserialize, Serialize};

use billdesk_core::{CustomerId, DomainError, DomainResult, Entity, Money, ValueObject, round2};

/// Contact information for a customer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContactInfo {
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
}

/// Input for registering a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    /// Human-facing customer code printed on invoices (e.g. `C-0001`).
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub contact: ContactInfo,
    /// Opening ledger balance carried over from before this system.
    #[serde(default)]
    pub opening_balance: Money,
}

/// Customer with a running ledger balance.
///
/// `previous_balance` is the authoritative amount the customer carries. It is
/// changed only through [`Customer::apply_adjustment`] (payment reconciliation)
/// or [`Customer::set_previous_balance`] (explicit manual edit).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    id: CustomerId,
    code: String,
    name: String,
    contact: ContactInfo,
    previous_balance: Money,
}

impl Customer {
    pub fn register(id: CustomerId, input: NewCustomer) -> DomainResult<Self> {
        if input.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if input.code.trim().is_empty() {
            return Err(DomainError::validation("customer code cannot be empty"));
        }

        Ok(Self {
            id,
            code: input.code.trim().to_string(),
            name: input.name.trim().to_string(),
            contact: input.contact,
            previous_balance: round2(input.opening_balance),
        })
    }

    pub fn id_typed(&self) -> CustomerId {
        self.id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contact(&self) -> &ContactInfo {
        &self.contact
    }

    pub fn previous_balance(&self) -> Money {
        self.previous_balance
    }

    /// Replace profile fields. The ledger balance is not touched.
    pub fn update_details(&mut self, name: Option<String>, contact: Option<ContactInfo>) -> DomainResult<()> {
        if let Some(name) = name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("name cannot be empty"));
            }
            self.name = name.trim().to_string();
        }
        if let Some(contact) = contact {
            self.contact = contact;
        }
        Ok(())
    }

    /// Manual ledger edit (operator correction).
    pub fn set_previous_balance(&mut self, balance: Money) {
        self.previous_balance = round2(balance);
    }

    /// Apply a signed ledger adjustment and return the new balance.
    pub fn apply_adjustment(&mut self, delta: Money) -> Money {
        self.previous_balance = round2(self.previous_balance + delta);
        self.previous_balance
    }

    /// Freeze the customer as it is right now, for embedding in an invoice.
    pub fn snapshot(&self) -> CustomerSnapshot {
        CustomerSnapshot {
            customer_id: self.id,
            code: self.code.clone(),
            name: self.name.clone(),
            contact: self.contact.clone(),
            previous_balance: self.previous_balance,
        }
    }
}

impl Entity for Customer {
    type Id = CustomerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Customer as it was when an invoice was saved.
///
/// A value record, not a reference: later edits of the live customer never
/// show through on stored invoices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSnapshot {
    pub customer_id: CustomerId,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub contact: ContactInfo,
    pub previous_balance: Money,
}

impl ValueObject for CustomerSnapshot {}
