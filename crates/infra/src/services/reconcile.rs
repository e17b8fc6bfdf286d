use billdesk_core::{CustomerId, Money};
use billdesk_invoicing::Invoice;
use billdesk_parties::Customer;

use crate::error::{BillingError, BillingResult};
use crate::repository::{CustomerRepository, RepositoryResult};

/// Applies payment settlements to customer ledgers.
pub struct CustomerBalanceReconciler<C> {
    customers: C,
}

impl<C: CustomerRepository> CustomerBalanceReconciler<C> {
    pub fn new(customers: C) -> Self {
        Self { customers }
    }

    pub fn customers(&self) -> &C {
        &self.customers
    }

    /// Apply a signed amount to a customer's balance.
    pub async fn apply(&self, customer_id: CustomerId, amount: Money) -> RepositoryResult<Customer> {
        self.customers.adjust_balance(customer_id, amount).await
    }

    /// Settle a paid invoice.
    ///
    /// The carried-forward balance collected by the invoice is taken off the
    /// customer ledger (`-previous_balance`). The ledger is adjusted once per
    /// call, zero amounts included.
    pub async fn settle(&self, invoice: &Invoice) -> BillingResult<Customer> {
        let amount = -invoice.previous_balance();
        let customer = self
            .apply(invoice.customer_id(), amount)
            .await
            .map_err(|source| BillingError::Reconciliation {
                invoice_number: invoice.invoice_number().to_string(),
                source,
            })?;

        tracing::info!(
            invoice_number = %invoice.invoice_number(),
            customer_code = %customer.code(),
            amount = %amount,
            balance = %customer.previous_balance(),
            "customer balance settled"
        );
        Ok(customer)
    }
}
