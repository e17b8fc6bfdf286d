use billdesk_core::InvoiceId;
use billdesk_invoicing::{InvoiceStatus, StatusTransition};

use crate::error::BillingResult;
use crate::repository::{CustomerRepository, InvoiceRepository};
use crate::services::book::InvoiceBook;
use crate::services::reconcile::CustomerBalanceReconciler;

/// Drives invoice status changes.
///
/// Transitions are planned against the stored record, never the book's copy.
/// A change is committed only once the repository has stored it. Moving an
/// invoice to `paid` then settles the customer ledger exactly once; asking
/// for the status an invoice already has writes nothing and settles nothing.
pub struct InvoiceStatusMachine<C> {
    reconciler: CustomerBalanceReconciler<C>,
}

impl<C: CustomerRepository> InvoiceStatusMachine<C> {
    pub fn new(reconciler: CustomerBalanceReconciler<C>) -> Self {
        Self { reconciler }
    }

    pub fn reconciler(&self) -> &CustomerBalanceReconciler<C> {
        &self.reconciler
    }

    pub async fn transition<R: InvoiceRepository>(
        &self,
        book: &mut InvoiceBook<R>,
        id: InvoiceId,
        status: InvoiceStatus,
    ) -> BillingResult<StatusTransition> {
        // Storage is the authority; the book may hold an older copy.
        let current = book.repository().get_by_id(id).await?;

        let (transition, record) = current.with_status(status)?;
        let Some(record) = record else {
            tracing::debug!(invoice_number = %current.invoice_number(), %status, "status unchanged");
            book.refresh(current);
            return Ok(transition);
        };

        let stored = book.write(id, record).await?;
        tracing::info!(
            invoice_number = %stored.invoice_number(),
            from = %current.status(),
            to = %stored.status(),
            "invoice status changed"
        );

        if transition.settles_payment() {
            self.reconciler.settle(&stored).await?;
        }
        Ok(transition)
    }

    pub async fn mark_paid<R: InvoiceRepository>(
        &self,
        book: &mut InvoiceBook<R>,
        id: InvoiceId,
    ) -> BillingResult<StatusTransition> {
        self.transition(book, id, InvoiceStatus::Paid).await
    }

    pub async fn mark_overdue<R: InvoiceRepository>(
        &self,
        book: &mut InvoiceBook<R>,
        id: InvoiceId,
    ) -> BillingResult<StatusTransition> {
        self.transition(book, id, InvoiceStatus::Overdue).await
    }
}
