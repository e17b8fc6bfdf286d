use std::sync::{Arc, RwLock};

use chrono::NaiveDateTime;

use billdesk_core::{CustomerId, InvoiceId};
use billdesk_invoicing::Invoice;

use super::{RepositoryError, RepositoryResult};

/// Invoice storage.
///
/// Writes return the record as stored; callers refresh their in-memory view
/// from that value rather than from what they sent.
#[async_trait::async_trait]
pub trait InvoiceRepository: Send + Sync {
    /// All invoices in storage order.
    async fn load_all(&self) -> RepositoryResult<Vec<Invoice>>;

    async fn get_by_id(&self, id: InvoiceId) -> RepositoryResult<Invoice>;

    /// Insert a new invoice. Duplicate ids or invoice numbers are a conflict.
    async fn save(&self, invoice: Invoice) -> RepositoryResult<Invoice>;

    /// Replace the stored record with `invoice` (full replacement, last write wins).
    async fn update(&self, id: InvoiceId, invoice: Invoice) -> RepositoryResult<Invoice>;

    async fn delete(&self, id: InvoiceId) -> RepositoryResult<()>;

    /// Case-insensitive match on invoice number, customer name or customer code.
    async fn search(&self, term: &str) -> RepositoryResult<Vec<Invoice>>;

    async fn filter_by_customer(&self, customer_id: CustomerId) -> RepositoryResult<Vec<Invoice>>;

    /// Invoices dated within `[start, end]`.
    async fn filter_by_date_range(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> RepositoryResult<Vec<Invoice>>;
}

#[async_trait::async_trait]
impl<S> InvoiceRepository for Arc<S>
where
    S: InvoiceRepository + ?Sized,
{
    async fn load_all(&self) -> RepositoryResult<Vec<Invoice>> {
        (**self).load_all().await
    }

    async fn get_by_id(&self, id: InvoiceId) -> RepositoryResult<Invoice> {
        (**self).get_by_id(id).await
    }

    async fn save(&self, invoice: Invoice) -> RepositoryResult<Invoice> {
        (**self).save(invoice).await
    }

    async fn update(&self, id: InvoiceId, invoice: Invoice) -> RepositoryResult<Invoice> {
        (**self).update(id, invoice).await
    }

    async fn delete(&self, id: InvoiceId) -> RepositoryResult<()> {
        (**self).delete(id).await
    }

    async fn search(&self, term: &str) -> RepositoryResult<Vec<Invoice>> {
        (**self).search(term).await
    }

    async fn filter_by_customer(&self, customer_id: CustomerId) -> RepositoryResult<Vec<Invoice>> {
        (**self).filter_by_customer(customer_id).await
    }

    async fn filter_by_date_range(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> RepositoryResult<Vec<Invoice>> {
        (**self).filter_by_date_range(start, end).await
    }
}

/// In-memory invoice store for tests/dev. Keeps insertion order.
#[derive(Debug, Default)]
pub struct InMemoryInvoiceRepository {
    inner: RwLock<Vec<Invoice>>,
}

impl InMemoryInvoiceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn select(&self, keep: impl Fn(&Invoice) -> bool) -> RepositoryResult<Vec<Invoice>> {
        let rows = self.inner.read()?;
        Ok(rows.iter().filter(|i| keep(i)).cloned().collect())
    }
}

#[async_trait::async_trait]
impl InvoiceRepository for InMemoryInvoiceRepository {
    async fn load_all(&self) -> RepositoryResult<Vec<Invoice>> {
        self.select(|_| true)
    }

    async fn get_by_id(&self, id: InvoiceId) -> RepositoryResult<Invoice> {
        let rows = self.inner.read()?;
        rows.iter()
            .find(|i| i.id_typed() == id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("invoice {id}")))
    }

    async fn save(&self, invoice: Invoice) -> RepositoryResult<Invoice> {
        let mut rows = self.inner.write()?;
        if rows.iter().any(|i| i.id_typed() == invoice.id_typed()) {
            return Err(RepositoryError::conflict(format!("invoice {} already exists", invoice.id_typed())));
        }
        if rows.iter().any(|i| i.invoice_number() == invoice.invoice_number()) {
            return Err(RepositoryError::conflict(format!(
                "invoice number {} is already used",
                invoice.invoice_number()
            )));
        }
        rows.push(invoice.clone());
        Ok(invoice)
    }

    async fn update(&self, id: InvoiceId, invoice: Invoice) -> RepositoryResult<Invoice> {
        if invoice.id_typed() != id {
            return Err(RepositoryError::conflict(format!(
                "record for {} cannot replace invoice {id}",
                invoice.id_typed()
            )));
        }
        let mut rows = self.inner.write()?;
        if rows
            .iter()
            .any(|i| i.id_typed() != id && i.invoice_number() == invoice.invoice_number())
        {
            return Err(RepositoryError::conflict(format!(
                "invoice number {} is already used",
                invoice.invoice_number()
            )));
        }
        let slot = rows
            .iter_mut()
            .find(|i| i.id_typed() == id)
            .ok_or_else(|| RepositoryError::not_found(format!("invoice {id}")))?;
        *slot = invoice.clone();
        Ok(invoice)
    }

    async fn delete(&self, id: InvoiceId) -> RepositoryResult<()> {
        let mut rows = self.inner.write()?;
        let before = rows.len();
        rows.retain(|i| i.id_typed() != id);
        if rows.len() == before {
            return Err(RepositoryError::not_found(format!("invoice {id}")));
        }
        Ok(())
    }

    async fn search(&self, term: &str) -> RepositoryResult<Vec<Invoice>> {
        let needle = term.trim().to_lowercase();
        self.select(|i| {
            needle.is_empty()
                || i.invoice_number().to_lowercase().contains(&needle)
                || i.customer().name.to_lowercase().contains(&needle)
                || i.customer().code.to_lowercase().contains(&needle)
        })
    }

    async fn filter_by_customer(&self, customer_id: CustomerId) -> RepositoryResult<Vec<Invoice>> {
        self.select(|i| i.customer_id() == customer_id)
    }

    async fn filter_by_date_range(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> RepositoryResult<Vec<Invoice>> {
        self.select(|i| start <= i.date() && i.date() <= end)
    }
}
