use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use billdesk_core::{CustomerId, Entity, InvoiceId};
use billdesk_invoicing::{Invoice, InvoiceDraft, InvoiceNumberSequence, plan_transition};
use billdesk_reporting::{DateFilter, PaginatedReport, ReportEntry, ReportMode, ReportPaginator};

use crate::error::BillingResult;
use crate::repository::InvoiceRepository;

/// The invoice list the application works on.
///
/// Every write goes to the repository first; the held list is then refreshed
/// from the record the repository returned. A failed write leaves the held
/// list exactly as it was. Records are kept newest first.
pub struct InvoiceBook<R> {
    repo: R,
    numbers: InvoiceNumberSequence,
    invoices: Vec<Invoice>,
}

impl<R: InvoiceRepository> InvoiceBook<R> {
    pub fn new(repo: R, numbers: InvoiceNumberSequence) -> Self {
        Self {
            repo,
            numbers,
            invoices: Vec::new(),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn invoices(&self) -> &[Invoice] {
        &self.invoices
    }

    pub fn get(&self, id: InvoiceId) -> Option<&Invoice> {
        self.invoices.iter().find(|i| *i.id() == id)
    }

    /// Replace the held list with everything in storage.
    pub async fn load(&mut self) -> BillingResult<&[Invoice]> {
        let mut invoices = self.repo.load_all().await?;
        newest_first(&mut invoices);
        self.invoices = invoices;
        tracing::debug!(count = self.invoices.len(), "invoices loaded");
        Ok(&self.invoices)
    }

    pub async fn create(&mut self, invoice: Invoice) -> BillingResult<Invoice> {
        let stored = self.repo.save(invoice).await?;
        self.refresh(stored.clone());
        tracing::info!(
            invoice_id = %stored.id_typed(),
            invoice_number = %stored.invoice_number(),
            total = %stored.total(),
            "invoice created"
        );
        Ok(stored)
    }

    /// Replace a stored invoice with a full new record.
    ///
    /// The record's status must be reachable from the stored status, so a
    /// paid invoice cannot be written back to pending or overdue.
    pub async fn replace(&mut self, id: InvoiceId, invoice: Invoice) -> BillingResult<Invoice> {
        let current = self.repo.get_by_id(id).await?;
        plan_transition(current.status(), invoice.status())?;
        self.write(id, invoice).await
    }

    // Status rules are the caller's job here.
    pub(crate) async fn write(&mut self, id: InvoiceId, invoice: Invoice) -> BillingResult<Invoice> {
        let stored = self.repo.update(id, invoice).await?;
        self.refresh(stored.clone());
        tracing::info!(
            invoice_id = %id,
            invoice_number = %stored.invoice_number(),
            status = %stored.status(),
            "invoice updated"
        );
        Ok(stored)
    }

    pub async fn remove(&mut self, id: InvoiceId) -> BillingResult<()> {
        self.repo.delete(id).await?;
        self.invoices.retain(|i| *i.id() != id);
        tracing::info!(invoice_id = %id, "invoice deleted");
        Ok(())
    }

    /// Save a draft: a new invoice gets the next number, a reopened one replaces its record.
    ///
    /// A reopened draft replaces content only. Status and creation time come
    /// from the stored record at save time, so an edit opened before a status
    /// change cannot undo it. Inputs clamped while computing totals are logged
    /// as warnings.
    pub async fn commit_draft(
        &mut self,
        draft: &InvoiceDraft,
        date: NaiveDateTime,
        now: DateTime<Utc>,
    ) -> BillingResult<Invoice> {
        for warning in draft.totals().warnings {
            tracing::warn!(%warning, "billing input adjusted");
        }

        let number = match draft.invoice_number() {
            Some(number) => number.to_string(),
            None => self
                .numbers
                .next_after(self.invoices.iter().map(Invoice::invoice_number)),
        };
        let record = draft.finalize(number, date, now)?;

        match draft.editing() {
            Some(id) => {
                let current = self.repo.get_by_id(id).await?;
                self.write(id, record.with_lifecycle_of(&current)).await
            }
            None => self.create(record).await,
        }
    }

    pub async fn search(&self, term: &str) -> BillingResult<Vec<Invoice>> {
        let mut found = self.repo.search(term).await?;
        newest_first(&mut found);
        Ok(found)
    }

    pub async fn for_customer(&self, customer_id: CustomerId) -> BillingResult<Vec<Invoice>> {
        let mut found = self.repo.filter_by_customer(customer_id).await?;
        newest_first(&mut found);
        Ok(found)
    }

    pub async fn in_date_range(&self, start: NaiveDateTime, end: NaiveDateTime) -> BillingResult<Vec<Invoice>> {
        let mut found = self.repo.filter_by_date_range(start, end).await?;
        newest_first(&mut found);
        Ok(found)
    }

    /// Paginated report over the held invoices, in their held order.
    pub fn report(
        &self,
        paginator: &ReportPaginator,
        filter: DateFilter,
        as_of: NaiveDate,
        mode: ReportMode,
    ) -> PaginatedReport {
        paginator.paginate(
            self.invoices.iter().map(ReportEntry::from_invoice),
            filter,
            as_of,
            mode,
        )
    }

    pub(crate) fn refresh(&mut self, stored: Invoice) {
        match self.invoices.iter().position(|i| i.id() == stored.id()) {
            Some(idx) => self.invoices[idx] = stored,
            None => self.invoices.push(stored),
        }
        newest_first(&mut self.invoices);
    }
}

fn newest_first(invoices: &mut [Invoice]) {
    invoices.sort_by(|a, b| {
        b.date()
            .cmp(&a.date())
            .then_with(|| b.created_at().cmp(&a.created_at()))
    });
}
