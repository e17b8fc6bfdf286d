//! End-to-end billing flows over the in-memory adapters.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio_util::sync::CancellationToken;

use billdesk_core::{CustomerId, InvoiceId, Money, ProductId};
use billdesk_infra::{
    BillingConfig, BillingError, CustomerBalanceReconciler, CustomerRepository, InMemoryCustomerRepository,
    InMemoryInvoiceRepository, InMemoryProductRepository, InvoiceBook, InvoiceRepository, InvoiceStatusMachine,
    ProductRepository, RepositoryError, RepositoryResult,
};
use billdesk_invoicing::{Invoice, InvoiceDraft, InvoiceNumberSequence, InvoiceStatus, StatusTransition};
use billdesk_parties::{ContactInfo, Customer, NewCustomer};
use billdesk_products::{NewProduct, PackUnit, PriceSide, Product, PurchasePrices};
use billdesk_reporting::{
    DateFilter, Delivery, DispatchOutcome, ExportMetadata, PrintExportGateway, PrinterDiscovery, ReportDispatcher,
    ReportMode, ReportPaginator, ReportResult, render_document,
};

/// Customer repository that counts balance adjustments.
#[derive(Default)]
struct CountingCustomers {
    inner: InMemoryCustomerRepository,
    adjustments: AtomicUsize,
}

#[async_trait::async_trait]
impl CustomerRepository for CountingCustomers {
    async fn read(&self, id: CustomerId) -> RepositoryResult<Customer> {
        self.inner.read(id).await
    }

    async fn adjust_balance(&self, id: CustomerId, delta: Money) -> RepositoryResult<Customer> {
        self.adjustments.fetch_add(1, Ordering::SeqCst);
        self.inner.adjust_balance(id, delta).await
    }
}

/// Invoice repository whose writes can be switched to fail.
#[derive(Default)]
struct FlakyInvoices {
    inner: InMemoryInvoiceRepository,
    fail_writes: AtomicBool,
}

impl FlakyInvoices {
    fn check(&self) -> RepositoryResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::storage("disk full"));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl InvoiceRepository for FlakyInvoices {
    async fn load_all(&self) -> RepositoryResult<Vec<Invoice>> {
        self.inner.load_all().await
    }

    async fn get_by_id(&self, id: InvoiceId) -> RepositoryResult<Invoice> {
        self.inner.get_by_id(id).await
    }

    async fn save(&self, invoice: Invoice) -> RepositoryResult<Invoice> {
        self.check()?;
        self.inner.save(invoice).await
    }

    async fn update(&self, id: InvoiceId, invoice: Invoice) -> RepositoryResult<Invoice> {
        self.check()?;
        self.inner.update(id, invoice).await
    }

    async fn delete(&self, id: InvoiceId) -> RepositoryResult<()> {
        self.check()?;
        self.inner.delete(id).await
    }

    async fn search(&self, term: &str) -> RepositoryResult<Vec<Invoice>> {
        self.inner.search(term).await
    }

    async fn filter_by_customer(&self, customer_id: CustomerId) -> RepositoryResult<Vec<Invoice>> {
        self.inner.filter_by_customer(customer_id).await
    }

    async fn filter_by_date_range(&self, start: NaiveDateTime, end: NaiveDateTime) -> RepositoryResult<Vec<Invoice>> {
        self.inner.filter_by_date_range(start, end).await
    }
}

struct Fixture {
    product: Product,
    customer: Customer,
    customers: Arc<CountingCustomers>,
    invoices: Arc<FlakyInvoices>,
    book: InvoiceBook<Arc<FlakyInvoices>>,
    machine: InvoiceStatusMachine<Arc<CountingCustomers>>,
}

fn eclairs() -> anyhow::Result<Product> {
    Ok(Product::create(
        ProductId::new(),
        NewProduct {
            name: "Chocolate Eclairs".to_string(),
            unit_price: dec!(5),
            pieces_per_box: 10,
            boxes_per_master: 24,
            box_price_override: None,
            master_price_override: None,
            purchase: PurchasePrices::default(),
        },
    )?)
}

fn at(y: i32, m: u32, d: u32) -> anyhow::Result<NaiveDateTime> {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|day| day.and_hms_opt(10, 30, 0))
        .ok_or_else(|| anyhow::anyhow!("invalid date {y}-{m}-{d}"))
}

fn fixture(opening_balance: Money) -> anyhow::Result<Fixture> {
    billdesk_observability::init_with(&BillingConfig::default().log);

    let customer = Customer::register(
        CustomerId::new(),
        NewCustomer {
            code: "C-0042".to_string(),
            name: "Candy Corner".to_string(),
            contact: ContactInfo {
                city: Some("Lahore".to_string()),
                ..ContactInfo::default()
            },
            opening_balance,
        },
    )?;
    let customers = Arc::new(CountingCustomers::default());
    customers.inner.upsert(customer.clone())?;
    let invoices = Arc::new(FlakyInvoices::default());

    Ok(Fixture {
        product: eclairs()?,
        customer,
        customers: customers.clone(),
        invoices: invoices.clone(),
        book: InvoiceBook::new(invoices, InvoiceNumberSequence::default()),
        machine: InvoiceStatusMachine::new(CustomerBalanceReconciler::new(customers)),
    })
}

fn draft_for(customer: &Customer, product: &Product, quantity: Decimal) -> anyhow::Result<InvoiceDraft> {
    let mut draft = InvoiceDraft::new(PriceSide::Sale);
    draft.select_customer(customer.clone());
    let idx = draft.add_product_line(product.clone(), PackUnit::Master)?;
    draft.set_quantity(idx, quantity)?;
    Ok(draft)
}

fn now() -> DateTime<Utc> {
    Utc::now()
}

#[tokio::test]
async fn paying_twice_reconciles_once() -> anyhow::Result<()> {
    let mut fx = fixture(dec!(300))?;
    let invoice = fx
        .book
        .commit_draft(&draft_for(&fx.customer, &fx.product, dec!(2))?, at(2024, 2, 10)?, now())
        .await?;
    assert_eq!(invoice.previous_balance(), dec!(300));
    assert_eq!(invoice.total(), dec!(2700));

    let first = fx.machine.mark_paid(&mut fx.book, invoice.id_typed()).await?;
    assert!(first.settles_payment());
    assert_eq!(fx.customers.adjustments.load(Ordering::SeqCst), 1);

    let second = fx.machine.mark_paid(&mut fx.book, invoice.id_typed()).await?;
    assert_eq!(second, StatusTransition::Unchanged(InvoiceStatus::Paid));
    assert_eq!(fx.customers.adjustments.load(Ordering::SeqCst), 1);

    let customer = fx.customers.read(fx.customer.id_typed()).await?;
    assert_eq!(customer.previous_balance(), Decimal::ZERO);
    assert_eq!(fx.book.get(invoice.id_typed()).map(Invoice::status), Some(InvoiceStatus::Paid));
    Ok(())
}

#[tokio::test]
async fn settlement_with_zero_carry_forward_still_adjusts_once() -> anyhow::Result<()> {
    let mut fx = fixture(Decimal::ZERO)?;
    let invoice = fx
        .book
        .commit_draft(&draft_for(&fx.customer, &fx.product, dec!(1))?, at(2024, 2, 10)?, now())
        .await?;

    fx.machine.mark_overdue(&mut fx.book, invoice.id_typed()).await?;
    assert_eq!(fx.customers.adjustments.load(Ordering::SeqCst), 0);

    fx.machine.mark_paid(&mut fx.book, invoice.id_typed()).await?;
    assert_eq!(fx.customers.adjustments.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn failed_status_write_applies_nothing() -> anyhow::Result<()> {
    let mut fx = fixture(dec!(300))?;
    let invoice = fx
        .book
        .commit_draft(&draft_for(&fx.customer, &fx.product, dec!(1))?, at(2024, 2, 10)?, now())
        .await?;

    fx.invoices.fail_writes.store(true, Ordering::SeqCst);
    let err = fx
        .machine
        .mark_paid(&mut fx.book, invoice.id_typed())
        .await
        .unwrap_err();

    assert!(matches!(err, BillingError::Repository(RepositoryError::Storage(_))));
    assert_eq!(fx.book.get(invoice.id_typed()).map(Invoice::status), Some(InvoiceStatus::Pending));
    assert_eq!(fx.invoices.get_by_id(invoice.id_typed()).await?.status(), InvoiceStatus::Pending);
    assert_eq!(fx.customers.adjustments.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn leaving_paid_is_rejected_without_writing() -> anyhow::Result<()> {
    let mut fx = fixture(Decimal::ZERO)?;
    let invoice = fx
        .book
        .commit_draft(&draft_for(&fx.customer, &fx.product, dec!(1))?, at(2024, 2, 10)?, now())
        .await?;
    fx.machine.mark_paid(&mut fx.book, invoice.id_typed()).await?;

    let err = fx
        .machine
        .transition(&mut fx.book, invoice.id_typed(), InvoiceStatus::Pending)
        .await
        .unwrap_err();

    assert!(matches!(err, BillingError::Domain(_)));
    assert_eq!(fx.book.get(invoice.id_typed()).map(Invoice::status), Some(InvoiceStatus::Paid));
    Ok(())
}

#[tokio::test]
async fn edit_opened_before_payment_does_not_undo_it() -> anyhow::Result<()> {
    let mut fx = fixture(dec!(300))?;
    let invoice = fx
        .book
        .commit_draft(&draft_for(&fx.customer, &fx.product, dec!(2))?, at(2024, 2, 10)?, now())
        .await?;
    let products = InMemoryProductRepository::with_products([fx.product.clone()]);
    let mut edit = InvoiceDraft::from_invoice(&invoice, fx.customer.clone(), |id| products.lookup(id))?;

    fx.machine.mark_paid(&mut fx.book, invoice.id_typed()).await?;
    edit.set_quantity(0, dec!(3))?;
    let saved = fx.book.commit_draft(&edit, invoice.date(), now()).await?;

    assert_eq!(saved.status(), InvoiceStatus::Paid);
    assert_eq!(saved.created_at(), invoice.created_at());
    assert_eq!(saved.sub_total(), dec!(3600));
    assert_eq!(fx.invoices.get_by_id(invoice.id_typed()).await?.status(), InvoiceStatus::Paid);

    let again = fx.machine.mark_paid(&mut fx.book, invoice.id_typed()).await?;
    assert_eq!(again, StatusTransition::Unchanged(InvoiceStatus::Paid));
    assert_eq!(fx.customers.adjustments.load(Ordering::SeqCst), 1);
    let customer = fx.customers.read(fx.customer.id_typed()).await?;
    assert_eq!(customer.previous_balance(), Decimal::ZERO);
    Ok(())
}

#[tokio::test]
async fn stale_book_does_not_settle_twice() -> anyhow::Result<()> {
    let mut fx = fixture(dec!(300))?;
    let invoice = fx
        .book
        .commit_draft(&draft_for(&fx.customer, &fx.product, dec!(1))?, at(2024, 2, 10)?, now())
        .await?;
    let mut stale = InvoiceBook::new(fx.invoices.clone(), InvoiceNumberSequence::default());
    stale.load().await?;

    fx.machine.mark_paid(&mut fx.book, invoice.id_typed()).await?;
    assert_eq!(stale.get(invoice.id_typed()).map(Invoice::status), Some(InvoiceStatus::Pending));

    let again = fx.machine.mark_paid(&mut stale, invoice.id_typed()).await?;

    assert_eq!(again, StatusTransition::Unchanged(InvoiceStatus::Paid));
    assert_eq!(fx.customers.adjustments.load(Ordering::SeqCst), 1);
    assert_eq!(stale.get(invoice.id_typed()).map(Invoice::status), Some(InvoiceStatus::Paid));
    Ok(())
}

#[tokio::test]
async fn replace_cannot_move_a_paid_invoice_back() -> anyhow::Result<()> {
    let mut fx = fixture(dec!(300))?;
    let pending = fx
        .book
        .commit_draft(&draft_for(&fx.customer, &fx.product, dec!(1))?, at(2024, 2, 10)?, now())
        .await?;
    fx.machine.mark_paid(&mut fx.book, pending.id_typed()).await?;

    let err = fx.book.replace(pending.id_typed(), pending.clone()).await.unwrap_err();

    assert!(matches!(err, BillingError::Domain(_)));
    assert_eq!(fx.invoices.get_by_id(pending.id_typed()).await?.status(), InvoiceStatus::Paid);
    assert_eq!(fx.book.get(pending.id_typed()).map(Invoice::status), Some(InvoiceStatus::Paid));
    Ok(())
}

#[tokio::test]
async fn reconciliation_failure_is_reported_after_commit() -> anyhow::Result<()> {
    let mut fx = fixture(dec!(100))?;
    let invoice = fx
        .book
        .commit_draft(&draft_for(&fx.customer, &fx.product, dec!(1))?, at(2024, 2, 10)?, now())
        .await?;

    // Ledger no longer knows the customer.
    let machine = InvoiceStatusMachine::new(CustomerBalanceReconciler::new(InMemoryCustomerRepository::new()));
    let err = machine.mark_paid(&mut fx.book, invoice.id_typed()).await.unwrap_err();

    assert!(matches!(err, BillingError::Reconciliation { .. }));
    assert_eq!(fx.book.get(invoice.id_typed()).map(Invoice::status), Some(InvoiceStatus::Paid));
    Ok(())
}

#[tokio::test]
async fn drafts_get_sequential_numbers_and_edits_replace() -> anyhow::Result<()> {
    let mut fx = fixture(Decimal::ZERO)?;
    let first = fx
        .book
        .commit_draft(&draft_for(&fx.customer, &fx.product, dec!(1))?, at(2024, 2, 10)?, now())
        .await?;
    let second = fx
        .book
        .commit_draft(&draft_for(&fx.customer, &fx.product, dec!(3))?, at(2024, 2, 11)?, now())
        .await?;
    assert_eq!(first.invoice_number(), "INV-00001");
    assert_eq!(second.invoice_number(), "INV-00002");

    let products = InMemoryProductRepository::with_products([fx.product.clone()]);
    let mut reopened = InvoiceDraft::from_invoice(&first, fx.customer.clone(), |id| products.lookup(id))?;
    reopened.set_quantity(0, dec!(5))?;
    let edited = fx.book.commit_draft(&reopened, first.date(), now()).await?;

    assert_eq!(edited.id_typed(), first.id_typed());
    assert_eq!(edited.invoice_number(), "INV-00001");
    assert_eq!(edited.sub_total(), dec!(6000));
    assert_eq!(fx.book.invoices().len(), 2);
    assert_eq!(fx.book.invoices()[0].invoice_number(), "INV-00002");
    assert_eq!(products.search_by_name("ECLAIR").await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn failed_create_leaves_book_unchanged() -> anyhow::Result<()> {
    let mut fx = fixture(Decimal::ZERO)?;
    fx.book
        .commit_draft(&draft_for(&fx.customer, &fx.product, dec!(1))?, at(2024, 2, 10)?, now())
        .await?;

    let clash = draft_for(&fx.customer, &fx.product, dec!(2))?.finalize("INV-00001", at(2024, 2, 12)?, now())?;
    let err = fx.book.create(clash).await.unwrap_err();

    assert!(matches!(err, BillingError::Repository(RepositoryError::Conflict(_))));
    assert_eq!(fx.book.invoices().len(), 1);

    fx.invoices.fail_writes.store(true, Ordering::SeqCst);
    let id = fx.book.invoices()[0].id_typed();
    assert!(fx.book.remove(id).await.is_err());
    assert_eq!(fx.book.invoices().len(), 1);
    Ok(())
}

#[tokio::test]
async fn load_and_queries_pass_through_repository() -> anyhow::Result<()> {
    let mut fx = fixture(Decimal::ZERO)?;
    for (day, qty) in [(5, dec!(1)), (10, dec!(2)), (20, dec!(3))] {
        fx.book
            .commit_draft(&draft_for(&fx.customer, &fx.product, qty)?, at(2024, 2, day)?, now())
            .await?;
    }

    let mut fresh = InvoiceBook::new(fx.invoices.clone(), InvoiceNumberSequence::default());
    assert_eq!(fresh.load().await?.len(), 3);
    assert_eq!(fresh.invoices()[0].date(), at(2024, 2, 20)?);

    assert_eq!(fresh.search("candy").await?.len(), 3);
    assert_eq!(fresh.search("INV-00002").await?.len(), 1);
    assert_eq!(fresh.for_customer(fx.customer.id_typed()).await?.len(), 3);
    assert_eq!(fresh.in_date_range(at(2024, 2, 6)?, at(2024, 2, 20)?).await?.len(), 2);
    Ok(())
}

#[tokio::test]
async fn monthly_report_only_includes_the_month() -> anyhow::Result<()> {
    let mut fx = fixture(Decimal::ZERO)?;
    for date in [at(2024, 1, 5)?, at(2024, 2, 10)?, at(2024, 3, 1)?] {
        fx.book.commit_draft(&draft_for(&fx.customer, &fx.product, dec!(1))?, date, now()).await?;
    }
    let as_of = NaiveDate::from_ymd_opt(2024, 2, 15).ok_or_else(|| anyhow::anyhow!("date"))?;

    let report = fx
        .book
        .report(&ReportPaginator::default(), DateFilter::Month, as_of, ReportMode::Short);

    assert_eq!(report.record_count(), 1);
    assert_eq!(report.pages[0].entries[0].date, at(2024, 2, 10)?);
    assert_eq!(report.summary.total_amount, dec!(1200));
    Ok(())
}

/// Gateway with no printers that records exports.
#[derive(Default)]
struct ExportOnlyGateway {
    exports: AtomicUsize,
}

#[async_trait::async_trait]
impl PrintExportGateway for ExportOnlyGateway {
    async fn detect_printers(&self) -> ReportResult<PrinterDiscovery> {
        Ok(PrinterDiscovery::default())
    }

    async fn render_to_pdf(&self, _html: &str, metadata: &ExportMetadata) -> ReportResult<PathBuf> {
        self.exports.fetch_add(1, Ordering::SeqCst);
        Ok(PathBuf::from("/reports").join(&metadata.file_name))
    }

    async fn send_to_printer(&self, _html: &str) -> ReportResult<()> {
        Ok(())
    }

    async fn open_printer_settings(&self) -> ReportResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn report_without_printer_is_exported() -> anyhow::Result<()> {
    let mut fx = fixture(Decimal::ZERO)?;
    fx.book
        .commit_draft(&draft_for(&fx.customer, &fx.product, dec!(2))?, at(2024, 2, 10)?, now())
        .await?;
    let config = BillingConfig::default();
    let as_of = NaiveDate::from_ymd_opt(2024, 2, 15).ok_or_else(|| anyhow::anyhow!("date"))?;

    let report = fx.book.report(
        &ReportPaginator::new(config.report_page_size),
        DateFilter::All,
        as_of,
        config.default_report_mode,
    );
    let document = render_document(&report, &config.report_context(DateFilter::All.label(as_of), as_of))?;
    let dispatcher = ReportDispatcher::new(ExportOnlyGateway::default());

    let outcome = dispatcher.print_or_export(&document, &CancellationToken::new()).await?;

    assert!(matches!(outcome, DispatchOutcome::Completed(Delivery::Exported(_))));
    assert_eq!(dispatcher.gateway().exports.load(Ordering::SeqCst), 1);
    assert!(document.html.contains("Page 1 of 1"));
    Ok(())
}
