use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use billdesk_core::{CustomerId, ProductId};
use billdesk_invoicing::InvoiceDraft;
use billdesk_parties::{ContactInfo, Customer, NewCustomer};
use billdesk_products::{NewProduct, PackUnit, PriceSide, Product, PurchasePrices};
use billdesk_reporting::{
    DateFilter, ReportContext, ReportEntry, ReportMode, ReportPaginator, ReportTheme, render_html,
};
use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;

fn catalog() -> anyhow::Result<Vec<Product>> {
    (1..=8u32)
        .map(|n| {
            Product::create(
                ProductId::new(),
                NewProduct {
                    name: format!("Candy #{n}"),
                    unit_price: Decimal::from(n),
                    pieces_per_box: 12,
                    boxes_per_master: 20,
                    box_price_override: None,
                    master_price_override: None,
                    purchase: PurchasePrices::default(),
                },
            )
            .map_err(anyhow::Error::from)
        })
        .collect()
}

fn sample_entries(count: usize) -> anyhow::Result<Vec<ReportEntry>> {
    let products = catalog()?;
    let customer = Customer::register(
        CustomerId::new(),
        NewCustomer {
            code: "C-0001".to_string(),
            name: "Bench Traders".to_string(),
            contact: ContactInfo::default(),
            opening_balance: Decimal::from(500),
        },
    )?;
    let start = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .ok_or_else(|| anyhow::anyhow!("bad start date"))?;

    let mut entries = Vec::with_capacity(count);
    for i in 0..count {
        let mut draft = InvoiceDraft::new(PriceSide::Sale);
        draft.select_customer(customer.clone());
        for (j, unit) in PackUnit::ALL.iter().enumerate() {
            let idx = draft.add_product_line(products[(i + j) % products.len()].clone(), *unit)?;
            draft.set_quantity(idx, Decimal::from((i % 5 + 1) as u64))?;
        }
        let invoice = draft.finalize(
            format!("INV-{:05}", i + 1),
            start + Duration::hours((i * 7) as i64),
            Utc::now(),
        )?;
        entries.push(ReportEntry::from_invoice(&invoice));
    }
    Ok(entries)
}

fn bench_report_generation(c: &mut Criterion) {
    let as_of = NaiveDate::from_ymd_opt(2024, 6, 30).expect("valid date");
    let ctx = ReportContext {
        organization_name: "Bench Traders".to_string(),
        label: DateFilter::Year.label(as_of),
        generated_on: as_of,
        theme: ReportTheme::default(),
    };
    let paginator = ReportPaginator::default();

    let mut group = c.benchmark_group("report_generation");
    for count in [100usize, 1_000, 5_000] {
        let entries = sample_entries(count).expect("bench data");
        group.throughput(Throughput::Elements(count as u64));

        for mode in [ReportMode::Normal, ReportMode::Short] {
            group.bench_with_input(
                BenchmarkId::new(format!("{mode:?}"), count),
                &entries,
                |b, entries| {
                    b.iter(|| {
                        let report = paginator.paginate(
                            black_box(entries.clone()),
                            DateFilter::Year,
                            as_of,
                            mode,
                        );
                        black_box(render_html(&report, &ctx))
                    })
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_report_generation);
criterion_main!(benches);
