//! Printing and PDF export of rendered reports.
//!
//! The host shell provides the actual printer and PDF plumbing through
//! [`PrintExportGateway`]. Every call races a [`CancellationToken`]: when the
//! user dismisses the dialog the call resolves to [`DispatchOutcome::Dismissed`]
//! and whatever the gateway produces afterwards is dropped.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::{ReportError, ReportResult};
use crate::render::ReportDocument;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PrinterDiscovery {
    pub has_printers: bool,
    pub default_printer: Option<String>,
    pub printers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub title: String,
    pub file_name: String,
    pub page_count: usize,
}

impl ExportMetadata {
    pub fn for_document(document: &ReportDocument) -> Self {
        let slug: String = document
            .title
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
            .collect();
        let slug = slug
            .split('-')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("-");
        Self {
            title: document.title.clone(),
            file_name: format!("{slug}.pdf"),
            page_count: document.page_count,
        }
    }
}

#[async_trait::async_trait]
pub trait PrintExportGateway: Send + Sync {
    async fn detect_printers(&self) -> ReportResult<PrinterDiscovery>;

    /// Write a PDF of `html` and return where it was saved.
    async fn render_to_pdf(&self, html: &str, metadata: &ExportMetadata) -> ReportResult<PathBuf>;

    async fn send_to_printer(&self, html: &str) -> ReportResult<()>;

    async fn open_printer_settings(&self) -> ReportResult<()>;
}

#[async_trait::async_trait]
impl<G> PrintExportGateway for Arc<G>
where
    G: PrintExportGateway + ?Sized,
{
    async fn detect_printers(&self) -> ReportResult<PrinterDiscovery> {
        (**self).detect_printers().await
    }

    async fn render_to_pdf(&self, html: &str, metadata: &ExportMetadata) -> ReportResult<PathBuf> {
        (**self).render_to_pdf(html, metadata).await
    }

    async fn send_to_printer(&self, html: &str) -> ReportResult<()> {
        (**self).send_to_printer(html).await
    }

    async fn open_printer_settings(&self) -> ReportResult<()> {
        (**self).open_printer_settings().await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome<T> {
    Completed(T),
    /// The user closed the dialog before the gateway answered.
    Dismissed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Printed,
    Exported(PathBuf),
}

pub struct ReportDispatcher<G> {
    gateway: G,
}

impl<G: PrintExportGateway> ReportDispatcher<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Print the document.
    ///
    /// Printers are detected first; with none available this fails with
    /// [`ReportError::PrinterUnavailable`] and nothing is sent.
    pub async fn print(
        &self,
        document: &ReportDocument,
        cancel: &CancellationToken,
    ) -> ReportResult<DispatchOutcome<()>> {
        let discovery = match guarded(cancel, self.gateway.detect_printers()).await? {
            DispatchOutcome::Completed(discovery) => discovery,
            DispatchOutcome::Dismissed => return Ok(DispatchOutcome::Dismissed),
        };
        if !discovery.has_printers || discovery.printers.is_empty() {
            tracing::warn!(title = %document.title, "no printer available");
            return Err(ReportError::PrinterUnavailable);
        }

        let outcome = guarded(cancel, self.gateway.send_to_printer(&document.html)).await?;
        if outcome == DispatchOutcome::Completed(()) {
            tracing::info!(
                title = %document.title,
                printer = discovery.default_printer.as_deref().unwrap_or("default"),
                pages = document.page_count,
                "report sent to printer"
            );
        }
        Ok(outcome)
    }

    pub async fn export_pdf(
        &self,
        document: &ReportDocument,
        cancel: &CancellationToken,
    ) -> ReportResult<DispatchOutcome<PathBuf>> {
        let metadata = ExportMetadata::for_document(document);
        let outcome = guarded(cancel, self.gateway.render_to_pdf(&document.html, &metadata)).await?;
        if let DispatchOutcome::Completed(path) = &outcome {
            tracing::info!(title = %document.title, path = %path.display(), "report exported to pdf");
        }
        Ok(outcome)
    }

    /// Print, falling back to PDF export when no printer is available.
    pub async fn print_or_export(
        &self,
        document: &ReportDocument,
        cancel: &CancellationToken,
    ) -> ReportResult<DispatchOutcome<Delivery>> {
        match self.print(document, cancel).await {
            Ok(DispatchOutcome::Completed(())) => Ok(DispatchOutcome::Completed(Delivery::Printed)),
            Ok(DispatchOutcome::Dismissed) => Ok(DispatchOutcome::Dismissed),
            Err(ReportError::PrinterUnavailable) => {
                let outcome = self.export_pdf(document, cancel).await?;
                Ok(match outcome {
                    DispatchOutcome::Completed(path) => DispatchOutcome::Completed(Delivery::Exported(path)),
                    DispatchOutcome::Dismissed => DispatchOutcome::Dismissed,
                })
            }
            Err(err) => Err(err),
        }
    }

    pub async fn open_printer_settings(&self, cancel: &CancellationToken) -> ReportResult<DispatchOutcome<()>> {
        guarded(cancel, self.gateway.open_printer_settings()).await
    }
}

async fn guarded<T>(
    cancel: &CancellationToken,
    call: impl Future<Output = ReportResult<T>>,
) -> ReportResult<DispatchOutcome<T>> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::debug!("report dialog dismissed; discarding result");
            Ok(DispatchOutcome::Dismissed)
        }
        result = call => result.map(DispatchOutcome::Completed),
    }
}
