//! Configuration loading and representation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use billdesk_observability::{LogConfig, LogFormat};
use billdesk_reporting::{DEFAULT_PAGE_SIZE, ReportContext, ReportMode, ReportTheme};

/// Billing settings. Every field has a default, so an empty environment works.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingConfig {
    pub organization_name: String,
    pub report_page_size: usize,
    pub default_report_mode: ReportMode,
    pub invoice_prefix: String,
    pub log: LogConfig,
    pub theme: ReportTheme,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            organization_name: "BillDesk".to_string(),
            report_page_size: DEFAULT_PAGE_SIZE,
            default_report_mode: ReportMode::Normal,
            invoice_prefix: "INV-".to_string(),
            log: LogConfig::default(),
            theme: ReportTheme::default(),
        }
    }
}

impl BillingConfig {
    /// Read `BILLDESK_*` environment variables over the defaults.
    ///
    /// Unparsable values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`BillingConfig::from_env`] with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(name) = lookup("BILLDESK_ORGANIZATION_NAME").filter(|v| !v.trim().is_empty()) {
            config.organization_name = name.trim().to_string();
        }
        if let Some(prefix) = lookup("BILLDESK_INVOICE_PREFIX") {
            config.invoice_prefix = prefix.trim().to_string();
        }
        if let Some(size) = parsed::<usize>(&lookup, "BILLDESK_REPORT_PAGE_SIZE") {
            if size == 0 {
                tracing::warn!("BILLDESK_REPORT_PAGE_SIZE must be positive; keeping {}", config.report_page_size);
            } else {
                config.report_page_size = size;
            }
        }
        if let Some(mode) = parsed::<ReportMode>(&lookup, "BILLDESK_REPORT_MODE") {
            config.default_report_mode = mode;
        }
        if let Some(format) = parsed::<LogFormat>(&lookup, "BILLDESK_LOG_FORMAT") {
            config.log.format = format;
        }
        if let Some(filter) = lookup("BILLDESK_LOG_FILTER").filter(|v| !v.trim().is_empty()) {
            config.log.filter = filter;
        }

        config
    }

    /// Report boundary object for a report titled `label`, generated on `generated_on`.
    pub fn report_context(&self, label: impl Into<String>, generated_on: NaiveDate) -> ReportContext {
        ReportContext {
            organization_name: self.organization_name.clone(),
            label: label.into(),
            generated_on,
            theme: self.theme.clone(),
        }
    }
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(key, value = %raw, error = %err, "ignoring unparsable configuration value");
            None
        }
    }
}
