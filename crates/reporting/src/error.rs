use thiserror::Error;

pub type ReportResult<T> = Result<T, ReportError>;

/// Report delivery error.
///
/// Malformed invoice records are not errors here: they degrade to empty
/// entries when the report input is built.
#[derive(Debug, Error)]
pub enum ReportError {
    /// No printer is installed or reachable. Exporting to PDF still works.
    #[error("no printer is available")]
    PrinterUnavailable,

    #[error("print/export gateway failed: {0}")]
    Gateway(String),

    #[error("report template failed to render: {0}")]
    Template(#[from] askama::Error),
}

impl ReportError {
    pub fn gateway(msg: impl Into<String>) -> Self {
        Self::Gateway(msg.into())
    }
}
