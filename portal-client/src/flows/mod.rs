//! Customer-facing flows
//!
//! Each flow owns its own state and receives the [`PortalApi`](crate::PortalApi)
//! at construction. State sits behind a `parking_lot::Mutex` that is never
//! held across an `.await`; a call made while the same flow is already
//! waiting on the backend is ignored.

mod autocomplete;
mod downloads;
mod facturacion;
mod lookup;
mod solicitud;

pub use autocomplete::{FiscalAutocomplete, apply_fiscal_data};
pub use downloads::DownloadActions;
pub use facturacion::{
    FacturacionDraft, FacturacionFlow, INVALID_EMAIL, INVALID_RFC, MISSING_FIELDS,
    SUBMIT_FAILED, SUBMIT_SUCCEEDED,
};
pub use lookup::{EMPTY_FOLIO, LookupPhase, TicketLookup};
pub use solicitud::{EMAIL_REQUIRED, SOLICITUD_FAILED, SOLICITUD_SENT, SolicitudFields, SolicitudFlow};

/// Progress of a request submission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmitPhase {
    #[default]
    Idle,
    Submitting,
    /// Accepted; carries the confirmation shown to the user
    Success(String),
    /// Rejected or failed; carries the message shown to the user
    Error(String),
}

impl SubmitPhase {
    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting)
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success(m) | Self::Error(m) => Some(m),
            _ => None,
        }
    }
}

/// Trimmed value, `None` when blank
pub(crate) fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
