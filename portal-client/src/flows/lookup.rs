//! Ticket lookup flow
//!
//! `Idle -> Searching -> Found | Error`. A search clears the previous result
//! before the request goes out, so a stale ticket is never shown next to a
//! new folio.

use std::sync::Arc;

use parking_lot::Mutex;
use shared::{CfdiStatus, Venta};

use crate::http::{PortalApi, TICKET_NOT_FOUND};
use crate::status::CfdiView;

/// Shown when the user submits an empty folio
pub const EMPTY_FOLIO: &str = "Por favor ingrese un número de ticket";

#[derive(Debug, Clone, Default, PartialEq)]
pub enum LookupPhase {
    #[default]
    Idle,
    Searching,
    Found(Box<Venta>),
    Error(String),
}

#[derive(Debug, Default)]
struct LookupState {
    input: String,
    phase: LookupPhase,
    notice: Option<String>,
}

/// Folio search over the portal API
pub struct TicketLookup {
    api: Arc<dyn PortalApi>,
    state: Mutex<LookupState>,
}

impl TicketLookup {
    pub fn new(api: Arc<dyn PortalApi>) -> Self {
        Self {
            api,
            state: Mutex::new(LookupState::default()),
        }
    }

    /// Update the folio input. Ignored while a search is running (the input
    /// is disabled).
    pub fn set_input(&self, folio: impl Into<String>) {
        let mut state = self.state.lock();
        if !matches!(state.phase, LookupPhase::Searching) {
            state.input = folio.into();
        }
    }

    pub fn phase(&self) -> LookupPhase {
        self.state.lock().phase.clone()
    }

    /// Inline validation notice (empty folio)
    pub fn notice(&self) -> Option<String> {
        self.state.lock().notice.clone()
    }

    /// Input and search button are disabled while this is true
    pub fn is_busy(&self) -> bool {
        matches!(self.state.lock().phase, LookupPhase::Searching)
    }

    pub fn ticket(&self) -> Option<Venta> {
        match self.state.lock().phase.clone() {
            LookupPhase::Found(venta) => Some(*venta),
            _ => None,
        }
    }

    /// CFDI notice for the ticket on screen, if any
    pub fn cfdi_view(&self) -> Option<CfdiView> {
        self.ticket().map(|venta| CfdiView::render(&venta.cfdi_status()))
    }

    /// Run a search for the current input.
    ///
    /// A blank input sets the validation notice, replaces a previous error
    /// and makes no request. A call made while another search is running is
    /// ignored.
    pub async fn search(&self) -> LookupPhase {
        let folio = {
            let mut state = self.state.lock();
            if matches!(state.phase, LookupPhase::Searching) {
                tracing::debug!("Search already in flight, ignoring");
                return LookupPhase::Searching;
            }
            let folio = state.input.trim().to_string();
            if folio.is_empty() {
                // One message at a time; a ticket on screen stays
                if matches!(state.phase, LookupPhase::Error(_)) {
                    state.phase = LookupPhase::Idle;
                }
                state.notice = Some(EMPTY_FOLIO.to_string());
                return state.phase.clone();
            }
            state.notice = None;
            state.phase = LookupPhase::Searching;
            folio
        };

        tracing::debug!(%folio, "Looking up ticket");
        let outcome = match self.api.get_ticket(&folio).await {
            Ok(response) => response.into_result(TICKET_NOT_FOUND),
            Err(e) => {
                tracing::warn!(%folio, error = %e, "Ticket lookup failed");
                Err(TICKET_NOT_FOUND.to_string())
            }
        };

        let phase = match outcome {
            Ok(venta) => {
                if let Err(e) = venta.check_totals() {
                    tracing::warn!(folio = %venta.folio, "Ticket totals inconsistent: {e}");
                }
                LookupPhase::Found(Box::new(venta))
            }
            Err(message) => LookupPhase::Error(message),
        };

        self.state.lock().phase = phase.clone();
        phase
    }

    /// Close the error notice
    pub fn dismiss_error(&self) {
        let mut state = self.state.lock();
        state.notice = None;
        if matches!(state.phase, LookupPhase::Error(_)) {
            state.phase = LookupPhase::Idle;
        }
    }

    /// Re-read the CFDI status of the ticket on screen (e.g. after a request
    /// was sent) and update it in place.
    ///
    /// Returns the new status, or `None` when no ticket is shown or the
    /// status could not be fetched.
    pub async fn refresh_cfdi_status(&self) -> Option<CfdiStatus> {
        let folio = self.ticket()?.folio;

        let record = match self.api.get_cfdi_status(&folio).await {
            Ok(response) => response.into_data()?,
            Err(e) => {
                tracing::warn!(%folio, error = %e, "CFDI status refresh failed");
                return None;
            }
        };

        let mut state = self.state.lock();
        let LookupPhase::Found(venta) = &mut state.phase else {
            return None;
        };
        // Another search replaced the ticket meanwhile
        if venta.folio != folio {
            return None;
        }
        venta.cfdi_estatus = record.cfdi_estatus.clone();
        venta.cfdi_uuid = record.cfdi_uuid.clone();
        venta.cfdi_timbrado_at = record.cfdi_timbrado_at.clone();
        Some(CfdiStatus::from(record))
    }
}
