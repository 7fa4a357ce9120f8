//! Ticket-bound CFDI request
//!
//! Contact data only; the folio is fixed when the flow is opened from a
//! looked-up ticket. After a success the caller reloads the ticket so the
//! new CFDI state shows up.

use std::sync::Arc;

use parking_lot::Mutex;
use shared::SolicitudCfdi;

use super::facturacion::acknowledge;
use super::{SubmitPhase, non_blank};
use crate::http::PortalApi;

pub const EMAIL_REQUIRED: &str = "El correo electrónico es requerido";
pub const SOLICITUD_SENT: &str =
    "Su solicitud de CFDI ha sido recibida. Le notificaremos por email cuando esté lista.";
pub const SOLICITUD_FAILED: &str = "Error al solicitar CFDI. Intente nuevamente.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolicitudFields {
    pub email: String,
    pub telefono: String,
    pub nota: String,
}

impl SolicitudFields {
    fn to_request(&self, folio: &str) -> Option<SolicitudCfdi> {
        Some(SolicitudCfdi {
            folio: folio.to_string(),
            cliente_email: non_blank(&self.email)?,
            cliente_telefono: non_blank(&self.telefono),
            nota_cliente: non_blank(&self.nota),
        })
    }
}

pub struct SolicitudFlow {
    api: Arc<dyn PortalApi>,
    folio: String,
    fields: Mutex<SolicitudFields>,
    phase: Mutex<SubmitPhase>,
}

impl SolicitudFlow {
    pub fn new(api: Arc<dyn PortalApi>, folio: impl Into<String>) -> Self {
        Self {
            api,
            folio: folio.into(),
            fields: Mutex::new(SolicitudFields::default()),
            phase: Mutex::new(SubmitPhase::Idle),
        }
    }

    pub fn folio(&self) -> &str {
        &self.folio
    }

    pub fn fields(&self) -> SolicitudFields {
        self.fields.lock().clone()
    }

    pub fn set_fields(&self, fields: SolicitudFields) {
        *self.fields.lock() = fields;
    }

    pub fn phase(&self) -> SubmitPhase {
        self.phase.lock().clone()
    }

    pub async fn submit(&self) -> SubmitPhase {
        let request = {
            let mut phase = self.phase.lock();
            if phase.is_submitting() {
                return phase.clone();
            }
            let Some(request) = self.fields.lock().to_request(&self.folio) else {
                *phase = SubmitPhase::Error(EMAIL_REQUIRED.to_string());
                return phase.clone();
            };
            *phase = SubmitPhase::Submitting;
            request
        };

        tracing::info!(folio = %self.folio, "Requesting CFDI");
        let next = match acknowledge(
            self.api.request_cfdi(&request).await,
            SOLICITUD_SENT,
            SOLICITUD_FAILED,
        ) {
            Ok(_) => {
                tracing::info!(folio = %self.folio, "CFDI request received");
                SubmitPhase::Success(SOLICITUD_SENT.to_string())
            }
            Err(message) => {
                tracing::warn!(folio = %self.folio, %message, "CFDI request failed");
                SubmitPhase::Error(message)
            }
        };
        *self.phase.lock() = next.clone();
        next
    }
}
