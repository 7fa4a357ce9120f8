//! Invoicing request form
//!
//! `Idle -> Submitting -> Success | Error`. The draft survives failures
//! untouched and is only reset once the backend accepts the request.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use shared::catalog::{DEFAULT_REGIMEN_FISCAL, DEFAULT_USO_CFDI};
use shared::validation::{is_valid_email, is_valid_rfc, normalize_rfc};
use shared::{FacturacionRequest, PortalResponse, SubmitAck};

use super::autocomplete::FiscalAutocomplete;
use super::{SubmitPhase, non_blank};
use crate::error::ClientResult;
use crate::http::PortalApi;

pub const MISSING_FIELDS: &str = "Por favor complete todos los campos requeridos";
pub const INVALID_RFC: &str = "El RFC no tiene un formato válido";
pub const INVALID_EMAIL: &str = "El correo electrónico no tiene un formato válido";
pub const SUBMIT_SUCCEEDED: &str =
    "¡Solicitud enviada correctamente! Pronto recibirás tu factura en tu correo electrónico.";
pub const SUBMIT_FAILED: &str =
    "Ocurrió un error al enviar tu solicitud. Por favor intenta nuevamente.";

/// Form fields as typed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacturacionDraft {
    pub folio: String,
    pub rfc: String,
    pub razon_social: String,
    pub uso_cfdi: String,
    pub regimen_fiscal: String,
    pub email: String,
}

impl Default for FacturacionDraft {
    fn default() -> Self {
        Self {
            folio: String::new(),
            rfc: String::new(),
            razon_social: String::new(),
            uso_cfdi: DEFAULT_USO_CFDI.to_string(),
            regimen_fiscal: DEFAULT_REGIMEN_FISCAL.to_string(),
            email: String::new(),
        }
    }
}

impl FacturacionDraft {
    /// RFC or razón social is still blank
    pub fn needs_fiscal_data(&self) -> bool {
        self.rfc.trim().is_empty() || self.razon_social.trim().is_empty()
    }

    /// Inline warning for a present but malformed RFC
    pub fn rfc_warning(&self) -> Option<&'static str> {
        let rfc = self.rfc.trim();
        (!rfc.is_empty() && !is_valid_rfc(rfc)).then_some(INVALID_RFC)
    }

    /// Inline warning for a present but malformed email
    pub fn email_warning(&self) -> Option<&'static str> {
        let email = self.email.trim();
        (!email.is_empty() && !is_valid_email(email)).then_some(INVALID_EMAIL)
    }

    /// Client-side checks run before any request goes out
    pub fn validate(&self) -> Result<(), &'static str> {
        let required = [
            &self.folio,
            &self.rfc,
            &self.razon_social,
            &self.uso_cfdi,
            &self.regimen_fiscal,
            &self.email,
        ];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(MISSING_FIELDS);
        }
        if let Some(warning) = self.rfc_warning().or_else(|| self.email_warning()) {
            return Err(warning);
        }
        Ok(())
    }

    /// Trimmed request with the RFC upper-cased
    pub fn to_request(&self) -> FacturacionRequest {
        FacturacionRequest {
            folio: self.folio.trim().to_string(),
            rfc: normalize_rfc(&self.rfc),
            razon_social: self.razon_social.trim().to_string(),
            uso_cfdi: self.uso_cfdi.trim().to_string(),
            regimen_fiscal: self.regimen_fiscal.trim().to_string(),
            email: self.email.trim().to_string(),
        }
    }
}

/// The "Solicitar CFDI" form with its autocomplete
pub struct FacturacionFlow {
    api: Arc<dyn PortalApi>,
    draft: Arc<Mutex<FacturacionDraft>>,
    phase: Mutex<SubmitPhase>,
    autocomplete: FiscalAutocomplete,
}

impl FacturacionFlow {
    pub fn new(api: Arc<dyn PortalApi>, autocomplete_delay: Duration) -> Self {
        let draft = Arc::new(Mutex::new(FacturacionDraft::default()));
        let autocomplete =
            FiscalAutocomplete::new(Arc::clone(&api), Arc::clone(&draft), autocomplete_delay);
        Self {
            api,
            draft,
            phase: Mutex::new(SubmitPhase::Idle),
            autocomplete,
        }
    }

    /// The form became visible. Clears a stale outcome notice and allows
    /// autocomplete.
    pub fn activate(&self) {
        {
            let mut phase = self.phase.lock();
            if matches!(*phase, SubmitPhase::Error(_)) {
                *phase = SubmitPhase::Idle;
            }
        }
        self.autocomplete.set_active(true);
    }

    /// The form was hidden. Pending autocomplete is cancelled.
    pub fn deactivate(&self) {
        self.autocomplete.set_active(false);
    }

    pub fn draft(&self) -> FacturacionDraft {
        self.draft.lock().clone()
    }

    pub fn phase(&self) -> SubmitPhase {
        self.phase.lock().clone()
    }

    pub fn autocomplete(&self) -> &FiscalAutocomplete {
        &self.autocomplete
    }

    pub fn set_folio(&self, folio: impl Into<String>) {
        self.draft.lock().folio = folio.into();
        self.autocomplete.rearm();
    }

    /// RFC is upper-cased as typed
    pub fn set_rfc(&self, rfc: impl AsRef<str>) {
        self.draft.lock().rfc = rfc.as_ref().to_uppercase();
        self.autocomplete.rearm();
    }

    pub fn set_razon_social(&self, razon_social: impl Into<String>) {
        self.draft.lock().razon_social = razon_social.into();
        self.autocomplete.rearm();
    }

    pub fn set_uso_cfdi(&self, uso_cfdi: impl Into<String>) {
        self.draft.lock().uso_cfdi = uso_cfdi.into();
    }

    pub fn set_regimen_fiscal(&self, regimen_fiscal: impl Into<String>) {
        self.draft.lock().regimen_fiscal = regimen_fiscal.into();
    }

    pub fn set_email(&self, email: impl Into<String>) {
        self.draft.lock().email = email.into();
    }

    /// Whether the submit button is enabled
    pub fn can_submit(&self) -> bool {
        !self.phase.lock().is_submitting() && self.draft.lock().validate().is_ok()
    }

    /// Validate, normalize and send the draft.
    pub async fn submit(&self) -> SubmitPhase {
        let request = {
            let mut phase = self.phase.lock();
            if phase.is_submitting() {
                tracing::debug!("Submission already in flight, ignoring");
                return phase.clone();
            }
            let draft = self.draft.lock().clone();
            if let Err(message) = draft.validate() {
                *phase = SubmitPhase::Error(message.to_string());
                return phase.clone();
            }
            *phase = SubmitPhase::Submitting;
            draft.to_request()
        };

        tracing::info!(folio = %request.folio, rfc = %request.rfc, "Submitting CFDI request");
        let outcome = acknowledge(
            self.api.submit_facturacion_request(&request).await,
            SUBMIT_SUCCEEDED,
            SUBMIT_FAILED,
        );

        let next = match outcome {
            Ok(message) => {
                tracing::info!(folio = %request.folio, "CFDI request accepted");
                self.autocomplete.cancel();
                *self.draft.lock() = FacturacionDraft::default();
                SubmitPhase::Success(message)
            }
            Err(message) => {
                tracing::warn!(folio = %request.folio, %message, "CFDI request rejected");
                SubmitPhase::Error(message)
            }
        };
        *self.phase.lock() = next.clone();
        next
    }

    /// "Enviar otra solicitud": back to an empty form after a success
    pub fn start_new_request(&self) {
        let mut phase = self.phase.lock();
        if matches!(*phase, SubmitPhase::Success(_)) {
            *phase = SubmitPhase::Idle;
            *self.draft.lock() = FacturacionDraft::default();
        }
    }
}

/// Fold a submission result into the message shown to the user
pub(super) fn acknowledge(
    result: ClientResult<PortalResponse<SubmitAck>>,
    success_default: &str,
    failure_default: &str,
) -> Result<String, String> {
    match result {
        Ok(response) if response.success => Ok(response
            .data
            .and_then(|ack| ack.message)
            .as_deref()
            .and_then(non_blank)
            .unwrap_or_else(|| success_default.to_string())),
        Ok(response) => Err(response
            .error_message()
            .map(str::to_string)
            .unwrap_or_else(|| failure_default.to_string())),
        Err(e) => {
            tracing::warn!(error = %e, "Request submission failed");
            Err(failure_default.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;

    fn filled() -> FacturacionDraft {
        FacturacionDraft {
            folio: " T-1 ".into(),
            rfc: "xaxx010101000 ".into(),
            razon_social: " Acme ".into(),
            email: " a@b.com".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_initial_shape() {
        let draft = FacturacionDraft::default();
        assert_eq!(draft.uso_cfdi, "G01");
        assert_eq!(draft.regimen_fiscal, "601");
        assert!(draft.folio.is_empty() && draft.rfc.is_empty() && draft.email.is_empty());
        assert!(draft.needs_fiscal_data());
    }

    #[test]
    fn test_validate_missing_fields() {
        let mut draft = filled();
        draft.razon_social = "   ".into();
        assert_eq!(draft.validate(), Err(MISSING_FIELDS));
    }

    #[test]
    fn test_validate_present_but_invalid() {
        let mut draft = filled();
        draft.rfc = "ABC".into();
        assert_eq!(draft.rfc_warning(), Some(INVALID_RFC));
        assert_eq!(draft.validate(), Err(INVALID_RFC));

        let mut draft = filled();
        draft.email = "a@b".into();
        assert_eq!(draft.email_warning(), Some(INVALID_EMAIL));
        assert_eq!(draft.validate(), Err(INVALID_EMAIL));
    }

    #[test]
    fn test_to_request_normalizes() {
        let draft = filled();
        assert_eq!(draft.validate(), Ok(()));
        let request = draft.to_request();
        assert_eq!(request.folio, "T-1");
        assert_eq!(request.rfc, "XAXX010101000");
        assert_eq!(request.razon_social, "Acme");
        assert_eq!(request.email, "a@b.com");
        assert_eq!(request.uso_cfdi, "G01");
    }

    #[test]
    fn test_acknowledge_messages() {
        let ok = PortalResponse::ok(SubmitAck { message: Some("ok".into()) });
        assert_eq!(acknowledge(Ok(ok), "default", "fail"), Ok("ok".to_string()));

        let bare = PortalResponse { success: true, data: None, error: None };
        assert_eq!(acknowledge(Ok(bare), "default", "fail"), Ok("default".to_string()));

        let rejected = PortalResponse::failure("RFC inválido");
        assert_eq!(acknowledge(Ok(rejected), "default", "fail"), Err("RFC inválido".to_string()));

        let transport = Err(ClientError::InvalidResponse("boom".into()));
        assert_eq!(acknowledge(transport, "default", "fail"), Err("fail".to_string()));
    }
}
