//! Fiscal-data autocomplete
//!
//! While the invoicing form is open and RFC or razón social is still blank,
//! a quiet period after the last edit triggers a lookup of the tax identity
//! known for the folio. Results only ever fill blank fields, and only if the
//! folio has not changed since the lookup was scheduled.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use shared::FiscalData;
use tokio::task::JoinHandle;

use super::facturacion::FacturacionDraft;
use super::non_blank;
use crate::http::PortalApi;

/// Scheduled lookup. Dropping it cancels the timer and any request still in
/// flight.
struct Debounce(JoinHandle<()>);

impl Drop for Debounce {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Fill the blank RFC / razón social fields of `draft` from a lookup that was
/// triggered for `triggered_by`.
///
/// Returns `false` without touching the draft when the folio in the draft no
/// longer matches, which discards late results for a superseded folio.
pub fn apply_fiscal_data(draft: &mut FacturacionDraft, triggered_by: &str, data: &FiscalData) -> bool {
    if draft.folio.trim() != triggered_by {
        return false;
    }
    let mut filled = false;
    if draft.rfc.trim().is_empty() {
        if let Some(rfc) = data.rfc.as_deref().and_then(non_blank) {
            draft.rfc = rfc;
            filled = true;
        }
    }
    if draft.razon_social.trim().is_empty() {
        if let Some(razon_social) = data.razon_social.as_deref().and_then(non_blank) {
            draft.razon_social = razon_social;
            filled = true;
        }
    }
    filled
}

/// Debounced, race-safe fiscal-data lookup bound to one draft
pub struct FiscalAutocomplete {
    api: Arc<dyn PortalApi>,
    draft: Arc<Mutex<FacturacionDraft>>,
    delay: Duration,
    active: Mutex<bool>,
    pending: Mutex<Option<Debounce>>,
}

impl FiscalAutocomplete {
    pub fn new(api: Arc<dyn PortalApi>, draft: Arc<Mutex<FacturacionDraft>>, delay: Duration) -> Self {
        Self {
            api,
            draft,
            delay,
            active: Mutex::new(false),
            pending: Mutex::new(None),
        }
    }

    /// Enable or disable lookups (the form being shown or hidden).
    /// Disabling cancels anything pending.
    pub fn set_active(&self, active: bool) {
        *self.active.lock() = active;
        if active {
            self.rearm();
        } else {
            self.cancel();
        }
    }

    pub fn is_active(&self) -> bool {
        *self.active.lock()
    }

    /// A lookup is scheduled or in flight
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|debounce| !debounce.0.is_finished())
    }

    /// Drop any scheduled or in-flight lookup
    pub fn cancel(&self) {
        self.pending.lock().take();
    }

    /// Restart the quiet period. Call after every edit of folio, RFC or
    /// razón social.
    pub fn rearm(&self) {
        let mut pending = self.pending.lock();
        pending.take();

        if !*self.active.lock() {
            return;
        }
        let folio = {
            let draft = self.draft.lock();
            if !draft.needs_fiscal_data() {
                return;
            }
            draft.folio.trim().to_string()
        };
        if folio.is_empty() {
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No Tokio runtime, fiscal-data autocomplete disabled");
            return;
        };

        let api = Arc::clone(&self.api);
        let draft = Arc::clone(&self.draft);
        let delay = self.delay;
        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            lookup_and_fill(api.as_ref(), &draft, &folio).await;
        });
        *pending = Some(Debounce(handle));
    }
}

async fn lookup_and_fill(api: &dyn PortalApi, draft: &Mutex<FacturacionDraft>, folio: &str) {
    tracing::debug!(%folio, "Fiscal-data lookup");
    let data = match api.get_ticket_fiscal_data(folio).await {
        Ok(response) => match response.into_data() {
            Some(data) => data,
            None => {
                tracing::debug!(%folio, "No fiscal data for folio");
                return;
            }
        },
        Err(e) => {
            tracing::debug!(%folio, error = %e, "Fiscal-data lookup failed");
            return;
        }
    };

    if apply_fiscal_data(&mut draft.lock(), folio, &data) {
        tracing::debug!(%folio, "Fiscal data autocompleted");
    } else {
        tracing::debug!(%folio, "Fiscal data discarded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(folio: &str, rfc: &str, razon_social: &str) -> FacturacionDraft {
        FacturacionDraft {
            folio: folio.into(),
            rfc: rfc.into(),
            razon_social: razon_social.into(),
            ..Default::default()
        }
    }

    fn data() -> FiscalData {
        FiscalData {
            rfc: Some("XAXX010101000".into()),
            razon_social: Some("Acme SA de CV".into()),
        }
    }

    #[test]
    fn test_fills_blank_fields() {
        let mut d = draft(" T-1 ", "", "  ");
        assert!(apply_fiscal_data(&mut d, "T-1", &data()));
        assert_eq!(d.rfc, "XAXX010101000");
        assert_eq!(d.razon_social, "Acme SA de CV");
    }

    #[test]
    fn test_never_overwrites_typed_rfc() {
        let mut d = draft("T-1", "GOM", "");
        assert!(apply_fiscal_data(&mut d, "T-1", &data()));
        assert_eq!(d.rfc, "GOM");
        assert_eq!(d.razon_social, "Acme SA de CV");
    }

    #[test]
    fn test_stale_folio_is_discarded() {
        let mut d = draft("B", "", "");
        assert!(!apply_fiscal_data(&mut d, "A", &data()));
        assert_eq!(d, draft("B", "", ""));
    }

    #[test]
    fn test_empty_result_fills_nothing() {
        let mut d = draft("T-1", "", "");
        assert!(!apply_fiscal_data(&mut d, "T-1", &FiscalData::default()));
        assert_eq!(d.rfc, "");
    }
}
