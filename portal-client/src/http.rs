//! HTTP client for the portal API
//!
//! [`PortalApi`] is the single access point the flows depend on; it is handed
//! to each flow at construction (`Arc<dyn PortalApi>`), so tests can swap in
//! a stub. [`NetworkPortalClient`] is the reqwest implementation.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};
use serde::de::DeserializeOwned;
use shared::{
    CfdiStatusRecord, FacturacionRequest, FiscalData, PortalResponse, SolicitudCfdi, SubmitAck,
    Venta,
};
use urlencoding::encode;

use crate::artifact::{Artifact, ArtifactKind, file_name_from_disposition};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Shown when the backend answers 404 without an envelope
pub const TICKET_NOT_FOUND: &str = "No se encontró el ticket. Verifique el número.";

/// Shown when a request endpoint answers 404 without an envelope
pub const SERVICE_UNAVAILABLE: &str =
    "El servicio de solicitudes no está disponible. Intente más tarde.";

/// Remote operations of the invoicing portal.
///
/// JSON operations return the backend envelope as `Ok` for both outcomes;
/// `Err` is reserved for transport and decoding failures.
#[async_trait]
pub trait PortalApi: Send + Sync {
    /// Exact lookup of a ticket by folio
    async fn get_ticket(&self, folio: &str) -> ClientResult<PortalResponse<Venta>>;

    /// Best-effort tax identity known for a folio
    async fn get_ticket_fiscal_data(&self, folio: &str)
    -> ClientResult<PortalResponse<FiscalData>>;

    /// Current CFDI status of a ticket
    async fn get_cfdi_status(&self, folio: &str) -> ClientResult<PortalResponse<CfdiStatusRecord>>;

    /// Ticket-bound request with contact data only
    async fn request_cfdi(&self, request: &SolicitudCfdi) -> ClientResult<PortalResponse<SubmitAck>>;

    /// Full invoicing request with tax data
    async fn submit_facturacion_request(
        &self,
        request: &FacturacionRequest,
    ) -> ClientResult<PortalResponse<SubmitAck>>;

    /// Fetch one of the ticket's documents
    async fn download(&self, folio: &str, kind: ArtifactKind) -> ClientResult<Artifact>;
}

/// Network portal client
#[derive(Debug, Clone)]
pub struct NetworkPortalClient {
    client: Client,
    base_url: String,
}

impl NetworkPortalClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "base URL must start with http:// or https://, got {:?}",
                config.base_url
            )));
        }
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;
        Ok(Self { client, base_url })
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn ticket_url(&self, folio: &str, suffix: &str) -> String {
        let mut url = format!("{}/api/portal/tickets/{}", self.base_url, encode(folio));
        if !suffix.is_empty() {
            url.push('/');
            url.push_str(suffix);
        }
        url
    }

    async fn get_envelope<T: DeserializeOwned>(
        &self,
        url: &str,
        not_found: &str,
    ) -> ClientResult<PortalResponse<T>> {
        tracing::debug!(%url, "GET");
        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;
        Self::handle_envelope(response, not_found).await
    }

    async fn post_envelope<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        url: &str,
        body: &B,
        not_found: &str,
    ) -> ClientResult<PortalResponse<T>> {
        tracing::debug!(%url, "POST");
        let response = self
            .client
            .post(url)
            .header(header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await?;
        Self::handle_envelope(response, not_found).await
    }

    /// Decode the envelope, folding envelope-less 4xx answers into a failed
    /// envelope and 5xx answers into [`ClientError::Server`].
    async fn handle_envelope<T: DeserializeOwned>(
        response: reqwest::Response,
        not_found: &str,
    ) -> ClientResult<PortalResponse<T>> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            return serde_json::from_str(&text).map_err(Into::into);
        }

        // Business failures may come with any status; keep the server's message.
        if let Ok(envelope) = serde_json::from_str::<PortalResponse<T>>(&text) {
            return Ok(envelope);
        }

        if status.is_client_error() {
            let message = match status {
                StatusCode::NOT_FOUND => not_found.to_string(),
                _ => plain_message(&text)
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("Solicitud inválida").to_string()),
            };
            tracing::debug!(status = status.as_u16(), %message, "Request rejected");
            return Ok(PortalResponse::failure(message));
        }

        Err(ClientError::Server {
            status: status.as_u16(),
            message: plain_message(&text).unwrap_or_default(),
        })
    }
}

/// A short plain-text body is worth showing; HTML error pages are not.
fn plain_message(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() || text.len() > 300 || text.starts_with('<') {
        return None;
    }
    Some(text.to_string())
}

#[async_trait]
impl PortalApi for NetworkPortalClient {
    async fn get_ticket(&self, folio: &str) -> ClientResult<PortalResponse<Venta>> {
        self.get_envelope(&self.ticket_url(folio, ""), TICKET_NOT_FOUND).await
    }

    async fn get_ticket_fiscal_data(
        &self,
        folio: &str,
    ) -> ClientResult<PortalResponse<FiscalData>> {
        self.get_envelope(
            &self.ticket_url(folio, "datos-fiscales"),
            "Sin datos fiscales para el ticket",
        )
        .await
    }

    async fn get_cfdi_status(&self, folio: &str) -> ClientResult<PortalResponse<CfdiStatusRecord>> {
        self.get_envelope(&self.ticket_url(folio, "cfdi"), TICKET_NOT_FOUND).await
    }

    async fn request_cfdi(&self, request: &SolicitudCfdi) -> ClientResult<PortalResponse<SubmitAck>> {
        let url = format!("{}/api/portal/cfdi/solicitudes", self.base_url);
        self.post_envelope(&url, request, SERVICE_UNAVAILABLE).await
    }

    async fn submit_facturacion_request(
        &self,
        request: &FacturacionRequest,
    ) -> ClientResult<PortalResponse<SubmitAck>> {
        let url = format!("{}/api/portal/facturacion", self.base_url);
        self.post_envelope(&url, request, SERVICE_UNAVAILABLE).await
    }

    async fn download(&self, folio: &str, kind: ArtifactKind) -> ClientResult<Artifact> {
        let url = self.ticket_url(folio, kind.path_suffix());
        tracing::debug!(%url, %kind, "GET document");
        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await?;
            let message = serde_json::from_str::<PortalResponse<serde_json::Value>>(&text)
                .ok()
                .and_then(|e| e.error_message().map(str::to_string))
                .or_else(|| plain_message(&text))
                .unwrap_or_else(|| format!("{kind} no disponible para {folio}"));
            return match status {
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(message)),
                _ => Err(ClientError::Server {
                    status: status.as_u16(),
                    message,
                }),
            };
        }

        let headers = response.headers();
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(kind.default_content_type())
            .to_string();
        let file_name = headers
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(file_name_from_disposition)
            .unwrap_or_else(|| kind.default_file_name(folio));

        // A missing document can also come back as 200 with a JSON envelope.
        if content_type.starts_with("application/json") {
            let text = response.text().await?;
            let message = serde_json::from_str::<PortalResponse<serde_json::Value>>(&text)
                .ok()
                .and_then(|e| e.error_message().map(str::to_string))
                .unwrap_or_else(|| "respuesta JSON inesperada".to_string());
            return Err(ClientError::InvalidResponse(message));
        }

        let bytes = response.bytes().await?.to_vec();
        if bytes.is_empty() {
            return Err(ClientError::InvalidResponse(format!("{kind} vacío para {folio}")));
        }

        Ok(Artifact {
            kind,
            file_name,
            content_type,
            bytes,
        })
    }
}
