#![allow(dead_code)]

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use portal_client::{Artifact, ArtifactKind, ClientError, ClientResult, PortalApi};
use serde_json::json;
use shared::{
    CfdiStatusRecord, FacturacionRequest, FiscalData, PortalResponse, SolicitudCfdi, SubmitAck,
    Venta,
};

/// In-memory portal backend recording every call
#[derive(Default)]
pub struct StubPortal {
    pub calls: Mutex<Vec<String>>,
    /// `None` simulates a transport failure
    pub ticket: Mutex<Option<PortalResponse<Venta>>>,
    pub fiscal: Mutex<HashMap<String, FiscalData>>,
    pub fiscal_latency: Duration,
    pub cfdi_status: Mutex<Option<CfdiStatusRecord>>,
    /// `None` simulates a transport failure
    pub submit_reply: Mutex<Option<PortalResponse<SubmitAck>>>,
    pub submitted: Mutex<Vec<FacturacionRequest>>,
    pub solicitudes: Mutex<Vec<SolicitudCfdi>>,
    /// Kinds missing from the map fail with a 404
    pub documents: Mutex<HashMap<ArtifactKind, Vec<u8>>>,
    pub download_latency: Duration,
}

impl StubPortal {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }
}

fn offline() -> ClientError {
    ClientError::InvalidResponse("connection refused".into())
}

#[async_trait]
impl PortalApi for StubPortal {
    async fn get_ticket(&self, folio: &str) -> ClientResult<PortalResponse<Venta>> {
        self.record(format!("ticket:{folio}"));
        self.ticket.lock().clone().ok_or_else(offline)
    }

    async fn get_ticket_fiscal_data(&self, folio: &str) -> ClientResult<PortalResponse<FiscalData>> {
        self.record(format!("fiscal:{folio}"));
        if !self.fiscal_latency.is_zero() {
            tokio::time::sleep(self.fiscal_latency).await;
        }
        Ok(match self.fiscal.lock().get(folio) {
            Some(data) => PortalResponse::ok(data.clone()),
            None => PortalResponse::failure("Sin datos fiscales"),
        })
    }

    async fn get_cfdi_status(&self, folio: &str) -> ClientResult<PortalResponse<CfdiStatusRecord>> {
        self.record(format!("cfdi:{folio}"));
        Ok(match self.cfdi_status.lock().clone() {
            Some(record) => PortalResponse::ok(record),
            None => PortalResponse::failure("No se encontró el ticket"),
        })
    }

    async fn request_cfdi(&self, request: &SolicitudCfdi) -> ClientResult<PortalResponse<SubmitAck>> {
        self.record(format!("solicitud:{}", request.folio));
        self.solicitudes.lock().push(request.clone());
        self.submit_reply.lock().clone().ok_or_else(offline)
    }

    async fn submit_facturacion_request(
        &self,
        request: &FacturacionRequest,
    ) -> ClientResult<PortalResponse<SubmitAck>> {
        self.record(format!("facturacion:{}", request.folio));
        self.submitted.lock().push(request.clone());
        self.submit_reply.lock().clone().ok_or_else(offline)
    }

    async fn download(&self, folio: &str, kind: ArtifactKind) -> ClientResult<Artifact> {
        self.record(format!("download:{folio}:{kind}"));
        if !self.download_latency.is_zero() {
            tokio::time::sleep(self.download_latency).await;
        }
        let bytes = self
            .documents
            .lock()
            .get(&kind)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("{kind} no disponible")))?;
        Ok(Artifact {
            kind,
            file_name: kind.default_file_name(folio),
            content_type: kind.default_content_type().to_string(),
            bytes,
        })
    }
}

pub fn fiscal(rfc: &str, razon_social: &str) -> FiscalData {
    FiscalData {
        rfc: Some(rfc.into()),
        razon_social: Some(razon_social.into()),
    }
}

pub fn venta_json(folio: &str, cfdi_estatus: &str) -> serde_json::Value {
    json!({
        "id": 7,
        "folio": folio,
        "clienteNombre": "Público en General",
        "fecha": "2024-05-10T14:30:00-06:00",
        "sucursal": "Centro",
        "subtotal": 100.0,
        "impuestos": 16.0,
        "descuentoTotal": 0.0,
        "total": 116.0,
        "metodoPago": "Efectivo",
        "estatus": "Pagado",
        "requiereFactura": true,
        "cfdiEstatus": cfdi_estatus,
        "items": [{
            "sku": "CAF-001",
            "nombre": "Café molido 500g",
            "cantidad": 2.0,
            "unidad": "pza",
            "precioUnitario": 50.0,
            "subtotal": 100.0,
            "impuestoMonto": 16.0,
            "total": 116.0
        }]
    })
}

pub fn venta(folio: &str, cfdi_estatus: &str) -> Venta {
    serde_json::from_value(venta_json(folio, cfdi_estatus)).unwrap()
}
