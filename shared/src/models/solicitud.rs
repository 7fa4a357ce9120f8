//! CFDI request payloads and acknowledgements

use serde::{Deserialize, Serialize};

/// Simple request bound to a looked-up ticket: contact data only, the tax
/// data is captured by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolicitudCfdi {
    pub folio: String,
    pub cliente_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cliente_telefono: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nota_cliente: Option<String>,
}

/// Full invoicing request with the customer's tax identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacturacionRequest {
    pub folio: String,
    pub rfc: String,
    pub razon_social: String,
    pub uso_cfdi: String,
    pub regimen_fiscal: String,
    pub email: String,
}

/// Partial tax identity known for a ticket, used for autocomplete
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiscalData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rfc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub razon_social: Option<String>,
}

/// Acknowledgement of an accepted request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitAck {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_solicitud_omits_absent_optionals() {
        let req = SolicitudCfdi {
            folio: "T-1".into(),
            cliente_email: "a@b.com".into(),
            cliente_telefono: None,
            nota_cliente: Some("Uso G03".into()),
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"folio": "T-1", "clienteEmail": "a@b.com", "notaCliente": "Uso G03"})
        );
    }

    #[test]
    fn test_facturacion_wire_names() {
        let req = FacturacionRequest {
            folio: "T-1".into(),
            rfc: "XAXX010101000".into(),
            razon_social: "Acme".into(),
            uso_cfdi: "G01".into(),
            regimen_fiscal: "601".into(),
            email: "a@b.com".into(),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["razonSocial"], "Acme");
        assert_eq!(value["usoCfdi"], "G01");
        assert_eq!(value["regimenFiscal"], "601");
    }

    #[test]
    fn test_fiscal_data_partial() {
        let data: FiscalData = serde_json::from_value(json!({"rfc": "XAXX010101000"})).unwrap();
        assert_eq!(data.rfc.as_deref(), Some("XAXX010101000"));
        assert_eq!(data.razon_social, None);
    }
}
