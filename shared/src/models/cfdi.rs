//! CFDI lifecycle model
//!
//! The backend reports the CFDI state of a ticket as a flat record with a
//! status code plus fields that are only meaningful in some states.
//! [`CfdiStatus`] folds that record into one variant per state.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// Wire codes of the closed status set
pub const ESTATUS_SIN_SOLICITAR: &str = "sin_solicitar";
pub const ESTATUS_SOLICITADO: &str = "solicitado";
pub const ESTATUS_TIMBRADO: &str = "timbrado";
pub const ESTATUS_ERROR: &str = "error";

/// Decode a status code, mapping null or non-string values to an empty code.
/// Combined with `#[serde(default)]` a missing field decodes the same way, so
/// the ticket still loads and renders as an unknown state.
pub(crate) fn lenient_estatus<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Code(String),
        Other(IgnoredAny),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Code(code)) => code,
        Some(Raw::Other(_)) | None => String::new(),
    })
}

/// Latest CFDI request recorded for a ticket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UltimaSolicitud {
    pub estatus_solicitud: String,
    pub created_at: String,
}

/// CFDI status record as returned by the status endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfdiStatusRecord {
    #[serde(default, deserialize_with = "lenient_estatus")]
    pub cfdi_estatus: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cfdi_uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cfdi_timbrado_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cfdi_error_msg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ultima_solicitud: Option<UltimaSolicitud>,
}

/// CFDI lifecycle state.
///
/// `SinSolicitar -> Solicitado -> (Timbrado | Error)`. `Timbrado` is terminal.
/// Any code outside the closed set is kept verbatim in `Desconocido`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CfdiStatus {
    SinSolicitar,
    Solicitado {
        ultima_solicitud: Option<UltimaSolicitud>,
    },
    Timbrado {
        uuid: Option<String>,
        timbrado_at: Option<String>,
    },
    Error {
        mensaje: Option<String>,
    },
    Desconocido(String),
}

impl CfdiStatus {
    /// Build the typed state from the flat wire fields.
    ///
    /// Fields that do not belong to the resolved state are dropped.
    pub fn from_parts(
        estatus: &str,
        uuid: Option<String>,
        timbrado_at: Option<String>,
        error_msg: Option<String>,
        ultima_solicitud: Option<UltimaSolicitud>,
    ) -> Self {
        match estatus {
            ESTATUS_SIN_SOLICITAR => Self::SinSolicitar,
            ESTATUS_SOLICITADO => Self::Solicitado { ultima_solicitud },
            ESTATUS_TIMBRADO => Self::Timbrado {
                uuid: uuid.filter(|u| !u.trim().is_empty()),
                timbrado_at,
            },
            ESTATUS_ERROR => Self::Error {
                mensaje: error_msg.filter(|m| !m.trim().is_empty()),
            },
            other => Self::Desconocido(other.to_string()),
        }
    }

    /// Wire code of this state
    pub fn code(&self) -> &str {
        match self {
            Self::SinSolicitar => ESTATUS_SIN_SOLICITAR,
            Self::Solicitado { .. } => ESTATUS_SOLICITADO,
            Self::Timbrado { .. } => ESTATUS_TIMBRADO,
            Self::Error { .. } => ESTATUS_ERROR,
            Self::Desconocido(raw) => raw,
        }
    }

    /// No further transition is expected from this state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Timbrado { .. } | Self::Error { .. })
    }

    /// A CFDI request can still be made for this ticket
    pub fn can_request(&self) -> bool {
        matches!(self, Self::SinSolicitar)
    }
}

impl From<CfdiStatusRecord> for CfdiStatus {
    fn from(record: CfdiStatusRecord) -> Self {
        Self::from_parts(
            &record.cfdi_estatus,
            record.cfdi_uuid,
            record.cfdi_timbrado_at,
            record.cfdi_error_msg,
            record.ultima_solicitud,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> CfdiStatus {
        serde_json::from_value::<CfdiStatusRecord>(value).unwrap().into()
    }

    #[test]
    fn test_closed_set() {
        assert_eq!(record(json!({"cfdiEstatus": "sin_solicitar"})), CfdiStatus::SinSolicitar);
        assert_eq!(
            record(json!({
                "cfdiEstatus": "solicitado",
                "ultimaSolicitud": {"estatusSolicitud": "pendiente", "createdAt": "2024-05-10T10:00:00Z"}
            })),
            CfdiStatus::Solicitado {
                ultima_solicitud: Some(UltimaSolicitud {
                    estatus_solicitud: "pendiente".into(),
                    created_at: "2024-05-10T10:00:00Z".into(),
                })
            }
        );
        assert_eq!(
            record(json!({"cfdiEstatus": "error", "cfdiErrorMsg": "RFC no registrado"})),
            CfdiStatus::Error { mensaje: Some("RFC no registrado".into()) }
        );
    }

    #[test]
    fn test_fields_of_other_states_are_dropped() {
        let status = record(json!({
            "cfdiEstatus": "solicitado",
            "cfdiUuid": "ABC-123",
            "cfdiErrorMsg": "stale"
        }));
        assert_eq!(status, CfdiStatus::Solicitado { ultima_solicitud: None });
    }

    #[test]
    fn test_unknown_code_is_preserved() {
        let status = record(json!({"cfdiEstatus": "cancelado"}));
        assert_eq!(status, CfdiStatus::Desconocido("cancelado".into()));
        assert_eq!(status.code(), "cancelado");
        assert!(!status.is_terminal());
        assert!(!status.can_request());
    }

    #[test]
    fn test_missing_or_null_code_is_unknown() {
        for value in [
            json!({}),
            json!({"cfdiEstatus": null}),
            json!({"cfdiEstatus": 3}),
        ] {
            let status = record(value);
            assert_eq!(status, CfdiStatus::Desconocido(String::new()));
            assert!(!status.can_request());
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(CfdiStatus::Timbrado { uuid: None, timbrado_at: None }.is_terminal());
        assert!(CfdiStatus::Error { mensaje: None }.is_terminal());
        assert!(!CfdiStatus::SinSolicitar.is_terminal());
        assert!(CfdiStatus::SinSolicitar.can_request());
    }

    #[test]
    fn test_blank_uuid_is_absent() {
        let status = record(json!({"cfdiEstatus": "timbrado", "cfdiUuid": "  "}));
        assert_eq!(status, CfdiStatus::Timbrado { uuid: None, timbrado_at: None });
    }
}
