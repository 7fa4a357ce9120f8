//! Shared types for the invoicing portal
//!
//! Wire models of the portal API, the response envelope, SAT catalogs and
//! the advisory field validators used by every front end.

pub mod catalog;
pub mod models;
pub mod response;
pub mod validation;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use models::{
    CfdiStatus, CfdiStatusRecord, FacturacionRequest, FiscalData, SolicitudCfdi, SubmitAck,
    TotalsError, UltimaSolicitud, Venta, VentaItem,
};
pub use response::PortalResponse;
