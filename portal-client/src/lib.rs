//! Portal Client - customer invoicing portal over the portal HTTP API
//!
//! Provides the network client, CFDI status presentation and the
//! customer-facing flows (ticket lookup, fiscal-data autocomplete, CFDI
//! requests and downloads).

pub mod artifact;
pub mod config;
pub mod error;
pub mod flows;
pub mod http;
pub mod status;

pub use artifact::{Artifact, ArtifactKind};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::{NetworkPortalClient, PortalApi};
pub use status::{CfdiView, Tone};

pub use flows::{
    DownloadActions, FacturacionDraft, FacturacionFlow, FiscalAutocomplete, LookupPhase,
    SolicitudFields, SolicitudFlow, SubmitPhase, TicketLookup,
};

// Re-export shared types for convenience
pub use shared::{CfdiStatus, FiscalData, PortalResponse, Venta};
