//! Data models
//!
//! Wire types of the portal API. JSON field names are camelCase.

pub mod cfdi;
pub mod solicitud;
pub mod venta;

// Re-exports
pub use cfdi::*;
pub use solicitud::*;
pub use venta::*;
