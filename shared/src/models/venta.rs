//! Venta (purchase ticket) Model

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::cfdi::{CfdiStatus, lenient_estatus};

/// Ticket totals invariant violation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TotalsError {
    #[error("{field} is negative ({value})")]
    Negative { field: &'static str, value: Decimal },

    #[error("total {total} != subtotal {subtotal} - descuento {descuento} + impuestos {impuestos}")]
    TicketTotal {
        total: Decimal,
        subtotal: Decimal,
        descuento: Decimal,
        impuestos: Decimal,
    },

    #[error("item {sku}: total {total} != subtotal {subtotal} + impuesto {impuesto}")]
    ItemTotal {
        sku: String,
        total: Decimal,
        subtotal: Decimal,
        impuesto: Decimal,
    },
}

fn non_negative(field: &'static str, value: Decimal) -> Result<(), TotalsError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(TotalsError::Negative { field, value });
    }
    Ok(())
}

/// Ticket line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VentaItem {
    pub sku: String,
    pub nombre: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub cantidad: Decimal,
    pub unidad: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub precio_unitario: Decimal,
    #[serde(default, with = "rust_decimal::serde::float_option", skip_serializing_if = "Option::is_none")]
    pub descuento: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub impuesto_monto: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

impl VentaItem {
    /// Verify `total = subtotal + impuestoMonto` and non-negative amounts
    pub fn check_totals(&self) -> Result<(), TotalsError> {
        non_negative("precioUnitario", self.precio_unitario)?;
        non_negative("descuento", self.descuento.unwrap_or_default())?;
        non_negative("subtotal", self.subtotal)?;
        non_negative("impuestoMonto", self.impuesto_monto)?;
        non_negative("total", self.total)?;
        if self.subtotal + self.impuesto_monto != self.total {
            return Err(TotalsError::ItemTotal {
                sku: self.sku.clone(),
                total: self.total,
                subtotal: self.subtotal,
                impuesto: self.impuesto_monto,
            });
        }
        Ok(())
    }
}

/// Purchase ticket as served by the portal backend.
///
/// Read-only on this side: the backend creates it at the point of sale and
/// owns every later change, including the CFDI sub-state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Venta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub folio: String,
    pub cliente_nombre: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cliente_rfc: Option<String>,
    /// ISO-8601 timestamp of the sale
    pub fecha: String,
    pub sucursal: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub impuestos: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub descuento_total: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub metodo_pago: String,
    /// Payment status, e.g. `Pagado`
    pub estatus: String,
    #[serde(default)]
    pub requiere_factura: bool,
    #[serde(default, deserialize_with = "lenient_estatus")]
    pub cfdi_estatus: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cfdi_uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cfdi_timbrado_at: Option<String>,
    #[serde(default)]
    pub items: Vec<VentaItem>,
}

impl Venta {
    /// Typed CFDI lifecycle state of this ticket
    pub fn cfdi_status(&self) -> CfdiStatus {
        CfdiStatus::from_parts(
            &self.cfdi_estatus,
            self.cfdi_uuid.clone(),
            self.cfdi_timbrado_at.clone(),
            None,
            None,
        )
    }

    pub fn is_paid(&self) -> bool {
        self.estatus == "Pagado"
    }

    /// Sale date, if the backend sent a parseable RFC 3339 timestamp
    pub fn fecha_parsed(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.fecha).ok()
    }

    /// Verify `total = subtotal - descuentoTotal + impuestos`, non-negative
    /// amounts, and every line item.
    pub fn check_totals(&self) -> Result<(), TotalsError> {
        non_negative("subtotal", self.subtotal)?;
        non_negative("impuestos", self.impuestos)?;
        non_negative("descuentoTotal", self.descuento_total)?;
        non_negative("total", self.total)?;
        if self.subtotal - self.descuento_total + self.impuestos != self.total {
            return Err(TotalsError::TicketTotal {
                total: self.total,
                subtotal: self.subtotal,
                descuento: self.descuento_total,
                impuestos: self.impuestos,
            });
        }
        self.items.iter().try_for_each(VentaItem::check_totals)
    }
}
