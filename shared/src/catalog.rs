//! SAT catalogs offered by the invoicing form

/// Catalog entry: SAT code plus display label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub code: &'static str,
    pub label: &'static str,
}

impl std::fmt::Display for CatalogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.code, self.label)
    }
}

/// Uso de CFDI offered by default
pub const DEFAULT_USO_CFDI: &str = "G01";

/// Régimen fiscal offered by default
pub const DEFAULT_REGIMEN_FISCAL: &str = "601";

pub const USOS_CFDI: &[CatalogEntry] = &[
    CatalogEntry { code: "G01", label: "Adquisición de mercancías" },
    CatalogEntry { code: "G02", label: "Devoluciones, descuentos o bonificaciones" },
    CatalogEntry { code: "G03", label: "Gastos en general" },
    CatalogEntry { code: "I01", label: "Construcciones" },
    CatalogEntry { code: "I02", label: "Mobiliario y equipo de oficina" },
    CatalogEntry { code: "I03", label: "Equipo de transporte" },
    CatalogEntry { code: "I04", label: "Equipo de cómputo" },
];

pub const REGIMENES_FISCALES: &[CatalogEntry] = &[
    CatalogEntry { code: "601", label: "General de Ley Personas Morales" },
    CatalogEntry { code: "612", label: "Personas Físicas Actividades Empresariales" },
    CatalogEntry { code: "613", label: "Personas Físicas Actividades Agrícolas" },
    CatalogEntry { code: "614", label: "Personas Físicas sin Actividad Empresarial" },
    CatalogEntry { code: "615", label: "Régimen Simplificado de Confianza" },
];

fn find(catalog: &'static [CatalogEntry], code: &str) -> Option<&'static CatalogEntry> {
    let code = code.trim();
    catalog.iter().find(|e| e.code.eq_ignore_ascii_case(code))
}

/// Look up a Uso de CFDI by code
pub fn uso_cfdi(code: &str) -> Option<&'static CatalogEntry> {
    find(USOS_CFDI, code)
}

/// Look up a Régimen fiscal by code
pub fn regimen_fiscal(code: &str) -> Option<&'static CatalogEntry> {
    find(REGIMENES_FISCALES, code)
}
