//! Downloadable documents of a ticket

use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::ClientResult;

/// Kind of binary document the portal can render for a ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Non-fiscal purchase receipt
    TicketPdf,
    /// Stamped CFDI, printable representation
    CfdiPdf,
    /// Stamped CFDI, signed XML
    CfdiXml,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [Self::TicketPdf, Self::CfdiPdf, Self::CfdiXml];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TicketPdf => "ticket-pdf",
            Self::CfdiPdf => "cfdi-pdf",
            Self::CfdiXml => "cfdi-xml",
        }
    }

    /// API path below `/api/portal/tickets/{folio}`
    pub(crate) fn path_suffix(&self) -> &'static str {
        match self {
            Self::TicketPdf => "pdf",
            Self::CfdiPdf => "cfdi/pdf",
            Self::CfdiXml => "cfdi/xml",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::TicketPdf | Self::CfdiPdf => "pdf",
            Self::CfdiXml => "xml",
        }
    }

    pub fn default_content_type(&self) -> &'static str {
        match self {
            Self::TicketPdf | Self::CfdiPdf => "application/pdf",
            Self::CfdiXml => "application/xml",
        }
    }

    /// File name used when the server does not suggest one
    pub fn default_file_name(&self, folio: &str) -> String {
        let prefix = match self {
            Self::TicketPdf => "ticket",
            Self::CfdiPdf | Self::CfdiXml => "cfdi",
        };
        format!("{}-{}.{}", prefix, sanitize_file_name(folio), self.extension())
    }

    /// Button label shown next to the download action
    pub fn label(&self) -> &'static str {
        match self {
            Self::TicketPdf => "Descargar PDF",
            Self::CfdiPdf => "Descargar PDF",
            Self::CfdiXml => "Descargar XML",
        }
    }

    /// Message shown to the user when this download fails
    pub fn failure_message(&self) -> &'static str {
        match self {
            Self::TicketPdf => "Error al descargar el ticket. Intente nuevamente.",
            Self::CfdiPdf => "Error al descargar el CFDI PDF.",
            Self::CfdiXml => "Error al descargar el CFDI XML.",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("tipo de documento desconocido: {s} (use ticket-pdf, cfdi-pdf o cfdi-xml)"))
    }
}

/// A downloaded document held in memory until saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Artifact {
    /// Write the document into `dir`, returning the full path
    pub async fn save_to(&self, dir: &Path) -> ClientResult<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(&self.file_name);
        tokio::fs::write(&path, &self.bytes).await?;
        tracing::info!(path = %path.display(), bytes = self.bytes.len(), "Saved {}", self.kind);
        Ok(path)
    }
}

/// Keep a server- or folio-derived name inside the target directory
pub(crate) fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() { "documento".to_string() } else { cleaned.to_string() }
}

/// Extract `filename="..."` from a Content-Disposition header value
pub(crate) fn file_name_from_disposition(value: &str) -> Option<String> {
    value.split(';').map(str::trim).find_map(|part| {
        let (key, raw) = part.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("filename") {
            return None;
        }
        let name = raw.trim().trim_matches('"');
        (!name.is_empty()).then(|| sanitize_file_name(name))
    })
}
