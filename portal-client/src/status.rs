//! CFDI status presentation
//!
//! Maps a [`CfdiStatus`] to what the customer sees. The mapping is pure;
//! downloads offered by a view only happen when the user triggers them
//! through [`DownloadActions`](crate::flows::DownloadActions).

use shared::CfdiStatus;

use crate::artifact::ArtifactKind;

/// Estimated stamping turnaround shown while a request is pending
pub const TURNAROUND: &str = "24-48 horas";

const STAMPED_DOWNLOADS: [ArtifactKind; 2] = [ArtifactKind::CfdiPdf, ArtifactKind::CfdiXml];

/// Visual tone of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Pending,
    Success,
    Danger,
    Neutral,
}

/// What to render for a ticket's CFDI state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CfdiView {
    /// Nothing requested yet: no notice, the request form is the call to action
    Hidden,
    /// Request received, stamping pending
    InProgress,
    /// Stamped; the UUID is shown verbatim when known
    Available { uuid: Option<String> },
    /// Stamping failed; the customer is sent to support
    Failed,
    /// Status code outside the known set
    Unknown,
}

impl CfdiView {
    pub fn render(status: &CfdiStatus) -> Self {
        match status {
            CfdiStatus::SinSolicitar => Self::Hidden,
            CfdiStatus::Solicitado { .. } => Self::InProgress,
            CfdiStatus::Timbrado { uuid, .. } => Self::Available { uuid: uuid.clone() },
            CfdiStatus::Error { .. } => Self::Failed,
            CfdiStatus::Desconocido(_) => Self::Unknown,
        }
    }

    pub fn is_visible(&self) -> bool {
        !matches!(self, Self::Hidden)
    }

    pub fn tone(&self) -> Tone {
        match self {
            Self::Hidden | Self::Unknown => Tone::Neutral,
            Self::InProgress => Tone::Pending,
            Self::Available { .. } => Tone::Success,
            Self::Failed => Tone::Danger,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Hidden => "",
            Self::InProgress => "CFDI en Proceso",
            Self::Available { .. } => "CFDI Disponible",
            Self::Failed => "Error en Timbrado",
            Self::Unknown => "Estado Desconocido",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Hidden => String::new(),
            Self::InProgress => format!(
                "Su solicitud de factura está siendo procesada. Le notificaremos por email cuando esté lista. Tiempo estimado: {TURNAROUND}."
            ),
            Self::Available { .. } => "Su factura fiscal ha sido timbrada exitosamente.".to_string(),
            Self::Failed => {
                "Hubo un error al procesar su factura. Por favor contacte a soporte.".to_string()
            }
            Self::Unknown => {
                "No se pudo determinar el estado de la factura. Por favor contacte a soporte."
                    .to_string()
            }
        }
    }

    pub fn uuid(&self) -> Option<&str> {
        match self {
            Self::Available { uuid } => uuid.as_deref(),
            _ => None,
        }
    }

    /// Download actions offered with this view. Each one is independent.
    pub fn download_actions(&self) -> &'static [ArtifactKind] {
        match self {
            Self::Available { .. } => &STAMPED_DOWNLOADS,
            _ => &[],
        }
    }
}

impl From<&CfdiStatus> for CfdiView {
    fn from(status: &CfdiStatus) -> Self {
        Self::render(status)
    }
}
