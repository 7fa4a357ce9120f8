//! Ticket and CFDI downloads
//!
//! One in-flight download per kind. Kinds never block each other, so a
//! failing PDF leaves the XML button usable.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::artifact::ArtifactKind;
use crate::http::PortalApi;

/// Releases the per-kind busy flag when the download ends or is dropped
struct InFlight<'a> {
    set: &'a Mutex<HashSet<ArtifactKind>>,
    kind: ArtifactKind,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.set.lock().remove(&self.kind);
    }
}

pub struct DownloadActions {
    api: Arc<dyn PortalApi>,
    folio: String,
    dir: PathBuf,
    in_flight: Mutex<HashSet<ArtifactKind>>,
}

impl DownloadActions {
    pub fn new(api: Arc<dyn PortalApi>, folio: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            api,
            folio: folio.into(),
            dir: dir.into(),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn is_downloading(&self, kind: ArtifactKind) -> bool {
        self.in_flight.lock().contains(&kind)
    }

    /// Fetch one artifact and save it under the target directory.
    ///
    /// Fails with the user-facing message for `kind`; a second trigger for a
    /// kind that is still downloading fails the same way without a request.
    pub async fn download(&self, kind: ArtifactKind) -> Result<PathBuf, String> {
        if !self.in_flight.lock().insert(kind) {
            tracing::debug!(folio = %self.folio, %kind, "Download already in flight");
            return Err(kind.failure_message().to_string());
        }
        let _guard = InFlight { set: &self.in_flight, kind };

        let artifact = match self.api.download(&self.folio, kind).await {
            Ok(artifact) => artifact,
            Err(e) => {
                tracing::warn!(folio = %self.folio, %kind, error = %e, "Download failed");
                return Err(kind.failure_message().to_string());
            }
        };

        match artifact.save_to(&self.dir).await {
            Ok(path) => Ok(path),
            Err(e) => {
                tracing::warn!(folio = %self.folio, %kind, error = %e, "Saving download failed");
                Err(kind.failure_message().to_string())
            }
        }
    }
}
