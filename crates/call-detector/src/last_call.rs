use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use ticket_call::{AnnouncementRequest, CallEvent, CallOrigin, Error, Result};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Durable record of the most recent call.
///
/// Written by whoever publishes a call notice and read once when a display
/// starts, so a notice sent before the listener attached is not lost.
#[derive(Debug, Clone)]
pub struct LastCallStore {
    path: PathBuf,
}

impl LastCallStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is not an error.
    pub fn load(&self) -> Result<Option<AnnouncementRequest>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::DetectorTransport(format!(
                    "reading {}: {e}",
                    self.path.display()
                )))
            }
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        let call = serde_json::from_str(&raw).map_err(|e| {
            Error::DetectorTransport(format!("parsing {}: {e}", self.path.display()))
        })?;
        Ok(Some(call))
    }

    /// Replace the record. Readers never observe a partial write.
    pub fn save(&self, call: &AnnouncementRequest) -> Result<()> {
        let io_err = |e: std::io::Error| {
            Error::DetectorTransport(format!("writing {}: {e}", self.path.display()))
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let json = serde_json::to_vec_pretty(call)
            .map_err(|e| Error::DetectorTransport(format!("encoding last call: {e}")))?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;
        debug!(path = %self.path.display(), ticket = %call.ticket_number, "last call saved");
        Ok(())
    }
}

/// Submit the stored last call, if any. Returns true when one was sent.
pub async fn replay_last_call(store: &LastCallStore, events: &mpsc::Sender<CallEvent>) -> bool {
    match store.load() {
        Ok(Some(call)) => {
            info!(%call, "replaying last known call");
            events
                .send(CallEvent::new(call, CallOrigin::LastCallSnapshot))
                .await
                .is_ok()
        }
        Ok(None) => false,
        Err(e) => {
            warn!(error = %e, "last call record unreadable");
            false
        }
    }
}
