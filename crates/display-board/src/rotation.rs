use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

pub const DEFAULT_SLIDE_INTERVAL: Duration = Duration::from_secs(8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// A promotional item shown beside the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub kind: MediaKind,
    pub source: String,
    /// Overrides the rotation interval for this item, e.g. a video's length.
    #[serde(default, with = "opt_millis")]
    pub duration_ms: Option<Duration>,
}

/// Cycles media items independently of announcements.
#[derive(Debug, Clone)]
pub struct ContentRotation {
    items: Vec<MediaItem>,
    interval: Duration,
    index: usize,
}

impl ContentRotation {
    pub fn new(items: Vec<MediaItem>, interval: Duration) -> Self {
        Self {
            items,
            interval,
            index: 0,
        }
    }

    pub fn current(&self) -> Option<&MediaItem> {
        self.items.get(self.index)
    }

    /// How long the current item stays up.
    pub fn dwell(&self) -> Duration {
        self.current()
            .and_then(|item| item.duration_ms)
            .unwrap_or(self.interval)
    }

    /// Move to the next item, wrapping around.
    pub fn advance(&mut self) -> Option<&MediaItem> {
        if self.items.is_empty() {
            return None;
        }
        self.index = (self.index + 1) % self.items.len();
        self.current()
    }

    /// Publish the current item, then rotate until every receiver is gone.
    pub async fn run(mut self, tx: watch::Sender<Option<MediaItem>>) {
        if tx.send(self.current().cloned()).is_err() || self.items.len() < 2 {
            return;
        }
        loop {
            tokio::time::sleep(self.dwell()).await;
            let next = self.advance().cloned();
            if let Some(item) = &next {
                debug!(source = %item.source, "rotating media");
            }
            if tx.send(next).is_err() {
                break;
            }
        }
    }
}

mod opt_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_some(&(d.as_millis() as u64)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(d)?.map(Duration::from_millis))
    }
}
