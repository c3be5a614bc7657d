use announce_sequencer::SequencerConfig;
use anyhow::{bail, Context, Result};
use audio_playback::{PlaybackWatchdog, PlayerKind, MAX_VOLUME};
use display_board::MediaItem;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnouncerConfig {
    /// Backend root, e.g. `https://queue.example.com/api`.
    pub base_url: String,
    pub tenant_id: String,
    pub api_token: Option<String>,
    pub http_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub broadcast: BroadcastConfig,
    pub last_call_path: Option<PathBuf>,
    pub settings_cache_path: Option<PathBuf>,
    pub player: PlayerConfig,
    pub sequencer: TimingConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BroadcastConfig {
    /// UDP address to receive call notices on. Disabled when unset.
    pub listen: Option<SocketAddr>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub kind: PlayerKind,
    pub program: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub settle_delay_ms: u64,
    pub inter_language_pause_ms: u64,
    pub volume: f32,
    pub playback_buffer_ms: u64,
    pub clip_estimate_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub rows: usize,
    /// Caption languages on the board, independent of the spoken boxes.
    pub languages: Vec<String>,
    pub slide_interval_ms: u64,
    pub media: Vec<MediaItem>,
}

impl Default for AnnouncerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080/api".to_string(),
            tenant_id: "default".to_string(),
            api_token: None,
            http_timeout_ms: 5_000,
            poll_interval_ms: 2_000,
            broadcast: BroadcastConfig::default(),
            last_call_path: Some(PathBuf::from("state/last-call.json")),
            settings_cache_path: Some(PathBuf::from("state/voice-settings.json")),
            player: PlayerConfig::default(),
            sequencer: TimingConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            kind: PlayerKind::Mpv,
            program: None,
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 500,
            inter_language_pause_ms: 200,
            volume: MAX_VOLUME,
            playback_buffer_ms: 2_000,
            clip_estimate_ms: 15_000,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            rows: display_board::DEFAULT_BOARD_ROWS,
            languages: vec!["en".to_string()],
            slide_interval_ms: display_board::DEFAULT_SLIDE_INTERVAL.as_millis() as u64,
            media: Vec::new(),
        }
    }
}

impl AnnouncerConfig {
    /// Read the YAML file, or write and return the defaults if it is missing.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_yaml::from_str(&contents)
                .with_context(|| format!("parsing config {}", path.display()))
        } else {
            let config = Self::default();
            config.save(path)?;
            Ok(config)
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml).with_context(|| format!("writing config {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            bail!("base_url must not be empty");
        }
        if self.tenant_id.trim().is_empty() {
            bail!("tenant_id must not be empty");
        }
        if self.poll_interval_ms == 0 {
            bail!("poll_interval_ms must be greater than zero");
        }
        if self.http_timeout_ms == 0 {
            bail!("http_timeout_ms must be greater than zero");
        }
        if !(0.0..=1.0).contains(&self.sequencer.volume) {
            bail!("sequencer.volume must be within 0.0..=1.0");
        }
        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn sequencer_config(&self) -> SequencerConfig {
        let t = &self.sequencer;
        SequencerConfig {
            settle_delay: Duration::from_millis(t.settle_delay_ms),
            inter_language_pause: Duration::from_millis(t.inter_language_pause_ms),
            volume: t.volume,
            watchdog: PlaybackWatchdog::new(
                Duration::from_millis(t.playback_buffer_ms),
                Duration::from_millis(t.clip_estimate_ms),
            ),
        }
    }
}
