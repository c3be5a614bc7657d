//! Playback through an external command-line player.

use crate::{AudioPlayer, PlaybackOptions};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use speech_synth::AudioResource;
use std::process::Stdio;
use ticket_call::{Error, Result};
use tokio::process::Command;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerKind {
    Mpv,
    Ffplay,
}

impl PlayerKind {
    pub fn default_program(self) -> &'static str {
        match self {
            PlayerKind::Mpv => "mpv",
            PlayerKind::Ffplay => "ffplay",
        }
    }
}

pub struct CommandPlayer {
    kind: PlayerKind,
    program: String,
}

impl CommandPlayer {
    pub fn new(kind: PlayerKind) -> Self {
        Self {
            kind,
            program: kind.default_program().to_string(),
        }
    }

    /// Use a specific binary instead of looking the default one up on `PATH`.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn args(&self, resource: &AudioResource, options: &PlaybackOptions) -> Vec<String> {
        let volume = (options.effective_volume() * 100.0).round() as u32;
        let rate = if options.rate.is_finite() && options.rate > 0.0 {
            options.rate
        } else {
            1.0
        };
        match self.kind {
            PlayerKind::Mpv => {
                let mut args = vec![
                    "--no-video".to_string(),
                    "--really-quiet".to_string(),
                    format!("--volume={volume}"),
                    format!("--speed={rate:.2}"),
                ];
                if options.preserve_pitch {
                    args.push("--audio-pitch-correction=yes".to_string());
                }
                args.push(resource.url.clone());
                args
            }
            PlayerKind::Ffplay => {
                let mut args = vec![
                    "-nodisp".to_string(),
                    "-autoexit".to_string(),
                    "-loglevel".to_string(),
                    "error".to_string(),
                    "-volume".to_string(),
                    volume.to_string(),
                ];
                // atempo changes speed without touching pitch; asetrate would not.
                if options.preserve_pitch && (rate - 1.0).abs() > f32::EPSILON {
                    args.push("-af".to_string());
                    args.push(format!("atempo={:.2}", rate.clamp(0.5, 2.0)));
                }
                args.push(resource.url.clone());
                args
            }
        }
    }
}

#[async_trait]
impl AudioPlayer for CommandPlayer {
    fn name(&self) -> &str {
        &self.program
    }

    async fn play(&self, resource: &AudioResource, options: &PlaybackOptions) -> Result<()> {
        let status = Command::new(&self.program)
            .args(self.args(resource, options))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| Error::PlaybackError(format!("spawning {}: {e}", self.program)))?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::PlaybackError(format!(
                "{} exited with {status}",
                self.program
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip() -> AudioResource {
        AudioResource {
            url: "http://tts.local/a.mp3?t=1".into(),
            duration: None,
            language: "en".into(),
        }
    }

    #[test]
    fn mpv_flags() {
        let player = CommandPlayer::new(PlayerKind::Mpv);
        let args = player.args(&clip(), &PlaybackOptions::new(0.9, 1.0).with_volume(1.0));
        assert!(args.contains(&"--volume=95".to_string()));
        assert!(args.contains(&"--speed=0.90".to_string()));
        assert!(args.contains(&"--audio-pitch-correction=yes".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("http://tts.local/a.mp3?t=1"));
    }

    #[test]
    fn ffplay_uses_atempo_for_rate() {
        let player = CommandPlayer::new(PlayerKind::Ffplay);
        let args = player.args(&clip(), &PlaybackOptions::new(0.9, 1.0));
        assert!(args.contains(&"-autoexit".to_string()));
        assert!(args.contains(&"atempo=0.90".to_string()));

        let normal = player.args(&clip(), &PlaybackOptions::new(1.0, 1.0));
        assert!(!normal.contains(&"-af".to_string()));
    }

    #[tokio::test]
    async fn missing_binary_is_playback_error() {
        let player = CommandPlayer::new(PlayerKind::Mpv).with_program("definitely-not-a-player-binary");
        let err = player
            .play(&clip(), &PlaybackOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::PlaybackError(_)));
    }
}
