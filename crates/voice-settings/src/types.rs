use serde::{Deserialize, Serialize};

pub const DEFAULT_VOICE: &str = "male";
pub const DEFAULT_SPEECH_RATE: f32 = 0.9;
pub const DEFAULT_SPEECH_PITCH: f32 = 1.0;
/// Rate and pitch accepted from the admin UI; values outside are clamped.
pub const SPEECH_RATE_RANGE: (f32, f32) = (0.1, 10.0);
pub const SPEECH_PITCH_RANGE: (f32, f32) = (0.1, 2.0);
pub const DEFAULT_LANGUAGE: &str = "en";
/// Number of announcement boxes a display can play per call.
pub const MAX_BOXES: usize = 2;

/// Tenant voice profile used for one announcement batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSettings {
    pub voice_identity: String,
    pub speech_rate: f32,
    pub speech_pitch: f32,
    /// Box order: index 0 is Box 1.
    pub languages: Vec<String>,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            voice_identity: DEFAULT_VOICE.to_string(),
            speech_rate: DEFAULT_SPEECH_RATE,
            speech_pitch: DEFAULT_SPEECH_PITCH,
            languages: vec![DEFAULT_LANGUAGE.to_string()],
        }
    }
}

impl VoiceSettings {
    /// Enforce the invariants the sequencer relies on: non-empty voice,
    /// finite rate and pitch inside their ranges, 1..=MAX_BOXES languages.
    pub fn normalized(mut self) -> Self {
        if self.voice_identity.trim().is_empty() {
            self.voice_identity = DEFAULT_VOICE.to_string();
        } else {
            self.voice_identity = self.voice_identity.trim().to_string();
        }
        if !self.speech_rate.is_finite() || self.speech_rate <= 0.0 {
            self.speech_rate = DEFAULT_SPEECH_RATE;
        }
        self.speech_rate = self
            .speech_rate
            .clamp(SPEECH_RATE_RANGE.0, SPEECH_RATE_RANGE.1);
        if !self.speech_pitch.is_finite() || self.speech_pitch <= 0.0 {
            self.speech_pitch = DEFAULT_SPEECH_PITCH;
        }
        self.speech_pitch = self
            .speech_pitch
            .clamp(SPEECH_PITCH_RANGE.0, SPEECH_PITCH_RANGE.1);
        self.languages = self
            .languages
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .take(MAX_BOXES)
            .collect();
        if self.languages.is_empty() {
            self.languages.push(DEFAULT_LANGUAGE.to_string());
        }
        self
    }
}

/// Body of `GET /voice-settings`. The admin UI may leave any field unset.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSettingsResponse {
    pub voice_identity: Option<String>,
    pub speech_rate: Option<f32>,
    pub speech_pitch: Option<f32>,
    #[serde(default)]
    pub languages: Option<Vec<String>>,
}

impl From<VoiceSettingsResponse> for VoiceSettings {
    fn from(resp: VoiceSettingsResponse) -> Self {
        VoiceSettings {
            voice_identity: resp.voice_identity.unwrap_or_default(),
            speech_rate: resp.speech_rate.unwrap_or(DEFAULT_SPEECH_RATE),
            speech_pitch: resp.speech_pitch.unwrap_or(DEFAULT_SPEECH_PITCH),
            languages: resp.languages.unwrap_or_default(),
        }
        .normalized()
    }
}

/// Where the settings used for a batch came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsOrigin {
    Fresh,
    Cached,
    Default,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSettings {
    pub settings: VoiceSettings,
    pub origin: SettingsOrigin,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_fills_defaults() {
        let s = VoiceSettings {
            voice_identity: "  ".into(),
            speech_rate: f32::NAN,
            speech_pitch: 0.0,
            languages: vec![" ".into()],
        }
        .normalized();
        assert_eq!(s, VoiceSettings::default());
    }

    #[test]
    fn extreme_rate_and_pitch_are_clamped() {
        let s = VoiceSettings {
            speech_rate: 0.0001,
            speech_pitch: 50.0,
            ..Default::default()
        }
        .normalized();
        assert_eq!(s.speech_rate, SPEECH_RATE_RANGE.0);
        assert_eq!(s.speech_pitch, SPEECH_PITCH_RANGE.1);

        let fast = VoiceSettings {
            speech_rate: 1e30,
            ..Default::default()
        }
        .normalized();
        assert_eq!(fast.speech_rate, SPEECH_RATE_RANGE.1);
    }

    #[test]
    fn languages_capped_at_two_boxes() {
        let s = VoiceSettings {
            languages: vec!["en".into(), "ar-ae".into(), "fr".into()],
            ..Default::default()
        }
        .normalized();
        assert_eq!(s.languages, vec!["en", "ar-ae"]);
    }

    #[test]
    fn partial_response_is_completed() {
        let resp: VoiceSettingsResponse =
            serde_json::from_str(r#"{"voiceIdentity":"female","languages":["ar","en"]}"#)
                .unwrap();
        let s = VoiceSettings::from(resp);
        assert_eq!(s.voice_identity, "female");
        assert_eq!(s.speech_rate, DEFAULT_SPEECH_RATE);
        assert_eq!(s.speech_pitch, DEFAULT_SPEECH_PITCH);
        assert_eq!(s.languages, vec!["ar", "en"]);
    }
}
