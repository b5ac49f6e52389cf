use serde::{Deserialize, Serialize};

use super::error::CaptureError;

/// Amplification steps offered to the user, in dB.
pub const AMPLIFICATION_STEPS_DB: [u8; 7] = [0, 3, 6, 9, 12, 15, 18];

/// Per-microphone user settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MicProfile {
    /// Device name as reported by device enumeration.
    pub name: String,

    /// Gain in dB. 0 disables amplification.
    #[serde(default)]
    pub amplification: u8,

    /// Latency between playback and the mic picking up the singer, in ms.
    #[serde(default)]
    pub delay_in_millis: i32,

    #[serde(default = "default_enabled")]
    pub is_enabled: bool,

    /// Percent. Stored for pitch-analysis consumers; the recorder ignores it.
    #[serde(default)]
    pub noise_suppression: u8,
}

fn default_enabled() -> bool {
    true
}

impl MicProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amplification: 0,
            delay_in_millis: 0,
            is_enabled: true,
            noise_suppression: 0,
        }
    }

    pub fn with_amplification(mut self, amplification_db: u8) -> Self {
        self.amplification = amplification_db;
        self
    }

    pub fn with_delay_in_millis(mut self, delay_in_millis: i32) -> Self {
        self.delay_in_millis = delay_in_millis;
        self
    }

    /// Whether the profile names a device at all. Whitespace is a valid name.
    pub fn has_device_name(&self) -> bool {
        !self.name.is_empty()
    }

    /// Integer gain applied to new samples.
    ///
    /// Returns `0` for 0 dB, which the recorder treats as "skip amplification".
    pub fn amplification_multiplier(&self) -> i32 {
        if self.amplification == 0 {
            return 0;
        }
        10f64.powf(f64::from(self.amplification) / 20.0).round() as i32
    }

    pub fn from_json(json: &str) -> Result<Self, CaptureError> {
        serde_json::from_str(json).map_err(|e| CaptureError::ConfigurationFailed(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, CaptureError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CaptureError::ConfigurationFailed(e.to_string()))
    }
}

/// The set of known mic profiles, as persisted in the settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MicSettings {
    #[serde(default)]
    pub mic_profiles: Vec<MicProfile>,
}

impl MicSettings {
    pub fn from_json(json: &str) -> Result<Self, CaptureError> {
        serde_json::from_str(json).map_err(|e| CaptureError::ConfigurationFailed(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, CaptureError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CaptureError::ConfigurationFailed(e.to_string()))
    }

    pub fn find(&self, name: &str) -> Option<&MicProfile> {
        self.mic_profiles.iter().find(|p| p.name == name)
    }

    pub fn enabled_profiles(&self) -> impl Iterator<Item = &MicProfile> {
        self.mic_profiles.iter().filter(|p| p.is_enabled)
    }

    /// First enabled profile whose device is currently connected.
    pub fn first_connected<'a>(&'a self, device_names: &[String]) -> Option<&'a MicProfile> {
        self.enabled_profiles()
            .find(|p| device_names.iter().any(|d| d == &p.name))
    }

    /// Insert or replace the profile with the same name.
    pub fn upsert(&mut self, profile: MicProfile) {
        match self.mic_profiles.iter_mut().find(|p| p.name == profile.name) {
            Some(existing) => *existing = profile,
            None => self.mic_profiles.push(profile),
        }
    }
}
