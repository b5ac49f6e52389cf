//! Conversions between playback position and song beats, including the
//! per-mic delay that shifts what the singer is heard singing.

use serde::{Deserialize, Serialize};

/// Tempo information of a song.
///
/// `bpm` is the value from the song file, which counts quarter beats; the
/// number of beats per minute is `bpm * 4`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongTiming {
    pub bpm: f64,
    /// Offset of beat 0 from the start of the audio, in ms.
    #[serde(default)]
    pub gap_millis: f64,
}

impl SongTiming {
    pub fn new(bpm: f64, gap_millis: f64) -> Self {
        Self { bpm, gap_millis }
    }

    pub fn beats_per_minute(&self) -> f64 {
        self.bpm * 4.0
    }

    pub fn beats_per_second(&self) -> f64 {
        self.beats_per_minute() / 60.0
    }

    pub fn millis_to_beat(&self, millis_in_song: f64) -> f64 {
        (millis_in_song - self.gap_millis) * self.beats_per_minute() / 60_000.0
    }

    pub fn beat_to_millis(&self, beat: f64) -> f64 {
        let bpm = self.beats_per_minute();
        if bpm == 0.0 {
            return self.gap_millis;
        }
        beat * 60_000.0 / bpm + self.gap_millis
    }

    /// Beat that is reaching the microphone while playback is at
    /// `position_in_song_millis`.
    ///
    /// Samples published now were sung `mic_delay_millis` earlier, so pitch
    /// results and scrolling notes must be aligned to this beat rather than
    /// to the playback position.
    pub fn mic_adjusted_beat(&self, position_in_song_millis: f64, mic_delay_millis: i32) -> f64 {
        self.millis_to_beat(position_in_song_millis - f64::from(mic_delay_millis))
    }

    /// Whole beats covered by a display window of `seconds`.
    pub fn displayed_beats(&self, seconds: f64) -> u32 {
        (self.beats_per_second() * seconds).ceil().max(0.0) as u32
    }
}
