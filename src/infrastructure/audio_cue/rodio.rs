//! Rodio-based audio cue adapter

use std::time::Duration;

use async_trait::async_trait;
use rodio::source::{SineWave, Source, Zero};
use rodio::{OutputStream, Sink};

use crate::application::ports::{AudioCue, AudioCueError, AudioCueType};

const AMPLITUDE: f32 = 0.3;
const SAMPLE_RATE: u32 = 44_100;

/// One synthesised note; a frequency of zero is a rest
#[derive(Debug, Clone, Copy, PartialEq)]
struct Note {
    hz: f32,
    ms: u64,
}

const fn note(hz: f32, ms: u64) -> Note {
    Note { hz, ms }
}

const fn rest(ms: u64) -> Note {
    Note { hz: 0.0, ms }
}

/// Note sequence for each cue. Start and stop mirror each other so the pair
/// reads as "open" and "close".
fn melody(cue: AudioCueType) -> &'static [Note] {
    match cue {
        AudioCueType::RecordingStart => const { &[note(523.0, 80), note(659.0, 120)] },
        AudioCueType::RecordingStop => const { &[note(659.0, 80), note(523.0, 120)] },
        AudioCueType::RecordingCancel => const { &[note(392.0, 60), rest(40), note(392.0, 60)] },
        AudioCueType::Complete => const { &[note(523.0, 70), note(659.0, 70), note(784.0, 140)] },
        AudioCueType::Error => const { &[note(220.0, 120), note(175.0, 200)] },
    }
}

/// Plays cues on the default output device
#[derive(Debug, Clone)]
pub struct RodioAudioCue {
    volume: f32,
}

impl RodioAudioCue {
    pub fn new() -> Self {
        Self::with_volume(1.0)
    }

    /// Scale every cue; clamped to 0.0..=1.0
    pub fn with_volume(volume: f32) -> Self {
        Self {
            volume: volume.clamp(0.0, 1.0),
        }
    }
}

impl Default for RodioAudioCue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioCue for RodioAudioCue {
    async fn play(&self, cue_type: AudioCueType) -> Result<(), AudioCueError> {
        let amplitude = AMPLITUDE * self.volume;
        // Sink::sleep_until_end blocks
        tokio::task::spawn_blocking(move || play_blocking(melody(cue_type), amplitude))
            .await
            .map_err(|e| AudioCueError::PlaybackFailed(format!("Task join error: {e}")))?
    }
}

fn play_blocking(notes: &[Note], amplitude: f32) -> Result<(), AudioCueError> {
    let (_stream, handle) = OutputStream::try_default()
        .map_err(|e| AudioCueError::DeviceNotAvailable(e.to_string()))?;
    let sink = Sink::try_new(&handle).map_err(|e| AudioCueError::PlaybackFailed(e.to_string()))?;

    for n in notes {
        let duration = Duration::from_millis(n.ms);
        if n.hz == 0.0 {
            sink.append(Zero::<f32>::new(1, SAMPLE_RATE).take_duration(duration));
            continue;
        }
        // Short fade avoids the click at note onset
        let fade = Duration::from_millis((n.ms / 5).min(30));
        sink.append(
            SineWave::new(n.hz)
                .take_duration(duration)
                .fade_in(fade)
                .amplify(amplitude),
        );
    }

    sink.sleep_until_end();
    Ok(())
}
