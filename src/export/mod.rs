//! Offline rendering
//!
//! Songs can be rendered to a WAV file instead of a speaker. Rendering runs
//! the sequencer in foreground mode against a [`WavRenderer`], so every note
//! is synthesized back to back in virtual time.

pub mod wav;

pub use wav::WavRenderer;

use std::path::Path;

use crate::config::PlayerConfig;
use crate::rtttl::Song;
use crate::sequencer::timer::ManualTimer;
use crate::sequencer::Sequencer;
use crate::Result;

/// Render `song` to a 16-bit mono WAV file at `output_path`.
///
/// Uses the volume and sample rate from `config`. Returns the rendered
/// length in milliseconds.
///
/// # Examples
///
/// ```no_run
/// use rtttl_tone::export::export_to_wav;
/// use rtttl_tone::{parse_song, PlayerConfig};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let song = parse_song("beep:d=8,o=6,b=180:c,e,g", 0)?;
/// export_to_wav(song, "beep.wav", &PlayerConfig::default())?;
/// # Ok(())
/// # }
/// ```
pub fn export_to_wav<P: AsRef<Path>>(
    song: Song,
    output_path: P,
    config: &PlayerConfig,
) -> Result<u64> {
    let mut sequencer = Sequencer::new(WavRenderer::new(config.sample_rate), ManualTimer::new());
    log::info!(
        "Rendering '{}' ({} ms) at {} Hz",
        song.title(),
        song.total_duration_ms(),
        config.sample_rate
    );
    sequencer.start(song, config.volume, false);

    let (renderer, _) = sequencer.into_parts();
    renderer.write_wav(output_path.as_ref())?;
    Ok(renderer.duration_ms())
}
