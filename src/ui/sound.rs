//! Procedural sound effects via rodio.
//!
//! Four cues: a reveal blip whose pitch rises through the sequence, a
//! tap click for selection toggles, a success arpeggio and a failure
//! slide. All are synthesized as in-memory WAV buffers; playback is
//! fire-and-forget through detached sinks.
//!
//! Build without the "sound" feature for a silent stub.

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;
    const TAU: f32 = 2.0 * std::f32::consts::PI;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_select: Arc<Vec<u8>>,
        sfx_deselect: Arc<Vec<u8>>,
        sfx_success: Arc<Vec<u8>>,
        sfx_failure: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = OutputStream::try_default().ok()?;

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_select: Arc::new(make_wav(&gen_click(880.0))),
                sfx_deselect: Arc::new(make_wav(&gen_click(440.0))),
                sfx_success: Arc::new(make_wav(&gen_success())),
                sfx_failure: Arc::new(make_wav(&gen_failure())),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }

        /// Reveal blip: pitch climbs with the card's position so a long
        /// sequence reads as an ascending scale.
        pub fn play_reveal(&self, index: usize, total: usize) {
            let ratio = index as f32 / total.max(1) as f32;
            let freq = 400.0 + ratio * 600.0;
            let buf = make_wav(&gen_blip(freq, 0.08, 0.3));
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf);
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach();
                }
            }
        }

        pub fn play_select(&self) { self.play(&self.sfx_select); }
        pub fn play_deselect(&self) { self.play(&self.sfx_deselect); }
        pub fn play_success(&self) { self.play(&self.sfx_success); }
        pub fn play_failure(&self) { self.play(&self.sfx_failure); }
    }

    // ── Waveform generators (mono f32 samples) ──

    /// Sine blip with linear fade-out.
    fn gen_blip(freq: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - i as f32 / n as f32;
                (t * freq * TAU).sin() * env * volume
            })
            .collect()
    }

    /// Very short percussive tick for card toggles.
    fn gen_click(freq: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * 0.04) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = (1.0 - i as f32 / n as f32).powf(2.0);
                ((t * freq * TAU).sin() * 0.8 + (t * freq * 2.0 * TAU).sin() * 0.2) * env * 0.25
            })
            .collect()
    }

    /// Round won: ascending arpeggio C5→E5→G5→C6 with a held top note.
    fn gen_success() -> Vec<f32> {
        let notes = [523.0_f32, 659.0, 784.0, 1047.0];
        let mut samples = Vec::new();
        for (k, &freq) in notes.iter().enumerate() {
            let dur = if k == notes.len() - 1 { 0.28 } else { 0.09 };
            let n = (SAMPLE_RATE as f32 * dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * 0.6;
                let wave = (t * freq * TAU).sin() * 0.7 + (t * freq * 2.0 * TAU).sin() * 0.3;
                samples.push(wave * env * 0.3);
            }
        }
        samples
    }

    /// Round lost: a glum slide from E4 down past A3.
    fn gen_failure() -> Vec<f32> {
        let duration = 0.45;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = 330.0 - t * 130.0;
                let ti = i as f32 / SAMPLE_RATE as f32;
                let env = (1.0 - t).powf(0.7);
                (ti * freq * TAU).sin() * env * 0.3
            })
            .collect()
    }

    // ── WAV encoder: 16-bit mono PCM ──

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let data_size = samples.len() as u32 * 2;
        let mut buf = Vec::with_capacity(44 + data_size as usize);

        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&1u16.to_le_bytes()); // mono
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&(SAMPLE_RATE * 2).to_le_bytes()); // byte rate
        buf.extend_from_slice(&2u16.to_le_bytes()); // block align
        buf.extend_from_slice(&16u16.to_le_bytes()); // bits per sample

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }
}

// ── Public API: compiles to no-ops when sound feature is off ──

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_reveal(&self, _index: usize, _total: usize) {}
    pub fn play_select(&self) {}
    pub fn play_deselect(&self) {}
    pub fn play_success(&self) {}
    pub fn play_failure(&self) {}
}
