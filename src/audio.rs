//! Clip decoding and playback through the default output device.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SizedSample};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("no audio output device available")]
    NoDevice,
    #[error("querying output config: {0}")]
    DeviceConfig(#[from] cpal::DefaultStreamConfigError),
    #[error("building output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),
    #[error("starting output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
    #[error("unsupported device sample format {0:?}")]
    UnsupportedFormat(cpal::SampleFormat),
    #[error("decoding {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },
    #[error("{path}: unsupported bit depth {bits}")]
    BitDepth { path: PathBuf, bits: u16 },
    #[error("{0} contains no audio")]
    EmptyClip(PathBuf),
}

// ---------------------------------------------------------------------------
// Clip – a decoded WAV file
// ---------------------------------------------------------------------------

/// Decoded audio, interleaved, normalised to `-1.0..=1.0`.
#[derive(Debug, Clone)]
pub struct Clip {
    pub path: PathBuf,
    pub samples: Vec<f32>,
    pub channels: u16,
    pub sample_rate: u32,
}

impl Clip {
    pub fn load(path: &Path) -> Result<Self, PlaybackError> {
        let decode_err = |source| PlaybackError::Decode {
            path: path.to_path_buf(),
            source,
        };
        let mut reader = hound::WavReader::open(path).map_err(decode_err)?;
        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<_, _>>()
                .map_err(decode_err)?,
            hound::SampleFormat::Int => {
                let max_val = int_full_scale(spec.bits_per_sample).ok_or(
                    PlaybackError::BitDepth {
                        path: path.to_path_buf(),
                        bits: spec.bits_per_sample,
                    },
                )?;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / max_val))
                    .collect::<Result<_, _>>()
                    .map_err(decode_err)?
            }
        };

        if samples.is_empty() || spec.channels == 0 {
            return Err(PlaybackError::EmptyClip(path.to_path_buf()));
        }

        Ok(Clip {
            path: path.to_path_buf(),
            samples,
            channels: spec.channels,
            sample_rate: spec.sample_rate,
        })
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn duration_secs(&self) -> f32 {
        self.frames() as f32 / self.sample_rate as f32
    }

    fn sample(&self, frame: usize, channel: usize) -> f32 {
        let channel = channel.min(self.channels as usize - 1);
        self.samples
            .get(frame * self.channels as usize + channel)
            .copied()
            .unwrap_or(0.0)
    }
}

/// Magnitude of full scale for integer samples of `bits` width.
fn int_full_scale(bits: u16) -> Option<f32> {
    let shift = bits.checked_sub(1).filter(|&s| s < 32)?;
    Some((1i64 << shift) as f32)
}

// ---------------------------------------------------------------------------
// PlaybackCursor – shared between the UI thread and the audio callback
// ---------------------------------------------------------------------------

/// Read position into the current clip, in clip frames.
#[derive(Debug, Default)]
struct PlaybackCursor {
    clip: Option<Arc<Clip>>,
    position: f64,
    /// Clip frames advanced per device frame.
    step: f64,
}

impl PlaybackCursor {
    fn start(&mut self, clip: Arc<Clip>, device_rate: u32) {
        self.step = clip.sample_rate as f64 / device_rate as f64;
        self.position = 0.0;
        self.clip = Some(clip);
    }

    /// Write one device frame into `out` and advance.
    fn next_frame(&mut self, out: &mut [f32]) {
        let Some(clip) = &self.clip else {
            out.fill(0.0);
            return;
        };
        let frames = clip.frames();
        let idx = self.position.floor() as usize;
        if idx >= frames {
            out.fill(0.0);
            self.clip = None;
            return;
        }

        let next = (idx + 1).min(frames - 1);
        let frac = (self.position - idx as f64) as f32;
        let clip_channels = clip.channels as usize;
        let downmix = out.len() == 1 && clip_channels > 1;

        for (ch, sample) in out.iter_mut().enumerate() {
            let value = if downmix {
                (0..clip_channels)
                    .map(|c| lerp(clip.sample(idx, c), clip.sample(next, c), frac))
                    .sum::<f32>()
                    / clip_channels as f32
            } else {
                lerp(clip.sample(idx, ch), clip.sample(next, ch), frac)
            };
            *sample = value.clamp(-1.0, 1.0);
        }

        self.position += self.step;
    }

    fn is_playing(&self) -> bool {
        self.clip.is_some()
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

// ---------------------------------------------------------------------------
// AudioPlayer
// ---------------------------------------------------------------------------

/// Owns the output stream for the lifetime of the app. Playing a new clip
/// replaces whatever is currently playing.
pub struct AudioPlayer {
    _stream: cpal::Stream,
    cursor: Arc<Mutex<PlaybackCursor>>,
    device_rate: u32,
}

impl AudioPlayer {
    /// Open the default output device and start a (silent) stream.
    pub fn new() -> Result<Self, PlaybackError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(PlaybackError::NoDevice)?;
        let config = device.default_output_config()?;
        let device_rate = config.sample_rate().0;

        log::info!(
            "Audio output: {} ({} Hz, {} channels)",
            device.name().unwrap_or_else(|_| "unknown device".to_string()),
            device_rate,
            config.channels()
        );

        let cursor = Arc::new(Mutex::new(PlaybackCursor::default()));
        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config.into(), &cursor)?,
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config.into(), &cursor)?,
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config.into(), &cursor)?,
            other => return Err(PlaybackError::UnsupportedFormat(other)),
        };
        stream.play()?;

        Ok(Self {
            _stream: stream,
            cursor,
            device_rate,
        })
    }

    /// Decode `path` and start playing it from the beginning.
    pub fn play_file(&self, path: &Path) -> Result<Arc<Clip>, PlaybackError> {
        let clip = Arc::new(Clip::load(path)?);
        log::debug!(
            "Playing {} ({:.2}s, {} Hz)",
            clip.path.display(),
            clip.duration_secs(),
            clip.sample_rate
        );
        if let Ok(mut cursor) = self.cursor.lock() {
            cursor.start(Arc::clone(&clip), self.device_rate);
        }
        Ok(clip)
    }

    pub fn stop(&self) {
        if let Ok(mut cursor) = self.cursor.lock() {
            cursor.clip = None;
        }
    }

    pub fn is_playing(&self) -> bool {
        self.cursor
            .lock()
            .map(|cursor| cursor.is_playing())
            .unwrap_or(false)
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    cursor: &Arc<Mutex<PlaybackCursor>>,
) -> Result<cpal::Stream, PlaybackError>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels as usize;
    let cursor = Arc::clone(cursor);
    let mut frame = vec![0.0f32; channels];

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            let Ok(mut cursor) = cursor.lock() else {
                for sample in data.iter_mut() {
                    *sample = T::from_sample(0.0);
                }
                return;
            };
            for out in data.chunks_mut(channels) {
                cursor.next_frame(&mut frame);
                for (sample, value) in out.iter_mut().zip(&frame) {
                    *sample = T::from_sample(*value);
                }
            }
        },
        |err| log::error!("Audio stream error: {err}"),
        None,
    )?;
    Ok(stream)
}
