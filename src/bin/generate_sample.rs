//! Writes a synthetic `disgust_all.csv` and matching `disgust-audios/*.wav`
//! into the working directory, with the same column layout as the real data.

use std::f64::consts::PI;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

const CSV_PATH: &str = "disgust_all.csv";
const AUDIO_DIR: &str = "disgust-audios";
const SAMPLE_RATE: u32 = 16_000;
const CLIP_SECONDS: f64 = 0.6;

/// Metadata columns between the categorical labels and the acoustic block,
/// so acoustic features start at header position 22.
const EXTRA_METADATA: [&str; 11] = [
    "Speaker",
    "Take",
    "Language",
    "Stimulus",
    "Duration",
    "Recording site",
    "Annotators",
    "Agreement",
    "Valence rating",
    "Arousal rating",
    "Set",
];

const LLD_NAMES: [&str; 11] = [
    "F0semitoneFrom27.5Hz_sma3nz",
    "loudness_sma3",
    "spectralFlux_sma3",
    "mfcc1_sma3",
    "mfcc2_sma3",
    "jitterLocal_sma3nz",
    "shimmerLocaldB_sma3nz",
    "HNRdBACF_sma3nz",
    "F1frequency_sma3nz",
    "F2frequency_sma3nz",
    "alphaRatio_sma3",
];

const FUNCTIONALS: [&str; 8] = [
    "amean",
    "stddevNorm",
    "percentile20.0",
    "percentile50.0",
    "percentile80.0",
    "pctlrange0-2",
    "meanRisingSlope",
    "meanFallingSlope",
];

/// (id code, label, umap centre, base f0 in Hz)
const CATEGORIES: [(&str, &str, (f64, f64), f64); 4] = [
    ("ca", "Core", (2.0, 6.0), 180.0),
    ("an", "Animal reminder", (8.0, 7.0), 240.0),
    ("co", "Contamination", (4.0, 1.0), 210.0),
    ("mo", "Moral", (9.5, 2.5), 150.0),
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
        mean + std_dev * z
    }

    fn pick<'a>(&mut self, options: &[&'a str]) -> &'a str {
        options[(self.next_u64() % options.len() as u64) as usize]
    }
}

fn feature_names() -> Vec<String> {
    LLD_NAMES
        .iter()
        .flat_map(|lld| FUNCTIONALS.iter().map(move |f| format!("{lld}_{f}")))
        .collect()
}

/// A short voiced burst: gliding tone plus breath noise under an envelope.
fn synthesize(f0: f64, noise: f64, rng: &mut SimpleRng) -> Vec<i16> {
    let n = (CLIP_SECONDS * SAMPLE_RATE as f64) as usize;
    let mut phase = 0.0;
    (0..n)
        .map(|i| {
            let t = i as f64 / SAMPLE_RATE as f64;
            let progress = t / CLIP_SECONDS;
            let envelope = (PI * progress).sin().powi(2);
            let freq = f0 * (1.0 - 0.3 * progress);
            phase += 2.0 * PI * freq / SAMPLE_RATE as f64;
            let voiced = phase.sin() + 0.4 * (2.0 * phase).sin();
            let value = envelope * (0.5 * voiced + rng.gauss(0.0, noise));
            (value.clamp(-1.0, 1.0) * i16::MAX as f64) as i16
        })
        .collect()
}

fn write_wav(path: &Path, samples: &[i16]) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("creating {}", path.display()))?;
    for &s in samples {
        writer.write_sample(s)?;
    }
    writer.finalize()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let features = feature_names();

    let mut header: Vec<String> = vec!["AudioID".into(), "umap_1".into(), "umap_2".into()];
    header.extend([
        "Disgust category",
        "Noise level",
        "Gender",
        "Age",
        "Linguistic group",
        "Confidence in disgust category",
        "Experience valence",
        "Intensity of expression",
    ]
    .map(String::from));
    header.extend(EXTRA_METADATA.map(String::from));
    header.extend(features.iter().cloned());

    fs::create_dir_all(AUDIO_DIR).with_context(|| format!("creating {AUDIO_DIR}"))?;
    let mut writer = csv::Writer::from_path(CSV_PATH).context("creating CSV")?;
    writer.write_record(&header)?;

    let mut rows = 0;
    for (code, label, (cx, cy), base_f0) in CATEGORIES {
        for speaker in 1..=6 {
            for take in 1..=2 {
                let audio_id = format!("a_{code}_{speaker:03}_{take:02}");
                let noise = rng.pick(&["Low", "Medium", "High"]);
                let noise_std = match noise {
                    "Low" => 0.02,
                    "Medium" => 0.08,
                    _ => 0.2,
                };
                let f0 = rng.gauss(base_f0, 25.0).max(80.0);
                let intensity = rng.next_f64();

                let mut record = vec![
                    audio_id.clone(),
                    format!("{:.6}", rng.gauss(cx, 0.8)),
                    format!("{:.6}", rng.gauss(cy, 0.8)),
                    label.to_string(),
                    noise.to_string(),
                    rng.pick(&["Female", "Male"]).to_string(),
                    rng.pick(&["18-29", "30-44", "45-60"]).to_string(),
                    rng.pick(&["Romance", "Germanic", "Slavic"]).to_string(),
                    rng.pick(&["Low", "Medium", "High"]).to_string(),
                    rng.pick(&["Negative", "Neutral", "Mixed"]).to_string(),
                    if intensity > 0.5 { "Strong" } else { "Mild" }.to_string(),
                    format!("S{speaker:03}"),
                    take.to_string(),
                    "en".to_string(),
                    format!("{label} scenario"),
                    format!("{CLIP_SECONDS:.2}"),
                    "Lab A".to_string(),
                    "5".to_string(),
                    format!("{:.2}", rng.next_f64()),
                    format!("{:.2}", rng.gauss(2.0, 0.5)),
                    format!("{:.2}", rng.gauss(3.0 + 2.0 * intensity, 0.5)),
                    if rows % 5 == 0 { "test" } else { "train" }.to_string(),
                ];
                for (i, _) in features.iter().enumerate() {
                    let centre = (i as f64 * 0.37).sin() * 10.0 + f0 / 50.0;
                    record.push(format!("{:.5}", rng.gauss(centre, 1.0 + noise_std * 10.0)));
                }
                writer.write_record(&record)?;

                let clip = synthesize(f0, noise_std, &mut rng);
                write_wav(&Path::new(AUDIO_DIR).join(format!("{audio_id}.wav")), &clip)?;
                rows += 1;
            }
        }
    }
    writer.flush()?;

    println!(
        "Wrote {rows} clips ({} acoustic features each) to {CSV_PATH} and {AUDIO_DIR}/",
        features.len()
    );
    Ok(())
}
