//! Writes a synthetic MaxQuant-style `proteinGroups.txt` for trying out the
//! analysis: 57 tab-separated columns with the dried replicates in columns
//! 51-53 and the liquid replicates in 54-56.

use anyhow::{Context, Result};

const COLUMNS: usize = 57;

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
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Three replicate intensities around `level` with relative noise `cv`.
fn replicates(rng: &mut SimpleRng, level: f64, cv: f64) -> [f64; 3] {
    let mut out = [0.0; 3];
    for v in &mut out {
        *v = if level <= 0.0 {
            0.0
        } else {
            rng.gauss(level, level * cv).max(0.0)
        };
    }
    out
}

fn header() -> Vec<String> {
    let mut cols: Vec<String> = (0..COLUMNS).map(|i| format!("Column {i}")).collect();
    cols[0] = "Protein IDs".into();
    cols[1] = "Majority protein IDs".into();
    cols[5] = "Protein names".into();
    cols[6] = "Gene names".into();
    for i in 0..3 {
        cols[51 + i] = format!("Intensity Dried_{}", i + 1);
        cols[54 + i] = format!("Intensity Liquid_{}", i + 1);
    }
    cols
}

fn main() -> Result<()> {
    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_proteinGroups.txt".to_string());
    let mut rng = SimpleRng::new(42);

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(&output_path)
        .with_context(|| format!("creating {output_path}"))?;
    writer.write_record(header())?;

    let n_proteins = 500;
    for i in 0..n_proteins {
        // Log-normal baseline abundance.
        let level = 10f64.powf(rng.gauss(7.0, 1.2));

        // Most proteins behave the same in both preparations; some shift,
        // a few are only seen in one, a few have noisy replicates.
        let roll = rng.next_f64();
        let (dried_level, liquid_level) = if roll < 0.70 {
            (level, level * rng.gauss(1.0, 0.15).max(0.1))
        } else if roll < 0.85 {
            (level, level * 2f64.powf(rng.gauss(0.0, 2.0)))
        } else if roll < 0.90 {
            (0.0, level)
        } else if roll < 0.95 {
            (level, 0.0)
        } else {
            (level, level)
        };
        let noise = if roll >= 0.95 { 0.6 } else { 0.08 };

        let dried = replicates(&mut rng, dried_level, noise);
        let liquid = replicates(&mut rng, liquid_level, noise);

        let mut row = vec![String::new(); COLUMNS];
        row[0] = format!("SYN{i:05};SYN{i:05}-2");
        row[1] = format!("SYN{i:05}");
        row[5] = format!("Synthetic protein {}", i % 400);
        row[6] = format!("SYN{}", i % 400);
        for k in 0..3 {
            row[51 + k] = format!("{:.2}", dried[k]);
            row[54 + k] = format!("{:.2}", liquid[k]);
        }
        writer.write_record(&row)?;
    }
    writer.flush()?;

    println!("Wrote {n_proteins} protein groups to {output_path}");
    Ok(())
}
