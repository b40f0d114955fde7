use std::path::PathBuf;

use anyhow::{Context, Result};

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

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

fn main() -> Result<()> {
    let output_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_data.csv"));

    let mut rng = SimpleRng::new(42);

    // (city, mean income in thousands)
    let cities = [("NY", 85.0), ("LA", 72.0), ("Chicago", 64.0), ("Austin", 70.0)];
    let departments = ["Sales", "Engineering", "Support", "Marketing"];
    let members = ["True", "False"];

    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("creating {}", output_path.display()))?;
    writer
        .write_record(["id", "city", "department", "member", "age", "income", "score"])
        .context("writing header")?;

    let n_rows = 500;
    for id in 0..n_rows {
        let (city, mean_income) = cities[id % cities.len()];
        let age = rng.gauss(40.0, 11.0).clamp(18.0, 80.0).round();
        let income = rng.gauss(mean_income + (age - 40.0) * 0.8, 12.0).max(10.0);
        // Roughly one score in twenty is missing.
        let score = if rng.next_f64() < 0.05 {
            String::new()
        } else {
            format!("{:.2}", rng.gauss(income / 20.0, 0.7))
        };

        writer
            .write_record([
                id.to_string(),
                city.to_string(),
                rng.pick(&departments).to_string(),
                rng.pick(&members).to_string(),
                format!("{age}"),
                format!("{income:.1}"),
                score,
            ])
            .with_context(|| format!("writing row {id}"))?;
    }
    writer.flush().context("flushing CSV")?;

    println!("Wrote {n_rows} rows to {}", output_path.display());
    Ok(())
}
