//! Writes a deterministic synthetic blade dataset to `sample_blades.csv`
//! and `sample_blades.parquet`.

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

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

/// Typical (Ep, Ec/Ep, Vp, Vl/Vp) centres per construction.
const TYPE_PROFILES: [(&str, f64, f64, f64, f64); 5] = [
    ("5-Ply", 0.90, 1.04, 1.25, 1.08),
    ("7-Ply", 1.10, 1.06, 1.10, 1.02),
    ("Carbon Inner", 1.15, 1.12, 0.95, 0.93),
    ("Carbon Outer", 1.40, 0.98, 0.82, 0.88),
    ("Other", 1.00, 1.00, 1.00, 1.00),
];

const BRANDS: [&str; 6] = ["Butterfly", "Stiga", "Yasaka", "Nittaku", "DHS", "andro"];

struct Blade {
    brand: String,
    name: String,
    blade_type: String,
    ep: f64,
    ec: f64,
    vp: f64,
    vl: f64,
}

fn generate(rng: &mut SimpleRng, per_type: usize) -> Vec<Blade> {
    let mut blades = Vec::new();
    for &(blade_type, ep_mu, lin_mu, vp_mu, fb_mu) in &TYPE_PROFILES {
        for i in 0..per_type {
            let brand = BRANDS[(rng.next_u64() % BRANDS.len() as u64) as usize];
            let ep = rng.gauss(ep_mu, 0.08).max(0.5);
            let vp = rng.gauss(vp_mu, 0.07).max(0.5);
            let ec = ep * rng.gauss(lin_mu, 0.04);
            let vl = vp * rng.gauss(fb_mu, 0.05);
            blades.push(Blade {
                brand: brand.to_string(),
                name: format!("{blade_type} Model {}", i + 1),
                blade_type: blade_type.to_string(),
                ep: round3(ep),
                ec: round3(ec),
                vp: round3(vp),
                vl: round3(vl),
            });
        }
    }
    blades
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

fn write_csv(path: &str, blades: &[Blade]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record(["Brand", "Name", "Type", "Ep", "Ec", "Vp", "Vl"])?;
    for b in blades {
        writer.write_record([
            b.brand.clone(),
            b.name.clone(),
            b.blade_type.clone(),
            b.ep.to_string(),
            b.ec.to_string(),
            b.vp.to_string(),
            b.vl.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &str, blades: &[Blade]) -> Result<()> {
    let text = |f: fn(&Blade) -> &str| StringArray::from(blades.iter().map(f).collect::<Vec<_>>());
    let num = |f: fn(&Blade) -> f64| Float64Array::from(blades.iter().map(f).collect::<Vec<_>>());

    let schema = Arc::new(Schema::new(vec![
        Field::new("Brand", DataType::Utf8, false),
        Field::new("Name", DataType::Utf8, false),
        Field::new("Type", DataType::Utf8, false),
        Field::new("Ep", DataType::Float64, false),
        Field::new("Ec", DataType::Float64, false),
        Field::new("Vp", DataType::Float64, false),
        Field::new("Vl", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(text(|b| b.brand.as_str())),
            Arc::new(text(|b| b.name.as_str())),
            Arc::new(text(|b| b.blade_type.as_str())),
            Arc::new(num(|b| b.ep)),
            Arc::new(num(|b| b.ec)),
            Arc::new(num(|b| b.vp)),
            Arc::new(num(|b| b.vl)),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let blades = generate(&mut rng, 12);

    write_csv("sample_blades.csv", &blades)?;
    write_parquet("sample_blades.parquet", &blades)?;

    println!(
        "Wrote {} blades ({} types) to sample_blades.csv and sample_blades.parquet",
        blades.len(),
        TYPE_PROFILES.len()
    );
    Ok(())
}
