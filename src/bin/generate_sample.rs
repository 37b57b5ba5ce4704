use std::sync::Arc;

use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// (country, income group, base temperature °C, warming °C/decade, CO₂ kt in 1960, CO₂ growth/yr)
const COUNTRIES: &[(&str, &str, f64, f64, f64, f64)] = &[
    ("India", "Lower middle income", 24.0, 0.12, 120_000.0, 0.055),
    ("United States", "High income", 8.6, 0.20, 2_890_000.0, 0.012),
    ("China", "Upper middle income", 6.9, 0.24, 780_000.0, 0.060),
    ("Brazil", "Upper middle income", 24.9, 0.15, 47_000.0, 0.050),
    ("Germany", "High income", 8.4, 0.26, 810_000.0, 0.001),
    ("Norway", "High income", 1.5, 0.28, 12_000.0, 0.020),
    ("Nigeria", "Lower middle income", 26.8, 0.14, 2_300.0, 0.070),
    ("Chad", "Low income", 26.5, 0.17, 60.0, 0.045),
    ("Nepal", "Low income", 12.7, 0.19, 90.0, 0.085),
    ("Peru", "Upper middle income", 19.7, 0.11, 12_000.0, 0.035),
    ("Canada", "High income", -5.3, 0.35, 190_000.0, 0.018),
    ("Ethiopia", "Low income", 22.4, 0.21, 350.0, 0.060),
];

const FIRST_YEAR: i64 = 1960;
const LAST_YEAR: i64 = 2013;

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

fn main() {
    let mut rng = SimpleRng::new(42);

    let mut all_country: Vec<&str> = Vec::new();
    let mut all_group: Vec<&str> = Vec::new();
    let mut all_year: Vec<i64> = Vec::new();
    let mut all_temp: Vec<Option<f64>> = Vec::new();
    let mut all_co2: Vec<Option<f64>> = Vec::new();

    for &(country, group, base, per_decade, co2_1960, growth) in COUNTRIES {
        for year in FIRST_YEAR..=LAST_YEAR {
            let t = (year - FIRST_YEAR) as f64;
            let temp = base + per_decade * t / 10.0 + rng.gauss(0.0, 0.35);
            let co2 = co2_1960 * (1.0 + growth).powf(t) * (1.0 + rng.gauss(0.0, 0.03));

            // Roughly 2% of cells are left empty, like the real dataset.
            let temp = (rng.next_f64() > 0.02).then_some((temp * 1000.0).round() / 1000.0);
            let co2 = (rng.next_f64() > 0.02).then_some(co2.max(0.0).round());

            all_country.push(country);
            all_group.push(group);
            all_year.push(year);
            all_temp.push(temp);
            all_co2.push(co2);
        }
    }

    // Write CSV
    let csv_path = "sample_climate.csv";
    let mut writer = csv::Writer::from_path(csv_path).expect("Failed to create CSV file");
    writer
        .write_record(["Country", "Income group", "Year", "MeanTemp", "CO2_kt"])
        .expect("Failed to write CSV header");
    let cell = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
    for i in 0..all_year.len() {
        writer
            .write_record([
                all_country[i].to_string(),
                all_group[i].to_string(),
                all_year[i].to_string(),
                cell(all_temp[i]),
                cell(all_co2[i]),
            ])
            .expect("Failed to write CSV row");
    }
    writer.flush().expect("Failed to flush CSV file");

    // Build Arrow arrays
    let schema = Arc::new(Schema::new(vec![
        Field::new("Country", DataType::Utf8, false),
        Field::new("Income group", DataType::Utf8, false),
        Field::new("Year", DataType::Int64, false),
        Field::new("MeanTemp", DataType::Float64, true),
        Field::new("CO2_kt", DataType::Float64, true),
    ]));

    let n_rows = all_year.len();
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(all_country)),
            Arc::new(StringArray::from(all_group)),
            Arc::new(Int64Array::from(all_year)),
            Arc::new(Float64Array::from(all_temp)),
            Arc::new(Float64Array::from(all_co2)),
        ],
    )
    .expect("Failed to create RecordBatch");

    // Write Parquet
    let parquet_path = "sample_climate.parquet";
    let file = std::fs::File::create(parquet_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    println!(
        "Wrote {n_rows} records ({} countries, {FIRST_YEAR}-{LAST_YEAR}) to {csv_path} and {parquet_path}",
        COUNTRIES.len()
    );
}
