//! Writes a small, deterministic tariff data folder that the dashboard can
//! open directly.
//!
//! Usage: `generate_sample [OUTPUT_DIR]` (defaults to `data`).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};

const IMPORTERS: &[&str] = &["United States", "Canada", "Mexico"];

const EXPORTERS: &[&str] = &[
    "China",
    "Germany",
    "Japan",
    "Korea, Republic of",
    "Viet Nam",
    "Brazil",
];

/// Raw four-digit ISIC class codes; the loader truncates them to two digits.
const ISIC_CODES: &[(&str, &str)] = &[
    ("0111", "Growing of cereals"),
    ("1010", "Processing and preserving of meat"),
    ("2410", "Manufacture of basic iron and steel"),
    ("2910", "Manufacture of motor vehicles"),
];

const HS6_CODES: &[&str] = &["720810", "760110", "870323", "847130", "851712"];

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
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
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

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// Effective dates: a baseline followed by a few tariff actions.
fn effective_dates() -> Vec<NaiveDate> {
    let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default();
    [0, 34, 63, 91, 98, 152]
        .into_iter()
        .map(|days| start + Duration::days(days))
        .collect()
}

fn write_single_column(path: &Path, header: &str, values: &[&str]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record([header])?;
    for value in values {
        writer.write_record([*value])?;
    }
    writer.flush()?;
    Ok(())
}

/// One tariff table. Each (importer, exporter, code) line walks through the
/// effective dates, occasionally raising its rate.
fn write_tariff_table(
    path: &Path,
    code_column: &str,
    codes: &[&str],
    with_shares: bool,
    rng: &mut SimpleRng,
) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    let mut header = vec![
        "importer",
        "exporter",
        code_column,
        "date_eff",
        "tariffs",
        "importsvaluein1000usd",
        "affected_trade_value",
    ];
    if with_shares {
        header.extend(["affected_trade_share", "affected_hs6tariff_line_share"]);
    }
    writer.write_record(&header)?;

    let dates = effective_dates();
    let mut rows = 0;
    for importer in IMPORTERS {
        for exporter in EXPORTERS {
            for code in codes {
                // Not every pair trades every product.
                if !rng.chance(0.7) {
                    continue;
                }
                let imports_k = rng.range(50.0, 25_000.0);
                let mut rate = rng.range(0.0, 8.0);
                for date in &dates {
                    if rng.chance(0.35) {
                        rate += rng.range(5.0, 25.0);
                    }
                    let affected_share = if rate > 10.0 { rng.range(0.2, 1.0) } else { 0.0 };
                    let affected_value = imports_k * 1000.0 * affected_share;

                    let mut record = vec![
                        importer.to_string(),
                        exporter.to_string(),
                        code.to_string(),
                        date.format("%m/%d/%Y").to_string(),
                        format!("{rate:.3}"),
                        format!("{imports_k:.1}"),
                        format!("{affected_value:.0}"),
                    ];
                    if with_shares {
                        let line_share = if affected_share > 0.0 {
                            rng.range(0.1, 1.0)
                        } else {
                            0.0
                        };
                        record.push(format!("{affected_share:.4}"));
                        record.push(format!("{line_share:.4}"));
                    }
                    writer.write_record(&record)?;
                    rows += 1;
                }
            }
        }
    }
    writer.flush()?;
    Ok(rows)
}

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);

    write_single_column(&out_dir.join("exporters.csv"), "exporter", EXPORTERS)?;
    write_single_column(&out_dir.join("hs6code.csv"), "hs6code", HS6_CODES)?;

    let path = out_dir.join("isic4_2_product_name.csv");
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(["isic4_2", "name"])?;
    for (code, name) in ISIC_CODES {
        writer.write_record([&code[..2], *name])?;
    }
    writer.flush()?;

    let isic: Vec<&str> = ISIC_CODES.iter().map(|(code, _)| *code).collect();
    let isic_rows = write_tariff_table(
        &out_dir.join("isic2tariff.csv"),
        "isic4_2",
        &isic,
        false,
        &mut rng,
    )?;
    let hs6_rows = write_tariff_table(
        &out_dir.join("hs6tariff.csv"),
        "hs6",
        HS6_CODES,
        true,
        &mut rng,
    )?;

    println!(
        "Wrote {isic_rows} ISIC and {hs6_rows} HS6 tariff rows to {}",
        out_dir.display()
    );
    Ok(())
}
