use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use protein_eda::config::INPUT_FILE;

const PROTEINS: usize = 24;
const ZERO_RATE: f64 = 0.3;

/// Samples and the abundance profile each group of samples shares.
const SAMPLES: [(&str, usize); 8] = [
    ("Ctrl_1", 0),
    ("Ctrl_2", 0),
    ("Ctrl_3", 0),
    ("Heat_1", 1),
    ("Heat_2", 1),
    ("Heat_3", 1),
    ("Salt_1", 2),
    ("Salt_2", 2),
];
const GROUPS: usize = 3;

fn main() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(42);

    // Per protein: a base abundance and a fold change for each sample group.
    let profiles: Vec<(f64, [f64; GROUPS])> = (0..PROTEINS)
        .map(|_| {
            let base = rng.gen_range(5.0..80.0);
            let mut folds = [1.0; GROUPS];
            for fold in folds.iter_mut().skip(1) {
                *fold = rng.gen_range(0.25..4.0);
            }
            (base, folds)
        })
        .collect();

    let mut writer = csv::Writer::from_path(INPUT_FILE)
        .with_context(|| format!("creating {INPUT_FILE}"))?;

    let mut header = vec!["protein".to_string()];
    header.extend(SAMPLES.iter().map(|(name, _)| name.to_string()));
    writer.write_record(&header)?;

    let mut zeros = 0usize;
    for (p, (base, folds)) in profiles.iter().enumerate() {
        let mut counts: Vec<u32> = SAMPLES
            .iter()
            .map(|&(_, group)| {
                if rng.gen_bool(ZERO_RATE) {
                    0
                } else {
                    let noise = rng.gen_range(0.8..1.25);
                    (base * folds[group] * noise).round().max(1.0) as u32
                }
            })
            .collect();

        // every protein is observed somewhere
        if counts.iter().all(|&c| c == 0) {
            let pick = rng.gen_range(0..counts.len());
            counts[pick] = base.round().max(1.0) as u32;
        }
        zeros += counts.iter().filter(|&&c| c == 0).count();

        let mut record = vec![format!("PROT{:03}", p + 1)];
        record.extend(counts.iter().map(|c| c.to_string()));
        writer.write_record(&record)?;
    }
    writer.flush().context("flushing CSV")?;

    println!(
        "Wrote {PROTEINS} proteins x {} samples ({zeros} zero cells) to {INPUT_FILE}",
        SAMPLES.len()
    );
    Ok(())
}
