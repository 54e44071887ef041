use serde::Serialize;
use tierorder_core::{Bucket, Distribution, ExactCalculator, ExactEstimate};

use super::{fail, load_config, resolve_distribution, write_json};

#[derive(Serialize)]
struct ExactReport {
    label: String,
    tiers: Distribution,
    permutations: usize,
    estimate: ExactEstimate,
}

pub fn run(
    tiers: Option<&str>,
    defenders: Option<&str>,
    config: Option<&str>,
    output: Option<&str>,
) {
    let file = load_config(config);
    let defenders = resolve_distribution("defenders", defenders, file.defenders.as_ref())
        .unwrap_or_else(|e| fail(e));

    // An inline list wins; otherwise report each list the config carries.
    let mut lists: Vec<(String, Distribution)> = Vec::new();
    if let Some(text) = tiers {
        let d = text
            .parse::<Distribution>()
            .unwrap_or_else(|e| fail(format!("--tiers: {e}")));
        lists.push(("tiers".to_string(), d));
    } else {
        if let Some(p) = file.poise {
            lists.push(("poise".to_string(), p));
        }
        if let Some(a) = file.attackers {
            lists.push(("attackers".to_string(), a));
        }
    }
    if lists.is_empty() {
        fail("missing tiers (use --tiers, or a --config with poise or attackers)");
    }

    println!("Defenders ({}): {defenders}", defenders.total());

    let mut reports = Vec::with_capacity(lists.len());
    for (label, list) in lists {
        let calc = ExactCalculator::new(&list).unwrap_or_else(|e| fail(format!("{label}: {e}")));
        let estimate = calc.expected_comparisons(&defenders);
        print_estimate(&label, &calc, &estimate);
        reports.push(ExactReport {
            label,
            tiers: calc.tiers().clone(),
            permutations: calc.table().len(),
            estimate,
        });
    }

    if let Some(path) = output {
        write_json(path, &reports);
    }
}

fn print_estimate(label: &str, calc: &ExactCalculator, estimate: &ExactEstimate) {
    println!("\n{}", "=".repeat(60));
    println!(
        "  {label}: {} tiers, {} orderings",
        calc.tiers().len(),
        calc.table().len()
    );
    println!("{}", "=".repeat(60));
    println!(
        "  {:<22} {:>10} {:>14}",
        "Defender bucket", "Share", "Tests / def."
    );
    println!("  {}", "-".repeat(48));
    for b in &estimate.buckets {
        println!(
            "  {:<22} {:>9.2}% {:>14.4}",
            bucket_label(&b.bucket),
            100.0 * b.mass,
            b.expected_tests
        );
    }
    println!();
    println!("  Expected comparisons: {:.3}", estimate.expected);
    println!("  Naive comparisons:    {}", estimate.naive);
    println!("  Percent of naive:     {:.2}%", 100.0 * estimate.reduction());
    if estimate.ties > 0 {
        println!("  Defenders on a tier:  {}", estimate.ties);
    }
}

fn bucket_label(bucket: &Bucket) -> String {
    match *bucket {
        Bucket::Below { lowest } => format!("below {lowest}"),
        Bucket::Between { lower, upper } => format!("[{lower}, {upper})"),
        Bucket::Above { highest } => format!("{highest} and up"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_labels() {
        assert_eq!(bucket_label(&Bucket::Below { lowest: 31.0 }), "below 31");
        assert_eq!(
            bucket_label(&Bucket::Between {
                lower: 31.0,
                upper: 61.5
            }),
            "[31, 61.5)"
        );
        assert_eq!(bucket_label(&Bucket::Above { highest: 121.0 }), "121 and up");
    }
}
