use pulse_demos::common::engine;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let pulse = engine()?;
    let report = pulse.snapshot().await;

    println!(
        "Regime: {:?} (tilt {}, score {} / {})",
        report.regime.label, report.regime.tilt, report.regime.score, report.regime.max_score
    );
    for row in &report.indicators {
        let z = row.z20.map_or_else(|| "-".to_string(), |z| format!("{z:+.2}"));
        println!(
            "  {:<32} {:>8}  {}  {}",
            row.name,
            z,
            row.obs_date,
            row.status.label()
        );
    }
    for w in &report.warnings {
        println!("  warning: {w}");
    }

    // Reports serialize for transport as-is.
    let json = serde_json::to_string(&report.regime)?;
    println!("{json}");
    Ok(())
}
