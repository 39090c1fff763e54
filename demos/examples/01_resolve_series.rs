use pulse_demos::common::engine;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Build the engine (fixtures when PULSE_DEMOS_USE_FIXTURES is set).
    let pulse = engine()?;

    // 2. Resolve the Fed balance sheet over the last 90 days.
    let walcl = pulse.resolve_series("WALCL", 90).await?;
    println!(
        "{} from {}: {} observations",
        walcl.series_id,
        walcl.source,
        walcl.items.len()
    );

    // 3. Print the latest few points.
    for p in walcl.items.iter().rev().take(5) {
        println!("  {}  {:>20.0}", p.date, p.value);
    }
    Ok(())
}
