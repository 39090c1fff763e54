use pulse_demos::common::engine;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let pulse = engine()?;

    let _ = pulse.resolve_series("SOFR", 30).await?;
    let _ = pulse.resolve_series("TGA", 30).await?;

    let stats = pulse.cache_stats().await;
    println!("{stats:#?}");

    println!("Fetchable series:");
    for s in pulse.list_series() {
        println!("  {:<20} {:<22} {:?}  {}", s.id, s.source.as_str(), s.cadence, s.name);
    }

    let cleared = pulse.cache_clear().await;
    println!("Deleted {} durable records", cleared.durable_files_deleted);
    Ok(())
}
