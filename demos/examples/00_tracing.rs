use pulse_demos::common::engine;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Suggested: RUST_LOG=info,pulse=debug,pulse_sources=debug,pulse_cache=debug
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
        .try_init();

    let pulse = engine()?;

    // Cold resolution goes upstream, the repeat is a memory hit.
    let _ = pulse.resolve_series("WALCL", 90).await?;
    let _ = pulse.resolve_series("WALCL", 90).await?;

    // Derived weekly series resolve their base first.
    let _ = pulse.resolve_series("UST_REDEMPTIONS_W", 90).await?;

    let _ = pulse.indicator_live("net_liq", 90).await?;
    Ok(())
}
