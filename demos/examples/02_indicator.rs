use pulse_demos::common::engine;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let pulse = engine()?;

    for id in ["net_liq", "sofr_iorb", "ust_net_w", "bill_share_w"] {
        let res = pulse.indicator_live(id, 120).await?;
        match res.items.last() {
            Some(latest) => println!(
                "{:<32} {:>8} points, latest {} = {:.4}",
                res.name,
                res.items.len(),
                latest.date,
                latest.value
            ),
            None => println!("{:<32} no data", res.name),
        }
    }
    Ok(())
}
