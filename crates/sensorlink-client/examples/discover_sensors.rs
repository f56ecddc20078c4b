//! Runs one asynchronous discovery pass and prints every sensor found.
//!
//! Run with: cargo run --example discover_sensors

use anyhow::Result;
use sensorlink_client::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    sensorlink_core::logging::init_with_filter("info")?;

    let client = SensorClient::init().await?;
    println!("IO systems: {:?}", client.io_types().await);

    client.list_sensors_async().await?;
    loop {
        match client.wait_for_next_event().await {
            SensorEvent::SensorFound { desc } => {
                println!(
                    "found {} on {} (identifier {})",
                    desc.name, desc.io_type, desc.identifier
                );
            }
            SensorEvent::SensorListingProgress { progress, complete } => {
                println!("listing {:.0}% done", progress * 100.0);
                if complete {
                    break;
                }
            }
            SensorEvent::SessionClosed => break,
            _ => {}
        }
    }

    client.shutdown().await?;
    Ok(())
}
