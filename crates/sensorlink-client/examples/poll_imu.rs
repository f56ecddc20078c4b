//! Connects to the simulated sensor, enables streaming, and prints a few
//! IMU samples pulled from the event queue.
//!
//! Run with: cargo run --example poll_imu

use anyhow::Result;
use sensorlink_client::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    sensorlink_core::logging::init_with_filter("info")?;

    let client = SensorClient::init().await?;
    let sensor = client.obtain_sensor_by_name("SimIO", "TestSensor", 0).await?;
    println!(
        "connected to {} (serial {:?})",
        sensor.name(),
        sensor.desc().serial
    );

    let imu = sensor
        .get_any_component_of_type(COMPONENT_TYPE_IMU)
        .await
        .ok_or_else(|| anyhow::anyhow!("sensor has no IMU component"))?;
    imu.set_property(Property::StreamData, true).await?;

    let mut samples = 0;
    while samples < 20 {
        match client.wait_for_next_event().await {
            SensorEvent::ImuSample { data, .. } => {
                println!(
                    "t={:.3}s frame={} a=[{:.2} {:.2} {:.2}] g=[{:.2} {:.2} {:.2}]",
                    data.timestamp,
                    data.frame_count,
                    data.a[0],
                    data.a[1],
                    data.a[2],
                    data.g[0],
                    data.g[1],
                    data.g[2],
                );
                samples += 1;
            }
            SensorEvent::SensorDisconnected { sensor } => {
                println!("{} disconnected", sensor);
                break;
            }
            SensorEvent::SessionClosed => break,
            _ => {}
        }
    }

    imu.set_property(Property::StreamData, false).await?;
    client.release_sensor(&sensor).await?;
    client.shutdown().await?;
    Ok(())
}
