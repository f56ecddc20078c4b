/*!
 * Simulated IO system.
 *
 * `SimIO` is an in-process backend that behaves like a real transport: it
 * lists configurable devices, holds per-device property state, and runs a
 * sample pump task per connection that emits IMU samples at the configured
 * rate while streaming is enabled. It backs the integration tests and lets
 * applications develop against the session API without hardware.
 */
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use sensorlink_core::value::Value;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, trace, warn};

use crate::error::{ClientError, Result};
use crate::event::{ImuData, SensorEvent};
use crate::handle::{ComponentId, ComponentInfo, SensorDesc, SensorId, COMPONENT_TYPE_IMU};
use crate::io::{EventSink, IoSystem, PropertyTarget, SensorDevice};
use crate::properties::Property;

/// The IO-type name of the simulated backend
pub const SIM_IO_TYPE: &str = "SimIO";

/// The device name of the default simulated sensor
pub const SIM_DEFAULT_SENSOR: &str = "TestSensor";

const DEFAULT_SAMPLE_PERIOD: Duration = Duration::from_millis(5);

/// Blueprint for one simulated device
#[derive(Debug, Clone)]
pub struct SimSensorSpec {
    /// The device name reported during listing
    pub name: String,
    /// The device serial number
    pub serial: Option<String>,
    /// Backend-specific address
    pub identifier: u64,
    /// Whether connection attempts succeed
    pub reachable: bool,
}

impl SimSensorSpec {
    /// A reachable device with the given name and address
    pub fn new<S: Into<String>>(name: S, identifier: u64) -> Self {
        Self {
            name: name.into(),
            serial: Some(format!("SIM-{:04}", identifier)),
            identifier,
            reachable: true,
        }
    }

    /// Mark the device as unreachable; connects to it will fail
    pub fn unreachable(mut self) -> Self {
        self.reachable = false;
        self
    }

    fn desc(&self) -> SensorDesc {
        SensorDesc {
            name: self.name.clone(),
            serial: self.serial.clone(),
            io_type: SIM_IO_TYPE.to_string(),
            identifier: self.identifier,
        }
    }
}

/// Handle to one live simulated connection, kept for fault injection
#[derive(Debug)]
struct SimLink {
    name: String,
    sensor_id: SensorId,
    connected: Arc<AtomicBool>,
    sink: EventSink,
}

/// The simulated IO system
#[derive(Debug)]
pub struct SimIoSystem {
    specs: Mutex<Vec<SimSensorSpec>>,
    sample_period: Duration,
    links: Mutex<Vec<SimLink>>,
}

impl SimIoSystem {
    /// Create the backend with the default `TestSensor` device
    pub fn new() -> Self {
        Self::with_sample_period(DEFAULT_SAMPLE_PERIOD)
    }

    /// Create the backend with a custom sample period for new connections
    pub fn with_sample_period(sample_period: Duration) -> Self {
        Self {
            specs: Mutex::new(vec![SimSensorSpec::new(SIM_DEFAULT_SENSOR, 0)]),
            sample_period,
            links: Mutex::new(Vec::new()),
        }
    }

    /// Add a device blueprint to the backend
    pub async fn add_sensor(&self, spec: SimSensorSpec) {
        self.specs.lock().await.push(spec);
    }

    /// Remove all device blueprints, including the default one
    pub async fn clear_sensors(&self) {
        self.specs.lock().await.clear();
    }

    /// Simulate a connection loss on a connected device
    ///
    /// Stops the device's sample pump and emits `SensorDisconnected` into
    /// the owning session. Returns the affected sensor id, or `None` if no
    /// connection with that name is live.
    pub async fn drop_connection(&self, name: &str) -> Option<SensorId> {
        let mut links = self.links.lock().await;
        // Connections torn down through `disconnect` leave dead links behind
        links.retain(|l| l.connected.load(Ordering::Acquire));
        let pos = links.iter().position(|l| l.name == name)?;
        let link = links.remove(pos);
        drop(links);

        link.connected.store(false, Ordering::Release);
        warn!(sensor = %link.sensor_id, "Simulating connection loss");
        link.sink
            .send(SensorEvent::SensorDisconnected {
                sensor: link.sensor_id,
            })
            .await;
        Some(link.sensor_id)
    }
}

impl Default for SimIoSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IoSystem for SimIoSystem {
    fn name(&self) -> &str {
        SIM_IO_TYPE
    }

    async fn list_devices(&self) -> Result<Vec<SensorDesc>> {
        let specs = self.specs.lock().await;
        Ok(specs.iter().map(SimSensorSpec::desc).collect())
    }

    async fn connect(
        &self,
        desc: &SensorDesc,
        sensor_id: SensorId,
        sink: EventSink,
    ) -> Result<Box<dyn SensorDevice>> {
        let spec = {
            let specs = self.specs.lock().await;
            specs
                .iter()
                .find(|s| s.name == desc.name)
                .cloned()
                .ok_or_else(|| ClientError::SensorNotFound {
                    io_type: SIM_IO_TYPE.to_string(),
                    name: desc.name.clone(),
                })?
        };

        if !spec.reachable {
            return Err(ClientError::ConnectionFailed(format!(
                "simulated device {} is unreachable",
                spec.name
            )));
        }

        let device = SimSensorDevice::start(&spec, sensor_id, sink.clone(), self.sample_period);

        let mut links = self.links.lock().await;
        links.push(SimLink {
            name: spec.name,
            sensor_id,
            connected: Arc::clone(&device.connected),
            sink,
        });

        debug!(sensor = %sensor_id, "Simulated sensor connected");
        Ok(Box::new(device))
    }
}

const IMU_COMPONENT_ID: ComponentId = ComponentId(1);

/// One live simulated device connection
#[derive(Debug)]
pub struct SimSensorDevice {
    sensor_props: Mutex<HashMap<Property, Value>>,
    imu_props: Mutex<HashMap<Property, Value>>,
    streaming: Arc<AtomicBool>,
    connected: Arc<AtomicBool>,
    period_us: Arc<AtomicU64>,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl SimSensorDevice {
    fn start(
        spec: &SimSensorSpec,
        sensor_id: SensorId,
        sink: EventSink,
        sample_period: Duration,
    ) -> Self {
        let mut sensor_props = HashMap::new();
        sensor_props.insert(Property::DeviceName, Value::String(spec.name.clone()));
        sensor_props.insert(
            Property::SerialNumber,
            Value::String(spec.serial.clone().unwrap_or_default()),
        );
        sensor_props.insert(
            Property::FirmwareVersion,
            Value::Int32Array(vec![1, 2, 0]),
        );
        sensor_props.insert(Property::BatteryLevel, Value::Float(100.0));
        sensor_props.insert(Property::BatteryCharging, Value::Bool(false));
        sensor_props.insert(Property::TimeOffset, Value::Int32(0));

        let mut imu_props = HashMap::new();
        imu_props.insert(Property::StreamData, Value::Bool(false));
        imu_props.insert(Property::SamplingRate, Value::Int32(200));
        imu_props.insert(Property::OutputQuat, Value::Bool(true));
        imu_props.insert(Property::OutputEuler, Value::Bool(false));
        imu_props.insert(Property::AccBias, Value::FloatArray(vec![0.0; 3]));
        imu_props.insert(Property::GyrBias, Value::FloatArray(vec![0.0; 3]));
        imu_props.insert(Property::MagBias, Value::FloatArray(vec![0.0; 3]));
        imu_props.insert(Property::FilterMode, Value::Int32(0));

        let streaming = Arc::new(AtomicBool::new(false));
        let connected = Arc::new(AtomicBool::new(true));
        let period_us = Arc::new(AtomicU64::new(sample_period.as_micros() as u64));

        let pump = tokio::spawn(run_pump(
            sink,
            sensor_id,
            Arc::clone(&streaming),
            Arc::clone(&connected),
            Arc::clone(&period_us),
        ));

        Self {
            sensor_props: Mutex::new(sensor_props),
            imu_props: Mutex::new(imu_props),
            streaming,
            connected,
            period_us,
            pump: Mutex::new(Some(pump)),
        }
    }

    fn check_component(&self, target: PropertyTarget) -> Result<bool> {
        match target {
            PropertyTarget::Sensor => Ok(false),
            PropertyTarget::Component(id) if id == IMU_COMPONENT_ID => Ok(true),
            PropertyTarget::Component(_) => Err(ClientError::InvalidHandle),
        }
    }
}

/// Emits IMU samples while streaming is enabled; exits once the device is
/// disconnected or the session queue closes.
async fn run_pump(
    sink: EventSink,
    sensor_id: SensorId,
    streaming: Arc<AtomicBool>,
    connected: Arc<AtomicBool>,
    period_us: Arc<AtomicU64>,
) {
    let started = Instant::now();
    let mut frame_count = 0u64;

    while connected.load(Ordering::Acquire) {
        let period = Duration::from_micros(period_us.load(Ordering::Acquire).max(1));
        time::sleep(period).await;

        if !streaming.load(Ordering::Acquire) {
            continue;
        }

        let data = ImuData {
            timestamp: started.elapsed().as_secs_f64(),
            frame_count,
            a: [0.0, 0.0, 9.81],
            g: [0.0, 0.0, 0.0],
            q: [1.0, 0.0, 0.0, 0.0],
        };
        frame_count += 1;

        let delivered = sink
            .send(SensorEvent::ImuSample {
                sensor: sensor_id,
                component: IMU_COMPONENT_ID,
                data,
            })
            .await;
        if !delivered {
            break;
        }
    }

    trace!(sensor = %sensor_id, frames = frame_count, "Sample pump stopped");
}

#[async_trait]
impl SensorDevice for SimSensorDevice {
    fn components(&self) -> Vec<ComponentInfo> {
        vec![ComponentInfo {
            id: IMU_COMPONENT_ID,
            component_type: COMPONENT_TYPE_IMU.to_string(),
        }]
    }

    async fn get_property(&self, target: PropertyTarget, property: Property) -> Result<Value> {
        let props = if self.check_component(target)? {
            self.imu_props.lock().await
        } else {
            self.sensor_props.lock().await
        };
        props
            .get(&property)
            .cloned()
            .ok_or(ClientError::UnsupportedProperty(property))
    }

    async fn set_property(
        &self,
        target: PropertyTarget,
        property: Property,
        value: Value,
    ) -> Result<()> {
        let is_component = self.check_component(target)?;

        // Resolve support for the addressed target first; a rejected write
        // must leave the device state untouched
        let mut props = if is_component {
            self.imu_props.lock().await
        } else {
            self.sensor_props.lock().await
        };
        if !props.contains_key(&property) {
            return Err(ClientError::UnsupportedProperty(property));
        }

        match property {
            Property::StreamData => {
                if let Some(on) = value.as_bool() {
                    self.streaming.store(on, Ordering::Release);
                }
            }
            Property::SamplingRate => {
                let rate = value.as_int32().unwrap_or(0);
                if rate <= 0 {
                    return Err(ClientError::InvalidValue {
                        property,
                        reason: format!("sampling rate must be positive, got {}", rate),
                    });
                }
                self.period_us
                    .store(1_000_000 / rate as u64, Ordering::Release);
            }
            _ => {}
        }

        props.insert(property, value);
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        self.connected.store(false, Ordering::Release);
        self.streaming.store(false, Ordering::Release);
        if let Some(pump) = self.pump.lock().await.take() {
            pump.abort();
        }
        Ok(())
    }
}
