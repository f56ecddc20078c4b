/*!
 * The client session.
 *
 * A [`SensorClient`] owns everything a session needs: the IO-system
 * registry, the connected-sensor table, and the single ordered event queue
 * all asynchronous activity funnels into. One client may be active per
 * process at a time; shutting it down frees the slot for the next one.
 */
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use futures::future;
use sensorlink_core::config::{Config, SharedConfig};
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::time;
use tracing::{debug, info, warn};

use crate::error::{ClientError, Result};
use crate::event::SensorEvent;
use crate::handle::{SensorDesc, SensorId};
use crate::io::EventSink;
use crate::registry::IoRegistry;
use crate::sensor::{Sensor, SensorInner};

/// Process-wide flag guarding the single active client slot
static CLIENT_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Lifecycle state of a client session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClientState {
    /// The session is live
    Initialized,
    /// `shutdown` is running
    ShuttingDown,
    /// The session is over; only `SessionClosed` remains observable
    Closed,
}

#[derive(Debug)]
struct ClientInner {
    config: SharedConfig,
    registry: Arc<IoRegistry>,
    state: RwLock<ClientState>,
    sensors: RwLock<HashMap<SensorId, Arc<SensorInner>>>,
    /// Producer side of the event queue; taken during shutdown
    event_tx: Mutex<Option<mpsc::Sender<SensorEvent>>>,
    event_rx: Mutex<mpsc::Receiver<SensorEvent>>,
    next_sensor_id: AtomicU64,
    listing: AtomicBool,
    slot_released: AtomicBool,
}

impl ClientInner {
    fn release_slot(&self) {
        if !self.slot_released.swap(true, Ordering::AcqRel) {
            CLIENT_ACTIVE.store(false, Ordering::Release);
        }
    }
}

impl Drop for ClientInner {
    fn drop(&mut self) {
        // A client dropped without shutdown still frees the process slot
        self.release_slot();
    }
}

/// Handle to the active client session
///
/// Clones share the session; the underlying state lives until the last
/// clone drops or [`shutdown`](SensorClient::shutdown) runs.
#[derive(Debug, Clone)]
pub struct SensorClient {
    inner: Arc<ClientInner>,
}

impl SensorClient {
    /// Initialize a client with default configuration and backends
    pub async fn init() -> Result<Self> {
        Self::init_with_config(Config::default()).await
    }

    /// Initialize a client with the given configuration and the built-in
    /// backends
    pub async fn init_with_config(config: Config) -> Result<Self> {
        let registry = IoRegistry::with_defaults(&config.session).await;
        Self::init_with_registry(config, registry).await
    }

    /// Initialize a client with a caller-assembled backend registry
    pub async fn init_with_registry(config: Config, registry: IoRegistry) -> Result<Self> {
        if CLIENT_ACTIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ClientError::AlreadyInitialized);
        }

        let capacity = config.session.event_queue_capacity.max(1);
        let (tx, rx) = mpsc::channel(capacity);

        let inner = Arc::new(ClientInner {
            config: SharedConfig::new(config),
            registry: Arc::new(registry),
            state: RwLock::new(ClientState::Initialized),
            sensors: RwLock::new(HashMap::new()),
            event_tx: Mutex::new(Some(tx)),
            event_rx: Mutex::new(rx),
            next_sensor_id: AtomicU64::new(1),
            listing: AtomicBool::new(false),
            slot_released: AtomicBool::new(false),
        });

        let io_types = inner.registry.io_types().await;
        info!(?io_types, queue_capacity = capacity, "Client initialized");
        Ok(Self { inner })
    }

    /// The session configuration
    pub fn config(&self) -> &Config {
        self.inner.config.get()
    }

    /// The IO-type names this client can resolve
    pub async fn io_types(&self) -> Vec<String> {
        self.inner.registry.io_types().await
    }

    async fn ensure_live(&self) -> Result<()> {
        let state = self.inner.state.read().await;
        if *state != ClientState::Initialized {
            return Err(ClientError::NotInitialized);
        }
        Ok(())
    }

    pub(crate) async fn event_sink(&self) -> Result<EventSink> {
        let tx = self.inner.event_tx.lock().await;
        tx.as_ref()
            .map(|tx| EventSink::new(tx.clone()))
            .ok_or(ClientError::NotInitialized)
    }

    /// Shut the session down
    ///
    /// Releases all connected sensors, closes the event queue, and frees
    /// the process client slot. Consumers blocked in
    /// [`wait_for_next_event`](Self::wait_for_next_event) observe a final
    /// `SessionClosed`. A second call fails with `NotInitialized`.
    pub async fn shutdown(&self) -> Result<()> {
        {
            let mut state = self.inner.state.write().await;
            if *state != ClientState::Initialized {
                return Err(ClientError::NotInitialized);
            }
            *state = ClientState::ShuttingDown;
        }
        info!("Client shutting down");

        let sensors: Vec<Arc<SensorInner>> = {
            let mut sensors = self.inner.sensors.write().await;
            sensors.drain().map(|(_, s)| s).collect()
        };
        let results = future::join_all(sensors.iter().map(|s| s.invalidate())).await;
        for (sensor, result) in sensors.iter().zip(results) {
            if let Err(e) = result {
                debug!(sensor = %sensor.id(), "Sensor already released: {}", e);
            }
        }

        // The sentinel wakes a blocked consumer immediately; dropping the
        // sender closes the queue once the last backend task exits.
        let tx = self.inner.event_tx.lock().await.take();
        if let Some(tx) = tx {
            let _ = tx.try_send(SensorEvent::SessionClosed);
        }

        {
            let mut state = self.inner.state.write().await;
            *state = ClientState::Closed;
        }
        self.inner.release_slot();
        info!("Client shut down");
        Ok(())
    }

    /// Wait for the next event in arrival order
    ///
    /// Blocks the calling task until an event is available. After shutdown
    /// this returns `SessionClosed` without blocking.
    pub async fn wait_for_next_event(&self) -> SensorEvent {
        {
            let state = self.inner.state.read().await;
            if *state == ClientState::Closed {
                return SensorEvent::SessionClosed;
            }
        }

        let mut rx = self.inner.event_rx.lock().await;
        match rx.recv().await {
            Some(event) => event,
            None => SensorEvent::SessionClosed,
        }
    }

    /// Take the next event if one is queued, without blocking
    ///
    /// Returns `None` when the queue is currently empty, or when another
    /// consumer holds the queue (a concurrent
    /// [`wait_for_next_event`](Self::wait_for_next_event) owns the receiver
    /// while it waits). Returns `Some(SessionClosed)` once the session is
    /// over.
    pub async fn poll_next_event(&self) -> Option<SensorEvent> {
        {
            let state = self.inner.state.read().await;
            if *state == ClientState::Closed {
                return Some(SensorEvent::SessionClosed);
            }
        }

        let mut rx = match self.inner.event_rx.try_lock() {
            Ok(rx) => rx,
            // A blocked waiter owns the receiver; it will consume the
            // next event anyway
            Err(_) => return None,
        };
        match rx.try_recv() {
            Ok(event) => Some(event),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => Some(SensorEvent::SessionClosed),
        }
    }

    /// Start an asynchronous listing pass over all registered IO systems
    ///
    /// Results arrive on the event queue: one `SensorFound` per device,
    /// interleaved with `SensorListingProgress` events of which exactly one
    /// carries `complete == true`. Fails with `ListingInProgress` while a
    /// previous pass is still running.
    pub async fn list_sensors_async(&self) -> Result<()> {
        self.ensure_live().await?;

        if self
            .inner
            .listing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ClientError::ListingInProgress);
        }

        let sink = match self.event_sink().await {
            Ok(sink) => sink,
            Err(e) => {
                self.inner.listing.store(false, Ordering::Release);
                return Err(e);
            }
        };
        let registry = Arc::clone(&self.inner.registry);
        let timeout = self.config().session.discovery_timeout();
        let inner = Arc::clone(&self.inner);

        tokio::spawn(async move {
            run_listing(registry, sink, timeout).await;
            inner.listing.store(false, Ordering::Release);
        });

        Ok(())
    }

    /// Connect to a sensor from a descriptor obtained during discovery
    pub async fn obtain_sensor(&self, desc: &SensorDesc) -> Result<Sensor> {
        self.ensure_live().await?;

        let system = self.inner.registry.get(&desc.io_type).await?;
        let sink = self.event_sink().await?;
        let id = SensorId(self.inner.next_sensor_id.fetch_add(1, Ordering::AcqRel));

        let connect_timeout = self.config().session.connect_timeout();
        let device = match time::timeout(connect_timeout, system.connect(desc, id, sink)).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(name = %desc.name, io_type = %desc.io_type, "Connect timed out");
                return Err(ClientError::Timeout);
            }
        };

        let sensor = Arc::new(SensorInner::new(id, desc.clone(), device));
        self.inner
            .sensors
            .write()
            .await
            .insert(id, Arc::clone(&sensor));

        info!(sensor = %id, name = %desc.name, io_type = %desc.io_type, "Sensor obtained");
        Ok(Sensor::new(sensor))
    }

    /// Connect to a sensor by IO-type and device name
    ///
    /// `identifier` is a backend-specific connect hint (bus address,
    /// baud-rate index, ...). The named IO system resolves the name itself;
    /// an unknown name fails with `SensorNotFound`.
    pub async fn obtain_sensor_by_name(
        &self,
        io_type: &str,
        name: &str,
        identifier: u64,
    ) -> Result<Sensor> {
        let desc = SensorDesc {
            name: name.to_string(),
            serial: None,
            io_type: io_type.to_string(),
            identifier,
        };
        self.obtain_sensor(&desc).await
    }

    /// Look up a connected sensor by its id
    pub async fn get_sensor(&self, id: SensorId) -> Option<Sensor> {
        let sensors = self.inner.sensors.read().await;
        sensors.get(&id).map(|inner| Sensor::new(Arc::clone(inner)))
    }

    /// Release a sensor, tearing down its connection
    ///
    /// Every alias of the sensor (and every component obtained from it)
    /// becomes invalid. Releasing an already-released sensor, or one whose
    /// client has been shut down, fails with `InvalidHandle`.
    pub async fn release_sensor(&self, sensor: &Sensor) -> Result<()> {
        self.inner.sensors.write().await.remove(&sensor.id());
        sensor.inner().invalidate().await
    }
}

/// One listing pass: every backend is queried once, in name order, with a
/// per-backend deadline. Exactly one progress event carries `complete`.
async fn run_listing(registry: Arc<IoRegistry>, sink: EventSink, timeout: std::time::Duration) {
    let systems = registry.all().await;
    let total = systems.len();
    debug!(systems = total, "Listing pass started");

    if total == 0 {
        sink.send(SensorEvent::SensorListingProgress {
            progress: 1.0,
            complete: true,
        })
        .await;
        return;
    }

    for (index, system) in systems.iter().enumerate() {
        match time::timeout(timeout, system.list_devices()).await {
            Ok(Ok(descs)) => {
                for desc in descs {
                    if !sink.send(SensorEvent::SensorFound { desc }).await {
                        return;
                    }
                }
            }
            Ok(Err(e)) => {
                warn!(io_type = system.name(), "Listing failed: {}", e);
            }
            Err(_) => {
                warn!(io_type = system.name(), "Listing timed out");
            }
        }

        let done = index + 1;
        let delivered = sink
            .send(SensorEvent::SensorListingProgress {
                progress: done as f32 / total as f32,
                complete: done == total,
            })
            .await;
        if !delivered {
            return;
        }
    }

    debug!("Listing pass finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::SensorEventKind;
    use serial_test::serial;

    async fn client_with_empty_registry() -> SensorClient {
        SensorClient::init_with_registry(Config::default(), IoRegistry::new())
            .await
            .unwrap()
    }

    #[tokio::test]
    #[serial]
    async fn test_single_client_slot() {
        let client = client_with_empty_registry().await;

        let err = SensorClient::init().await.unwrap_err();
        assert!(matches!(err, ClientError::AlreadyInitialized));

        client.shutdown().await.unwrap();

        // The slot is free again
        let client = SensorClient::init().await.unwrap();
        client.shutdown().await.unwrap();
    }

    #[tokio::test]
    #[serial]
    async fn test_double_shutdown() {
        let client = client_with_empty_registry().await;
        client.shutdown().await.unwrap();

        let err = client.shutdown().await.unwrap_err();
        assert!(matches!(err, ClientError::NotInitialized));
    }

    #[tokio::test]
    #[serial]
    async fn test_dropped_client_frees_slot() {
        {
            let _client = client_with_empty_registry().await;
        }
        let client = client_with_empty_registry().await;
        client.shutdown().await.unwrap();
    }

    #[tokio::test]
    #[serial]
    async fn test_fifo_order() {
        let client = client_with_empty_registry().await;
        let sink = client.event_sink().await.unwrap();

        for i in 0..8u64 {
            sink.send(SensorEvent::SensorDisconnected {
                sensor: SensorId(i),
            })
            .await;
        }

        for i in 0..8u64 {
            let event = client.wait_for_next_event().await;
            assert_eq!(
                event,
                SensorEvent::SensorDisconnected {
                    sensor: SensorId(i)
                }
            );
        }

        client.shutdown().await.unwrap();
    }

    #[tokio::test]
    #[serial]
    async fn test_poll_empty_queue() {
        let client = client_with_empty_registry().await;
        assert_eq!(client.poll_next_event().await, None);

        client.shutdown().await.unwrap();
        assert_eq!(
            client.poll_next_event().await,
            Some(SensorEvent::SessionClosed)
        );
    }

    #[tokio::test]
    #[serial]
    async fn test_poll_returns_immediately_behind_blocked_waiter() {
        let client = client_with_empty_registry().await;

        let waiter = {
            let client = client.clone();
            tokio::spawn(async move { client.wait_for_next_event().await })
        };
        // Let the waiter take the receiver and park on the empty queue
        time::sleep(std::time::Duration::from_millis(50)).await;

        let polled = time::timeout(
            std::time::Duration::from_millis(100),
            client.poll_next_event(),
        )
        .await
        .expect("poll must not park behind a blocked waiter");
        assert_eq!(polled, None);

        client.shutdown().await.unwrap();
        let event = waiter.await.unwrap();
        assert_eq!(event.kind(), SensorEventKind::SessionClosed);
    }

    #[tokio::test]
    #[serial]
    async fn test_wait_after_shutdown() {
        let client = client_with_empty_registry().await;
        client.shutdown().await.unwrap();

        let event = client.wait_for_next_event().await;
        assert_eq!(event.kind(), SensorEventKind::SessionClosed);
        // And again, without blocking
        let event = client.wait_for_next_event().await;
        assert_eq!(event.kind(), SensorEventKind::SessionClosed);
    }

    #[tokio::test]
    #[serial]
    async fn test_listing_empty_registry_completes() {
        let client = client_with_empty_registry().await;
        client.list_sensors_async().await.unwrap();

        let event = client.wait_for_next_event().await;
        assert_eq!(
            event,
            SensorEvent::SensorListingProgress {
                progress: 1.0,
                complete: true
            }
        );

        client.shutdown().await.unwrap();
    }

    #[tokio::test]
    #[serial]
    async fn test_operations_after_shutdown() {
        let client = client_with_empty_registry().await;
        client.shutdown().await.unwrap();

        let err = client.list_sensors_async().await.unwrap_err();
        assert!(matches!(err, ClientError::NotInitialized));

        let desc = SensorDesc {
            name: "TestSensor".into(),
            serial: None,
            io_type: "SimIO".into(),
            identifier: 0,
        };
        let err = client.obtain_sensor(&desc).await.unwrap_err();
        assert!(matches!(err, ClientError::NotInitialized));
    }

    #[tokio::test]
    #[serial]
    async fn test_unknown_io_type() {
        let client = client_with_empty_registry().await;

        let err = client
            .obtain_sensor_by_name("Bluetooth", "TestSensor", 0)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::UnsupportedIoType(t) if t == "Bluetooth"));

        client.shutdown().await.unwrap();
    }
}
