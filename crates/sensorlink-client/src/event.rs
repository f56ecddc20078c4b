/*!
 * The client event stream.
 *
 * Everything asynchronous in a session — discovery results, listing
 * progress, connection loss, and data samples — is delivered as a tagged
 * [`SensorEvent`] through one ordered queue per client. Events are
 * consumed strictly in arrival order via
 * [`SensorClient::wait_for_next_event`](crate::SensorClient::wait_for_next_event).
 */
use serde::{Deserialize, Serialize};

use crate::handle::{ComponentId, SensorDesc, SensorId};

/// One inertial measurement sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImuData {
    /// Sampling time in seconds since the stream started
    pub timestamp: f64,
    /// Index of the data frame, consecutive within one stream
    pub frame_count: u64,
    /// Calibrated accelerometer data in m/s^2
    pub a: [f32; 3],
    /// Calibrated gyroscope data in degree/s
    pub g: [f32; 3],
    /// Orientation quaternion (w, x, y, z)
    pub q: [f32; 4],
}

/// Discriminant for [`SensorEvent`] variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorEventKind {
    /// A sensor was discovered during an asynchronous listing
    SensorFound,
    /// Progress of an asynchronous listing
    SensorListingProgress,
    /// A sensor connection was lost
    SensorDisconnected,
    /// An IMU data sample
    ImuSample,
    /// The session was shut down
    SessionClosed,
}

/// An event pulled from the client's ordered event queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type")]
pub enum SensorEvent {
    /// A sensor was discovered during an asynchronous listing
    SensorFound {
        /// Descriptor that can be passed to `obtain_sensor`
        desc: SensorDesc,
    },
    /// Progress of an asynchronous listing
    ///
    /// Exactly one event per listing pass carries `complete == true`;
    /// it is the sole termination signal of the pass.
    SensorListingProgress {
        /// Fraction of the listing completed, in `0.0..=1.0`
        progress: f32,
        /// Whether the listing has finished
        complete: bool,
    },
    /// A sensor connection was lost
    SensorDisconnected {
        /// The affected sensor
        sensor: SensorId,
    },
    /// An IMU data sample
    ImuSample {
        /// The sensor that produced the sample
        sensor: SensorId,
        /// The component that produced the sample
        component: ComponentId,
        /// The sample payload
        data: ImuData,
    },
    /// The session was shut down; no further events will follow
    SessionClosed,
}

impl SensorEvent {
    /// The discriminant of this event
    pub fn kind(&self) -> SensorEventKind {
        match self {
            SensorEvent::SensorFound { .. } => SensorEventKind::SensorFound,
            SensorEvent::SensorListingProgress { .. } => SensorEventKind::SensorListingProgress,
            SensorEvent::SensorDisconnected { .. } => SensorEventKind::SensorDisconnected,
            SensorEvent::ImuSample { .. } => SensorEventKind::ImuSample,
            SensorEvent::SessionClosed => SensorEventKind::SessionClosed,
        }
    }

    /// The sensor this event concerns, when it concerns one
    pub fn sensor_id(&self) -> Option<SensorId> {
        match self {
            SensorEvent::SensorDisconnected { sensor } => Some(*sensor),
            SensorEvent::ImuSample { sensor, .. } => Some(*sensor),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let event = SensorEvent::SessionClosed;
        assert_eq!(event.kind(), SensorEventKind::SessionClosed);

        let event = SensorEvent::SensorListingProgress {
            progress: 1.0,
            complete: true,
        };
        assert_eq!(event.kind(), SensorEventKind::SensorListingProgress);
        assert_eq!(event.sensor_id(), None);
    }

    #[test]
    fn test_sensor_id() {
        let event = SensorEvent::ImuSample {
            sensor: SensorId(2),
            component: ComponentId(1),
            data: ImuData {
                timestamp: 0.0,
                frame_count: 0,
                a: [0.0; 3],
                g: [0.0; 3],
                q: [1.0, 0.0, 0.0, 0.0],
            },
        };
        assert_eq!(event.sensor_id(), Some(SensorId(2)));
    }

    #[test]
    fn test_event_payload_shape() {
        // The serialized form carries the discriminant and the documented
        // sample fields, which callers on the other side of a binding rely on.
        let event = SensorEvent::ImuSample {
            sensor: SensorId(1),
            component: ComponentId(1),
            data: ImuData {
                timestamp: 0.25,
                frame_count: 3,
                a: [0.0, 0.0, 9.81],
                g: [0.1, 0.2, 0.3],
                q: [1.0, 0.0, 0.0, 0.0],
            },
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "ImuSample");
        assert_eq!(json["data"]["a"].as_array().unwrap().len(), 3);
        assert_eq!(json["data"]["g"].as_array().unwrap().len(), 3);
        assert_eq!(json["data"]["q"].as_array().unwrap().len(), 4);

        let progress = SensorEvent::SensorListingProgress {
            progress: 0.5,
            complete: false,
        };
        let json = serde_json::to_value(&progress).unwrap();
        assert_eq!(json["event_type"], "SensorListingProgress");
        assert_eq!(json["complete"], false);
    }
}
