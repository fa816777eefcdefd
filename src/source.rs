//! Position sample delivery.
//!
//! The recorder consumes a stream of [`SampleEvent`]s; in production that
//! stream comes from the host's subscription mechanism. The mock loop here
//! stands in for it when running standalone, emitting a slow drift away
//! from a fixed starting point.

use chrono::Utc;
use log::debug;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::Sender;
use tokio::time::{interval, Duration};

use crate::position::{DepthReading, PositionSample};
use crate::recorder::m_per_s_to_knots;

/// One delivery from the host: the position report plus the current
/// speed-over-ground and depth readings queried alongside it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SampleEvent {
    pub sample: PositionSample,
    pub sog_knots: f64,
    pub depth: Option<DepthReading>,
}

/// A recorded sample log for replay.
#[derive(Debug, Serialize, Deserialize)]
pub struct SampleLog {
    pub events: Vec<SampleEvent>,
}

pub async fn mock_position_loop(tx: Sender<SampleEvent>, period_secs: u64) {
    let mut ticker = interval(Duration::from_secs(period_secs.max(1)));
    let mut seq = 0u64;

    loop {
        ticker.tick().await;

        let event = mock_sample(seq);
        seq += 1;

        match tx.try_send(event) {
            Ok(_) => {
                if seq % 10 == 0 {
                    debug!("[source] {seq} samples emitted");
                }
            }
            Err(tokio::sync::mpsc::error::TrySendError::Closed(_)) => {
                debug!("[source] channel closed after {seq} samples");
                break;
            }
            Err(tokio::sync::mpsc::error::TrySendError::Full(_)) => {
                // receiver is behind; drop this sample
            }
        }
    }
}

fn mock_sample(seq: u64) -> SampleEvent {
    let t = seq as f64;
    SampleEvent {
        sample: PositionSample {
            source: "mock".to_string(),
            ts: Utc::now(),
            latitude: 47.6062 + t * 0.0008,
            longitude: -122.3321 + t * 0.0003,
        },
        // the host reports speed over ground in m/s
        sog_knots: m_per_s_to_knots(2.3 + (t * 0.5).sin()),
        depth: Some(DepthReading {
            ts: Utc::now(),
            meters: 12.0 + (t * 0.2).sin() * 3.0,
        }),
    }
}
