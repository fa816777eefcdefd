//! Per-sample retention decisions.
//!
//! Keeps the buffer from growing while the vessel sits at anchor or at the
//! dock: a sample is only recorded when the vessel is moving fast enough
//! and has travelled far enough from the last recorded point.

use log::debug;

use crate::geo::haversine_distance_m;
use crate::position::Position;

/// Outcome of offering one sample to the filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterDecision {
    /// First sample of the session; recorded unconditionally so later
    /// distance comparisons have a reference point.
    Bootstrap,
    /// Passed the speed and distance gates; recorded.
    Accept,
    /// Gated out; not recorded.
    Reject,
}

impl FilterDecision {
    pub fn is_accepted(self) -> bool {
        !matches!(self, FilterDecision::Reject)
    }
}

pub struct PositionFilter {
    minimum_speed_knots: f64,
    minimum_distance_meters: f64,
    last_recorded: Option<Position>,
}

impl PositionFilter {
    /// A minimum of 0 disables the corresponding gate.
    pub fn new(minimum_speed_knots: f64, minimum_distance_meters: f64) -> Self {
        PositionFilter {
            minimum_speed_knots,
            minimum_distance_meters,
            last_recorded: None,
        }
    }

    /// The most recently retained point, not merely the most recent sample.
    pub fn last_recorded(&self) -> Option<&Position> {
        self.last_recorded.as_ref()
    }

    /// Decide whether `sample` should be recorded, without committing it.
    /// Callers that persist accepted points append to their store first and
    /// then call [`record`](Self::record), so a failed append leaves the
    /// reference point unchanged.
    pub fn evaluate(&self, sample: &Position, sog_knots: f64) -> FilterDecision {
        let last = match &self.last_recorded {
            None => return FilterDecision::Bootstrap,
            Some(last) => last,
        };

        let distance = haversine_distance_m(
            last.latitude,
            last.longitude,
            sample.latitude,
            sample.longitude,
        );
        debug!(
            "filter: sog={:.2}kn (min {:.2}) distance={:.2}m (min {:.2})",
            sog_knots, self.minimum_speed_knots, distance, self.minimum_distance_meters
        );

        if sog_knots >= self.minimum_speed_knots && distance >= self.minimum_distance_meters {
            FilterDecision::Accept
        } else {
            FilterDecision::Reject
        }
    }

    /// Make `sample` the new reference point.
    pub fn record(&mut self, sample: &Position) {
        self.last_recorded = Some(sample.clone());
    }

    /// Evaluate and, on acceptance, immediately record.
    pub fn offer(&mut self, sample: &Position, sog_knots: f64) -> FilterDecision {
        let decision = self.evaluate(sample, sog_knots);
        if decision.is_accepted() {
            self.record(sample);
        }
        decision
    }
}
