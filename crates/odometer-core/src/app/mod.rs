//! Boot orchestration: what the matrix shows from power-on until the device
//! settles into serving control requests.

use core::net::Ipv4Addr;

use embedded_hal_async::delay::DelayNs;
use log::{debug, info, warn};

use crate::{
    animation::{AnimationEngine, UpdateOutcome},
    control::{self, ControlError, ControlReply, ControlRequest, RESTART_BANNER},
    format::{DistanceKm, format_ip},
    render::FrameSink,
    store::DistanceStore,
    strava::{FetchError, GearReading},
};

/// Static text for any unrecoverable boot failure.
pub const ERROR_TEXT: &str = "Error";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AppConfig {
    /// Pause after each informational scroll (gear name, IP).
    pub scroll_pause_ms: u32,
    /// Pause between the restart banner and the reset.
    pub restart_pause_ms: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scroll_pause_ms: 1_000,
            restart_pause_ms: 500,
        }
    }
}

/// How a freshly fetched distance gets onto the matrix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DistancePlan {
    /// Nothing stored: count up from zero.
    CountUp(DistanceKm),
    /// A previous value exists; small changes render directly.
    Update { old: DistanceKm, new: DistanceKm },
}

impl DistancePlan {
    pub fn for_reading(previous: Option<DistanceKm>, fetched: DistanceKm) -> Self {
        match previous {
            None => Self::CountUp(fetched),
            Some(old) => Self::Update { old, new: fetched },
        }
    }

    pub fn target(&self) -> DistanceKm {
        match self {
            Self::CountUp(target) => *target,
            Self::Update { new, .. } => *new,
        }
    }
}

/// What ended up on the matrix after [`OdometerApp::present`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Presented {
    CountedUp(DistanceKm),
    Updated {
        distance: DistanceKm,
        outcome: UpdateOutcome,
    },
    /// Fetch failed; the last stored value is shown.
    Stale(DistanceKm),
    /// Fetch failed and nothing was stored.
    Failed,
}

pub struct OdometerApp<S, D, St> {
    engine: AnimationEngine<S, D>,
    store: St,
    config: AppConfig,
}

impl<S, D, St> OdometerApp<S, D, St>
where
    S: FrameSink,
    D: DelayNs,
    St: DistanceStore,
{
    pub fn new(engine: AnimationEngine<S, D>, store: St, config: AppConfig) -> Self {
        Self {
            engine,
            store,
            config,
        }
    }

    pub fn store(&self) -> &St {
        &self.store
    }

    /// Last persisted distance; a failing store reads as "nothing stored".
    pub fn last_distance(&mut self) -> Option<DistanceKm> {
        match self.store.load() {
            Ok(distance) => distance,
            Err(err) => {
                warn!("store: load failed err={:?}", err);
                None
            }
        }
    }
}

include!("boot.rs");
include!("remote.rs");

#[cfg(test)]
mod tests;
