//! Application state for the web layer.

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use tokio::sync::Mutex;

use crate::allocation::AllocationConfig;
use crate::store::ScheduleStore;

/// Source of "now" for eligibility checks.
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Shared application state.
///
/// Requests that change the schedule hold the store lock from load to
/// replace, so bookings are applied one at a time.
#[derive(Clone)]
pub struct AppState {
    /// Live schedule and presets
    pub store: Arc<Mutex<Box<dyn ScheduleStore>>>,

    /// Allocation settings
    pub config: Arc<AllocationConfig>,

    clock: Clock,
}

impl AppState {
    /// Create a new app state using the local wall clock.
    pub fn new(store: impl ScheduleStore + 'static, config: AllocationConfig) -> Self {
        let store: Box<dyn ScheduleStore> = Box::new(store);
        Self {
            store: Arc::new(Mutex::new(store)),
            config: Arc::new(config),
            clock: Arc::new(|| Local::now().naive_local()),
        }
    }

    /// Use a fixed or simulated clock.
    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDateTime + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn now(&self) -> NaiveDateTime {
        (self.clock)()
    }
}
