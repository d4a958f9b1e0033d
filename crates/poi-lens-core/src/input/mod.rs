//! Sensor input abstraction
//!
//! Location fixes and compass headings arrive as two independent,
//! unordered streams. Each is exposed as a cancellable [`Subscription`];
//! [`sensor_events`] merges them into the single event stream the
//! coordinator consumes.

mod event;
mod filter;
mod provider;
mod simulator;

pub use event::{LocationFix, LocationUpdate, SensorEvent};
pub use filter::{FixFilter, HeadingGate};
pub use provider::{
    sensor_events, HeadingProvider, LocationOptions, LocationProvider, Subscription,
};
pub use simulator::{SimulatedHeadingProvider, SimulatedLocationProvider};
