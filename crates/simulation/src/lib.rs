//! Tick-driven simulation of a compiled sensor graph.
//!
//! [`SensorGraphSimulator`] drives a graph with synthetic timed inputs: one
//! `system_tick` per simulated second, `user_tick` at the configured
//! interval, and `battery_voltage` every ten ticks. [`step`] injects precise
//! manual inputs without advancing the clock; [`run`] advances it until a
//! registered stop condition reports true.
//!
//! Everything is synchronous and single-threaded, mirroring the engine's
//! contract. The only wall-clock blocking is the optional one-tick-per-second
//! pacing of a non-accelerated `run`.
//!
//! [`step`]: SensorGraphSimulator::step
//! [`run`]: SensorGraphSimulator::run

mod simulator;
mod stop_conditions;
mod trace;

pub use simulator::SensorGraphSimulator;
pub use stop_conditions::{ArgumentError, StopCondition, StopConditionRegistry};
pub use trace::SimulationTrace;
