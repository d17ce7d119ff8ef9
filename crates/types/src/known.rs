//! Well-known system streams and configuration keys.
//!
//! These ids mirror the firmware's fixed assignments. The simulator produces
//! the tick and battery streams itself; the connection events come from the
//! device's communication layer (or from test inputs).

use crate::{DataStream, StreamKind};

/// One reading per simulated second, value = tick count.
pub const SYSTEM_TICK: DataStream = DataStream::new(StreamKind::System, 2);

/// Configurable fast tick, produced every [`CONFIG_USER_TICK`] seconds.
pub const USER_TICK: DataStream = DataStream::new(StreamKind::System, 3);

/// Battery voltage in 16.16 fixed-point volts, every 10 seconds.
pub const BATTERY_VOLTAGE: DataStream = DataStream::new(StreamKind::System, 5);

/// Pushed once at power-on / start of a simulation run.
pub const SYSTEM_RESET: DataStream = DataStream::new(StreamKind::System, 1024);

/// A client connected to the device.
pub const SYSTEM_CONNECT: DataStream = DataStream::new(StreamKind::System, 1025);

/// A client disconnected from the device.
pub const SYSTEM_DISCONNECT: DataStream = DataStream::new(StreamKind::System, 1026);

/// Controller config key holding the user tick interval in seconds.
/// A value of 0 disables the user tick.
pub const CONFIG_USER_TICK: u16 = 0x2066;
