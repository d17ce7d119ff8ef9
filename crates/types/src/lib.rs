//! Core types for SensorGraph.
//!
//! This crate provides the foundational value types used throughout the
//! compiler and runtime:
//!
//! - **Streams**: [`DataStream`], [`StreamKind`], [`DataStreamSelector`]
//! - **Destinations**: [`SlotIdentifier`]
//! - **Data**: [`Reading`], [`ConfigType`]
//! - **Operators**: [`CompareOp`], [`Combiner`]
//! - **Device description**: [`DeviceModel`]
//! - **Well-known streams**: the [`known`] module
//!
//! # Design Philosophy
//!
//! This crate is self-contained with minimal dependencies. It does not depend
//! on any other workspace crates, making it the foundation layer. All types
//! here are immutable value types: a stream's identity never changes for the
//! life of a graph, and a reading is never mutated after creation.

mod config;
mod model;
mod ops;
mod reading;
mod selector;
mod slot;
mod stream;

pub mod known;

pub use config::ConfigType;
pub use model::DeviceModel;
pub use ops::{Combiner, CompareOp};
pub use reading::Reading;
pub use selector::DataStreamSelector;
pub use slot::SlotIdentifier;
pub use stream::{DataStream, StreamKind};

use thiserror::Error;

/// Error parsing the textual form of a stream, selector, or slot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The kind word was not one of the recognized stream kinds.
    #[error("unknown stream kind '{kind}'")]
    UnknownKind {
        /// The word that failed to parse as a kind.
        kind: String,
    },

    /// The numeric id was missing or not a valid u16.
    #[error("invalid or missing stream id in '{text}'")]
    InvalidId {
        /// The full text being parsed.
        text: String,
    },

    /// The text did not match any recognized form.
    #[error("unrecognized syntax '{text}'")]
    Unrecognized {
        /// The full text being parsed.
        text: String,
    },
}
