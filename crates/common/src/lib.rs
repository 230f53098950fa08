//! Common types, configuration and logging for the DHO engine

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod names;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock, TokioClock};
pub use config::{Configuration, DaoSettings, ENV_PREFIX};
pub use error::{Error, Result};
pub use types::{Asset, Checksum256, Name, Symbol, TimePoint};
