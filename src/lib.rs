//! # evtrack - EV charging session tracker
//!
//! Tracks one vehicle's charging: the state of charge (SOC) at the start of
//! a session, the energy added so far, and a history of finished sessions.
//! The current SOC is estimated from the start percentage and the energy
//! added against an 80 kWh usable battery.
//!
//! ## Architecture
//!
//! - `persistence`: key-value [`Store`] contract plus memory and file stores
//! - `session`: records, the [`SessionEngine`] lifecycle and the derived view
//! - `keypad`: modal numeric keypad answering async number requests
//! - `actions`: button flows combining the keypad with engine operations
//! - `config`: YAML configuration
//! - `logging`: structured logging and tracing
//! - `error`: error types

pub mod actions;
pub mod config;
pub mod error;
pub mod keypad;
pub mod logging;
pub mod persistence;
pub mod session;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, TrackerError};
pub use keypad::{Keypad, KeypadOutcome, NumberInput};
pub use persistence::{FileStore, MemoryStore, Store};
pub use session::{ChargeView, SessionEngine};
