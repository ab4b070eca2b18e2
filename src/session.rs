//! Charging session management for evtrack
//!
//! The [`SessionEngine`] owns the session lifecycle:
//!
//! ```text
//! NoSession --start_session--> ActiveSession
//! ActiveSession --update_energy_added--> ActiveSession
//! ActiveSession --end_session--> NoSession
//! ```
//!
//! It keeps no state of its own between calls. Every operation reads the
//! records from the [`Store`], changes them, and writes them back, so the
//! store is the only source of truth.

use crate::config::{Config, VehicleDefaults};
use crate::error::Result;
use crate::keypad::KeypadOutcome;
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};
use crate::persistence::{Store, load_record, save_record};
use chrono::Utc;

mod types;
mod view;

pub use types::{
    BATTERY_CAPACITY_KWH, CarInfo, DEFAULT_START_SOC, HistoryEntry, Metadata, SessionRecord,
    clamp_percent, soc_from_energy,
};
pub use view::{ChargeView, ViewStatus, ViewTimestamp};

/// Result of an energy update
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnergyUpdate {
    /// Session now reports this total
    Updated(f64),
    /// Keypad was cancelled; nothing changed
    Cancelled,
    /// Negative or non-finite input; nothing changed
    Rejected,
    /// There is no session to update; nothing changed
    NoActiveSession,
}

/// Result of ending a session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEnd {
    /// Session closed and recorded in the history
    Ended(HistoryEntry),
    /// There was no session to end; nothing changed
    NoSession,
}

/// Session lifecycle over an injected store
pub struct SessionEngine<S: Store> {
    store: S,
    session_key: String,
    metadata_key: String,
    vehicle: VehicleDefaults,
    logger: StructuredLogger,
}

impl<S: Store> SessionEngine<S> {
    /// Wrap a store and make sure the metadata record carries a complete car
    pub fn open(store: S, config: &Config) -> Result<Self> {
        let logger = get_logger_with_context(
            LogContext::new("engine").with_record_key(&config.storage.session_key),
        );
        let mut engine = Self {
            store,
            session_key: config.storage.session_key.clone(),
            metadata_key: config.storage.metadata_key.clone(),
            vehicle: config.vehicle.clone(),
            logger,
        };
        let meta = engine.metadata();
        engine.save_metadata(&meta)?;
        engine.logger.debug(&format!("Engine ready for {}", meta.car));
        Ok(engine)
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// The active session, if any
    pub fn active_session(&self) -> Option<SessionRecord> {
        load_record(&self.store, &self.session_key)
    }

    /// Current metadata with defaults applied
    pub fn metadata(&self) -> Metadata {
        Metadata::from_value(self.store.get(&self.metadata_key).as_ref(), &self.vehicle)
    }

    /// Completed sessions, most recent first
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.metadata().history
    }

    /// Begin a session from the last known SOC (or 20%) and return that start value.
    ///
    /// Any existing session is overwritten.
    pub fn start_session(&mut self) -> Result<u8> {
        let mut meta = self.metadata();
        let start_soc = meta.last_soc.take().unwrap_or(DEFAULT_START_SOC);

        if self.active_session().is_some() {
            self.logger.warn("Replacing an unfinished session");
        }

        let session = SessionRecord::new(start_soc, now_millis());
        save_record(&mut self.store, &self.session_key, &session)?;
        self.save_metadata(&meta)?;

        self.logger
            .info(&format!("Started charging session at {start_soc}%"));
        Ok(start_soc)
    }

    /// Remember a manually entered SOC; a cancelled entry changes nothing.
    ///
    /// Not guarded against an active session: callers decide when to offer it.
    pub fn record_known_soc(&mut self, input: KeypadOutcome) -> Result<Option<u8>> {
        let Some(value) = input.value() else {
            return Ok(None);
        };
        let soc = clamp_percent(value);

        let mut meta = self.metadata();
        meta.last_soc = Some(soc);
        self.save_metadata(&meta)?;

        self.logger.info(&format!("Recorded known SOC {soc}%"));
        Ok(Some(soc))
    }

    /// Replace the session's energy total with the entered value
    pub fn update_energy_added(&mut self, input: KeypadOutcome) -> Result<EnergyUpdate> {
        let Some(mut session) = self.active_session() else {
            self.logger.debug("Energy update without an active session");
            return Ok(EnergyUpdate::NoActiveSession);
        };
        let Some(kwh) = input.value() else {
            return Ok(EnergyUpdate::Cancelled);
        };
        if !kwh.is_finite() || kwh < 0.0 {
            self.logger
                .warn(&format!("Rejected energy value {kwh}"));
            return Ok(EnergyUpdate::Rejected);
        }

        session.kwh_added = kwh;
        session.ts_update = Some(now_millis());
        save_record(&mut self.store, &self.session_key, &session)?;

        self.logger.info(&format!(
            "Energy added now {kwh} kWh, estimated SOC {}%",
            session.estimated_soc()
        ));
        Ok(EnergyUpdate::Updated(kwh))
    }

    /// Close the session, prepend it to the history and remember its end SOC
    pub fn end_session(&mut self) -> Result<SessionEnd> {
        let Some(session) = self.active_session() else {
            self.logger.debug("End requested without an active session");
            return Ok(SessionEnd::NoSession);
        };

        let entry = HistoryEntry {
            start: session.start_soc,
            end: session.estimated_soc(),
            kwh: session.kwh_added,
            ts: now_millis(),
        };

        let previous = self.store.get(&self.metadata_key);
        let mut meta = self.metadata();
        meta.last_soc = Some(entry.end);
        meta.history.insert(0, entry.clone());
        self.save_metadata(&meta)?;

        if let Err(e) = self.store.remove(&self.session_key) {
            // Session is still active, so the history must not hold its entry yet
            self.logger
                .error(&format!("Failed to close session, restoring metadata: {e}"));
            let restored = match previous {
                Some(value) => self.store.set(&self.metadata_key, &value),
                None => self.store.remove(&self.metadata_key),
            };
            if let Err(restore_err) = restored {
                self.logger
                    .error(&format!("Failed to restore metadata: {restore_err}"));
            }
            return Err(e);
        }

        self.logger.info(&format!(
            "Ended charging session {}% -> {}% after {} kWh",
            entry.start, entry.end, entry.kwh
        ));
        Ok(SessionEnd::Ended(entry))
    }

    /// Derive the card contents from the stored records
    pub fn current_view(&self) -> ChargeView {
        let meta = self.metadata();
        match self.active_session() {
            Some(session) => ChargeView {
                car: meta.car,
                soc: Some(session.estimated_soc()),
                status: ViewStatus::Charging {
                    start_soc: session.start_soc,
                    kwh_added: session.kwh_added,
                },
                timestamp: Some(session.ts_update.map_or(
                    ViewTimestamp::Started(session.ts_start),
                    ViewTimestamp::Updated,
                )),
            },
            None => ChargeView {
                car: meta.car,
                soc: meta.last_soc,
                status: if meta.last_soc.is_some() {
                    ViewStatus::LastKnown
                } else {
                    ViewStatus::NoData
                },
                timestamp: None,
            },
        }
    }

    /// Edit the vehicle; blank values fall back to the configured defaults
    pub fn set_car(&mut self, model: &str, reg: &str) -> Result<CarInfo> {
        let mut meta = self.metadata();
        meta.car = CarInfo {
            model: non_blank_or(model, &self.vehicle.model),
            reg: non_blank_or(reg, &self.vehicle.reg),
        };
        self.save_metadata(&meta)?;
        self.logger.info(&format!("Vehicle set to {}", meta.car));
        Ok(meta.car)
    }

    fn save_metadata(&mut self, meta: &Metadata) -> Result<()> {
        save_record(&mut self.store, &self.metadata_key, meta)
    }
}

fn non_blank_or(value: &str, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
