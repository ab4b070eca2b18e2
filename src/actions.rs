//! Button flows of the charge card
//!
//! Each flow optionally asks a [`NumberInput`] for a value and then runs one
//! engine operation. The returned [`Feedback`] is the short message the front
//! end flashes afterwards.

use crate::error::Result;
use crate::keypad::NumberInput;
use crate::logging::get_logger;
use crate::persistence::Store;
use crate::session::{EnergyUpdate, SessionEnd, SessionEngine};
use std::fmt;

/// Keypad title when asking for the current SOC
pub const SOC_PROMPT: &str = "Current SOC (%)";

/// Keypad title when asking for the energy total
pub const KWH_PROMPT: &str = "Total kWh added";

/// Seed of the SOC keypad when no SOC is known
const SOC_PROMPT_SEED: u8 = 50;

/// User-facing outcome of a flow
#[derive(Debug, Clone, PartialEq)]
pub enum Feedback {
    SessionStarted(u8),
    SocSaved(u8),
    EnergyUpdated(f64),
    SessionEnded { start: u8, end: u8 },
    NoActiveSession,
    NoSessionToEnd,
    InvalidEnergy,
    CarSaved,
    /// Keypad dismissed; nothing was saved
    Cancelled,
    /// The store rejected a write
    Failed(String),
}

impl Feedback {
    /// Whether the flow changed stored state
    pub const fn changed_state(&self) -> bool {
        matches!(
            self,
            Self::SessionStarted(_)
                | Self::SocSaved(_)
                | Self::EnergyUpdated(_)
                | Self::SessionEnded { .. }
                | Self::CarSaved
        )
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionStarted(soc) => write!(f, "Session started at {soc}%"),
            Self::SocSaved(soc) => write!(f, "Saved {soc}%"),
            Self::EnergyUpdated(kwh) => write!(f, "Updated {kwh} kWh"),
            Self::SessionEnded { start, end } => write!(f, "Ended: {start}% → {end}%"),
            Self::NoActiveSession => f.write_str("No active session, start one first"),
            Self::NoSessionToEnd => f.write_str("No session to end"),
            Self::InvalidEnergy => f.write_str("Energy must be a non-negative number"),
            Self::CarSaved => f.write_str("Saved"),
            Self::Cancelled => f.write_str("No changes"),
            Self::Failed(reason) => write!(f, "Not saved: {reason}"),
        }
    }
}

/// Collapse a flow result into feedback; a failed write is reported and logged
pub fn settle(result: Result<Feedback>) -> Feedback {
    result.unwrap_or_else(|e| {
        get_logger("actions").error(&format!("Action failed: {e}"));
        Feedback::Failed(e.to_string())
    })
}

pub fn start_session<S: Store>(engine: &mut SessionEngine<S>) -> Result<Feedback> {
    engine.start_session().map(Feedback::SessionStarted)
}

/// Ask for the current SOC and remember it
pub async fn set_soc<S, I>(engine: &mut SessionEngine<S>, input: &I) -> Result<Feedback>
where
    S: Store,
    I: NumberInput + ?Sized,
{
    let seed = engine.metadata().last_soc.unwrap_or(SOC_PROMPT_SEED);
    let answer = input.read_number(SOC_PROMPT, &seed.to_string(), true).await;
    Ok(engine
        .record_known_soc(answer)?
        .map_or(Feedback::Cancelled, Feedback::SocSaved))
}

/// Ask for the session's energy total; the keypad is not opened without a session
pub async fn add_energy<S, I>(engine: &mut SessionEngine<S>, input: &I) -> Result<Feedback>
where
    S: Store,
    I: NumberInput + ?Sized,
{
    let Some(session) = engine.active_session() else {
        return Ok(Feedback::NoActiveSession);
    };
    let answer = input
        .read_number(KWH_PROMPT, &session.kwh_added.to_string(), false)
        .await;
    Ok(match engine.update_energy_added(answer)? {
        EnergyUpdate::Updated(kwh) => Feedback::EnergyUpdated(kwh),
        EnergyUpdate::Cancelled => Feedback::Cancelled,
        EnergyUpdate::Rejected => Feedback::InvalidEnergy,
        EnergyUpdate::NoActiveSession => Feedback::NoActiveSession,
    })
}

pub fn end_session<S: Store>(engine: &mut SessionEngine<S>) -> Result<Feedback> {
    Ok(match engine.end_session()? {
        SessionEnd::Ended(entry) => Feedback::SessionEnded {
            start: entry.start,
            end: entry.end,
        },
        SessionEnd::NoSession => Feedback::NoSessionToEnd,
    })
}

/// Tapping the card edits whatever is relevant: energy while charging, SOC otherwise
pub async fn card_tap<S, I>(engine: &mut SessionEngine<S>, input: &I) -> Result<Feedback>
where
    S: Store,
    I: NumberInput + ?Sized,
{
    if engine.active_session().is_some() {
        add_energy(engine, input).await
    } else {
        set_soc(engine, input).await
    }
}

pub fn edit_car<S: Store>(engine: &mut SessionEngine<S>, model: &str, reg: &str) -> Result<Feedback> {
    engine.set_car(model, reg).map(|_| Feedback::CarSaved)
}
