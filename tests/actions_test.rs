mod common;

use common::{CountingStore, META_KEY, SESSION_KEY};
use evtrack::actions::{self, Feedback, KWH_PROMPT, SOC_PROMPT};
use evtrack::config::Config;
use evtrack::keypad::{Keypad, KeypadOutcome, NumberInput};
use evtrack::TrackerError;
use evtrack::persistence::{MemoryStore, Store};
use evtrack::session::SessionEngine;
use std::sync::Mutex;

/// Answers every request with a fixed outcome and records what was asked
struct Scripted {
    answer: KeypadOutcome,
    asked: Mutex<Vec<(String, String, bool)>>,
}

impl Scripted {
    fn new(answer: KeypadOutcome) -> Self {
        Self {
            answer,
            asked: Mutex::new(Vec::new()),
        }
    }

    fn asked(&self) -> Vec<(String, String, bool)> {
        self.asked.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl NumberInput for Scripted {
    async fn read_number(&self, title: &str, initial: &str, integer_only: bool) -> KeypadOutcome {
        self.asked
            .lock()
            .unwrap()
            .push((title.to_string(), initial.to_string(), integer_only));
        self.answer
    }
}

fn engine() -> SessionEngine<CountingStore> {
    SessionEngine::open(CountingStore::default(), &Config::default()).unwrap()
}

#[tokio::test]
async fn set_soc_prompts_integer_keypad_seeded_with_fifty() {
    let mut engine = engine();
    let input = Scripted::new(KeypadOutcome::Value(64.0));
    let feedback = actions::set_soc(&mut engine, &input).await.unwrap();
    assert_eq!(feedback, Feedback::SocSaved(64));
    assert_eq!(feedback.to_string(), "Saved 64%");
    assert_eq!(
        input.asked(),
        vec![(SOC_PROMPT.to_string(), "50".to_string(), true)]
    );

    // Next prompt is seeded with the saved value
    let input = Scripted::new(KeypadOutcome::Cancelled);
    let feedback = actions::set_soc(&mut engine, &input).await.unwrap();
    assert_eq!(feedback, Feedback::Cancelled);
    assert_eq!(input.asked()[0].1, "64");
}

#[tokio::test]
async fn add_energy_without_session_never_opens_keypad() {
    let mut engine = engine();
    let writes_before = engine.store().writes;
    let input = Scripted::new(KeypadOutcome::Value(5.0));
    let feedback = actions::add_energy(&mut engine, &input).await.unwrap();
    assert_eq!(feedback, Feedback::NoActiveSession);
    assert!(input.asked().is_empty());
    assert_eq!(engine.store().writes, writes_before);
}

#[tokio::test]
async fn add_energy_is_seeded_with_current_total() {
    let mut engine = engine();
    actions::start_session(&mut engine).unwrap();

    let input = Scripted::new(KeypadOutcome::Value(7.5));
    assert_eq!(
        actions::add_energy(&mut engine, &input).await.unwrap(),
        Feedback::EnergyUpdated(7.5)
    );
    assert_eq!(input.asked()[0], (KWH_PROMPT.to_string(), "0".to_string(), false));

    let input = Scripted::new(KeypadOutcome::Value(9.0));
    actions::add_energy(&mut engine, &input).await.unwrap();
    assert_eq!(input.asked()[0].1, "7.5");
}

#[tokio::test]
async fn cancelled_flows_leave_records_untouched() {
    let mut engine = engine();
    actions::start_session(&mut engine).unwrap();
    let session_before = engine.store().inner.raw(SESSION_KEY).map(str::to_string);
    let meta_before = engine.store().inner.raw(META_KEY).map(str::to_string);
    let writes_before = engine.store().writes;

    let input = Scripted::new(KeypadOutcome::Cancelled);
    assert_eq!(actions::card_tap(&mut engine, &input).await.unwrap(), Feedback::Cancelled);
    assert_eq!(actions::set_soc(&mut engine, &input).await.unwrap(), Feedback::Cancelled);

    assert_eq!(engine.store().writes, writes_before);
    assert_eq!(engine.store().inner.raw(SESSION_KEY).map(str::to_string), session_before);
    assert_eq!(engine.store().inner.raw(META_KEY).map(str::to_string), meta_before);
}

#[tokio::test]
async fn card_tap_routes_by_session_state() {
    let mut engine = engine();
    let input = Scripted::new(KeypadOutcome::Value(40.0));
    assert_eq!(actions::card_tap(&mut engine, &input).await.unwrap(), Feedback::SocSaved(40));
    assert_eq!(input.asked()[0].0, SOC_PROMPT);

    actions::start_session(&mut engine).unwrap();
    let input = Scripted::new(KeypadOutcome::Value(8.0));
    assert_eq!(
        actions::card_tap(&mut engine, &input).await.unwrap(),
        Feedback::EnergyUpdated(8.0)
    );
    assert_eq!(input.asked()[0].0, KWH_PROMPT);
    assert_eq!(engine.current_view().soc, Some(50));
}

#[tokio::test]
async fn full_cycle_feedback_texts() {
    let mut engine = engine();
    assert_eq!(actions::end_session(&mut engine).unwrap(), Feedback::NoSessionToEnd);

    let started = actions::start_session(&mut engine).unwrap();
    assert_eq!(started.to_string(), "Session started at 20%");
    assert!(started.changed_state());

    let input = Scripted::new(KeypadOutcome::Value(40.0));
    actions::add_energy(&mut engine, &input).await.unwrap();

    let ended = actions::end_session(&mut engine).unwrap();
    assert_eq!(ended, Feedback::SessionEnded { start: 20, end: 70 });
    assert_eq!(ended.to_string(), "Ended: 20% → 70%");
    assert!(engine.store().get(SESSION_KEY).is_none());
}

#[tokio::test]
async fn edit_car_saves_vehicle() {
    let mut engine = engine();
    assert_eq!(
        actions::edit_car(&mut engine, "Kia EV6", "231D42").unwrap(),
        Feedback::CarSaved
    );
    let view = engine.current_view();
    assert_eq!(view.car.to_string(), "Kia EV6 · 231D42");
}

#[tokio::test]
async fn keypad_drives_energy_flow() {
    let mut engine = engine();
    actions::start_session(&mut engine).unwrap();
    let keypad = Keypad::new();

    let flow = actions::add_energy(&mut engine, &keypad);
    let driver = async {
        tokio::task::yield_now().await;
        assert_eq!(keypad.title().as_deref(), Some(KWH_PROMPT));
        for c in "12,5".chars() {
            keypad.press(evtrack::keypad::Key::from_char(c).unwrap());
        }
        keypad.confirm();
    };
    let (feedback, ()) = tokio::join!(flow, driver);
    assert_eq!(feedback.unwrap(), Feedback::EnergyUpdated(12.5));
    assert!(!keypad.is_open());
}

/// Store that accepts the first `budget` writes and rejects the rest
struct FullDisk {
    inner: MemoryStore,
    budget: usize,
}

impl Store for FullDisk {
    fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &serde_json::Value) -> evtrack::Result<()> {
        if self.budget == 0 {
            return Err(TrackerError::storage("disk full"));
        }
        self.budget -= 1;
        self.inner.set(key, value)
    }

    fn remove(&mut self, key: &str) -> evtrack::Result<()> {
        self.inner.remove(key)
    }
}

#[tokio::test]
async fn write_failures_become_feedback() {
    let store = FullDisk {
        inner: MemoryStore::new(),
        budget: 1,
    };
    let mut engine = SessionEngine::open(store, &Config::default()).unwrap();

    let feedback = actions::settle(actions::start_session(&mut engine));
    assert!(matches!(feedback, Feedback::Failed(_)));
    assert!(!feedback.changed_state());
    assert!(feedback.to_string().starts_with("Not saved: "));
    assert!(feedback.to_string().contains("disk full"));

    // Flows keep working once the store accepts writes again
    let mut store = engine.into_store();
    store.budget = 4;
    let mut engine = SessionEngine::open(store, &Config::default()).unwrap();
    assert!(engine.active_session().is_none());
    let input = Scripted::new(KeypadOutcome::Value(35.0));
    let feedback = actions::settle(actions::set_soc(&mut engine, &input).await);
    assert_eq!(feedback, Feedback::SocSaved(35));
}
