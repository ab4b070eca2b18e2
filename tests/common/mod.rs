#![allow(dead_code)]

use evtrack::error::Result;
use evtrack::persistence::{MemoryStore, Store};
use serde_json::Value;

/// Memory store that counts writes and removals
#[derive(Default)]
pub struct CountingStore {
    pub inner: MemoryStore,
    pub writes: usize,
}

impl Store for CountingStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &Value) -> Result<()> {
        self.writes += 1;
        self.inner.set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.writes += 1;
        self.inner.remove(key)
    }
}

pub const SESSION_KEY: &str = "ev_v2_session";
pub const META_KEY: &str = "ev_v2_meta";
