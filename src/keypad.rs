//! On-screen numeric keypad
//!
//! A [`Keypad`] is a modal input surface. [`Keypad::request_number`] opens it
//! and hands back a [`KeypadRequest`] future; the future resolves once the
//! front end reports a terminal tap through [`Keypad::confirm`] or
//! [`Keypad::cancel`]. Digit taps arrive through [`Keypad::press`] while the
//! caller is suspended. There is no timeout.

use crate::logging::{StructuredLogger, get_logger};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use tokio::sync::oneshot;

mod buffer;

pub use buffer::{Key, KeypadBuffer, layout};

/// Result of a keypad request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeypadOutcome {
    /// The user tapped Done
    Value(f64),
    /// The user tapped Cancel, or the request was superseded
    Cancelled,
}

impl KeypadOutcome {
    /// The confirmed number, if any
    pub const fn value(self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(v),
            Self::Cancelled => None,
        }
    }

    pub const fn is_cancelled(self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Source of user-entered numbers
#[async_trait::async_trait]
pub trait NumberInput: Send + Sync {
    /// Ask for a number, suspending until the user confirms or cancels
    async fn read_number(&self, title: &str, initial: &str, integer_only: bool) -> KeypadOutcome;
}

struct OpenRequest {
    title: String,
    buffer: KeypadBuffer,
    responder: oneshot::Sender<KeypadOutcome>,
}

/// Modal keypad with at most one outstanding request
pub struct Keypad {
    open: Mutex<Option<OpenRequest>>,
    logger: StructuredLogger,
}

impl Keypad {
    pub fn new() -> Self {
        Self {
            open: Mutex::new(None),
            logger: get_logger("keypad"),
        }
    }

    /// Open the keypad; a previously open request resolves as cancelled
    pub fn request_number(
        &self,
        title: &str,
        initial: Option<&str>,
        integer_only: bool,
    ) -> KeypadRequest {
        let (tx, rx) = oneshot::channel();
        let request = OpenRequest {
            title: title.to_string(),
            buffer: KeypadBuffer::new(initial, integer_only),
            responder: tx,
        };
        if self.slot().replace(request).is_some() {
            self.logger
                .warn("Keypad reopened while a request was outstanding");
        }
        self.logger.debug(&format!(
            "Keypad opened: '{title}' (integer_only={integer_only})"
        ));
        KeypadRequest { rx }
    }

    /// Apply a tap to the open request; false when the keypad is closed
    pub fn press(&self, key: Key) -> bool {
        match self.slot().as_mut() {
            Some(open) => {
                open.buffer.press(key);
                true
            }
            None => false,
        }
    }

    /// Tap Done: resolve the open request with the parsed buffer
    pub fn confirm(&self) -> bool {
        let Some(open) = self.slot().take() else {
            return false;
        };
        let value = open.buffer.value();
        self.logger
            .debug(&format!("Keypad '{}' confirmed: {value}", open.title));
        let _ = open.responder.send(KeypadOutcome::Value(value));
        true
    }

    /// Tap Cancel: resolve the open request as cancelled
    pub fn cancel(&self) -> bool {
        let Some(open) = self.slot().take() else {
            return false;
        };
        self.logger
            .debug(&format!("Keypad '{}' cancelled", open.title));
        let _ = open.responder.send(KeypadOutcome::Cancelled);
        true
    }

    pub fn is_open(&self) -> bool {
        self.slot().is_some()
    }

    /// Title of the open request
    pub fn title(&self) -> Option<String> {
        self.slot().as_ref().map(|open| open.title.clone())
    }

    /// Display text of the open request
    pub fn display(&self) -> Option<String> {
        self.slot()
            .as_ref()
            .map(|open| open.buffer.text().to_string())
    }

    /// Key grid of the open request
    pub fn layout(&self) -> Option<[Option<Key>; 12]> {
        self.slot()
            .as_ref()
            .map(|open| layout(open.buffer.integer_only()))
    }

    fn slot(&self) -> MutexGuard<'_, Option<OpenRequest>> {
        self.open.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Keypad {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl NumberInput for Keypad {
    async fn read_number(&self, title: &str, initial: &str, integer_only: bool) -> KeypadOutcome {
        self.request_number(title, Some(initial), integer_only).await
    }
}

/// Pending keypad answer
#[must_use = "the keypad answer is delivered through this future"]
pub struct KeypadRequest {
    rx: oneshot::Receiver<KeypadOutcome>,
}

impl Future for KeypadRequest {
    type Output = KeypadOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|answer| answer.unwrap_or(KeypadOutcome::Cancelled))
    }
}
