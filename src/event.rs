use std::io::Write;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::sync::broadcast::{self, Receiver, Sender};

use crate::cluster::{ButtonId, PressType};

/// Event type used by the hub for device-originated events
pub const ZHA_SEND_EVENT: &str = "zha_send_event";

pub const BUTTON: &str = "button";
pub const PRESS_TYPE: &str = "press_type";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ButtonEvent {
    pub button: ButtonId,
    pub press_type: PressType,
}

impl ButtonEvent {
    #[must_use]
    pub const fn new(button: ButtonId, press_type: PressType) -> Self {
        Self { button, press_type }
    }

    /// Event name, e.g. `button_1_short_press`
    #[must_use]
    pub fn name(&self) -> String {
        format!("{}_{}", self.button, self.press_type)
    }

    #[must_use]
    pub fn payload(&self) -> Value {
        json!({
            BUTTON: self.button.as_str(),
            PRESS_TYPE: self.press_type.as_str(),
        })
    }
}

/// Receiver of decoded device events.
pub trait EventSink {
    fn emit(&self, name: &str, payload: Value);
}

impl<T: EventSink + ?Sized> EventSink for &T {
    fn emit(&self, name: &str, payload: Value) {
        (**self).emit(name, payload);
    }
}

/// Writes every event to the log, and nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, name: &str, payload: Value) {
        log::info!("[{ZHA_SEND_EVENT}] {name} {payload}");
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmittedEvent {
    pub event: String,
    pub args: Value,
}

/// Fans events out to any number of subscribers.
///
/// Events emitted while nobody is subscribed are dropped.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    tx: Sender<EmittedEvent>,
}

impl BroadcastSink {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    #[must_use]
    pub fn subscribe(&self) -> Receiver<EmittedEvent> {
        self.tx.subscribe()
    }
}

impl EventSink for BroadcastSink {
    fn emit(&self, name: &str, payload: Value) {
        let evt = EmittedEvent {
            event: name.to_string(),
            args: payload,
        };
        if self.tx.send(evt).is_err() {
            log::trace!("No subscribers for event {name}");
        }
    }
}

/// Collects emitted events in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<EmittedEvent>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return all events collected so far.
    pub fn take(&self) -> Vec<EmittedEvent> {
        self.events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, name: &str, payload: Value) {
        if let Ok(mut events) = self.events.lock() {
            events.push(EmittedEvent {
                event: name.to_string(),
                args: payload,
            });
        }
    }
}

/// Writes each event as one json line, e.g.
/// `{"event":"button_1_short_press","args":{...}}`
#[derive(Debug)]
pub struct JsonLineSink<W> {
    out: Mutex<W>,
}

impl<W: Write> JsonLineSink<W> {
    pub const fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write> EventSink for JsonLineSink<W> {
    fn emit(&self, name: &str, payload: Value) {
        let evt = EmittedEvent {
            event: name.to_string(),
            args: payload,
        };

        let Ok(mut out) = self.out.lock() else {
            log::error!("Event output is poisoned, dropping {name}");
            return;
        };

        let res = serde_json::to_writer(&mut *out, &evt)
            .map_err(std::io::Error::from)
            .and_then(|()| writeln!(out))
            .and_then(|()| out.flush());

        if let Err(err) = res {
            log::error!("Failed to write event {name}: {err}");
        }
    }
}
