#![warn(missing_docs)]
//! Deterministic testing surfaces: message capture, tracker event streams
//! and region fixtures.

mod fixtures;

use anyhow::{Context, Result};
use serde::Serialize;
use std::cell::RefCell;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::rc::Rc;
use tracing::debug;
use voidworld_core::{ActorId, RegistryKey, SimTick};
use voidworld_world::{LocationTracker, MessageChannel, MessageSink};

pub use fixtures::*;

/// Primary event record captured by headless runs.
#[derive(Debug, Serialize)]
pub struct EventRecord<'a> {
    /// Simulation tick when the event occurred.
    pub tick: SimTick,
    /// Event kind label (`enter`, `exit`, `command`, ...).
    pub kind: &'a str,
    /// Actor the event concerns.
    pub actor: ActorId,
    /// Free-form payload (region ID, command line, ...).
    pub payload: &'a str,
}

/// A sink that writes newline-delimited JSON to disk.
pub struct JsonlSink {
    file: File,
}

impl JsonlSink {
    /// Create a new sink at `path`, creating parent directories if needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create {}", parent.display()))?;
            }
        }
        let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
        debug!(path = %path.display(), "opened event log");
        Ok(Self { file })
    }

    /// Append an event to the log.
    pub fn write(&mut self, event: &EventRecord<'_>) -> Result<()> {
        let line = serde_json::to_string(event)?;
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        Ok(())
    }
}

/// One message captured by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    /// Recipient.
    pub actor: ActorId,
    /// Display channel.
    pub channel: MessageChannel,
    /// Message text.
    pub text: String,
}

/// Message sink that keeps every message in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: Vec<SentMessage>,
}

impl RecordingSink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every captured message, oldest first.
    pub fn messages(&self) -> &[SentMessage] {
        &self.messages
    }

    /// Texts sent to `actor` on `channel`, oldest first.
    pub fn texts(&self, actor: ActorId, channel: MessageChannel) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|m| m.actor == actor && m.channel == channel)
            .map(|m| m.text.as_str())
            .collect()
    }

    /// Drain the captured messages.
    pub fn take(&mut self) -> Vec<SentMessage> {
        std::mem::take(&mut self.messages)
    }
}

impl MessageSink for RecordingSink {
    fn send(&mut self, actor: ActorId, channel: MessageChannel, text: &str) {
        self.messages.push(SentMessage {
            actor,
            channel,
            text: text.to_string(),
        });
    }
}

/// Direction of a tracker transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    /// Actor entered the region.
    Enter,
    /// Actor left the region.
    Exit,
}

impl Transition {
    /// Lowercase label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Transition::Enter => "enter",
            Transition::Exit => "exit",
        }
    }
}

/// One tracker callback invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedEvent {
    /// Enter or exit.
    pub transition: Transition,
    /// Actor concerned.
    pub actor: ActorId,
    /// Region ID.
    pub location: RegistryKey,
}

/// Shared, append-only list of tracker callbacks.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<TrackedEvent>>>,
}

impl EventLog {
    /// Register enter and exit listeners on `tracker` that append to a new log.
    pub fn attach(tracker: &mut LocationTracker) -> Self {
        let log = Self::default();
        let enter = log.clone();
        tracker.on_enter(move |actor, location| enter.push(Transition::Enter, actor, &location.id));
        let exit = log.clone();
        tracker.on_exit(move |actor, location| exit.push(Transition::Exit, actor, &location.id));
        log
    }

    fn push(&self, transition: Transition, actor: ActorId, location: &RegistryKey) {
        self.events.borrow_mut().push(TrackedEvent {
            transition,
            actor,
            location: location.clone(),
        });
    }

    /// Snapshot of the events so far.
    pub fn events(&self) -> Vec<TrackedEvent> {
        self.events.borrow().clone()
    }

    /// Events as `(transition, region path)` pairs, for compact assertions.
    pub fn summary(&self) -> Vec<(Transition, String)> {
        self.events
            .borrow()
            .iter()
            .map(|e| (e.transition, e.location.path().to_string()))
            .collect()
    }

    /// Drain the log.
    pub fn take(&self) -> Vec<TrackedEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}
