//! Typed domain events and the synchronous match event bus.
//!
//! Events are a closed union: every state-changing occurrence maps to one
//! variant with its own payload, so downstream consumers (the scoring
//! system in particular) can match exhaustively. Dispatch is synchronous
//! and in registration order; listeners must not apply new actions to the
//! same match from inside a callback.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::connect4::Connect4Move;
use crate::context::now_rfc3339;
use crate::engine::PlayerId;
use crate::player::PlayerAction;
use crate::poker::Phase;

/// The executed action, summarized game-agnostically for event consumers.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionSummary {
    Poker(PlayerAction),
    Connect4(Connect4Move),
}

/// How badly an AI reply misread the game state.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MisreadSeverity {
    Minor,
    Major,
}

/// A domain event, broadcast exactly once per occurrence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    HandStarted {
        hand_number: u32,
        phase: Phase,
        ts: String,
    },
    HandCompleted {
        winners: Vec<PlayerId>,
        /// Everyone dealt into the hand, including players forced all-in
        /// by the blinds who never acted voluntarily.
        players: Vec<PlayerId>,
        hand_number: u32,
        phase: Phase,
        showdown: bool,
        pot: u32,
        ts: String,
    },
    ActionExecuted {
        player: PlayerId,
        action: ActionSummary,
        ts: String,
    },
    /// An AI reply could not be reconciled with the actual game state.
    HandMisread {
        player: PlayerId,
        severity: MisreadSeverity,
        ts: String,
    },
    /// An AI proposed an action that made no sense for the situation.
    ActionIllogical {
        player: PlayerId,
        ts: String,
    },
}

/// Subscription key for [`EventBus`] listeners.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum EventKind {
    HandStarted,
    HandCompleted,
    ActionExecuted,
    HandMisread,
    ActionIllogical,
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::HandStarted { .. } => EventKind::HandStarted,
            GameEvent::HandCompleted { .. } => EventKind::HandCompleted,
            GameEvent::ActionExecuted { .. } => EventKind::ActionExecuted,
            GameEvent::HandMisread { .. } => EventKind::HandMisread,
            GameEvent::ActionIllogical { .. } => EventKind::ActionIllogical,
        }
    }

    pub fn action_executed(player: PlayerId, action: impl Into<ActionSummary>) -> Self {
        GameEvent::ActionExecuted {
            player,
            action: action.into(),
            ts: now_rfc3339(),
        }
    }

    pub fn hand_misread(player: PlayerId, severity: MisreadSeverity) -> Self {
        GameEvent::HandMisread {
            player,
            severity,
            ts: now_rfc3339(),
        }
    }

    pub fn action_illogical(player: PlayerId) -> Self {
        GameEvent::ActionIllogical {
            player,
            ts: now_rfc3339(),
        }
    }
}

impl From<PlayerAction> for ActionSummary {
    fn from(action: PlayerAction) -> Self {
        ActionSummary::Poker(action)
    }
}

impl From<Connect4Move> for ActionSummary {
    fn from(mv: Connect4Move) -> Self {
        ActionSummary::Connect4(mv)
    }
}

pub type ListenerId = usize;

type Callback = Box<dyn FnMut(&GameEvent) + Send>;

struct Listener {
    id: ListenerId,
    once: bool,
    callback: Callback,
}

impl std::fmt::Debug for Listener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listener")
            .field("id", &self.id)
            .field("once", &self.once)
            .finish()
    }
}

/// Synchronous event bus: `emit` runs every listener for the event's kind
/// before returning. Listeners for the emitted kind are detached from the
/// registry during dispatch, so emitting another event of the same kind
/// from inside a callback cannot deadlock (it simply finds no listeners).
#[derive(Debug, Default)]
pub struct EventBus {
    listeners: Mutex<HashMap<EventKind, Vec<Listener>>>,
    next_id: AtomicUsize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for one event kind. Returns an id for `off`.
    pub fn on<F>(&self, kind: EventKind, callback: F) -> ListenerId
    where
        F: FnMut(&GameEvent) + Send + 'static,
    {
        self.register(kind, false, Box::new(callback))
    }

    /// Like `on`, but the listener is dropped after its first delivery.
    pub fn once<F>(&self, kind: EventKind, callback: F) -> ListenerId
    where
        F: FnMut(&GameEvent) + Send + 'static,
    {
        self.register(kind, true, Box::new(callback))
    }

    fn register(&self, kind: EventKind, once: bool, callback: Callback) -> ListenerId {
        let id = self.next_id.fetch_add(1, Ordering::AcqRel);
        let mut guard = self.listeners.lock().expect("listener lock poisoned");
        guard.entry(kind).or_default().push(Listener {
            id,
            once,
            callback,
        });
        id
    }

    /// Remove a listener. A no-op for unknown ids; removal of a listener
    /// that is currently mid-dispatch takes effect after the dispatch.
    pub fn off(&self, id: ListenerId) {
        let mut guard = self.listeners.lock().expect("listener lock poisoned");
        for list in guard.values_mut() {
            list.retain(|l| l.id != id);
        }
        guard.retain(|_, list| !list.is_empty());
    }

    /// Deliver `event` to every listener registered for its kind, in
    /// registration order. `once` listeners are pruned afterwards.
    pub fn emit(&self, event: &GameEvent) {
        let kind = event.kind();
        tracing::debug!(kind = ?kind, "emitting game event");

        let mut batch = {
            let mut guard = self.listeners.lock().expect("listener lock poisoned");
            guard.remove(&kind).unwrap_or_default()
        };
        if batch.is_empty() {
            return;
        }

        for listener in batch.iter_mut() {
            (listener.callback)(event);
        }
        batch.retain(|l| !l.once);

        // Listeners registered during dispatch landed in a fresh vec under
        // the same key; keep them behind the surviving originals.
        let mut guard = self.listeners.lock().expect("listener lock poisoned");
        let added = guard.remove(&kind).unwrap_or_default();
        batch.extend(added);
        if !batch.is_empty() {
            guard.insert(kind, batch);
        }
    }

    pub fn listener_count(&self) -> usize {
        let guard = self.listeners.lock().expect("listener lock poisoned");
        guard.values().map(|list| list.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use std::sync::Arc;

    fn ping() -> GameEvent {
        GameEvent::action_illogical(0)
    }

    #[test]
    fn emit_reaches_all_listeners_in_order() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for tag in ["first", "second"] {
            let seen = Arc::clone(&seen);
            bus.on(EventKind::ActionIllogical, move |_| {
                seen.lock().unwrap().push(tag);
            });
        }
        bus.emit(&ping());
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn once_listener_fires_exactly_once() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicU32::new(0));
        let h = Arc::clone(&hits);
        bus.once(EventKind::ActionIllogical, move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        bus.emit(&ping());
        bus.emit(&ping());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn off_removes_listener() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicU32::new(0));
        let h = Arc::clone(&hits);
        let id = bus.on(EventKind::ActionIllogical, move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        bus.off(id);
        bus.emit(&ping());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn listeners_only_hear_their_kind() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicU32::new(0));
        let h = Arc::clone(&hits);
        bus.on(EventKind::HandCompleted, move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        bus.emit(&ping());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn emitting_from_inside_a_listener_does_not_deadlock() {
        let bus = Arc::new(EventBus::new());
        let inner = Arc::clone(&bus);
        bus.on(EventKind::ActionIllogical, move |_| {
            inner.emit(&GameEvent::hand_misread(1, MisreadSeverity::Minor));
        });
        bus.emit(&ping());
    }
}
