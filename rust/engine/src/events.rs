use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::mpsc;

use crate::dice::{DICE_PER_HAND, Face};
use crate::hand::{HandResult, Outcome};

// Bounded so a subscriber that stops reading cannot grow memory without limit;
// once its buffer is full it is dropped.
const EVENT_CHANNEL_BUFFER: usize = 256;

pub type EventSender = mpsc::Sender<RoundEvent>;
pub type EventReceiver = mpsc::Receiver<RoundEvent>;

/// Change notifications published by the round state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoundEvent {
    TableSelected {
        table_id: String,
        bet: u32,
    },
    ReturnedToLobby,
    BankrollReset {
        bankroll: u32,
    },
    RollStarted {
        round_id: u64,
        roll_id: u64,
        rolls_remaining: u8,
        dice: Vec<usize>,
    },
    DieSettled {
        die: usize,
        face: Face,
    },
    HoldToggled {
        die: usize,
        held: bool,
    },
    PlayerHandEvaluated {
        hand: HandResult,
        rolls_remaining: u8,
    },
    OpponentRevealed {
        faces: [Face; DICE_PER_HAND],
        hand: HandResult,
        holds: [bool; DICE_PER_HAND],
    },
    RoundScored {
        outcome: Outcome,
        payout: u32,
        bankroll: u32,
    },
    RoundReset {
        round_id: u64,
    },
}

pub struct EventSubscription {
    bus: EventBus,
    subscriber_id: usize,
    pub receiver: EventReceiver,
}

impl EventSubscription {
    pub fn receiver(&mut self) -> &mut EventReceiver {
        &mut self.receiver
    }

    /// Everything received so far, without waiting.
    pub fn drain(&mut self) -> Vec<RoundEvent> {
        let mut out = Vec::new();
        while let Ok(ev) = self.receiver.try_recv() {
            out.push(ev);
        }
        out
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.subscriber_id);
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventBus {
    inner: Arc<EventBusInner>,
}

#[derive(Debug, Default)]
struct EventBusInner {
    subscribers: RwLock<Vec<(usize, EventSender)>>,
    next_id: AtomicUsize,
}

impl EventBusInner {
    fn read(&self) -> RwLockReadGuard<'_, Vec<(usize, EventSender)>> {
        self.subscribers.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<(usize, EventSender)>> {
        self.subscribers.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> EventSubscription {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_BUFFER);
        let id = self.inner.next_id.fetch_add(1, Ordering::AcqRel);
        self.inner.write().push((id, tx));
        tracing::debug!(subscriber_id = id, "subscribed to round events");
        EventSubscription {
            bus: self.clone(),
            subscriber_id: id,
            receiver: rx,
        }
    }

    pub fn broadcast(&self, event: RoundEvent) {
        tracing::trace!(event = ?event, "broadcasting round event");
        let subscribers = self.inner.read().clone();

        let mut failed = Vec::new();
        for (id, sender) in subscribers {
            if let Err(e) = sender.try_send(event.clone()) {
                tracing::warn!(subscriber_id = id, error = ?e, "dropping round event subscriber");
                failed.push(id);
            }
        }
        if !failed.is_empty() {
            self.inner.write().retain(|(id, _)| !failed.contains(id));
        }
    }

    pub fn unsubscribe(&self, subscriber_id: usize) {
        self.inner.write().retain(|(id, _)| *id != subscriber_id);
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.read().len()
    }
}
