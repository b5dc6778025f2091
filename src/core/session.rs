//! Per-page session context and the render instructions it emits.
//!
//! Controllers never touch a display directly. They mutate the
//! [`SessionContext`] behind a [`SessionHandle`], which queues
//! [`ChatInstruction`]s in an outbox; a [`ChatSurface`] adapter drains them.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::core::transcript::{Sender, Transcript, Turn};
use crate::render::{render_turn, Markup};

pub type IndicatorId = u64;

/// One visible mutation of the chat surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInstruction {
    AppendTurn {
        index: usize,
        sender: Sender,
        is_error: bool,
        markup: Markup,
    },
    ShowPending {
        indicator: IndicatorId,
    },
    RemovePending {
        indicator: IndicatorId,
    },
    SetInputEnabled(bool),
    ClearInput,
    FocusInput,
    SaveFile {
        filename: String,
        content_type: Option<String>,
        bytes: Vec<u8>,
    },
}

/// Display adapter for the chat surface.
pub trait ChatSurface {
    fn apply(&mut self, instruction: ChatInstruction);
}

impl<F> ChatSurface for F
where
    F: FnMut(ChatInstruction),
{
    fn apply(&mut self, instruction: ChatInstruction) {
        self(instruction)
    }
}

#[derive(Debug, Default)]
pub struct SessionContext {
    transcript: Transcript,
    busy: bool,
    live_indicators: BTreeSet<IndicatorId>,
    next_indicator: IndicatorId,
    health_probed: bool,
    outbox: Vec<ChatInstruction>,
}

impl SessionContext {
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Claims the busy gate. Returns `false` when a request is already in flight.
    pub fn try_acquire_busy(&mut self) -> bool {
        if self.busy {
            return false;
        }
        self.busy = true;
        true
    }

    pub fn release_busy(&mut self) {
        self.busy = false;
    }

    /// Appends a turn, queueing its rendered markup, and returns its index.
    pub fn append_turn(&mut self, turn: Turn) -> usize {
        let markup = render_turn(&turn);
        let sender = turn.sender;
        let is_error = turn.is_error;
        let index = self.transcript.push(turn);
        self.outbox.push(ChatInstruction::AppendTurn {
            index,
            sender,
            is_error,
            markup,
        });
        index
    }

    pub fn show_pending(&mut self) -> IndicatorId {
        self.next_indicator += 1;
        let indicator = self.next_indicator;
        self.live_indicators.insert(indicator);
        self.outbox.push(ChatInstruction::ShowPending { indicator });
        indicator
    }

    /// Removes a live indicator. Unknown or already-removed ids are ignored.
    pub fn remove_pending(&mut self, indicator: IndicatorId) -> bool {
        if !self.live_indicators.remove(&indicator) {
            return false;
        }
        self.outbox.push(ChatInstruction::RemovePending { indicator });
        true
    }

    pub fn live_indicator_count(&self) -> usize {
        self.live_indicators.len()
    }

    /// Marks the one-shot health probe as taken. Returns `false` if it already was.
    pub fn claim_health_probe(&mut self) -> bool {
        !std::mem::replace(&mut self.health_probed, true)
    }

    pub fn health_probed(&self) -> bool {
        self.health_probed
    }

    pub fn emit(&mut self, instruction: ChatInstruction) {
        self.outbox.push(instruction);
    }

    pub fn drain_instructions(&mut self) -> Vec<ChatInstruction> {
        std::mem::take(&mut self.outbox)
    }
}

/// Shared handle to one page's [`SessionContext`].
///
/// The lock is only taken inside synchronous closures and never across an
/// `.await`, so concurrent controllers on one executor cannot deadlock.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    inner: Arc<Mutex<SessionContext>>,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context<R>(&self, f: impl FnOnce(&mut SessionContext) -> R) -> R {
        let mut context = lock_unpoisoned(&self.inner);
        f(&mut context)
    }

    pub fn append_turn(&self, turn: Turn) -> usize {
        self.with_context(|context| context.append_turn(turn))
    }

    pub fn is_busy(&self) -> bool {
        self.with_context(|context| context.is_busy())
    }

    pub fn turns(&self) -> Vec<Turn> {
        self.with_context(|context| context.transcript().turns().to_vec())
    }

    pub fn transcript_len(&self) -> usize {
        self.with_context(|context| context.transcript().len())
    }

    pub fn live_indicator_count(&self) -> usize {
        self.with_context(|context| context.live_indicator_count())
    }

    pub fn drain_instructions(&self) -> Vec<ChatInstruction> {
        self.with_context(SessionContext::drain_instructions)
    }

    /// Drains the outbox into `surface` in emission order. Returns how many
    /// instructions were applied.
    pub fn flush_to(&self, surface: &mut dyn ChatSurface) -> usize {
        let instructions = self.drain_instructions();
        let applied = instructions.len();
        for instruction in instructions {
            surface.apply(instruction);
        }
        applied
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_turn_queues_rendered_markup() {
        let session = SessionHandle::new();

        let index = session.append_turn(Turn::assistant("**hi**", Vec::new()));

        assert_eq!(index, 0);
        assert_eq!(
            session.drain_instructions(),
            vec![ChatInstruction::AppendTurn {
                index: 0,
                sender: Sender::Assistant,
                is_error: false,
                markup: crate::render::render("**hi**"),
            }]
        );
        assert!(session.drain_instructions().is_empty());
    }

    #[test]
    fn busy_gate_is_single_claim() {
        let session = SessionHandle::new();

        assert!(session.with_context(SessionContext::try_acquire_busy));
        assert!(!session.with_context(SessionContext::try_acquire_busy));
        session.with_context(SessionContext::release_busy);
        assert!(!session.is_busy());
    }

    #[test]
    fn removing_an_indicator_twice_emits_once() {
        let session = SessionHandle::new();
        let first = session.with_context(SessionContext::show_pending);
        let second = session.with_context(SessionContext::show_pending);
        assert_ne!(first, second);

        assert!(session.with_context(|context| context.remove_pending(first)));
        assert!(!session.with_context(|context| context.remove_pending(first)));
        assert!(!session.with_context(|context| context.remove_pending(999)));

        let removals = session
            .drain_instructions()
            .into_iter()
            .filter(|instruction| matches!(instruction, ChatInstruction::RemovePending { .. }))
            .count();
        assert_eq!(removals, 1);
        assert_eq!(session.live_indicator_count(), 1);
    }

    #[test]
    fn health_probe_claim_is_one_shot() {
        let session = SessionHandle::new();

        assert!(session.with_context(SessionContext::claim_health_probe));
        assert!(!session.with_context(SessionContext::claim_health_probe));
        assert!(session.with_context(|context| context.health_probed()));
    }

    #[test]
    fn flush_to_applies_in_emission_order() {
        let session = SessionHandle::new();
        session.with_context(|context| {
            context.emit(ChatInstruction::SetInputEnabled(false));
            context.emit(ChatInstruction::ClearInput);
            context.emit(ChatInstruction::FocusInput);
        });

        let mut seen = Vec::new();
        let applied = session.flush_to(&mut |instruction: ChatInstruction| seen.push(instruction));

        assert_eq!(applied, 3);
        assert_eq!(
            seen,
            vec![
                ChatInstruction::SetInputEnabled(false),
                ChatInstruction::ClearInput,
                ChatInstruction::FocusInput,
            ]
        );
    }
}
