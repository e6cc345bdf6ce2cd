//! Undo/redo history for commands over some state `S`.
//!
//! ```text
//! execute(c4)
//!   undo: [c1, c2, c3, c4]   redo: []
//!
//! undo() x2
//!   undo: [c1, c2]           redo: [c4, c3]
//!
//! execute(c5)   <-- new branch, redo cleared
//!   undo: [c1, c2, c5]       redo: []
//! ```
//!
//! The manager owns commands but not the state they operate on; callers pass
//! `&mut S` into every operation. This keeps the manager polymorphic over the
//! command abstraction and independent of any concrete catalog type.

use std::sync::Arc;

use larder_core::DomainResult;

use crate::audit::{AuditAction, AuditRecord, AuditSink};
use crate::bounded::BoundedStack;
use crate::command::Command;

/// Default number of commands kept in undo history.
pub const DEFAULT_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Maximum number of undoable commands. Overflow keeps the newest half.
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

pub struct HistoryManager<S> {
    undo_stack: BoundedStack<Box<dyn Command<S>>>,
    /// Newest at the back.
    redo_stack: Vec<Box<dyn Command<S>>>,
    sinks: Vec<Arc<dyn AuditSink>>,
}

impl<S> core::fmt::Debug for HistoryManager<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HistoryManager")
            .field("undo_depth", &self.undo_stack.len())
            .field("redo_depth", &self.redo_stack.len())
            .field("capacity", &self.undo_stack.capacity())
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl<S> Default for HistoryManager<S> {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl<S> HistoryManager<S> {
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            undo_stack: BoundedStack::new(config.capacity),
            redo_stack: Vec::new(),
            sinks: Vec::new(),
        }
    }

    /// Register an audit sink. Sinks are notified in registration order.
    pub fn add_sink(&mut self, sink: Arc<dyn AuditSink>) {
        self.sinks.push(sink);
    }

    pub fn capacity(&self) -> usize {
        self.undo_stack.capacity()
    }

    /// Execute `command` against `state` and record it.
    ///
    /// On success the redo list is cleared (a new branch of history was taken)
    /// and the undo list is bounded to capacity. On failure the command is
    /// dropped and both lists are left exactly as they were.
    pub fn execute(&mut self, state: &mut S, mut command: Box<dyn Command<S>>) -> DomainResult<()> {
        if let Err(err) = command.execute(state) {
            tracing::debug!(command = command.description(), error = %err, "command rejected");
            return Err(err);
        }

        self.redo_stack.clear();
        let record = AuditRecord::new(AuditAction::Executed, command.description());
        let evicted = self.undo_stack.push(command);
        if !evicted.is_empty() {
            tracing::debug!(
                evicted = evicted.len(),
                retained = self.undo_stack.len(),
                "undo history over capacity; discarded oldest commands"
            );
        }

        tracing::debug!(command = %record.description, "command executed");
        self.publish(&record);
        Ok(())
    }

    /// Undo the most recent command.
    ///
    /// Returns `Ok(None)` when there is nothing to undo. If the command's own
    /// undo fails, it stays on the undo list and the error is returned.
    pub fn undo(&mut self, state: &mut S) -> DomainResult<Option<String>> {
        let Some(mut command) = self.undo_stack.pop() else {
            return Ok(None);
        };

        if let Err(err) = command.undo(state) {
            tracing::warn!(command = command.description(), error = %err, "undo failed");
            self.undo_stack.push(command);
            return Err(err);
        }

        let description = command.description().to_string();
        self.redo_stack.push(command);

        tracing::debug!(command = %description, "command undone");
        self.publish(&AuditRecord::new(AuditAction::Undone, description.clone()));
        Ok(Some(description))
    }

    /// Redo the most recently undone command.
    ///
    /// Returns `Ok(None)` when there is nothing to redo. If the redo fails, the
    /// command stays on the redo list and the error is returned.
    ///
    /// A successful redo moves only that command back onto the undo list. The
    /// older undone commands stay redoable, so repeated redos walk forward
    /// through everything that was undone. Only [`HistoryManager::execute`]
    /// clears the redo list.
    pub fn redo(&mut self, state: &mut S) -> DomainResult<Option<String>> {
        let Some(mut command) = self.redo_stack.pop() else {
            return Ok(None);
        };

        if let Err(err) = command.redo(state) {
            tracing::warn!(command = command.description(), error = %err, "redo failed");
            self.redo_stack.push(command);
            return Err(err);
        }

        let description = command.description().to_string();
        self.undo_stack.push(command);

        tracing::debug!(command = %description, "command redone");
        self.publish(&AuditRecord::new(AuditAction::Redone, description.clone()));
        Ok(Some(description))
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Descriptions of undoable commands, most recent first.
    pub fn undo_descriptions(&self) -> Vec<&str> {
        self.undo_stack
            .iter_recent_first()
            .map(|c| c.description())
            .collect()
    }

    /// Descriptions of redoable commands, most recent first.
    pub fn redo_descriptions(&self) -> Vec<&str> {
        self.redo_stack.iter().rev().map(|c| c.description()).collect()
    }

    pub fn next_undo_description(&self) -> Option<&str> {
        self.undo_stack.peek().map(|c| c.description())
    }

    pub fn next_redo_description(&self) -> Option<&str> {
        self.redo_stack.last().map(|c| c.description())
    }

    /// Forget both undo and redo history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    fn publish(&self, record: &AuditRecord) {
        for sink in &self.sinks {
            sink.record(record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::RecordingAuditSink;
    use larder_core::DomainError;

    /// Adds to a counter; refuses to take it below zero.
    struct Add {
        delta: i64,
        description: String,
    }

    fn add(delta: i64) -> Box<dyn Command<i64>> {
        Box::new(Add {
            delta,
            description: format!("add {delta}"),
        })
    }

    impl Command<i64> for Add {
        fn execute(&mut self, state: &mut i64) -> DomainResult<()> {
            if *state + self.delta < 0 {
                return Err(DomainError::invariant("counter cannot go negative"));
            }
            *state += self.delta;
            Ok(())
        }

        fn undo(&mut self, state: &mut i64) -> DomainResult<()> {
            *state -= self.delta;
            Ok(())
        }

        fn description(&self) -> &str {
            &self.description
        }
    }

    #[test]
    fn execute_undo_redo_round_trip() {
        let mut state = 0;
        let mut history = HistoryManager::default();

        history.execute(&mut state, add(5)).unwrap();
        history.execute(&mut state, add(3)).unwrap();
        assert_eq!(state, 8);
        assert_eq!(history.undo_descriptions(), vec!["add 3", "add 5"]);

        assert_eq!(history.undo(&mut state).unwrap().as_deref(), Some("add 3"));
        assert_eq!(state, 5);
        assert!(history.can_redo());
        assert_eq!(history.redo_descriptions(), vec!["add 3"]);

        assert_eq!(history.redo(&mut state).unwrap().as_deref(), Some("add 3"));
        assert_eq!(state, 8);
        assert!(!history.can_redo());
    }

    #[test]
    fn undo_and_redo_on_empty_history_are_noops() {
        let mut state = 7;
        let mut history: HistoryManager<i64> = HistoryManager::default();

        assert_eq!(history.undo(&mut state).unwrap(), None);
        assert_eq!(history.redo(&mut state).unwrap(), None);
        assert_eq!(state, 7);
    }

    #[test]
    fn redo_keeps_older_undone_commands_redoable() {
        let mut state = 0;
        let mut history = HistoryManager::default();

        for delta in [1, 2, 4] {
            history.execute(&mut state, add(delta)).unwrap();
        }
        while history.undo(&mut state).unwrap().is_some() {}
        assert_eq!(history.redo_descriptions(), vec!["add 1", "add 2", "add 4"]);

        assert_eq!(history.redo(&mut state).unwrap().as_deref(), Some("add 1"));
        assert_eq!(history.redo_descriptions(), vec!["add 2", "add 4"]);
        assert_eq!(history.redo(&mut state).unwrap().as_deref(), Some("add 2"));
        assert_eq!(state, 3);
        assert_eq!(history.redo_depth(), 1);
    }

    #[test]
    fn new_command_after_undo_invalidates_redo() {
        let mut state = 0;
        let mut history = HistoryManager::default();

        history.execute(&mut state, add(1)).unwrap();
        history.execute(&mut state, add(2)).unwrap();
        history.undo(&mut state).unwrap();
        assert!(history.can_redo());

        history.execute(&mut state, add(10)).unwrap();
        assert!(!history.can_redo());
        assert_eq!(state, 11);
    }

    #[test]
    fn rejected_command_leaves_history_untouched() {
        let mut state = 0;
        let mut history = HistoryManager::default();

        history.execute(&mut state, add(1)).unwrap();
        history.undo(&mut state).unwrap();

        let err = history.execute(&mut state, add(-5)).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert_eq!(state, 0);
        assert!(history.can_redo());
        assert!(!history.can_undo());
    }

    #[test]
    fn overflow_discards_oldest_half() {
        let mut state = 0;
        let mut history = HistoryManager::new(HistoryConfig { capacity: 4 });

        for i in 1..=5 {
            history.execute(&mut state, add(i)).unwrap();
        }

        assert!(history.undo_depth() <= 4);
        assert_eq!(history.undo_descriptions(), vec!["add 5", "add 4"]);
        assert_eq!(state, 15);
    }

    #[test]
    fn sinks_receive_every_operation() {
        let mut state = 0;
        let sink = Arc::new(RecordingAuditSink::new());
        let mut history = HistoryManager::default();
        history.add_sink(sink.clone());

        history.execute(&mut state, add(2)).unwrap();
        history.undo(&mut state).unwrap();
        history.redo(&mut state).unwrap();
        let _ = history.execute(&mut state, add(-100));

        assert_eq!(
            sink.descriptions(),
            vec![
                (AuditAction::Executed, "add 2".to_string()),
                (AuditAction::Undone, "add 2".to_string()),
                (AuditAction::Redone, "add 2".to_string()),
            ]
        );
    }

    #[test]
    fn clear_empties_both_lists() {
        let mut state = 0;
        let mut history = HistoryManager::default();
        history.execute(&mut state, add(1)).unwrap();
        history.execute(&mut state, add(1)).unwrap();
        history.undo(&mut state).unwrap();

        history.clear();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.next_undo_description(), None);
    }
}
