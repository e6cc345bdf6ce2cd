use larder_core::{DomainError, DomainResult};

use crate::command::Command;

/// A batch of commands that execute and undo as one history entry.
///
/// Children run in insertion order and are undone in reverse. If a child fails
/// during `execute`, the children that already ran are undone before the error is
/// returned, so the batch as a whole still applies all-or-nothing.
pub struct CommandBatch<S> {
    commands: Vec<Box<dyn Command<S>>>,
    description: String,
    executed_to: usize,
}

impl<S> core::fmt::Debug for CommandBatch<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CommandBatch")
            .field("description", &self.description)
            .field("commands", &self.commands.len())
            .field("executed_to", &self.executed_to)
            .finish()
    }
}

impl<S> CommandBatch<S> {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            commands: Vec::new(),
            description: description.into(),
            executed_to: 0,
        }
    }

    pub fn push(&mut self, command: impl Command<S> + 'static) {
        self.commands.push(Box::new(command));
    }

    pub fn with(mut self, command: impl Command<S> + 'static) -> Self {
        self.push(command);
        self
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Descriptions of the children in execution order.
    pub fn child_descriptions(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.description()).collect()
    }
}

impl<S> Command<S> for CommandBatch<S> {
    fn execute(&mut self, state: &mut S) -> DomainResult<()> {
        if self.commands.is_empty() {
            return Err(DomainError::validation("batch contains no commands"));
        }

        for i in 0..self.commands.len() {
            if let Err(err) = self.commands[i].execute(state) {
                for j in (0..i).rev() {
                    if let Err(rollback) = self.commands[j].undo(state) {
                        tracing::error!(
                            batch = %self.description,
                            child = self.commands[j].description(),
                            error = %rollback,
                            "failed to roll back batch child"
                        );
                    }
                }
                self.executed_to = 0;
                return Err(err);
            }
            self.executed_to = i + 1;
        }
        Ok(())
    }

    fn undo(&mut self, state: &mut S) -> DomainResult<()> {
        while self.executed_to > 0 {
            self.commands[self.executed_to - 1].undo(state)?;
            self.executed_to -= 1;
        }
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Appends a value; refuses negative values.
    struct Append(i32);

    impl Command<Vec<i32>> for Append {
        fn execute(&mut self, state: &mut Vec<i32>) -> DomainResult<()> {
            if self.0 < 0 {
                return Err(DomainError::validation("negative"));
            }
            state.push(self.0);
            Ok(())
        }

        fn undo(&mut self, state: &mut Vec<i32>) -> DomainResult<()> {
            state.pop();
            Ok(())
        }

        fn description(&self) -> &str {
            "append"
        }
    }

    #[test]
    fn batch_executes_in_order_and_undoes_in_reverse() {
        let mut state = Vec::new();
        let mut batch = CommandBatch::new("three").with(Append(1)).with(Append(2)).with(Append(3));

        batch.execute(&mut state).unwrap();
        assert_eq!(state, vec![1, 2, 3]);

        batch.undo(&mut state).unwrap();
        assert!(state.is_empty());

        batch.redo(&mut state).unwrap();
        assert_eq!(state, vec![1, 2, 3]);
    }

    #[test]
    fn failing_child_rolls_back_earlier_children() {
        let mut state = vec![9];
        let mut batch = CommandBatch::new("mixed").with(Append(1)).with(Append(2)).with(Append(-1));

        let err = batch.execute(&mut state).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(state, vec![9]);
    }

    #[test]
    fn empty_batch_is_rejected() {
        let mut state = Vec::new();
        let mut batch: CommandBatch<Vec<i32>> = CommandBatch::new("nothing");
        assert!(batch.execute(&mut state).is_err());
        assert_eq!(batch.child_descriptions().len(), 0);
    }
}
