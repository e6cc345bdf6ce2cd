use larder_core::DomainResult;

/// A reversible mutation of some state `S` (command abstraction).
///
/// Commands are value objects: everything `undo` needs is captured as owned
/// snapshots, either when the command is built or at the start of `execute`
/// before anything is mutated. A command never holds a live reference into `S`.
///
/// ## Contract
///
/// - `execute` applies the whole effect or returns an error having changed
///   nothing. Implementations validate every precondition before the first write.
/// - `undo` restores the exact observable state that existed before the matching
///   `execute`, not an approximation of it.
/// - `redo` re-applies the effect after an `undo`; by default it is `execute`.
/// - `description` is a pure accessor used for audit and history display.
///
/// `Send` lets a history of boxed commands live behind a mutex shared between
/// threads. The commands themselves are only ever run from one thread at a time.
pub trait Command<S>: Send {
    fn execute(&mut self, state: &mut S) -> DomainResult<()>;

    fn undo(&mut self, state: &mut S) -> DomainResult<()>;

    fn redo(&mut self, state: &mut S) -> DomainResult<()> {
        self.execute(state)
    }

    fn description(&self) -> &str;
}

impl<S> core::fmt::Debug for dyn Command<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Command")
            .field("description", &self.description())
            .finish()
    }
}

impl<S, C> Command<S> for Box<C>
where
    C: Command<S> + ?Sized,
{
    fn execute(&mut self, state: &mut S) -> DomainResult<()> {
        (**self).execute(state)
    }

    fn undo(&mut self, state: &mut S) -> DomainResult<()> {
        (**self).undo(state)
    }

    fn redo(&mut self, state: &mut S) -> DomainResult<()> {
        (**self).redo(state)
    }

    fn description(&self) -> &str {
        (**self).description()
    }
}
