//! Guarded commands invoked by the UI layer.

use std::fmt::{Debug, Formatter};

/// An action on view-model state `S` paired with an enable predicate.
///
/// The UI re-evaluates [`Command::can_execute`] after property changes;
/// [`Command::execute`] re-checks the guard and returns `Ok(None)` when the
/// command is disabled.
pub struct Command<S, T, E> {
    name: &'static str,
    guard: fn(&S) -> bool,
    action: fn(&mut S) -> Result<T, E>,
}

impl<S, T, E> Command<S, T, E> {
    pub fn new(
        name: &'static str,
        guard: fn(&S) -> bool,
        action: fn(&mut S) -> Result<T, E>,
    ) -> Self {
        Self {
            name,
            guard,
            action,
        }
    }

    /// Command that is always enabled.
    pub fn always(name: &'static str, action: fn(&mut S) -> Result<T, E>) -> Self {
        Self::new(name, |_| true, action)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn can_execute(&self, state: &S) -> bool {
        (self.guard)(state)
    }

    pub fn execute(&self, state: &mut S) -> Result<Option<T>, E> {
        if !(self.guard)(state) {
            return Ok(None);
        }
        (self.action)(state).map(Some)
    }
}

impl<S, T, E> Clone for Command<S, T, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, T, E> Copy for Command<S, T, E> {}

impl<S, T, E> Debug for Command<S, T, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::Command;

    struct Counter {
        value: i32,
        enabled: bool,
    }

    fn increment(counter: &mut Counter) -> Result<i32, String> {
        counter.value += 1;
        Ok(counter.value)
    }

    #[test]
    fn disabled_command_does_not_run() {
        let command = Command::new("increment", |c: &Counter| c.enabled, increment);
        let mut counter = Counter {
            value: 0,
            enabled: false,
        };
        assert!(!command.can_execute(&counter));
        assert_eq!(command.execute(&mut counter), Ok(None));
        assert_eq!(counter.value, 0);

        counter.enabled = true;
        assert_eq!(command.execute(&mut counter), Ok(Some(1)));
        assert_eq!(command.name(), "increment");
    }
}
