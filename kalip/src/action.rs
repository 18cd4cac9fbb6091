use crate::error::BoxError;
use crate::session::Session;

/// A side-effecting unit run against a session.
///
/// Actions are built once from configuration and shared across all sessions,
/// so implementations hold no mutable state of their own — everything mutable
/// lives in the session. The two-phase contract mirrors the transform stage:
/// [`reserve`](Action::reserve) declares every variable the action will touch,
/// once per session, before any [`run`](Action::run).
///
/// Within one stage invocation, actions run strictly in their configured
/// order and are never reordered or parallelized. A failing action stops the
/// list; the error propagates to the actor's execution context, which owns
/// the retry/abort policy.
pub trait Action: Send + Sync {
    /// Declare the variables this action reads or writes. Default: nothing.
    fn reserve(&self, _session: &mut Session) {}

    /// Execute against the session.
    fn run(&self, session: &mut Session) -> Result<(), BoxError>;
}

/// Marker for structs that configure an action kind, stamped on by the
/// `#[action_config]` attribute.
pub trait ActionConfig
where
    Self: serde::de::DeserializeOwned + std::fmt::Debug + Clone,
{
}

#[cfg(feature = "builtins")]
pub use builtins::*;

#[cfg(feature = "builtins")]
mod builtins {
    use super::*;
    use crate::macros::action_config;
    use crate::session::{Value, VarAccess};

    /// Config for [`SetAction`].
    #[action_config]
    pub struct SetConfig {
        pub var: String,
        pub text: String,
    }

    /// Stores a literal value into a variable.
    pub struct SetAction {
        var: VarAccess,
        value: Value,
    }

    impl SetAction {
        pub fn new(var: VarAccess, value: Value) -> Self {
            Self { var, value }
        }
    }

    impl Action for SetAction {
        fn reserve(&self, session: &mut Session) {
            session.declare(&self.var);
        }

        fn run(&self, session: &mut Session) -> Result<(), BoxError> {
            session.set(&self.var, self.value.clone());
            Ok(())
        }
    }

    /// Config for [`AppendAction`].
    #[action_config]
    pub struct AppendConfig {
        pub var: String,
        pub text: String,
    }

    /// Appends text to a variable, starting from empty when it is unset.
    pub struct AppendAction {
        var: VarAccess,
        text: String,
    }

    impl AppendAction {
        pub fn new(var: VarAccess, text: impl Into<String>) -> Self {
            Self {
                var,
                text: text.into(),
            }
        }
    }

    impl Action for AppendAction {
        fn reserve(&self, session: &mut Session) {
            session.declare(&self.var);
        }

        fn run(&self, session: &mut Session) -> Result<(), BoxError> {
            match session.get_mut(&self.var) {
                Some(Value::Text(s)) => s.push_str(&self.text),
                Some(Value::Bytes(b)) => b.extend_from_slice(self.text.as_bytes()),
                None => session.set(&self.var, Value::Text(self.text.clone())),
            }
            Ok(())
        }
    }

    /// Config for [`UnsetAction`].
    #[action_config]
    pub struct UnsetConfig {
        pub var: String,
    }

    /// Clears a variable, leaving the slot declared but unset.
    pub struct UnsetAction {
        var: VarAccess,
    }

    impl UnsetAction {
        pub fn new(var: VarAccess) -> Self {
            Self { var }
        }
    }

    impl Action for UnsetAction {
        fn reserve(&self, session: &mut Session) {
            session.declare(&self.var);
        }

        fn run(&self, session: &mut Session) -> Result<(), BoxError> {
            session.unset(&self.var);
            Ok(())
        }
    }
}
