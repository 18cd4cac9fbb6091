//! Kalip — a session-based response-transform pipeline for load-testing
//! engines.
//!
//! Kalip is the transform stage of a load generator: the piece that takes a
//! raw wire response, binds it to per-virtual-user state, mutates that state
//! through a configured list of actions, and renders a templated output
//! fragment. It is built to be shared by thousands of concurrently executing
//! sessions without locks and without allocating on the per-request path.
//!
//! # Architecture
//!
//! The main building blocks are:
//!
//! - [`Session`]: per-actor variable storage, indexed by pre-resolved slots.
//!   The only mutable thing in the whole pipeline.
//! - [`SlotAllocator`] / [`VarAccess`]: build-time resolution from variable
//!   names to slot handles, so execution never looks anything up by name.
//! - [`DataFormat`]: converts a complete record's bytes into a typed
//!   [`Value`] (raw bytes or text).
//! - [`Action`]: a side-effecting unit run against the session. Built once,
//!   shared everywhere, ordered exactly as configured.
//! - [`Pattern`]: a compiled output template substituting session variables
//!   into literal byte runs.
//! - [`Transformer`]: the stage contract —
//!   [`ActionsTransformer`] orchestrates convert → act → render, and
//!   [`DefragTransformer`] wraps it when the network may split records into
//!   fragments.
//! - [`ActionRegistry`] / [`TransformSpec`]: the configuration surface;
//!   named action kinds resolve through an explicit registry at load time.
//!
//! # Lifecycle
//!
//! Everything follows a two-phase contract. At build time, configuration is
//! validated and every variable name resolves to a slot. Per session,
//! `reserve` declares every slot the stage will touch — once, outside the
//! hot path — and only then may `transform` run. Misordering the phases is a
//! wiring bug and fails loudly, not a condition to retry.
//!
//! # Example
//!
//! ```rust
//! use kalip::{ActionRegistry, ActionSpec, Session, SlotAllocator, TransformSpec};
//! use serde_json::json;
//!
//! let registry = ActionRegistry::with_builtins();
//! let mut alloc = SlotAllocator::new();
//!
//! let action: ActionSpec =
//!     serde_json::from_value(json!({"kind": "append", "var": "body", "text": "!"})).unwrap();
//! let stage = TransformSpec::builder()
//!     .variable("body")
//!     .pattern("[${body}]")
//!     .actions(vec![action])
//!     .build()
//!     .build(&registry, &mut alloc, true)
//!     .unwrap();
//!
//! // One session per virtual user; the stage itself is shared.
//! let mut session = Session::new();
//! stage.reserve(&mut session);
//!
//! // The record arrives split in two; the defrag wrapper reassembles it.
//! let mut out = Vec::new();
//! stage.transform(&mut session, b"he", 0, 2, false, &mut out).unwrap();
//! stage.transform(&mut session, b"llo", 0, 3, true, &mut out).unwrap();
//! assert_eq!(out, b"[hello!]");
//! ```
//!
//! # Error model
//!
//! Configuration problems ([`ConfigError`]) abort startup and are never
//! retried. Invocation problems ([`TransformError`]) propagate to the
//! actor's execution context, which owns the abort/retry policy — nothing in
//! this crate retries on its own. Using a variable before declaring it is
//! neither: it is a programming error and panics.
//!
//! # Feature flags
//!
//! - `macros`: the `#[action_config]` attribute for action config structs.
//!   (Enabled by default)
//! - `builtins`: the built-in `set`, `append` and `unset` action kinds.
//!   (Enabled by default)

/// Side-effecting units that operate on a session
pub mod action;
/// Error taxonomy: build-time vs invocation-time
pub mod error;
/// Wire-byte to value conversion strategies
pub mod format;
/// Compiled output templates
pub mod pattern;
/// Named action kinds and the configuration surface
pub mod registry;
/// Per-actor sessions and slot-indexed variable storage
pub mod session;
/// The transform stage and its defragmentation decorator
pub mod transform;

pub use action::{Action, ActionConfig};
pub use error::{BoxError, ConfigError, TransformError};
pub use format::DataFormat;
pub use pattern::Pattern;
pub use registry::{ActionRegistry, ActionSpec, TransformSpec};
pub use session::{Session, SlotAllocator, Value, VarAccess};
pub use transform::{ActionsTransformer, DefragTransformer, Transformer};

#[cfg(feature = "macros")]
/// Procedural macros to reduce boilerplate
pub mod macros {
    pub use kalip_macros::*;
}
