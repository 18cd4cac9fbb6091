//! Transform stages — the response-transform step of the benchmark pipeline.
//!
//! A [`Transformer`] takes one complete logical record delivered by the
//! network layer, binds it to session state, and emits a rendered output
//! fragment. The built-in [`ActionsTransformer`] does this in three steps:
//! convert the record with a [`DataFormat`](crate::format::DataFormat) and
//! store it at its variable slot, run the configured
//! [`Action`](crate::action::Action) list in order, then render its
//! [`Pattern`](crate::pattern::Pattern) into the output buffer.
//!
//! # Lifecycle
//!
//! Stages follow the same two-phase contract as everything else that touches
//! a session:
//!
//! 1. [`reserve`](Transformer::reserve) — called once per session before any
//!    execution. The stage declares its own variable and propagates the call
//!    to every contained action. Reservation happens outside the hot path so
//!    slot allocation never occurs per request.
//! 2. [`transform`](Transformer::transform) — the per-request hot path.
//!    May only touch slots declared during reservation.
//!
//! Calling `transform` on a fresh session without `reserve` is a wiring
//! defect and panics inside the session accessors.
//!
//! # Sharing across sessions
//!
//! A built stage is immutable: its variable handle, format, action list and
//! compiled pattern never change after construction. All mutable state lives
//! in the session, which is owned by a single actor. That is the whole
//! concurrency story — one `Arc<dyn Transformer>` is shared by thousands of
//! concurrently executing sessions with no locks, whether the engine runs
//! parallel worker threads or a cooperative event loop per actor.
//!
//! # Fragmentation
//!
//! The network layer may deliver a record split into arbitrary fragments.
//! A bare `ActionsTransformer` refuses non-final fragments (the converter
//! and actions assume a whole record); when delivery may be split, wrap the
//! stage in a [`DefragTransformer`], which buffers fragments per session and
//! forwards exactly one complete record.
//!
//! # Failure semantics
//!
//! Nothing here retries. Action failures and unset pattern variables surface
//! as [`TransformError`](crate::error::TransformError) to the actor's
//! execution context. If an invocation is abandoned mid-action-list the
//! session is left consistent but partially updated; recovering from that is
//! the engine's call, not the stage's.

pub mod actions;
pub mod defrag;

pub use actions::{ActionsTransformer, ActionsTransformerBuilder};
pub use defrag::DefragTransformer;

use crate::error::TransformError;
use crate::session::Session;

/// The contract between the upstream fragment producer and a transform stage.
///
/// `input`/`offset`/`length` describe the delivered byte range;
/// `last_fragment` tells whether it completes a logical record. Output is
/// appended to `out`.
pub trait Transformer: Send + Sync {
    /// Declare every session slot this stage and its actions will touch.
    /// Idempotent per session; must run before the first `transform`.
    fn reserve(&self, session: &mut Session);

    /// Process one delivered fragment.
    fn transform(
        &self,
        session: &mut Session,
        input: &[u8],
        offset: usize,
        length: usize,
        last_fragment: bool,
        out: &mut Vec<u8>,
    ) -> Result<(), TransformError>;
}
