use thiserror::Error;

/// Boxed error type used at the action seam, where implementations report
/// arbitrary failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Build-time errors. These abort benchmark startup and are never retried.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing variable name")]
    MissingVariable,
    #[error("missing pattern template")]
    MissingPattern,
    #[error("no actions; use a plain conversion step instead")]
    NoActions,
    #[error("unknown action kind `{0}`")]
    UnknownAction(String),
    #[error("invalid template at byte {at}: {reason}")]
    Template { at: usize, reason: &'static str },
    #[error("invalid config for `{kind}` action: {source}")]
    ActionParams {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Invocation-time errors. The caller (the actor's execution context) decides
/// whether to abort the iteration, retry, or mark the actor failed — no retry
/// happens here.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The bare stage was handed a non-final fragment. Wrap the stage in a
    /// [`DefragTransformer`](crate::transform::DefragTransformer) when input
    /// may arrive split.
    #[error("incomplete record: fragment is not final")]
    IncompleteRecord,
    /// A pattern referenced a variable that was never set in this session.
    #[error("variable `{0}` referenced before being set")]
    UnsetVariable(String),
    #[error("action failed: {0}")]
    Action(#[source] BoxError),
}
