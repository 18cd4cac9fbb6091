//! Named action kinds and the configuration surface.
//!
//! Configuration names an action by kind (`{"kind": "append", ...}`); the
//! [`ActionRegistry`] maps each kind to a factory that turns the remaining
//! parameters into a built [`Action`]. Resolution happens once, at
//! configuration-load time — there is no discovery or reflection at runtime.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use typed_builder::TypedBuilder;

use crate::action::Action;
use crate::error::ConfigError;
use crate::format::DataFormat;
use crate::session::SlotAllocator;
use crate::transform::{ActionsTransformer, Transformer};

/// Factory for one action kind: parameters in, built action out.
pub type ActionFactory =
    Box<dyn Fn(&serde_json::Value, &mut SlotAllocator) -> Result<Box<dyn Action>, ConfigError> + Send + Sync>;

/// Explicit kind → factory map, populated at startup.
#[derive(Default)]
pub struct ActionRegistry {
    factories: HashMap<String, ActionFactory>,
}

impl ActionRegistry {
    /// An empty registry; register kinds yourself.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-loaded with the built-in kinds `set`, `append` and
    /// `unset`.
    #[cfg(feature = "builtins")]
    pub fn with_builtins() -> Self {
        use crate::action::{AppendAction, AppendConfig, SetAction, SetConfig, UnsetAction, UnsetConfig};
        use crate::session::Value;

        let mut registry = Self::new();
        registry.register("set", |params, alloc| {
            let cfg: SetConfig = decode("set", params)?;
            Ok(Box::new(SetAction::new(alloc.access(&cfg.var), Value::Text(cfg.text))))
        });
        registry.register("append", |params, alloc| {
            let cfg: AppendConfig = decode("append", params)?;
            Ok(Box::new(AppendAction::new(alloc.access(&cfg.var), cfg.text)))
        });
        registry.register("unset", |params, alloc| {
            let cfg: UnsetConfig = decode("unset", params)?;
            Ok(Box::new(UnsetAction::new(alloc.access(&cfg.var))))
        });
        registry
    }

    /// Register a factory for `kind`, replacing any previous one.
    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F)
    where
        F: Fn(&serde_json::Value, &mut SlotAllocator) -> Result<Box<dyn Action>, ConfigError>
            + Send
            + Sync
            + 'static,
    {
        let kind = kind.into();
        tracing::debug!(kind = %kind, "registered action kind");
        self.factories.insert(kind, Box::new(factory));
    }

    /// Build the action a spec names.
    pub fn build(
        &self,
        spec: &ActionSpec,
        alloc: &mut SlotAllocator,
    ) -> Result<Box<dyn Action>, ConfigError> {
        let factory = self
            .factories
            .get(&spec.kind)
            .ok_or_else(|| ConfigError::UnknownAction(spec.kind.clone()))?;
        factory(&spec.params, alloc)
    }
}

/// Decode a kind's parameter payload into its config struct.
pub fn decode<C: serde::de::DeserializeOwned>(
    kind: &str,
    params: &serde_json::Value,
) -> Result<C, ConfigError> {
    serde_json::from_value(params.clone()).map_err(|source| ConfigError::ActionParams {
        kind: kind.to_string(),
        source,
    })
}

/// One configured action: a kind plus whatever parameters that kind takes.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionSpec {
    pub kind: String,
    #[serde(flatten)]
    pub params: serde_json::Value,
}

/// Deserializable mirror of the transform stage's configuration surface.
///
/// Recognized options: `variable` (required), `format` (default `string`),
/// `pattern` (required), `actions` (required, ordered, non-empty). Also
/// constructible programmatically:
///
/// ```
/// use kalip::TransformSpec;
///
/// let spec = TransformSpec::builder()
///     .variable("body")
///     .pattern("${body}")
///     .build();
/// assert_eq!(spec.variable.as_deref(), Some("body"));
/// ```
#[derive(Debug, Clone, Deserialize, TypedBuilder)]
pub struct TransformSpec {
    #[serde(default)]
    #[builder(default, setter(strip_option, into))]
    pub variable: Option<String>,
    #[serde(default)]
    #[builder(default)]
    pub format: DataFormat,
    #[serde(default)]
    #[builder(default, setter(strip_option, into))]
    pub pattern: Option<String>,
    #[serde(default)]
    #[builder(default)]
    pub actions: Vec<ActionSpec>,
}

impl TransformSpec {
    /// Resolve the action specs through `registry` and build the stage.
    /// Validation (missing variable or pattern, empty action list) fails
    /// here, before any session exists.
    pub fn build(
        &self,
        registry: &ActionRegistry,
        alloc: &mut SlotAllocator,
        fragmented: bool,
    ) -> Result<Arc<dyn Transformer>, ConfigError> {
        let mut builder = ActionsTransformer::builder().format(self.format);
        if let Some(variable) = &self.variable {
            builder = builder.var(variable);
        }
        if let Some(pattern) = &self.pattern {
            builder = builder.pattern(pattern);
        }
        for spec in &self.actions {
            builder = builder.action_boxed(registry.build(spec, alloc)?);
        }
        builder.build(alloc, fragmented)
    }
}
