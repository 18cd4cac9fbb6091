//! The actions transformer: convert, act, render.

use std::sync::Arc;

use crate::action::Action;
use crate::error::{ConfigError, TransformError};
use crate::format::DataFormat;
use crate::pattern::Pattern;
use crate::session::{Session, SlotAllocator, VarAccess};
use crate::transform::{DefragTransformer, Transformer};

/// Stores the (defragmented) input into a variable using the requested
/// format, executes all configured actions, then fetches the transformed
/// value through the pattern.
///
/// Immutable after build; one instance serves every session.
pub struct ActionsTransformer {
    var: VarAccess,
    format: DataFormat,
    actions: Vec<Box<dyn Action>>,
    pattern: Pattern,
}

impl ActionsTransformer {
    pub fn builder() -> ActionsTransformerBuilder {
        ActionsTransformerBuilder::default()
    }
}

impl Transformer for ActionsTransformer {
    fn reserve(&self, session: &mut Session) {
        session.declare(&self.var);
        for action in &self.actions {
            action.reserve(session);
        }
    }

    fn transform(
        &self,
        session: &mut Session,
        input: &[u8],
        offset: usize,
        length: usize,
        last_fragment: bool,
        out: &mut Vec<u8>,
    ) -> Result<(), TransformError> {
        if !last_fragment {
            return Err(TransformError::IncompleteRecord);
        }
        session.set(&self.var, self.format.convert(input, offset, length));
        for action in &self.actions {
            action.run(session).map_err(TransformError::Action)?;
        }
        self.pattern.render(session, out)
    }
}

/// Assembles an [`ActionsTransformer`] from configuration.
///
/// Validation happens in [`build`](ActionsTransformerBuilder::build):
/// the variable name and pattern are required and the action list must be
/// non-empty — a stage with no actions would be a plain pass-through, which
/// means the wrong component was configured.
#[derive(Default)]
pub struct ActionsTransformerBuilder {
    var: Option<String>,
    format: DataFormat,
    pattern: Option<String>,
    actions: Vec<Box<dyn Action>>,
}

impl ActionsTransformerBuilder {
    /// Variable used as the intermediate storage for the data.
    pub fn var(mut self, var: impl Into<String>) -> Self {
        self.var = Some(var.into());
        self
    }

    /// Format the input is converted to before storing. Default is text.
    pub fn format(mut self, format: DataFormat) -> Self {
        self.format = format;
        self
    }

    /// Template the transformed value is fetched through.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Append an action to the (ordered) list.
    pub fn action(self, action: impl Action + 'static) -> Self {
        self.action_boxed(Box::new(action))
    }

    pub fn action_boxed(mut self, action: Box<dyn Action>) -> Self {
        self.actions.push(action);
        self
    }

    /// Build the stage. With `fragmented` set the stage is wrapped in a
    /// [`DefragTransformer`]; leave it unset only when the caller guarantees
    /// whole-record delivery.
    pub fn build(
        self,
        alloc: &mut SlotAllocator,
        fragmented: bool,
    ) -> Result<Arc<dyn Transformer>, ConfigError> {
        let var = self.var.ok_or(ConfigError::MissingVariable)?;
        let template = self.pattern.ok_or(ConfigError::MissingPattern)?;
        if self.actions.is_empty() {
            return Err(ConfigError::NoActions);
        }
        let pattern = Pattern::compile(&template, alloc, true)?;
        tracing::debug!(
            var = %var,
            actions = self.actions.len(),
            fragmented,
            "built actions transformer"
        );
        let transformer = ActionsTransformer {
            var: alloc.access(&var),
            format: self.format,
            actions: self.actions,
            pattern,
        };
        if fragmented {
            Ok(Arc::new(DefragTransformer::new(transformer, alloc)))
        } else {
            Ok(Arc::new(transformer))
        }
    }
}
