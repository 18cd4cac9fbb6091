//! Output templates, compiled once and rendered per request.
//!
//! A template like `"user=${name}!"` compiles into literal runs and variable
//! references; references are resolved to session slots at compile time, so
//! rendering is a straight walk over the segments with no name lookups.
//! `$$` escapes a literal dollar sign; a `$` not followed by `{` passes
//! through as-is.

use crate::error::{ConfigError, TransformError};
use crate::session::{Session, SlotAllocator, VarAccess};

#[derive(Debug, Clone)]
enum Segment {
    Literal(Vec<u8>),
    Var(VarAccess),
}

/// A compiled output template.
///
/// Immutable after compilation and shared across sessions. Rendering is
/// read-only over session state: it never declares or mutates variables.
#[derive(Debug, Clone)]
pub struct Pattern {
    segments: Vec<Segment>,
    strict: bool,
}

impl Pattern {
    /// Compile `template`, resolving variable references through `alloc`.
    ///
    /// With `strict` set, rendering a reference whose variable is undeclared
    /// or unset fails with [`TransformError::UnsetVariable`]; otherwise such
    /// references render as nothing.
    pub fn compile(
        template: &str,
        alloc: &mut SlotAllocator,
        strict: bool,
    ) -> Result<Self, ConfigError> {
        let bytes = template.as_bytes();
        let mut segments = Vec::new();
        let mut literal = Vec::new();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'$' if bytes.get(i + 1) == Some(&b'$') => {
                    literal.push(b'$');
                    i += 2;
                }
                b'$' if bytes.get(i + 1) == Some(&b'{') => {
                    let start = i + 2;
                    let end = bytes[start..]
                        .iter()
                        .position(|&b| b == b'}')
                        .map(|p| start + p)
                        .ok_or(ConfigError::Template {
                            at: i,
                            reason: "unterminated `${`",
                        })?;
                    if end == start {
                        return Err(ConfigError::Template {
                            at: i,
                            reason: "empty variable reference",
                        });
                    }
                    let name = std::str::from_utf8(&bytes[start..end]).map_err(|_| {
                        ConfigError::Template {
                            at: i,
                            reason: "variable reference is not valid UTF-8",
                        }
                    })?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Var(alloc.access(name)));
                    i = end + 1;
                }
                b => {
                    literal.push(b);
                    i += 1;
                }
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        tracing::debug!(template, segments = segments.len(), "compiled pattern");
        Ok(Self { segments, strict })
    }

    /// Render into `out`, substituting each reference with the variable's
    /// current byte representation.
    pub fn render(&self, session: &Session, out: &mut Vec<u8>) -> Result<(), TransformError> {
        for segment in &self.segments {
            match segment {
                Segment::Literal(bytes) => out.extend_from_slice(bytes),
                Segment::Var(var) => match session.get(var) {
                    Some(value) => value.write_to(out),
                    None if self.strict => {
                        return Err(TransformError::UnsetVariable(var.name().to_string()));
                    }
                    None => {}
                },
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Value;

    fn render(pattern: &Pattern, session: &Session) -> Result<Vec<u8>, TransformError> {
        let mut out = Vec::new();
        pattern.render(session, &mut out)?;
        Ok(out)
    }

    #[test]
    fn literal_only_template_passes_through() {
        let mut alloc = SlotAllocator::new();
        let p = Pattern::compile("plain text", &mut alloc, true).unwrap();
        assert_eq!(render(&p, &Session::new()).unwrap(), b"plain text");
    }

    #[test]
    fn substitutes_variables() {
        let mut alloc = SlotAllocator::new();
        let p = Pattern::compile("a=${x}, b=${y}", &mut alloc, true).unwrap();
        let x = alloc.access("x");
        let y = alloc.access("y");
        let mut session = Session::new();
        session.declare(&x);
        session.declare(&y);
        session.set(&x, Value::Text("1".into()));
        session.set(&y, Value::Bytes(b"2".to_vec()));
        assert_eq!(render(&p, &session).unwrap(), b"a=1, b=2");
    }

    #[test]
    fn dollar_escape() {
        let mut alloc = SlotAllocator::new();
        let p = Pattern::compile("$$${x}$", &mut alloc, false).unwrap();
        let x = alloc.access("x");
        let mut session = Session::new();
        session.declare(&x);
        session.set(&x, Value::Text("v".into()));
        assert_eq!(render(&p, &session).unwrap(), b"$v$");
    }

    #[test]
    fn strict_render_names_the_missing_variable() {
        let mut alloc = SlotAllocator::new();
        let p = Pattern::compile("${missing}", &mut alloc, true).unwrap();
        match render(&p, &Session::new()) {
            Err(TransformError::UnsetVariable(name)) => assert_eq!(name, "missing"),
            other => panic!("expected UnsetVariable, got {other:?}"),
        }
    }

    #[test]
    fn lenient_render_substitutes_nothing() {
        let mut alloc = SlotAllocator::new();
        let p = Pattern::compile("<${missing}>", &mut alloc, false).unwrap();
        assert_eq!(render(&p, &Session::new()).unwrap(), b"<>");
    }

    #[test]
    fn unterminated_reference_is_a_config_error() {
        let mut alloc = SlotAllocator::new();
        assert!(matches!(
            Pattern::compile("${oops", &mut alloc, true),
            Err(ConfigError::Template { .. })
        ));
    }

    #[test]
    fn empty_reference_is_a_config_error() {
        let mut alloc = SlotAllocator::new();
        assert!(matches!(
            Pattern::compile("${}", &mut alloc, true),
            Err(ConfigError::Template { .. })
        ));
    }
}
