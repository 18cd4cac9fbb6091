//! Record reassembly in front of a transform stage.

use crate::error::TransformError;
use crate::format::slice_range;
use crate::session::{Session, SlotAllocator, Value, VarAccess};
use crate::transform::Transformer;

/// Decorator that buffers split deliveries and hands the wrapped stage one
/// complete record.
///
/// The decorator itself is as stateless as the stage it wraps: the
/// accumulation buffer lives in a scratch session slot, so one instance is
/// shared across sessions like any other transformer. Unfragmented records
/// are forwarded directly without touching the buffer.
pub struct DefragTransformer<T> {
    inner: T,
    buffer: VarAccess,
}

impl<T: Transformer> DefragTransformer<T> {
    pub fn new(inner: T, alloc: &mut SlotAllocator) -> Self {
        Self {
            inner,
            buffer: alloc.scratch("defrag"),
        }
    }
}

impl<T: Transformer> Transformer for DefragTransformer<T> {
    fn reserve(&self, session: &mut Session) {
        session.declare(&self.buffer);
        self.inner.reserve(session);
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
        let fragment = slice_range(input, offset, length);
        if !last_fragment {
            match session.get_mut(&self.buffer) {
                Some(Value::Bytes(buf)) => buf.extend_from_slice(fragment),
                _ => session.set(&self.buffer, Value::Bytes(fragment.to_vec())),
            }
            tracing::trace!(buffered = fragment.len(), "buffered partial fragment");
            return Ok(());
        }
        match session.unset(&self.buffer) {
            Some(Value::Bytes(mut buf)) if !buf.is_empty() => {
                buf.extend_from_slice(fragment);
                tracing::trace!(record = buf.len(), "forwarding reassembled record");
                self.inner.transform(session, &buf, 0, buf.len(), true, out)
            }
            _ => self.inner.transform(session, input, offset, length, true, out),
        }
    }
}

#[cfg(all(test, feature = "builtins"))]
mod tests {
    use super::*;
    use crate::action::AppendAction;
    use crate::transform::ActionsTransformer;
    use std::sync::Arc;

    fn stage(alloc: &mut SlotAllocator, fragmented: bool) -> Arc<dyn Transformer> {
        let trail = AppendAction::new(alloc.access("trail"), "A");
        ActionsTransformer::builder()
            .var("body")
            .pattern("${body}:${trail}")
            .action(trail)
            .build(alloc, fragmented)
            .unwrap()
    }

    fn run(stage: &dyn Transformer, fragments: &[(&[u8], bool)]) -> Vec<u8> {
        let mut session = Session::new();
        stage.reserve(&mut session);
        let mut out = Vec::new();
        for (bytes, last) in fragments {
            stage
                .transform(&mut session, bytes, 0, bytes.len(), *last, &mut out)
                .unwrap();
        }
        out
    }

    #[test]
    fn fragmentation_is_transparent() {
        let mut alloc = SlotAllocator::new();
        let whole = run(&*stage(&mut alloc, false), &[(b"hello", true)]);

        let mut alloc = SlotAllocator::new();
        let split = run(&*stage(&mut alloc, true), &[(b"he", false), (b"llo", true)]);

        assert_eq!(whole, split);
        assert_eq!(split, b"hello:A");
    }

    #[test]
    fn byte_order_is_preserved_across_many_fragments() {
        let mut alloc = SlotAllocator::new();
        let out = run(
            &*stage(&mut alloc, true),
            &[(b"ab", false), (b"", false), (b"cd", false), (b"ef", true)],
        );
        assert_eq!(out, b"abcdef:A");
    }

    #[test]
    fn unfragmented_record_is_forwarded_directly() {
        let mut alloc = SlotAllocator::new();
        let out = run(&*stage(&mut alloc, true), &[(b"solo", true)]);
        assert_eq!(out, b"solo:A");
    }

    #[test]
    fn buffer_resets_between_records() {
        let mut alloc = SlotAllocator::new();
        let stage = stage(&mut alloc, true);
        let mut session = Session::new();
        stage.reserve(&mut session);

        let mut out = Vec::new();
        stage
            .transform(&mut session, b"fi", 0, 2, false, &mut out)
            .unwrap();
        stage
            .transform(&mut session, b"rst", 0, 3, true, &mut out)
            .unwrap();
        out.clear();
        stage
            .transform(&mut session, b"second", 0, 6, true, &mut out)
            .unwrap();
        assert_eq!(out, b"second:AA");
    }

    #[test]
    fn partial_fragments_emit_no_output() {
        let mut alloc = SlotAllocator::new();
        let stage = stage(&mut alloc, true);
        let mut session = Session::new();
        stage.reserve(&mut session);

        let mut out = Vec::new();
        stage
            .transform(&mut session, b"part", 0, 4, false, &mut out)
            .unwrap();
        assert!(out.is_empty());
    }
}
