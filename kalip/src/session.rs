//! Per-actor sessions: slot-indexed variable storage behind a strict
//! declare-before-use discipline.
//!
//! Variable names are resolved to slot ids exactly once, at build time,
//! through a [`SlotAllocator`]. Everything that runs per request works with
//! [`VarAccess`] handles and plain `Vec` indexing — no name lookups, no
//! hashing, no allocation on the hot path.
//!
//! The lifecycle has two phases:
//!
//! 1. **Declare** (`reserve` on stages and actions): every slot a component
//!    will touch is declared on the session up front. Declaring is idempotent.
//! 2. **Execute**: `set`/`get`/`get_mut`/`unset` against declared slots only.
//!
//! Using a slot before declaring it is a wiring defect, not a runtime
//! condition: the mutating accessors panic with the variable name. The
//! read-only [`Session::get`] instead returns `None` for undeclared or unset
//! slots so that rendering can surface a proper runtime error naming the
//! variable.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A typed value held in a session slot.
///
/// Conversion from wire bytes always copies; a `Value` never borrows from a
/// network buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Bytes(Vec<u8>),
    Text(String),
}

impl Value {
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Bytes(b) => b.is_empty(),
            Value::Text(s) => s.is_empty(),
        }
    }

    /// The value's byte representation, as rendering emits it.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Value::Bytes(b) => b,
            Value::Text(s) => s.as_bytes(),
        }
    }

    /// Append the value's byte representation to `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.as_bytes());
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bytes(b) => write!(f, "{}", String::from_utf8_lossy(b)),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// Handle to one session slot, resolved from a variable name at build time.
///
/// A `VarAccess` carries no session state of its own, so one handle is shared
/// by every session for the lifetime of the benchmark.
#[derive(Debug, Clone)]
pub struct VarAccess {
    name: Arc<str>,
    slot: usize,
}

impl VarAccess {
    /// The variable name, kept for diagnostics only.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn slot(&self) -> usize {
        self.slot
    }
}

/// Build-time resolver from variable names to slot ids.
///
/// The same name always resolves to the same slot, so a variable written by
/// one component and read by another shares storage. One allocator is used
/// per benchmark build; sessions created afterwards size themselves as slots
/// get declared.
#[derive(Debug, Default)]
pub struct SlotAllocator {
    by_name: HashMap<Arc<str>, usize>,
    next: usize,
}

impl SlotAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `name` to a slot, allocating one on first sight.
    pub fn access(&mut self, name: &str) -> VarAccess {
        if let Some((key, &slot)) = self.by_name.get_key_value(name) {
            return VarAccess {
                name: Arc::clone(key),
                slot,
            };
        }
        let slot = self.alloc();
        let key: Arc<str> = Arc::from(name);
        self.by_name.insert(Arc::clone(&key), slot);
        tracing::debug!(name, slot, "allocated variable slot");
        VarAccess { name: key, slot }
    }

    /// Mint an anonymous slot for internal state (e.g. a defragmentation
    /// buffer). Scratch slots never enter the name map, so no template or
    /// config variable can resolve to one; the generated name exists for
    /// diagnostics only.
    pub fn scratch(&mut self, prefix: &str) -> VarAccess {
        let slot = self.alloc();
        tracing::debug!(prefix, slot, "allocated scratch slot");
        VarAccess {
            name: Arc::from(format!("{prefix}@{slot}")),
            slot,
        }
    }

    /// Number of slots allocated so far.
    pub fn slots(&self) -> usize {
        self.next
    }

    fn alloc(&mut self) -> usize {
        let slot = self.next;
        self.next += 1;
        slot
    }
}

#[derive(Debug, Default)]
struct Slot {
    declared: bool,
    value: Option<Value>,
}

/// Per-actor execution state: a flat slot table plus nothing else.
///
/// A session is owned by exactly one actor and never touched by two
/// invocations at once; the engine guarantees single-threaded access per
/// session, which is why none of this needs locking.
#[derive(Debug, Default)]
pub struct Session {
    slots: Vec<Slot>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a slot on this session. Idempotent; called from `reserve`
    /// implementations before any execution.
    pub fn declare(&mut self, var: &VarAccess) {
        let slot = var.slot();
        if slot >= self.slots.len() {
            self.slots.resize_with(slot + 1, Slot::default);
        }
        self.slots[slot].declared = true;
    }

    /// Store a value. Panics if the slot was never declared on this session.
    pub fn set(&mut self, var: &VarAccess, value: Value) {
        self.slot_mut(var).value = Some(value);
    }

    /// Read a value. Returns `None` when the slot is undeclared or unset;
    /// callers that need to distinguish report the variable by name.
    pub fn get(&self, var: &VarAccess) -> Option<&Value> {
        let slot = self.slots.get(var.slot())?;
        if slot.declared { slot.value.as_ref() } else { None }
    }

    /// Mutable access to a stored value. Panics if the slot was never
    /// declared; returns `None` when declared but unset.
    pub fn get_mut(&mut self, var: &VarAccess) -> Option<&mut Value> {
        self.slot_mut(var).value.as_mut()
    }

    /// Take the value out of a slot, leaving it unset. Panics if the slot
    /// was never declared.
    pub fn unset(&mut self, var: &VarAccess) -> Option<Value> {
        self.slot_mut(var).value.take()
    }

    /// Clear all values while keeping declarations, for iteration restart.
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            slot.value = None;
        }
    }

    fn slot_mut(&mut self, var: &VarAccess) -> &mut Slot {
        let slot = self
            .slots
            .get_mut(var.slot())
            .filter(|s| s.declared)
            .unwrap_or_else(|| panic!("variable `{}` used before declaration", var.name()));
        slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_resolves_to_same_slot() {
        let mut alloc = SlotAllocator::new();
        let a = alloc.access("foo");
        let b = alloc.access("foo");
        let c = alloc.access("bar");
        assert_eq!(a.slot(), b.slot());
        assert_ne!(a.slot(), c.slot());
        assert_eq!(alloc.slots(), 2);
    }

    #[test]
    fn scratch_slots_are_distinct() {
        let mut alloc = SlotAllocator::new();
        let a = alloc.scratch("defrag");
        let b = alloc.scratch("defrag");
        assert_ne!(a.slot(), b.slot());
    }

    #[test]
    fn scratch_slots_cannot_be_reached_by_name() {
        let mut alloc = SlotAllocator::new();
        let scratch = alloc.scratch("defrag");
        // even a variable spelled exactly like the diagnostic name gets its
        // own slot
        let named = alloc.access(scratch.name());
        assert_ne!(scratch.slot(), named.slot());
    }

    #[test]
    fn declare_set_get_roundtrip() {
        let mut alloc = SlotAllocator::new();
        let var = alloc.access("foo");
        let mut session = Session::new();
        session.declare(&var);
        assert!(session.get(&var).is_none());
        session.set(&var, Value::Text("hi".into()));
        assert_eq!(session.get(&var), Some(&Value::Text("hi".into())));
        assert_eq!(session.unset(&var), Some(Value::Text("hi".into())));
        assert!(session.get(&var).is_none());
    }

    #[test]
    #[should_panic(expected = "used before declaration")]
    fn set_before_declare_panics() {
        let mut alloc = SlotAllocator::new();
        let var = alloc.access("foo");
        let mut session = Session::new();
        session.set(&var, Value::Text("hi".into()));
    }

    #[test]
    fn get_on_undeclared_slot_is_none() {
        let mut alloc = SlotAllocator::new();
        let var = alloc.access("foo");
        let session = Session::new();
        assert!(session.get(&var).is_none());
    }

    #[test]
    fn reset_keeps_declarations() {
        let mut alloc = SlotAllocator::new();
        let var = alloc.access("foo");
        let mut session = Session::new();
        session.declare(&var);
        session.set(&var, Value::Bytes(vec![1, 2]));
        session.reset();
        assert!(session.get(&var).is_none());
        // still declared: set must not panic
        session.set(&var, Value::Bytes(vec![3]));
    }
}
