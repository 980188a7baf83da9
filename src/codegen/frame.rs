use std::collections::HashMap;

use crate::ast::DeclId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    /// `<clinit>`, no local slots at all
    ClassInit,
    /// static entry point; slot 0 holds argv, slot 1 the program instance
    Main,
    /// instance method; slot 0 holds `this`
    Instance,
}

/// Label and local slot bookkeeping of the method being emitted
pub struct Frame {
    kind: MethodKind,
    next_label: usize,
    next_slot: u16,
    slots: HashMap<DeclId, u16>,
}

impl Frame {
    pub fn new(kind: MethodKind) -> Self {
        let next_slot = match kind {
            MethodKind::ClassInit => 0,
            MethodKind::Main => 2,
            MethodKind::Instance => 1,
        };
        Self {
            kind,
            next_label: 0,
            next_slot,
            slots: HashMap::new(),
        }
    }

    pub fn new_label(&mut self) -> usize {
        let label = self.next_label;
        self.next_label += 1;
        label
    }

    /// Assigns the next free slot to a parameter or local variable
    pub fn allocate(&mut self, decl: DeclId) -> u16 {
        let slot = self.next_slot;
        self.next_slot += 1;
        self.slots.insert(decl, slot);
        slot
    }

    pub fn slot_of(&self, decl: DeclId) -> Option<u16> {
        self.slots.get(&decl).copied()
    }

    /// Number of local slots the method needs
    pub fn limit_locals(&self) -> u16 {
        self.next_slot
    }

    /// Slot holding the program instance, if the method has one
    pub fn this_slot(&self) -> Option<u16> {
        match self.kind {
            MethodKind::ClassInit => None,
            MethodKind::Main => Some(1),
            MethodKind::Instance => Some(0),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn main_reserves_two_slots() {
        let mut frame = Frame::new(MethodKind::Main);
        assert_eq!(frame.allocate(DeclId(20)), 2);
        assert_eq!(frame.allocate(DeclId(21)), 3);
        assert_eq!(frame.slot_of(DeclId(20)), Some(2));
        assert_eq!(frame.limit_locals(), 4);
        assert_eq!(frame.this_slot(), Some(1));
    }

    #[test]
    fn instance_method_reserves_this() {
        let mut frame = Frame::new(MethodKind::Instance);
        assert_eq!(frame.limit_locals(), 1);
        assert_eq!(frame.allocate(DeclId(7)), 1);
        assert_eq!(frame.slot_of(DeclId(8)), None);
        assert_eq!(frame.this_slot(), Some(0));
    }

    #[test]
    fn labels_count_from_zero() {
        let mut frame = Frame::new(MethodKind::ClassInit);
        assert_eq!(frame.new_label(), 0);
        assert_eq!(frame.new_label(), 1);
        assert_eq!(frame.new_label(), 2);
        assert_eq!(frame.limit_locals(), 0);
        assert_eq!(frame.this_slot(), None);
    }
}
