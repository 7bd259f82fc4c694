use crate::powerset::SubsetId;
use rustc_hash::FxHashMap;

/// Identity of one output state: "at `state`, competing with the other
/// members of `subset`".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Element {
    pub state: u32,
    pub subset: SubsetId,
}

/// Bijection between elements and output state ids. Ids are handed out
/// densely in discovery order and never reassigned.
#[derive(Default)]
pub struct ElementTable {
    map: FxHashMap<Element, u32>,
    elements: Vec<Element>,
}

impl ElementTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Output id for `(state, subset)`, allocating the next id on first
    /// sight. The flag is true when the id is new.
    pub fn get_or_create(&mut self, state: u32, subset: SubsetId) -> (u32, bool) {
        let e = Element { state, subset };
        if let Some(&id) = self.map.get(&e) {
            return (id, false);
        }
        let id = self.elements.len() as u32;
        self.elements.push(e);
        self.map.insert(e, id);
        (id, true)
    }

    pub fn get(&self, id: u32) -> Option<Element> {
        self.elements.get(id as usize).copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.elements.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_create_idempotent() {
        let mut table = ElementTable::new();
        assert_eq!(table.get_or_create(3, 0), (0, true));
        assert_eq!(table.get_or_create(3, 1), (1, true));
        assert_eq!(table.get_or_create(4, 0), (2, true));
        assert_eq!(table.get_or_create(3, 0), (0, false));
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(1), Some(Element { state: 3, subset: 1 }));
        assert_eq!(table.get(3), None);
    }
}
