use rustc_hash::FxHashMap;

/// Handle of an interned subset. Equal handles mean equal content.
pub type SubsetId = u32;

/// Interns sorted `Vec<u32>` subsets of original states as `u32` handles.
/// The arena owns every canonical sequence until it is dropped.
#[derive(Default)]
pub struct SubsetArena {
    map: FxHashMap<Vec<u32>, SubsetId>,
    /// Fast path for single-element sets, the common case when the input
    /// is already close to unambiguous.
    single_map: FxHashMap<u32, SubsetId>,
    sets: Vec<Vec<u32>>,
}

impl SubsetArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a sorted, duplicate-free set of states. Returns its handle,
    /// reusing an existing one when the content was seen before.
    pub fn intern(&mut self, sorted_set: Vec<u32>) -> SubsetId {
        debug_assert!(sorted_set.windows(2).all(|w| w[0] < w[1]));

        if sorted_set.len() == 1 {
            let key = sorted_set[0];
            if let Some(&id) = self.single_map.get(&key) {
                return id;
            }
            let id = self.sets.len() as SubsetId;
            self.sets.push(sorted_set);
            self.single_map.insert(key, id);
            return id;
        }

        if let Some(&id) = self.map.get(&sorted_set) {
            return id;
        }
        let id = self.sets.len() as SubsetId;
        self.sets.push(sorted_set.clone());
        self.map.insert(sorted_set, id);
        id
    }

    pub fn get(&self, id: SubsetId) -> Option<&[u32]> {
        self.sets.get(id as usize).map(Vec::as_slice)
    }

    pub(crate) fn len(&self) -> usize {
        self.sets.len()
    }
}
