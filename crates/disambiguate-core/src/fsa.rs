use rustc_hash::FxHashSet;

/// Result FSA represented as parallel arrays (easy to send across PyO3 boundary).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FsaResult {
    pub num_states: u32,
    pub start: Vec<u32>,
    pub stop: Vec<u32>,
    pub arc_src: Vec<u32>,
    pub arc_lbl: Vec<u32>,
    pub arc_dst: Vec<u32>,
}

impl FsaResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_state(&mut self) -> u32 {
        let id = self.num_states;
        self.num_states += 1;
        id
    }

    pub fn set_start(&mut self, state: u32) {
        self.start = vec![state];
    }

    pub fn set_final(&mut self, state: u32) {
        self.stop.push(state);
    }

    pub fn add_arc(&mut self, src: u32, lbl: u32, dst: u32) {
        self.arc_src.push(src);
        self.arc_lbl.push(lbl);
        self.arc_dst.push(dst);
    }

    pub fn num_arcs(&self) -> usize {
        self.arc_src.len()
    }

    fn final_set(&self) -> FxHashSet<u32> {
        self.stop.iter().copied().collect()
    }

    pub fn accepts(&self, word: &[u32]) -> bool {
        self.count_accepting_paths(word) > 0
    }

    /// Number of distinct accepting paths reading `word`. Saturates at
    /// `u64::MAX`.
    pub fn count_accepting_paths(&self, word: &[u32]) -> u64 {
        let n = self.num_states as usize;
        let mut counts = vec![0u64; n];
        for &s in &self.start {
            counts[s as usize] = counts[s as usize].saturating_add(1);
        }
        for &x in word {
            let mut next = vec![0u64; n];
            for i in 0..self.arc_src.len() {
                if self.arc_lbl[i] == x {
                    let d = self.arc_dst[i] as usize;
                    next[d] = next[d].saturating_add(counts[self.arc_src[i] as usize]);
                }
            }
            counts = next;
        }
        self.final_set()
            .iter()
            .fold(0u64, |acc, &s| acc.saturating_add(counts[s as usize]))
    }
}
