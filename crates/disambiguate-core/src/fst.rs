use crate::error::{DisambiguateError, Precondition};
use rustc_hash::FxHashSet;

pub const EPSILON: u32 = u32::MAX;

/// Tropical semiring one: the weight of an unweighted arc or final state.
pub const WEIGHT_ONE: f32 = 0.0;
/// Tropical semiring zero: the final weight of a non-final state.
pub const WEIGHT_ZERO: f32 = f32::INFINITY;

#[derive(Debug, Clone, Copy)]
pub struct FstArc {
    pub input: u32,
    pub output: u32,
    pub weight: f32,
    pub dest: u32,
}

/// Input machine stored in CSR format. Arcs keep their insertion order
/// within each source state; that order decides which of several
/// equivalent paths survives disambiguation.
#[derive(Debug, Clone)]
pub struct Fst {
    pub num_states: u32,
    pub start_states: Vec<u32>,
    pub final_weight: Vec<f32>,

    // CSR arc storage (sorted by source state, stable)
    pub offsets: Vec<u32>, // length num_states+1
    pub arcs: Vec<FstArc>,
}

impl Fst {
    /// Build a machine from parallel arc arrays.
    ///
    /// Fails with `LoadFailure` when the arrays disagree in length or
    /// reference a state outside `0..num_states`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        num_states: u32,
        start_states: Vec<u32>,
        final_states: &[u32],
        final_weights: &[f32],
        arc_src: &[u32],
        arc_in: &[u32],
        arc_out: &[u32],
        arc_wt: &[f32],
        arc_dst: &[u32],
    ) -> Result<Self, DisambiguateError> {
        let n = num_states as usize;
        let num_arcs = arc_src.len();

        if final_weights.len() != final_states.len() {
            return Err(DisambiguateError::LoadFailure(format!(
                "{} final states but {} final weights",
                final_states.len(),
                final_weights.len()
            )));
        }
        if arc_in.len() != num_arcs
            || arc_out.len() != num_arcs
            || arc_wt.len() != num_arcs
            || arc_dst.len() != num_arcs
        {
            return Err(DisambiguateError::LoadFailure(
                "arc arrays have mismatched lengths".to_string(),
            ));
        }
        let out_of_range = start_states
            .iter()
            .chain(final_states)
            .chain(arc_src)
            .chain(arc_dst)
            .find(|&&s| s >= num_states);
        if let Some(&s) = out_of_range {
            return Err(DisambiguateError::LoadFailure(format!(
                "state {} out of range for {} states",
                s, num_states
            )));
        }

        let mut final_weight = vec![WEIGHT_ZERO; n];
        for (&s, &w) in final_states.iter().zip(final_weights) {
            final_weight[s as usize] = w;
        }

        // Stable sort keeps per-state arc order
        let mut indices: Vec<usize> = (0..num_arcs).collect();
        indices.sort_by_key(|&i| arc_src[i]);

        let mut offsets = vec![0u32; n + 1];
        let mut arcs = Vec::with_capacity(num_arcs);

        for &idx in &indices {
            offsets[arc_src[idx] as usize + 1] += 1;
            arcs.push(FstArc {
                input: arc_in[idx],
                output: arc_out[idx],
                weight: arc_wt[idx],
                dest: arc_dst[idx],
            });
        }

        // Prefix sum
        for i in 1..=n {
            offsets[i] += offsets[i - 1];
        }

        Ok(Fst {
            num_states,
            start_states,
            final_weight,
            offsets,
            arcs,
        })
    }

    /// Build an unweighted acceptor: every arc reads and writes `arc_lbl`.
    pub fn acceptor(
        num_states: u32,
        start_states: Vec<u32>,
        final_states: &[u32],
        arc_src: &[u32],
        arc_lbl: &[u32],
        arc_dst: &[u32],
    ) -> Result<Self, DisambiguateError> {
        let final_weights = vec![WEIGHT_ONE; final_states.len()];
        let arc_wt = vec![WEIGHT_ONE; arc_src.len()];
        Fst::new(
            num_states,
            start_states,
            final_states,
            &final_weights,
            arc_src,
            arc_lbl,
            arc_lbl,
            &arc_wt,
            arc_dst,
        )
    }

    /// Iterate arcs from a given source state.
    #[inline]
    pub fn arcs_from(&self, state: u32) -> &[FstArc] {
        let lo = self.offsets[state as usize] as usize;
        let hi = self.offsets[state as usize + 1] as usize;
        &self.arcs[lo..hi]
    }

    #[inline]
    pub fn is_final(&self, state: u32) -> bool {
        self.final_weight[state as usize] != WEIGHT_ZERO
    }

    pub fn start(&self) -> Option<u32> {
        self.start_states.first().copied()
    }

    /// Does the input side of the machine accept `word`? Epsilon arcs are
    /// not followed.
    pub fn accepts(&self, word: &[u32]) -> bool {
        let mut current: FxHashSet<u32> = self.start_states.iter().copied().collect();
        for &x in word {
            let mut next: FxHashSet<u32> = FxHashSet::default();
            for &s in &current {
                for arc in self.arcs_from(s) {
                    if arc.input == x {
                        next.insert(arc.dest);
                    }
                }
            }
            if next.is_empty() {
                return false;
            }
            current = next;
        }
        current.iter().any(|&s| self.is_final(s))
    }

    /// Number of distinct accepting paths reading `word`, counting parallel
    /// arcs separately. Saturates at `u64::MAX`.
    pub fn count_accepting_paths(&self, word: &[u32]) -> u64 {
        let n = self.num_states as usize;
        let mut counts = vec![0u64; n];
        for &s in &self.start_states {
            counts[s as usize] = counts[s as usize].saturating_add(1);
        }
        for &x in word {
            let mut next = vec![0u64; n];
            for (s, &c) in counts.iter().enumerate() {
                if c == 0 {
                    continue;
                }
                for arc in self.arcs_from(s as u32) {
                    if arc.input == x {
                        let d = arc.dest as usize;
                        next[d] = next[d].saturating_add(c);
                    }
                }
            }
            counts = next;
        }
        counts
            .iter()
            .enumerate()
            .filter(|&(s, _)| self.is_final(s as u32))
            .fold(0u64, |acc, (_, &c)| acc.saturating_add(c))
    }
}

/// Reject anything the disambiguator cannot handle: weights, epsilons,
/// transducers and multiple start states.
pub fn check_unweighted_acceptor(fst: &Fst) -> Result<(), Precondition> {
    if fst.start_states.len() > 1 {
        return Err(Precondition::MultipleStarts {
            count: fst.start_states.len(),
        });
    }
    for state in 0..fst.num_states {
        let w = fst.final_weight[state as usize];
        if w != WEIGHT_ZERO && w != WEIGHT_ONE {
            return Err(Precondition::WeightedFinal { state, weight: w });
        }
        for arc in fst.arcs_from(state) {
            if arc.input == EPSILON || arc.output == EPSILON {
                return Err(Precondition::Epsilon { state });
            }
            if arc.input != arc.output {
                return Err(Precondition::NotAcceptor {
                    state,
                    input: arc.input,
                    output: arc.output,
                });
            }
            if arc.weight != WEIGHT_ONE {
                return Err(Precondition::WeightedArc {
                    state,
                    weight: arc.weight,
                });
            }
        }
    }
    Ok(())
}
