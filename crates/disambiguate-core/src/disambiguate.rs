use crate::connect::connect_with_map;
use crate::element::{Element, ElementTable};
use crate::error::DisambiguateError;
use crate::fsa::FsaResult;
use crate::fst::{check_unweighted_acceptor, Fst};
use crate::powerset::SubsetArena;
use crate::product::CommonFutures;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use std::time::Instant;
use tracing::{debug, warn};

/// Knobs for a [`disambiguate`] run.
#[derive(Debug, Clone)]
pub struct DisambiguateOptions {
    /// Trim states that cannot reach acceptance. Turning this off exposes
    /// the raw subset construction, which is mostly useful for debugging.
    pub connect: bool,
    /// Emit a progress event every this many expanded states (0 disables).
    pub progress_stride: u64,
    /// Produce a `"state:{subset}"` label for every output state.
    pub state_labels: bool,
}

impl Default for DisambiguateOptions {
    fn default() -> Self {
        DisambiguateOptions {
            connect: true,
            progress_stride: 4096,
            state_labels: false,
        }
    }
}

/// Profiling statistics for a disambiguate() call.
#[derive(Debug, Clone, Default)]
pub struct DisambiguateStats {
    pub total_ms: f64,
    pub common_futures_ms: f64,
    pub traversal_ms: f64,
    pub connect_ms: f64,

    // self-product
    pub product_nodes: usize,
    pub product_edges: usize,
    pub common_future_pairs: usize,

    // traversal
    pub subsets: usize,
    pub elements: usize,
    pub arcs_emitted: u64,
    pub arcs_pruned: u64,
    pub max_subset_size: usize,

    // after trim
    pub output_states: u32,
    pub output_arcs: usize,
}

pub struct DisambiguateResult {
    pub fsa: FsaResult,
    pub stats: DisambiguateStats,
    /// Per-output-state labels, present when requested in the options.
    pub state_labels: Option<Vec<String>>,
}

/// Subset construction over `(state, subset)` elements.
///
/// `subset` always contains `state`; the other members are the states
/// reached on the same prefix by higher-priority paths that still share a
/// future with `state`. Path priority is arc order: at the first point two
/// paths diverge, the one taking the earlier arc wins.
struct Traversal<'a> {
    fst: &'a Fst,
    common: &'a CommonFutures,
    subsets: SubsetArena,
    elements: ElementTable,
    out: FsaResult,
    queue: VecDeque<u32>,
    stats: &'a mut DisambiguateStats,
}

impl<'a> Traversal<'a> {
    fn new(fst: &'a Fst, common: &'a CommonFutures, stats: &'a mut DisambiguateStats) -> Self {
        Traversal {
            fst,
            common,
            subsets: SubsetArena::new(),
            elements: ElementTable::new(),
            out: FsaResult::new(),
            queue: VecDeque::new(),
            stats,
        }
    }

    /// Output state for `(state, subset)`, enqueueing it when first seen.
    fn find_state(&mut self, state: u32, subset: Vec<u32>) -> Result<u32, DisambiguateError> {
        self.stats.max_subset_size = self.stats.max_subset_size.max(subset.len());
        let handle = self.subsets.intern(subset);
        let (id, is_new) = self.elements.get_or_create(state, handle);
        if is_new {
            let sid = self.out.add_state();
            if sid != id {
                return Err(DisambiguateError::InternalInvariantViolation(format!(
                    "element table assigned id {} but output state is {}",
                    id, sid
                )));
            }
            self.queue.push_back(id);
        }
        Ok(id)
    }

    fn element(&self, sid: u32) -> Result<Element, DisambiguateError> {
        self.elements.get(sid).ok_or_else(|| {
            DisambiguateError::InternalInvariantViolation(format!(
                "output state {} has no element",
                sid
            ))
        })
    }

    fn subset_of(&self, e: Element) -> Result<&[u32], DisambiguateError> {
        self.subsets.get(e.subset).ok_or_else(|| {
            DisambiguateError::InternalInvariantViolation(format!(
                "element {:?} references unknown subset",
                e
            ))
        })
    }

    fn expand(&mut self, sid: u32) -> Result<(), DisambiguateError> {
        let fst = self.fst;
        let e = self.element(sid)?;
        let subset = self.subset_of(e)?.to_vec();

        // A higher-priority path that is already accepting wins the tie.
        let rivals: Vec<u32> = subset.iter().copied().filter(|&q| q != e.state).collect();
        if fst.is_final(e.state) && !rivals.iter().any(|&q| fst.is_final(q)) {
            self.out.set_final(sid);
        }

        // label -> successors of the higher-priority states
        let mut ahead: FxHashMap<u32, Vec<u32>> = FxHashMap::default();
        for &q in &rivals {
            for arc in fst.arcs_from(q) {
                ahead.entry(arc.input).or_default().push(arc.dest);
            }
        }

        // label -> destinations of earlier arcs out of e.state
        let mut earlier: FxHashMap<u32, Vec<u32>> = FxHashMap::default();

        for arc in fst.arcs_from(e.state) {
            let dest = arc.dest;
            let rival_dests = ahead.get(&arc.input).map(Vec::as_slice).unwrap_or(&[]);
            let siblings = earlier.entry(arc.input).or_default();

            if siblings.contains(&dest) || rival_dests.contains(&dest) {
                // Some better path reaches dest on the same prefix.
                self.stats.arcs_pruned += 1;
                continue;
            }

            let mut next: Vec<u32> = rival_dests
                .iter()
                .chain(siblings.iter())
                .copied()
                .filter(|&q| self.common.contains(dest, q))
                .collect();
            next.push(dest);
            next.sort_unstable();
            next.dedup();
            siblings.push(dest);

            let did = self.find_state(dest, next)?;
            self.out.add_arc(sid, arc.input, did);
            self.stats.arcs_emitted += 1;
        }

        Ok(())
    }

    /// FIFO drain from the start element until no unseen element remains.
    fn run(&mut self, start: u32, progress_stride: u64) -> Result<(), DisambiguateError> {
        let traversal_start = Instant::now();
        let initial = self.find_state(start, vec![start])?;
        self.out.set_start(initial);

        let mut iterations: u64 = 0;
        while let Some(sid) = self.queue.pop_front() {
            iterations += 1;
            if progress_stride > 0 && iterations % progress_stride == 0 {
                debug!(
                    iter = iterations,
                    queued = self.queue.len(),
                    elements = self.elements.len(),
                    subsets = self.subsets.len(),
                    arcs = self.out.num_arcs(),
                    elapsed_s = traversal_start.elapsed().as_secs_f64(),
                    "disambiguate progress"
                );
            }
            self.expand(sid)?;
        }
        Ok(())
    }

    /// `"p:{q1,q2}"` for every output state, in output id order.
    fn labels(&self) -> Result<Vec<String>, DisambiguateError> {
        (0..self.elements.len() as u32)
            .map(|id| {
                let e = self.element(id)?;
                let members: Vec<String> =
                    self.subset_of(e)?.iter().map(u32::to_string).collect();
                Ok(format!("{}:{{{}}}", e.state, members.join(",")))
            })
            .collect()
    }
}

/// Build an acceptor equivalent to `fst` in which every accepted string has
/// exactly one accepting path.
///
/// The input must be an unweighted, epsilon-free acceptor with at most one
/// start state. Either the whole result is returned or an error; nothing is
/// built when the precondition fails.
pub fn disambiguate(
    fst: &Fst,
    opts: &DisambiguateOptions,
) -> Result<DisambiguateResult, DisambiguateError> {
    let total_start = Instant::now();

    if let Err(violation) = check_unweighted_acceptor(fst) {
        warn!(%violation, "cannot disambiguate input");
        return Err(violation.into());
    }

    let mut stats = DisambiguateStats::default();

    let Some(start) = fst.start() else {
        debug!("input has no start state, result is empty");
        stats.total_ms = total_start.elapsed().as_secs_f64() * 1000.0;
        return Ok(DisambiguateResult {
            fsa: FsaResult::new(),
            stats,
            state_labels: opts.state_labels.then(Vec::new),
        });
    };

    // 1. Common futures, computed completely before any element exists
    let cf_start = Instant::now();
    let common = CommonFutures::compute(fst);
    stats.common_futures_ms = cf_start.elapsed().as_secs_f64() * 1000.0;
    stats.product_nodes = common.product_nodes;
    stats.product_edges = common.product_edges;
    stats.common_future_pairs = common.len();
    debug!(
        product_nodes = common.product_nodes,
        product_edges = common.product_edges,
        pairs = common.len(),
        "common futures computed"
    );

    // 2. Traversal
    let bfs_start = Instant::now();
    let (raw, labels) = {
        let mut traversal = Traversal::new(fst, &common, &mut stats);
        traversal.run(start, opts.progress_stride)?;
        let labels = if opts.state_labels {
            Some(traversal.labels()?)
        } else {
            None
        };
        traversal.stats.subsets = traversal.subsets.len();
        traversal.stats.elements = traversal.elements.len();
        (std::mem::take(&mut traversal.out), labels)
    };
    stats.traversal_ms = bfs_start.elapsed().as_secs_f64() * 1000.0;
    debug!(
        elements = stats.elements,
        subsets = stats.subsets,
        arcs = stats.arcs_emitted,
        pruned = stats.arcs_pruned,
        "traversal finished"
    );

    // 3. Drop states that cannot reach acceptance
    let (fsa, state_labels) = if opts.connect {
        let connect_start = Instant::now();
        let (trimmed, old_to_new) = connect_with_map(&raw);
        stats.connect_ms = connect_start.elapsed().as_secs_f64() * 1000.0;
        let state_labels = labels.map(|labels| {
            labels
                .into_iter()
                .zip(&old_to_new)
                .filter(|&(_, &new)| new != u32::MAX)
                .map(|(label, _)| label)
                .collect()
        });
        (trimmed, state_labels)
    } else {
        (raw, labels)
    };

    stats.output_states = fsa.num_states;
    stats.output_arcs = fsa.num_arcs();
    stats.total_ms = total_start.elapsed().as_secs_f64() * 1000.0;
    debug!(
        states = fsa.num_states,
        arcs = fsa.num_arcs(),
        total_ms = stats.total_ms,
        "disambiguation done"
    );

    Ok(DisambiguateResult {
        fsa,
        stats,
        state_labels,
    })
}

/// [`disambiguate`] with default options.
pub fn disambiguate_default(fst: &Fst) -> Result<FsaResult, DisambiguateError> {
    disambiguate(fst, &DisambiguateOptions::default()).map(|r| r.fsa)
}
