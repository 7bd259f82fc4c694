use crate::disambiguate::{self, DisambiguateOptions, DisambiguateStats};
use crate::error::DisambiguateError;
use crate::fsa::FsaResult;
use crate::fst::Fst;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

fn to_py_err(err: DisambiguateError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Python-visible FST wrapper. Constructed once from Python arrays, then
/// passed to `rust_disambiguate()`.
#[pyclass]
pub struct RustFst {
    pub(crate) inner: Fst,
}

#[pymethods]
impl RustFst {
    #[new]
    #[pyo3(signature = (num_states, start_states, final_states, final_weights, arc_src, arc_in, arc_out, arc_wt, arc_dst))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        num_states: u32,
        start_states: Vec<u32>,
        final_states: Vec<u32>,
        final_weights: Vec<f32>,
        arc_src: Vec<u32>,
        arc_in: Vec<u32>,
        arc_out: Vec<u32>,
        arc_wt: Vec<f32>,
        arc_dst: Vec<u32>,
    ) -> PyResult<Self> {
        let inner = Fst::new(
            num_states,
            start_states,
            &final_states,
            &final_weights,
            &arc_src,
            &arc_in,
            &arc_out,
            &arc_wt,
            &arc_dst,
        )
        .map_err(to_py_err)?;
        Ok(RustFst { inner })
    }

    fn num_states(&self) -> u32 {
        self.inner.num_states
    }
}

/// Python-visible FSA result.
#[pyclass]
pub struct RustFsa {
    num_states: u32,
    start: Vec<u32>,
    stop: Vec<u32>,
    src: Vec<u32>,
    lbl: Vec<u32>,
    dst: Vec<u32>,
}

impl From<FsaResult> for RustFsa {
    fn from(fsa: FsaResult) -> Self {
        RustFsa {
            num_states: fsa.num_states,
            start: fsa.start,
            stop: fsa.stop,
            src: fsa.arc_src,
            lbl: fsa.arc_lbl,
            dst: fsa.arc_dst,
        }
    }
}

#[pymethods]
impl RustFsa {
    fn num_states(&self) -> u32 {
        self.num_states
    }

    fn start_states(&self) -> Vec<u32> {
        self.start.clone()
    }

    fn final_states(&self) -> Vec<u32> {
        self.stop.clone()
    }

    fn arcs(&self) -> (Vec<u32>, Vec<u32>, Vec<u32>) {
        (self.src.clone(), self.lbl.clone(), self.dst.clone())
    }
}

/// Python-visible profiling stats.
#[pyclass]
pub struct RustDisambiguateStats {
    #[pyo3(get)]
    pub total_ms: f64,
    #[pyo3(get)]
    pub common_futures_ms: f64,
    #[pyo3(get)]
    pub traversal_ms: f64,
    #[pyo3(get)]
    pub connect_ms: f64,
    #[pyo3(get)]
    pub product_nodes: usize,
    #[pyo3(get)]
    pub product_edges: usize,
    #[pyo3(get)]
    pub common_future_pairs: usize,
    #[pyo3(get)]
    pub subsets: usize,
    #[pyo3(get)]
    pub elements: usize,
    #[pyo3(get)]
    pub arcs_emitted: u64,
    #[pyo3(get)]
    pub arcs_pruned: u64,
    #[pyo3(get)]
    pub max_subset_size: usize,
    #[pyo3(get)]
    pub output_states: u32,
    #[pyo3(get)]
    pub output_arcs: usize,
}

impl From<DisambiguateStats> for RustDisambiguateStats {
    fn from(s: DisambiguateStats) -> Self {
        RustDisambiguateStats {
            total_ms: s.total_ms,
            common_futures_ms: s.common_futures_ms,
            traversal_ms: s.traversal_ms,
            connect_ms: s.connect_ms,
            product_nodes: s.product_nodes,
            product_edges: s.product_edges,
            common_future_pairs: s.common_future_pairs,
            subsets: s.subsets,
            elements: s.elements,
            arcs_emitted: s.arcs_emitted,
            arcs_pruned: s.arcs_pruned,
            max_subset_size: s.max_subset_size,
            output_states: s.output_states,
            output_arcs: s.output_arcs,
        }
    }
}

#[pymethods]
impl RustDisambiguateStats {
    fn __repr__(&self) -> String {
        format!(
            "DisambiguateStats(\n\
             \x20 total={:.1}ms, common_futures={:.1}ms, traversal={:.1}ms, connect={:.1}ms\n\
             \x20 product: nodes={}, edges={}, common_future_pairs={}\n\
             \x20 subsets={}, elements={}, max_subset={}\n\
             \x20 arcs: emitted={}, pruned={}\n\
             \x20 output: states={}, arcs={}\n\
             )",
            self.total_ms, self.common_futures_ms, self.traversal_ms, self.connect_ms,
            self.product_nodes, self.product_edges, self.common_future_pairs,
            self.subsets, self.elements, self.max_subset_size,
            self.arcs_emitted, self.arcs_pruned,
            self.output_states, self.output_arcs,
        )
    }
}

/// Python-visible disambiguation result.
#[pyclass]
pub struct DisambiguateResult {
    #[pyo3(get)]
    fsa: Py<RustFsa>,
    #[pyo3(get)]
    stats: Py<RustDisambiguateStats>,
    #[pyo3(get)]
    state_labels: Option<Vec<String>>,
}

/// Disambiguate an unweighted, epsilon-free acceptor. Raises `ValueError`
/// if the machine is weighted, has epsilon arcs, or is a transducer.
#[pyfunction]
#[pyo3(signature = (fst, connect=true, state_labels=false))]
pub fn rust_disambiguate(
    py: Python<'_>,
    fst: &RustFst,
    connect: bool,
    state_labels: bool,
) -> PyResult<DisambiguateResult> {
    let opts = DisambiguateOptions {
        connect,
        state_labels,
        ..DisambiguateOptions::default()
    };
    let result = disambiguate::disambiguate(&fst.inner, &opts).map_err(to_py_err)?;

    Ok(DisambiguateResult {
        fsa: Py::new(py, RustFsa::from(result.fsa))?,
        stats: Py::new(py, RustDisambiguateStats::from(result.stats))?,
        state_labels: result.state_labels,
    })
}
