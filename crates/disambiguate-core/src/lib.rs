pub mod connect;
pub mod disambiguate;
pub mod element;
pub mod error;
pub mod fsa;
pub mod fst;
pub mod powerset;
pub mod product;
#[cfg(feature = "python")]
pub mod py;

pub use disambiguate::{
    disambiguate, disambiguate_default, DisambiguateOptions, DisambiguateResult,
    DisambiguateStats,
};
pub use error::{DisambiguateError, Precondition};
pub use fsa::FsaResult;
pub use fst::Fst;

#[cfg(feature = "python")]
use pyo3::prelude::*;

#[cfg(feature = "python")]
#[pymodule]
fn disambiguate_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<py::RustFst>()?;
    m.add_class::<py::RustFsa>()?;
    m.add_class::<py::RustDisambiguateStats>()?;
    m.add_class::<py::DisambiguateResult>()?;
    m.add_function(wrap_pyfunction!(py::rust_disambiguate, m)?)?;
    Ok(())
}
