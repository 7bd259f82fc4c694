use thiserror::Error;

/// The specific reason an input machine cannot be disambiguated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Precondition {
    #[error("epsilon arc leaving state {state}")]
    Epsilon { state: u32 },
    #[error("arc leaving state {state} has input {input} != output {output}")]
    NotAcceptor { state: u32, input: u32, output: u32 },
    #[error("arc leaving state {state} has non-trivial weight {weight}")]
    WeightedArc { state: u32, weight: f32 },
    #[error("state {state} has non-trivial final weight {weight}")]
    WeightedFinal { state: u32, weight: f32 },
    #[error("{count} start states, at most one is supported")]
    MultipleStarts { count: usize },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DisambiguateError {
    /// The input is weighted, has epsilon arcs, or is not an acceptor.
    #[error("precondition violated: {0}")]
    PreconditionViolation(#[from] Precondition),

    /// The input arrays do not describe a well-formed machine.
    #[error("failed to load automaton: {0}")]
    LoadFailure(String),

    /// A registry lookup disagreed with itself. Always a bug.
    #[error("internal invariant violated: {0}")]
    InternalInvariantViolation(String),
}
