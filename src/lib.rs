//! Checking natural-deduction proofs over propositional and first-order logic.
//!
//! A proof arrives as numbered [`Line`]s grouped into scopes. Each nested
//! scope compiles into a [`ProofType`] that later lines may cite, and the
//! [`Ctx`] checks everything in one pass over the line numbers.

pub mod config;
pub mod context;
pub mod diagnostics;
pub mod logic;
pub mod report;
pub mod semant;
mod strings;
mod util;

pub use config::{ConfigError, MouseConfig, find_config_file};
pub use context::{
    CheckStatus, Ctx,
    events::{CheckEvent, EventSink},
    registry::ProofId,
};
pub use diagnostics::{CheckError, CheckFailure, CheckResult, LineFailure};
pub use logic::prop::{Prop, Term, is_axiom, symbols};
pub use report::CheckSummary;
pub use semant::{
    justification::{Cite, Justification},
    line::{Line, LineNo},
    proof::{Proof, ProofType},
};
