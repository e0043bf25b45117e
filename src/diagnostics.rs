use std::fmt;

use annotate_snippets::{Level, Renderer, Snippet};
use thiserror::Error;
use ustr::Ustr;

use crate::{
    logic::prop::Prop,
    semant::{justification::Justification, line::LineNo},
};

pub type CheckResult<T> = Result<T, CheckError>;

/// A precondition of one of the algebraic helpers was violated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleMismatch {
    #[error("{0} is not an implication")]
    NotAnImplication(Prop),
    #[error("implication expects {expected}, got {got}")]
    AntecedentMismatch { expected: Prop, got: Prop },
    #[error("cannot compose {f} and {g}")]
    CompositionMismatch { f: Prop, g: Prop },
    #[error("{0} is not a conjunction")]
    NotAConjunction(Prop),
    #[error("{0} is not a disjunction")]
    NotADisjunction(Prop),
    #[error("no codiagonal out of {0}")]
    NoCodiagonal(Prop),
    #[error("domains of {0} and {1} do not match")]
    DomainMismatch(Prop, Prop),
    #[error("codomains of {0} and {1} do not match")]
    CodomainMismatch(Prop, Prop),
    #[error("{0} is not a negation")]
    NotANegation(Prop),
    #[error("{0} is not universally quantified")]
    NotAUniversal(Prop),
    #[error("{0} is not existentially quantified")]
    NotAnExistential(Prop),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlphaError {
    #[error("`{var}` is instantiated both as `{first}` and as `{second}`")]
    AmbiguousSubstitution { var: Ustr, first: Ustr, second: Ustr },
    #[error("substituting `{target}` for `{var}` would be captured by a quantifier over `{target}`")]
    CaptureViolation { var: Ustr, target: Ustr },
    #[error("{instance} is not an instance of {general}")]
    ShapeMismatch { general: Prop, instance: Prop },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    #[error(transparent)]
    RuleMismatch(#[from] RuleMismatch),

    #[error(transparent)]
    Alpha(#[from] AlphaError),

    #[error("failed to apply rule {left} <=> {right} ({rule}) to {old} => {new}")]
    RuleNotApplicable {
        rule: Ustr,
        left: Prop,
        right: Prop,
        old: Prop,
        new: Prop,
    },

    #[error("line {0} has not been checked yet")]
    UnresolvedReference(LineNo),

    #[error("no checked scope spans lines {0}-{1}")]
    UnresolvedScope(LineNo, LineNo),

    #[error("line {0} is inside a scope that closed before this line")]
    OutOfScope(LineNo),

    #[error("internal inconsistency: {old} and {new} were diffed but are equal")]
    InconsistentContext { old: Prop, new: Prop },

    #[error("cannot unify two metavariables {left} and {right}")]
    UnsupportedUnification { left: Prop, right: Prop },

    #[error("unknown rule `{name}` taking {arity} citation(s)")]
    UnknownRule { name: Ustr, arity: usize },

    #[error("`{name}` expects {expected} citation(s), got {got}")]
    CitationArity {
        name: Ustr,
        expected: usize,
        got: usize,
    },

    #[error("`{name}` expects a {expected} as citation {position}")]
    CitationKind {
        name: Ustr,
        position: usize,
        expected: &'static str,
    },

    #[error("expected {expected}, got {got}")]
    Mismatch { expected: Prop, got: Prop },

    #[error("cited scope does not {role} {prop}")]
    NotInScope { prop: Prop, role: &'static str },

    #[error("cited scope also assumes {0}, which is never discharged")]
    UndischargedAssumption(Prop),

    #[error("cannot generalize over `{0}`, it is fixed by a premise")]
    GeneralizesConstant(Ustr),

    #[error("cannot generalize over `{0}`, it occurs in an open hypothesis")]
    GeneralizesHypothesis(Ustr),

    #[error("witness `{0}` must be fresh")]
    EscapingEigenvariable(Ustr),

    #[error("line {0} is declared more than once")]
    DuplicateLine(LineNo),
}

impl CheckError {
    pub fn mismatch(expected: &Prop, got: &Prop) -> Self {
        CheckError::Mismatch {
            expected: expected.clone(),
            got: got.clone(),
        }
    }

    pub fn citation_kind(name: Ustr, position: usize, expected: &'static str) -> Self {
        CheckError::CitationKind {
            name,
            position,
            expected,
        }
    }

    pub fn citation_arity(name: Ustr, expected: usize, got: usize) -> Self {
        CheckError::CitationArity {
            name,
            expected,
            got,
        }
    }

    /// A short name for the contract that was violated.
    pub fn contract(&self) -> &'static str {
        match self {
            CheckError::RuleMismatch(_) => "rule mismatch",
            CheckError::Alpha(AlphaError::AmbiguousSubstitution { .. }) => "ambiguous substitution",
            CheckError::Alpha(AlphaError::CaptureViolation { .. }) => "capture violation",
            CheckError::Alpha(AlphaError::ShapeMismatch { .. }) => "not an instance",
            CheckError::RuleNotApplicable { .. } => "rule not applicable",
            CheckError::UnresolvedReference(_) | CheckError::UnresolvedScope(..) => {
                "unresolved reference"
            }
            CheckError::InconsistentContext { .. } => "inconsistent context",
            CheckError::UnsupportedUnification { .. } => "unsupported unification",
            CheckError::UnknownRule { .. } => "unknown rule",
            CheckError::CitationArity { .. } | CheckError::CitationKind { .. } => {
                "malformed citation"
            }
            CheckError::Mismatch { .. } => "proposition mismatch",
            CheckError::NotInScope { .. } | CheckError::UndischargedAssumption(_) => {
                "scope mismatch"
            }
            CheckError::OutOfScope(_) => "out of scope",
            CheckError::GeneralizesConstant(_) | CheckError::GeneralizesHypothesis(_) => {
                "illegal generalization"
            }
            CheckError::EscapingEigenvariable(_) => "escaping eigenvariable",
            CheckError::DuplicateLine(_) => "duplicate line",
        }
    }
}

/// The first line that failed to check, with everything needed to report it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFailure {
    pub line: LineNo,
    pub prop: Prop,
    pub justification: Justification,
    pub error: CheckError,
}

impl LineFailure {
    /// Renders the failing line as an annotated snippet.
    pub fn render(&self, styled: bool) -> String {
        let head = format!("{}. {}  ", self.line, self.prop);
        let source = format!("{head}{}", self.justification);
        let just_span = head.len()..source.len();

        let title = format!("cannot justify line {}", self.line);
        let label = self.error.to_string();
        let footer = format!("violated contract: {}", self.error.contract());

        let msg = Level::Error
            .title(&title)
            .snippet(
                Snippet::source(&source)
                    .line_start(1)
                    .annotation(Level::Error.span(just_span).label(&label)),
            )
            .footer(Level::Help.title(&footer));

        let renderer = if styled {
            Renderer::styled()
        } else {
            Renderer::plain()
        };
        renderer.render(msg).to_string()
    }
}

impl fmt::Display for LineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: cannot use `{}` to produce {}: {}",
            self.line, self.justification, self.prop, self.error
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckFailure {
    #[error("no proofs added")]
    Empty,
    #[error("{0}")]
    Line(Box<LineFailure>),
}

impl CheckFailure {
    pub fn line(&self) -> Option<&LineFailure> {
        match self {
            CheckFailure::Empty => None,
            CheckFailure::Line(failure) => Some(failure),
        }
    }
}
