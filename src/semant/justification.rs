use std::fmt;

use itertools::Itertools;
use rustc_hash::FxHashSet;
use ustr::Ustr;

use crate::{
    context::Ctx,
    diagnostics::{CheckError, CheckResult},
    logic::prop::symbols,
    semant::{argument::Argument, line::Line, line::LineNo},
    strings,
};

/// A reference from a justification to earlier work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cite {
    Line(LineNo),
    /// A closed scope, named by its first and last line.
    Scope(LineNo, LineNo),
}

impl fmt::Display for Cite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cite::Line(n) => write!(f, "{n}"),
            Cite::Scope(first, last) => write!(f, "{first}-{last}"),
        }
    }
}

/// The stated reason a line holds, before its citations are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Justification {
    Premise,
    Hypothesis,
    Rewrite { rule: Ustr, cites: Vec<Cite> },
    Uninterpreted { name: Ustr, cites: Vec<Cite> },
}

/// A justification resolved against the context.
#[derive(Debug, Clone)]
pub struct Interpretation {
    pub argument: Argument,
    /// Symbols that become constants once the line is checked.
    pub introduced: FxHashSet<Ustr>,
}

impl Justification {
    pub fn rewrite(rule: &str, cites: impl IntoIterator<Item = Cite>) -> Self {
        Justification::Rewrite {
            rule: Ustr::from(rule),
            cites: cites.into_iter().collect(),
        }
    }

    pub fn uninterpreted(name: &str, cites: impl IntoIterator<Item = Cite>) -> Self {
        Justification::Uninterpreted {
            name: Ustr::from(name),
            cites: cites.into_iter().collect(),
        }
    }

    pub fn name(&self) -> Ustr {
        match self {
            Justification::Premise => *strings::PREMISE,
            Justification::Hypothesis => *strings::HYPOTHESIS,
            Justification::Rewrite { rule: name, .. }
            | Justification::Uninterpreted { name, .. } => *name,
        }
    }

    pub fn cites(&self) -> &[Cite] {
        match self {
            Justification::Premise | Justification::Hypothesis => &[],
            Justification::Rewrite { cites, .. } | Justification::Uninterpreted { cites, .. } => {
                cites.as_slice()
            }
        }
    }

    /// Resolves citations to checked lines and compiled scopes.
    pub fn interpret(&self, line: &Line, ctx: &Ctx) -> CheckResult<Interpretation> {
        let argument = match self {
            Justification::Premise => {
                return Ok(Interpretation {
                    argument: Argument::Premise(line.prop().clone()),
                    introduced: symbols(line.prop()).free(),
                });
            }
            Justification::Hypothesis => Argument::Hypothesis(line.prop().clone()),
            Justification::Rewrite { rule, cites } => {
                let rules = ctx.rules().lookup(*rule).ok_or(CheckError::UnknownRule {
                    name: *rule,
                    arity: cites.len(),
                })?;
                let [cite] = cites.as_slice() else {
                    return Err(CheckError::citation_arity(*rule, 1, cites.len()));
                };
                if !matches!(cite, Cite::Line(_)) {
                    return Err(CheckError::citation_kind(*rule, 1, "line"));
                }

                Argument::Rewrite {
                    name: *rule,
                    rules: rules.to_vec(),
                    cited: ctx.resolve(*cite, line.number())?,
                }
            }
            Justification::Uninterpreted { name, cites } => {
                let rule = ctx.inferences().lookup(*name, cites.len()).ok_or(
                    CheckError::UnknownRule {
                        name: *name,
                        arity: cites.len(),
                    },
                )?;
                let cited = cites
                    .iter()
                    .map(|&cite| ctx.resolve(cite, line.number()))
                    .collect::<CheckResult<Vec<_>>>()?;

                Argument::Inference {
                    name: *name,
                    rule,
                    cited,
                    open_symbols: ctx.open_hypothesis_symbols(cites),
                }
            }
        };

        Ok(Interpretation {
            argument,
            introduced: FxHashSet::default(),
        })
    }
}

impl fmt::Display for Justification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cites() {
            [] => write!(f, "{}", self.name()),
            cites => write!(f, "{} {}", self.name(), cites.iter().join(", ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lists_citations() {
        let just = Justification::uninterpreted(
            "ore",
            [
                Cite::Line(LineNo(1)),
                Cite::Scope(LineNo(2), LineNo(4)),
                Cite::Scope(LineNo(5), LineNo(7)),
            ],
        );
        assert_eq!(just.to_string(), "ore 1, 2-4, 5-7");
        assert_eq!(Justification::Premise.to_string(), "prem");
        assert_eq!(Justification::Hypothesis.to_string(), "hyp");
        assert_eq!(
            Justification::rewrite("comm", [Cite::Line(LineNo(3))]).to_string(),
            "comm 3"
        );
    }
}
