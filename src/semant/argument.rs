use std::fmt;

use itertools::Itertools;
use rustc_hash::FxHashSet;
use ustr::Ustr;

use crate::{
    diagnostics::{CheckError, CheckResult},
    logic::{
        prop::Prop,
        rewrite::{RewriteRule, try_rewrite},
    },
    semant::{
        inference::{Inference, InferenceFn},
        line::{Line, LineNo},
        proof::ProofType,
    },
};

/// Domain references fixed by premises.
pub type Constants = im::OrdSet<Ustr>;

/// A citation after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cited {
    Line { number: LineNo, prop: Prop },
    Scope {
        first: LineNo,
        last: LineNo,
        ty: ProofType,
    },
}

impl Cited {
    pub fn prop(&self) -> Option<&Prop> {
        match self {
            Cited::Line { prop, .. } => Some(prop),
            Cited::Scope { .. } => None,
        }
    }

    pub fn scope(&self) -> Option<&ProofType> {
        match self {
            Cited::Line { .. } => None,
            Cited::Scope { ty, .. } => Some(ty),
        }
    }
}

impl fmt::Display for Cited {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cited::Line { number, .. } => write!(f, "{number}"),
            Cited::Scope { first, last, .. } => write!(f, "{first}-{last}"),
        }
    }
}

/// The checkable form of a justification.
#[derive(Debug, Clone)]
pub enum Argument {
    Premise(Prop),
    Hypothesis(Prop),
    Rewrite {
        name: Ustr,
        rules: Vec<RewriteRule>,
        cited: Cited,
    },
    Inference {
        name: Ustr,
        rule: InferenceFn,
        cited: Vec<Cited>,
        /// Free symbols of the hypotheses the citations still depend on.
        open_symbols: FxHashSet<Ustr>,
    },
}

impl Argument {
    pub fn verify(&self, line: &Line, constants: &Constants) -> CheckResult<()> {
        self.typecheck(line.prop(), constants)
    }

    /// Checks that this argument licenses `candidate`.
    pub fn typecheck(&self, candidate: &Prop, constants: &Constants) -> CheckResult<()> {
        match self {
            Argument::Premise(p) | Argument::Hypothesis(p) => {
                if p == candidate {
                    Ok(())
                } else {
                    Err(CheckError::mismatch(p, candidate))
                }
            }
            Argument::Rewrite { name, rules, cited } => {
                let old = cited
                    .prop()
                    .ok_or_else(|| CheckError::citation_kind(*name, 1, "line"))?;

                let mut last_err = CheckError::UnknownRule {
                    name: *name,
                    arity: 1,
                };
                for rule in rules {
                    match try_rewrite(old, candidate, rule) {
                        Ok(_) => return Ok(()),
                        Err(err @ CheckError::RuleNotApplicable { .. }) => last_err = err,
                        Err(err) => return Err(err),
                    }
                }
                Err(last_err)
            }
            Argument::Inference {
                name,
                rule,
                cited,
                open_symbols,
            } => rule(&Inference {
                name: *name,
                cited,
                claim: candidate,
                constants,
                open_symbols,
            }),
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Premise(_) => write!(f, "prem"),
            Argument::Hypothesis(_) => write!(f, "hyp"),
            Argument::Rewrite { name, cited, .. } => write!(f, "{name} {cited}"),
            Argument::Inference { name, cited, .. } => {
                write!(f, "{name} {}", cited.iter().join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{logic::rewrite::RuleCatalog, strings};

    fn comm(prop: Prop) -> Argument {
        Argument::Rewrite {
            name: *strings::COMM,
            rules: RuleCatalog::builtin()
                .lookup(*strings::COMM)
                .unwrap()
                .to_vec(),
            cited: Cited::Line {
                number: LineNo(1),
                prop,
            },
        }
    }

    #[test]
    fn premise_checks_identity() {
        let p = Prop::atom("A");
        let arg = Argument::Premise(p.clone());
        assert_eq!(arg.typecheck(&p, &Constants::new()), Ok(()));
        assert!(matches!(
            arg.typecheck(&Prop::atom("B"), &Constants::new()),
            Err(CheckError::Mismatch { .. })
        ));
    }

    #[test]
    fn rewrite_tries_every_rule_for_the_name() {
        let old = Prop::or(Prop::atom("B"), Prop::atom("A"));
        let arg = comm(old);
        let new = Prop::or(Prop::atom("A"), Prop::atom("B"));
        assert_eq!(arg.typecheck(&new, &Constants::new()), Ok(()));
        assert_eq!(arg.to_string(), "comm 1");
    }

    #[test]
    fn rewrite_reports_last_failure() {
        let arg = comm(Prop::and(Prop::atom("A"), Prop::atom("A")));
        let new = Prop::and(Prop::atom("B"), Prop::atom("A"));
        assert!(matches!(
            arg.typecheck(&new, &Constants::new()),
            Err(CheckError::RuleNotApplicable { .. })
        ));
    }
}
