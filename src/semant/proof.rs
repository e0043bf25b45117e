use std::{collections::BTreeMap, fmt};

use im::OrdSet;
use itertools::Itertools;

use crate::{
    logic::prop::{Prop, is_axiom},
    semant::line::{Line, LineNo},
};

/// One scope of a proof, named by the lines it contains.
///
/// Lines themselves live in the context so nested scopes can share the
/// flat numbering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof {
    lines: Vec<LineNo>,
}

impl Proof {
    pub fn new(mut lines: Vec<LineNo>) -> Self {
        lines.sort();
        lines.dedup();
        Self { lines }
    }

    pub fn lines(&self) -> &[LineNo] {
        &self.lines
    }

    pub fn first(&self) -> Option<LineNo> {
        self.lines.first().copied()
    }

    pub fn last(&self) -> Option<LineNo> {
        self.lines.last().copied()
    }

    /// Folds the scope into the lemma it proves.
    ///
    /// Missing lines are skipped; callers only compile once every line is
    /// checked.
    pub fn compile(&self, all_lines: &BTreeMap<LineNo, Line>) -> ProofType {
        let mut ty = ProofType::default();
        for line in self.lines.iter().filter_map(|n| all_lines.get(n)) {
            if line.is_hypothesis() {
                ty.assumptions.insert(line.prop().clone());
            }
            ty.conclusions.insert(line.prop().clone());
        }
        ty
    }
}

/// The compiled type of a scope: what it assumes and what it concludes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProofType {
    assumptions: OrdSet<Prop>,
    conclusions: OrdSet<Prop>,
}

impl ProofType {
    pub fn new(assumptions: OrdSet<Prop>, conclusions: OrdSet<Prop>) -> Self {
        Self {
            assumptions,
            conclusions,
        }
    }

    pub fn assumptions(&self) -> impl Iterator<Item = &Prop> {
        self.assumptions.iter()
    }

    pub fn conclusions(&self) -> impl Iterator<Item = &Prop> {
        self.conclusions.iter()
    }

    pub fn assumes(&self, p: &Prop) -> bool {
        self.assumptions.contains(p)
    }

    pub fn concludes(&self, p: &Prop) -> bool {
        self.conclusions.contains(p)
    }

    /// Assumptions that still need discharging. With excluded middle
    /// enabled, instances of `p \/ ~p` come for free.
    pub fn non_axiom_assumptions(&self, excluded_middle: bool) -> OrdSet<Prop> {
        if !excluded_middle {
            return self.assumptions.clone();
        }
        self.assumptions
            .iter()
            .filter(|p| !is_axiom(p))
            .cloned()
            .collect()
    }
}

impl fmt::Display for ProofType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{}}} |- {{{}}}",
            self.assumptions.iter().join(", "),
            self.conclusions.iter().join(", ")
        )
    }
}
