use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::FxHashSet;
use tracing::{debug, info, warn};
use ustr::Ustr;

use crate::{
    config::{ConfigError, MouseConfig},
    context::{
        events::{CheckEvent, EventSink},
        registry::{ProofId, ProofRegistry},
    },
    diagnostics::{CheckError, CheckFailure, CheckResult, LineFailure},
    logic::{
        prop::{Prop, symbols},
        rewrite::RuleCatalog,
    },
    semant::{
        argument::{Cited, Constants},
        inference::InferenceTable,
        justification::{Cite, Interpretation},
        line::{Line, LineNo},
        proof::{Proof, ProofType},
    },
};

pub mod events;
pub mod registry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Unchecked,
    Checking,
    Verified,
    Failed(CheckFailure),
}

impl CheckStatus {
    pub fn is_verified(&self) -> bool {
        matches!(self, CheckStatus::Verified)
    }

    pub fn failure(&self) -> Option<&CheckFailure> {
        match self {
            CheckStatus::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// All proof state for one checking session.
///
/// Scopes are announced innermost first through [`Ctx::add_proof`], so the
/// last proof added is the main one.
#[derive(Debug, Clone)]
pub struct Ctx {
    /// Every line of every scope, flat.
    lines: BTreeMap<LineNo, Line>,
    registry: ProofRegistry,
    main_proof: Option<ProofId>,

    /// Domain references fixed by premises. Only ever grows.
    constants: Constants,
    /// Lines verified during the current run.
    checked: FxHashSet<LineNo>,

    rules: RuleCatalog,
    inferences: InferenceTable,
    excluded_middle: bool,

    status: CheckStatus,
}

impl Default for Ctx {
    fn default() -> Self {
        Self::new()
    }
}

impl Ctx {
    pub fn new() -> Self {
        Self {
            lines: BTreeMap::new(),
            registry: ProofRegistry::new(),
            main_proof: None,
            constants: Constants::new(),
            checked: FxHashSet::default(),
            rules: RuleCatalog::builtin(),
            inferences: InferenceTable::builtin(),
            excluded_middle: true,
            status: CheckStatus::Unchecked,
        }
    }

    pub fn with_config(config: &MouseConfig) -> Result<Self, ConfigError> {
        let mut ctx = Self::new();
        ctx.excluded_middle = config.excluded_middle();

        for (alias, target) in config.aliases() {
            let (alias, target) = (Ustr::from(alias), Ustr::from(target));
            let in_catalog = ctx.rules.add_alias(alias, target);
            let in_table = ctx.inferences.add_alias(alias, target);
            if !in_catalog && !in_table {
                return Err(ConfigError::UnknownAlias { alias, target });
            }
        }

        for name in config.disabled() {
            let name = Ustr::from(name);
            debug!(rule = %name, "disabling rule");
            ctx.rules.remove(name);
            ctx.inferences.remove(name);
        }

        Ok(ctx)
    }

    /// Registers one scope. Every line number may only be announced once.
    pub fn add_proof(&mut self, lines: Vec<Line>) -> CheckResult<ProofId> {
        let mut seen = FxHashSet::default();
        for line in &lines {
            let n = line.number();
            if self.lines.contains_key(&n) || !seen.insert(n) {
                return Err(CheckError::DuplicateLine(n));
            }
        }

        let proof = Proof::new(lines.iter().map(Line::number).collect());
        self.lines
            .extend(lines.into_iter().map(|line| (line.number(), line)));
        let id = self.registry.insert(proof);
        self.main_proof = Some(id);
        Ok(id)
    }

    pub fn check(&mut self) -> bool {
        self.check_with(&mut ())
    }

    /// Checks every line in order, reporting progress to `sink`.
    pub fn check_with(&mut self, sink: &mut impl EventSink) -> bool {
        self.checked.clear();
        self.status = CheckStatus::Checking;

        info!(
            lines = self.lines.len(),
            proofs = self.registry.len(),
            "checking proof"
        );
        sink.event(&CheckEvent::Started {
            lines: self.lines.len(),
            proofs: self.registry.len(),
        });

        let verified = match self.run(sink) {
            Ok(()) => {
                self.status = CheckStatus::Verified;
                true
            }
            Err(failure) => {
                warn!(%failure, "check failed");
                if let CheckFailure::Line(_) = failure {
                    sink.event(&CheckEvent::LineFailed(failure.clone()));
                }
                self.status = CheckStatus::Failed(failure);
                false
            }
        };

        info!(verified, constants = self.constants.len(), "finished checking");
        sink.event(&CheckEvent::Finished { verified });
        verified
    }

    fn run(&mut self, sink: &mut impl EventSink) -> Result<(), CheckFailure> {
        if self.lines.is_empty() || self.registry.is_empty() {
            return Err(CheckFailure::Empty);
        }

        self.seed_constants();

        let lines: Vec<Line> = self.lines.values().cloned().collect();
        for line in lines {
            if let Err(error) = self.check_line(&line) {
                return Err(CheckFailure::Line(Box::new(LineFailure {
                    line: line.number(),
                    prop: line.prop().clone(),
                    justification: line.justification().clone(),
                    error,
                })));
            }

            debug!(line = %line.number(), prop = %line.prop(), "verified");
            sink.event(&CheckEvent::LineVerified {
                number: line.number(),
                prop: line.prop().clone(),
            });

            self.compile_ready(sink);
        }

        Ok(())
    }

    fn seed_constants(&mut self) {
        for line in self.lines.values().filter(|line| line.is_premise()) {
            self.constants.extend(symbols(line.prop()).free());
        }
    }

    fn check_line(&mut self, line: &Line) -> CheckResult<()> {
        let Interpretation {
            argument,
            introduced,
        } = line.justification().interpret(line, self)?;
        argument.verify(line, &self.constants)?;

        self.constants.extend(introduced);
        self.checked.insert(line.number());
        Ok(())
    }

    fn compile_ready(&mut self, sink: &mut impl EventSink) {
        for id in self.registry.ready(&self.checked) {
            let Some(proof) = self.registry.get(id) else {
                continue;
            };
            let ty = proof.compile(&self.lines);

            debug!(
                first = ?proof.first(),
                last = ?proof.last(),
                ty = %ty,
                "compiled scope"
            );
            sink.event(&CheckEvent::ScopeCompiled {
                proof: id,
                ty: ty.clone(),
            });
            self.registry.register_type(id, ty);
        }
    }

    pub fn rules(&self) -> &RuleCatalog {
        &self.rules
    }

    pub fn inferences(&self) -> &InferenceTable {
        &self.inferences
    }

    /// Looks up what a citation refers to, as seen from line `at`.
    pub fn resolve(&self, cite: Cite, at: LineNo) -> CheckResult<Cited> {
        match cite {
            Cite::Line(number) => {
                let line = self
                    .lines
                    .get(&number)
                    .filter(|_| number < at && self.checked.contains(&number))
                    .ok_or(CheckError::UnresolvedReference(number))?;
                let closed = self
                    .registry
                    .owner(number)
                    .and_then(|id| self.registry.get(id))
                    .and_then(Proof::last)
                    .is_some_and(|last| last < at);
                if closed {
                    return Err(CheckError::OutOfScope(number));
                }
                Ok(Cited::Line {
                    number,
                    prop: line.prop().clone(),
                })
            }
            Cite::Scope(first, last) => {
                let ty = self
                    .registry
                    .find_span(first, last)
                    .and_then(|id| self.registry.compiled(id))
                    .ok_or(CheckError::UnresolvedScope(first, last))?;
                Ok(Cited::Scope {
                    first,
                    last,
                    ty: ty.clone(),
                })
            }
        }
    }

    /// Every line `number` depends on through its citations.
    pub fn transitive_dependencies(&self, number: LineNo) -> BTreeSet<LineNo> {
        let mut deps = BTreeSet::new();
        let mut worklist: Vec<Cite> = self
            .lines
            .get(&number)
            .map(|line| line.justification().cites().to_vec())
            .unwrap_or_default();

        while let Some(cite) = worklist.pop() {
            match cite {
                Cite::Line(n) => {
                    if !deps.insert(n) {
                        continue;
                    }
                    if let Some(line) = self.lines.get(&n) {
                        worklist.extend_from_slice(line.justification().cites());
                    }
                }
                Cite::Scope(first, last) => {
                    worklist.extend(self.scope_lines(first, last).map(Cite::Line));
                }
            }
        }

        deps
    }

    /// Hypotheses that `cites` depend on and that no cited scope discharges.
    pub fn open_hypotheses(&self, cites: &[Cite]) -> BTreeSet<LineNo> {
        let mut visited = FxHashSet::default();
        let mut open = BTreeSet::new();
        let mut discharged = FxHashSet::default();
        let mut worklist = cites.to_vec();

        while let Some(cite) = worklist.pop() {
            match cite {
                Cite::Line(n) => {
                    if !visited.insert(n) {
                        continue;
                    }
                    let Some(line) = self.lines.get(&n) else {
                        continue;
                    };
                    if line.is_hypothesis() {
                        open.insert(n);
                    }
                    worklist.extend_from_slice(line.justification().cites());
                }
                Cite::Scope(first, last) => {
                    for n in self.scope_lines(first, last) {
                        if self.lines.get(&n).is_some_and(Line::is_hypothesis) {
                            discharged.insert(n);
                        }
                        worklist.push(Cite::Line(n));
                    }
                }
            }
        }

        open.retain(|n| !discharged.contains(n));
        open
    }

    pub fn open_hypothesis_symbols(&self, cites: &[Cite]) -> FxHashSet<Ustr> {
        self.open_hypotheses(cites)
            .iter()
            .filter_map(|n| self.lines.get(n))
            .flat_map(|line| symbols(line.prop()).free())
            .collect()
    }

    fn scope_lines(&self, first: LineNo, last: LineNo) -> impl Iterator<Item = LineNo> + '_ {
        self.registry
            .find_span(first, last)
            .and_then(|id| self.registry.get(id))
            .into_iter()
            .flat_map(|proof| proof.lines().iter().copied())
    }

    pub fn status(&self) -> &CheckStatus {
        &self.status
    }

    pub fn main_proof(&self) -> Option<ProofId> {
        self.main_proof
    }

    pub fn proof(&self, id: ProofId) -> Option<&Proof> {
        self.registry.get(id)
    }

    pub fn proofs(&self) -> impl Iterator<Item = ProofId> + '_ {
        self.registry.ids()
    }

    pub fn proof_type(&self, id: ProofId) -> Option<&ProofType> {
        self.registry.compiled(id)
    }

    pub fn constants(&self) -> &Constants {
        &self.constants
    }

    pub fn line(&self, number: LineNo) -> Option<&Line> {
        self.lines.get(&number)
    }

    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.values()
    }

    pub fn excluded_middle(&self) -> bool {
        self.excluded_middle
    }

    /// Assumptions of the main proof still owed by the caller.
    pub fn main_assumptions(&self) -> Option<im::OrdSet<Prop>> {
        let ty = self.proof_type(self.main_proof?)?;
        Some(ty.non_axiom_assumptions(self.excluded_middle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semant::justification::Justification;

    fn a() -> Prop {
        Prop::atom("A")
    }

    fn b() -> Prop {
        Prop::atom("B")
    }

    fn cite(n: u32) -> Cite {
        Cite::Line(LineNo(n))
    }

    #[test]
    fn duplicate_lines_are_rejected() {
        let mut ctx = Ctx::new();
        ctx.add_proof(vec![Line::new(1, a(), Justification::Premise)])
            .unwrap();
        assert_eq!(
            ctx.add_proof(vec![Line::new(1, b(), Justification::Premise)]),
            Err(CheckError::DuplicateLine(LineNo(1)))
        );
        assert_eq!(
            ctx.add_proof(vec![
                Line::new(2, a(), Justification::Premise),
                Line::new(2, b(), Justification::Premise),
            ]),
            Err(CheckError::DuplicateLine(LineNo(2)))
        );
        assert!(ctx.line(LineNo(2)).is_none());
    }

    #[test]
    fn forward_references_do_not_resolve() {
        let mut ctx = Ctx::new();
        ctx.add_proof(vec![
            Line::new(1, Prop::and(a(), b()), Justification::uninterpreted("projl", [cite(2)])),
            Line::new(2, Prop::and(a(), b()), Justification::Premise),
        ])
        .unwrap();

        assert!(!ctx.check());
        let failure = ctx.status().failure().and_then(CheckFailure::line).unwrap();
        assert_eq!(failure.line, LineNo(1));
        assert_eq!(failure.error, CheckError::UnresolvedReference(LineNo(2)));
    }

    #[test]
    fn dependencies_follow_citations_into_scopes() {
        let mut ctx = Ctx::new();
        ctx.add_proof(vec![
            Line::new(2, a(), Justification::Hypothesis),
            Line::new(3, Prop::or(a(), b()), Justification::uninterpreted("injl", [cite(2)])),
        ])
        .unwrap();
        ctx.add_proof(vec![
            Line::new(1, b(), Justification::Premise),
            Line::new(
                4,
                Prop::imp(a(), Prop::or(a(), b())),
                Justification::uninterpreted("impi", [Cite::Scope(LineNo(2), LineNo(3))]),
            ),
            Line::new(5, Prop::and(b(), b()), Justification::uninterpreted("diag", [cite(1)])),
        ])
        .unwrap();

        let deps: Vec<_> = ctx.transitive_dependencies(LineNo(4)).into_iter().collect();
        assert_eq!(deps, vec![LineNo(2), LineNo(3)]);
        assert_eq!(ctx.transitive_dependencies(LineNo(5)).len(), 1);

        assert_eq!(ctx.open_hypotheses(&[cite(3)]).len(), 1);
        assert!(ctx.open_hypotheses(&[Cite::Scope(LineNo(2), LineNo(3))]).is_empty());

        assert!(ctx.check());
    }

    #[test]
    fn config_aliases_and_disabled_rules() {
        let config = MouseConfig::parse(
            r#"
            [rules]
            disabled = ["diag"]

            [rules.aliases]
            swap = "comm"
            "#,
        )
        .unwrap();
        let ctx = Ctx::with_config(&config).unwrap();
        assert!(ctx.rules().contains(Ustr::from("swap")));
        assert!(ctx.inferences().lookup(Ustr::from("diag"), 1).is_none());

        let bad = MouseConfig::parse("[rules.aliases]\nswap = \"nope\"\n").unwrap();
        assert!(matches!(
            Ctx::with_config(&bad),
            Err(ConfigError::UnknownAlias { .. })
        ));
    }
}
