//! Inference rules that cite lines and scopes.
//!
//! Rewrites relate one line to the next through the unifier. Everything
//! else goes through this table, keyed by citation name and arity.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;
use ustr::Ustr;

use crate::{
    diagnostics::{CheckError, CheckResult, RuleMismatch},
    logic::{
        algebra,
        alpha::recover_instance,
        prop::{Prop, symbols},
    },
    semant::{
        argument::{Cited, Constants},
        proof::ProofType,
    },
    strings,
};

pub type InferenceFn = fn(&Inference<'_>) -> CheckResult<()>;

/// Everything an inference rule gets to look at.
pub struct Inference<'a> {
    pub name: Ustr,
    pub cited: &'a [Cited],
    pub claim: &'a Prop,
    pub constants: &'a Constants,
    pub open_symbols: &'a FxHashSet<Ustr>,
}

impl Inference<'_> {
    /// The proposition of the line cited at `idx`.
    pub fn line(&self, idx: usize) -> CheckResult<&Prop> {
        self.cited
            .get(idx)
            .and_then(Cited::prop)
            .ok_or_else(|| CheckError::citation_kind(self.name, idx + 1, "line"))
    }

    /// The type of the scope cited at `idx`.
    pub fn scope(&self, idx: usize) -> CheckResult<&ProofType> {
        self.cited
            .get(idx)
            .and_then(Cited::scope)
            .ok_or_else(|| CheckError::citation_kind(self.name, idx + 1, "scope"))
    }

    fn derives(&self, derived: Prop) -> CheckResult<()> {
        if &derived == self.claim {
            Ok(())
        } else {
            Err(CheckError::mismatch(&derived, self.claim))
        }
    }
}

fn assumes(ty: &ProofType, p: &Prop) -> CheckResult<()> {
    if ty.assumes(p) {
        Ok(())
    } else {
        Err(CheckError::NotInScope {
            prop: p.clone(),
            role: "assume",
        })
    }
}

/// The scope assumes `h` and nothing else, so discharging `h` closes it.
fn discharges(ty: &ProofType, h: &Prop) -> CheckResult<()> {
    assumes(ty, h)?;
    match ty.assumptions().find(|p| *p != h) {
        Some(extra) => Err(CheckError::UndischargedAssumption(extra.clone())),
        None => Ok(()),
    }
}

fn concludes(ty: &ProofType, p: &Prop) -> CheckResult<()> {
    if ty.concludes(p) {
        Ok(())
    } else {
        Err(CheckError::NotInScope {
            prop: p.clone(),
            role: "conclude",
        })
    }
}

fn apply(inf: &Inference) -> CheckResult<()> {
    inf.derives(algebra::apply(inf.line(0)?, inf.line(1)?)?)
}

fn compose(inf: &Inference) -> CheckResult<()> {
    inf.derives(algebra::compose(inf.line(0)?, inf.line(1)?)?)
}

fn proj_l(inf: &Inference) -> CheckResult<()> {
    inf.derives(algebra::proj_l(inf.line(0)?)?)
}

fn proj_r(inf: &Inference) -> CheckResult<()> {
    inf.derives(algebra::proj_r(inf.line(0)?)?)
}

fn inj_l(inf: &Inference) -> CheckResult<()> {
    let Prop::Or(_, other) = inf.claim else {
        return Err(RuleMismatch::NotADisjunction(inf.claim.clone()).into());
    };
    inf.derives(algebra::inj_l(inf.line(0)?, other))
}

fn inj_r(inf: &Inference) -> CheckResult<()> {
    let Prop::Or(other, _) = inf.claim else {
        return Err(RuleMismatch::NotADisjunction(inf.claim.clone()).into());
    };
    inf.derives(algebra::inj_r(inf.line(0)?, other))
}

fn diag(inf: &Inference) -> CheckResult<()> {
    inf.derives(algebra::diag(inf.line(0)?))
}

fn codiag(inf: &Inference) -> CheckResult<()> {
    inf.derives(algebra::codiag(inf.line(0)?)?)
}

fn univ_prod(inf: &Inference) -> CheckResult<()> {
    inf.derives(algebra::univ_prod(inf.line(0)?, inf.line(1)?)?)
}

fn univ_coprod(inf: &Inference) -> CheckResult<()> {
    inf.derives(algebra::univ_coprod(inf.line(0)?, inf.line(1)?)?)
}

fn and_intro(inf: &Inference) -> CheckResult<()> {
    inf.derives(Prop::and(inf.line(0)?.clone(), inf.line(1)?.clone()))
}

fn not_elim(inf: &Inference) -> CheckResult<()> {
    let negated = algebra::inspect_not(inf.line(0)?)?;
    let p = inf.line(1)?;
    if &negated != p {
        return Err(CheckError::mismatch(&negated, p));
    }
    inf.derives(Prop::Bool(false))
}

fn ex_falso(inf: &Inference) -> CheckResult<()> {
    let p = inf.line(0)?;
    if *p != Prop::Bool(false) {
        return Err(CheckError::mismatch(&Prop::Bool(false), p));
    }
    Ok(())
}

fn imp_intro(inf: &Inference) -> CheckResult<()> {
    let ty = inf.scope(0)?;
    let Prop::Imp(h, k) = inf.claim else {
        return Err(RuleMismatch::NotAnImplication(inf.claim.clone()).into());
    };
    discharges(ty, h)?;
    concludes(ty, k)
}

fn not_intro(inf: &Inference) -> CheckResult<()> {
    let ty = inf.scope(0)?;
    let h = algebra::inspect_not(inf.claim)?;
    discharges(ty, &h)?;
    concludes(ty, &Prop::Bool(false))
}

fn or_elim(inf: &Inference) -> CheckResult<()> {
    let Prop::Or(a, b) = inf.line(0)? else {
        return Err(RuleMismatch::NotADisjunction(inf.line(0)?.clone()).into());
    };
    let left = inf.scope(1)?;
    let right = inf.scope(2)?;

    discharges(left, a)?;
    discharges(right, b)?;
    concludes(left, inf.claim)?;
    concludes(right, inf.claim)
}

fn forall_elim(inf: &Inference) -> CheckResult<()> {
    let general = inf.line(0)?;
    let Prop::ForAll(var, body) = general else {
        return Err(RuleMismatch::NotAUniversal(general.clone()).into());
    };
    let t = recover_instance(body, inf.claim, var.name())?;
    trace!(rule = %inf.name, var = %var, witness = ?t, "instantiated universal");
    Ok(())
}

fn exists_intro(inf: &Inference) -> CheckResult<()> {
    let Prop::Exists(var, body) = inf.claim else {
        return Err(RuleMismatch::NotAnExistential(inf.claim.clone()).into());
    };
    recover_instance(body, inf.line(0)?, var.name())?;
    Ok(())
}

fn forall_intro(inf: &Inference) -> CheckResult<()> {
    let Prop::ForAll(var, body) = inf.claim else {
        return Err(RuleMismatch::NotAUniversal(inf.claim.clone()).into());
    };
    let Some(t) = recover_instance(body, inf.line(0)?, var.name())? else {
        // vacuous quantification
        return Ok(());
    };

    if inf.constants.contains(&t) {
        return Err(CheckError::GeneralizesConstant(t));
    }
    if inf.open_symbols.contains(&t) {
        return Err(CheckError::GeneralizesHypothesis(t));
    }
    if symbols(inf.claim).free().contains(&t) {
        return Err(CheckError::EscapingEigenvariable(t));
    }
    Ok(())
}

fn exists_elim(inf: &Inference) -> CheckResult<()> {
    let general = inf.line(0)?;
    let Prop::Exists(var, body) = general else {
        return Err(RuleMismatch::NotAnExistential(general.clone()).into());
    };
    let ty = inf.scope(1)?;
    concludes(ty, inf.claim)?;

    let mut last_err = CheckError::NotInScope {
        prop: (**body).clone(),
        role: "assume",
    };
    for hyp in ty.assumptions() {
        let witness = match recover_instance(body, hyp, var.name()) {
            Ok(witness) => witness,
            Err(_) => continue,
        };
        discharges(ty, hyp)?;
        let Some(t) = witness else {
            return Ok(());
        };

        let escapes = inf.constants.contains(&t)
            || inf.open_symbols.contains(&t)
            || symbols(inf.claim).free().contains(&t);
        if !escapes {
            return Ok(());
        }
        last_err = CheckError::EscapingEigenvariable(t);
    }
    Err(last_err)
}

/// Inference rules keyed by citation name and number of citations.
#[derive(Debug, Clone)]
pub struct InferenceTable {
    rules: FxHashMap<(Ustr, usize), InferenceFn>,
}

impl InferenceTable {
    pub fn builtin() -> Self {
        let entries: [(Ustr, usize, InferenceFn); 20] = [
            (*strings::APPLY, 2, apply),
            (*strings::COMPOSE, 2, compose),
            (*strings::PROJ_L, 1, proj_l),
            (*strings::PROJ_R, 1, proj_r),
            (*strings::INJ_L, 1, inj_l),
            (*strings::INJ_R, 1, inj_r),
            (*strings::DIAG, 1, diag),
            (*strings::CODIAG, 1, codiag),
            (*strings::UNIV_PROD, 2, univ_prod),
            (*strings::UNIV_COPROD, 2, univ_coprod),
            (*strings::AND_INTRO, 2, and_intro),
            (*strings::NOT_ELIM, 2, not_elim),
            (*strings::EX_FALSO, 1, ex_falso),
            (*strings::IMP_INTRO, 1, imp_intro),
            (*strings::NOT_INTRO, 1, not_intro),
            (*strings::OR_ELIM, 3, or_elim),
            (*strings::FORALL_ELIM, 1, forall_elim),
            (*strings::EXISTS_INTRO, 1, exists_intro),
            (*strings::FORALL_INTRO, 1, forall_intro),
            (*strings::EXISTS_ELIM, 2, exists_elim),
        ];

        Self {
            rules: entries
                .into_iter()
                .map(|(name, arity, rule)| ((name, arity), rule))
                .collect(),
        }
    }

    pub fn lookup(&self, name: Ustr, arity: usize) -> Option<InferenceFn> {
        self.rules.get(&(name, arity)).copied()
    }

    pub fn contains(&self, name: Ustr) -> bool {
        self.rules.keys().any(|(n, _)| *n == name)
    }

    /// Makes `alias` cite the same rules as `target`, at every arity.
    pub fn add_alias(&mut self, alias: Ustr, target: Ustr) -> bool {
        let aliased: Vec<_> = self
            .rules
            .iter()
            .filter(|((name, _), _)| *name == target)
            .map(|(&(_, arity), &rule)| ((alias, arity), rule))
            .collect();
        let found = !aliased.is_empty();
        self.rules.extend(aliased);
        found
    }

    pub fn remove(&mut self, name: Ustr) {
        self.rules.retain(|(n, _), _| *n != name);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for InferenceTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use im::OrdSet;

    use super::*;
    use crate::{logic::prop::Term, semant::line::LineNo};

    fn a() -> Prop {
        Prop::atom("A")
    }

    fn b() -> Prop {
        Prop::atom("B")
    }

    fn r(name: &str) -> Term {
        Term::Ref(Ustr::from(name))
    }

    fn line(n: u32, prop: Prop) -> Cited {
        Cited::Line {
            number: LineNo(n),
            prop,
        }
    }

    fn scope(assumptions: &[Prop], conclusions: &[Prop]) -> Cited {
        Cited::Scope {
            first: LineNo(10),
            last: LineNo(20),
            ty: ProofType::new(
                assumptions.iter().cloned().collect(),
                conclusions.iter().cloned().collect(),
            ),
        }
    }

    struct Check {
        constants: Constants,
        open: FxHashSet<Ustr>,
    }

    impl Check {
        fn new() -> Self {
            Self {
                constants: OrdSet::new(),
                open: FxHashSet::default(),
            }
        }

        fn run(&self, name: &str, cited: &[Cited], claim: &Prop) -> CheckResult<()> {
            let name = Ustr::from(name);
            let rule = InferenceTable::builtin()
                .lookup(name, cited.len())
                .expect("builtin rule");
            rule(&Inference {
                name,
                cited,
                claim,
                constants: &self.constants,
                open_symbols: &self.open,
            })
        }
    }

    #[test]
    fn algebraic_rules_compare_against_claim() {
        let check = Check::new();
        let f = line(1, Prop::imp(a(), b()));
        assert_eq!(check.run("apply", &[f.clone(), line(2, a())], &b()), Ok(()));
        assert!(matches!(
            check.run("apply", &[f, line(2, a())], &a()),
            Err(CheckError::Mismatch { .. })
        ));

        let conj = line(1, Prop::and(a(), b()));
        assert_eq!(check.run("projr", &[conj.clone()], &b()), Ok(()));
        assert_eq!(
            check.run("andi", &[line(1, a()), line(2, b())], &Prop::and(a(), b())),
            Ok(())
        );
        assert_eq!(check.run("injl", &[line(1, a())], &Prop::or(a(), b())), Ok(()));
        assert_eq!(check.run("injr", &[line(1, a())], &Prop::or(b(), a())), Ok(()));
        assert!(matches!(
            check.run("injl", &[line(1, a())], &Prop::or(b(), a())),
            Err(CheckError::Mismatch { .. })
        ));
    }

    #[test]
    fn helper_failures_surface_as_rule_mismatch() {
        let check = Check::new();
        assert_eq!(
            check.run("projl", &[line(1, a())], &a()),
            Err(CheckError::RuleMismatch(RuleMismatch::NotAConjunction(a())))
        );
    }

    #[test]
    fn negation_rules() {
        let check = Check::new();
        let cited = [line(1, Prop::not(a())), line(2, a())];
        assert_eq!(check.run("note", &cited, &Prop::Bool(false)), Ok(()));
        assert_eq!(check.run("efq", &[line(3, Prop::Bool(false))], &b()), Ok(()));
        assert!(check.run("efq", &[line(3, a())], &b()).is_err());

        let refutation = scope(&[a()], &[a(), Prop::Bool(false)]);
        assert_eq!(check.run("noti", &[refutation], &Prop::not(a())), Ok(()));
    }

    #[test]
    fn scope_rules_need_scopes() {
        let check = Check::new();
        assert_eq!(
            check.run("impi", &[line(1, a())], &Prop::imp(a(), a())),
            Err(CheckError::citation_kind(Ustr::from("impi"), 1, "scope"))
        );

        let deduction = scope(&[a()], &[a(), b()]);
        assert_eq!(check.run("impi", &[deduction.clone()], &Prop::imp(a(), b())), Ok(()));
        assert_eq!(
            check.run("impi", &[deduction], &Prop::imp(b(), a())),
            Err(CheckError::NotInScope {
                prop: b(),
                role: "assume"
            })
        );
    }

    #[test]
    fn scopes_may_only_assume_what_they_discharge() {
        let check = Check::new();
        let k = Prop::atom("K");
        let c = Prop::atom("C");

        let two_hyps = scope(&[a(), k.clone()], &[a(), k.clone(), c.clone()]);
        assert_eq!(
            check.run("impi", &[two_hyps], &Prop::imp(a(), c.clone())),
            Err(CheckError::UndischargedAssumption(k.clone()))
        );

        let refutation = scope(&[a(), k.clone()], &[Prop::Bool(false)]);
        assert_eq!(
            check.run("noti", &[refutation], &Prop::not(a())),
            Err(CheckError::UndischargedAssumption(k.clone()))
        );

        let cited = [
            line(1, Prop::or(a(), b())),
            scope(&[a()], &[c.clone()]),
            scope(&[b(), k.clone()], &[c.clone()]),
        ];
        assert_eq!(
            check.run("ore", &cited, &c),
            Err(CheckError::UndischargedAssumption(k.clone()))
        );

        let witness = Prop::pred("P", [r("w")]);
        let cited = [
            line(1, Prop::exists(r("x"), Prop::pred("P", [r("x")]))),
            scope(&[witness, k.clone()], &[c.clone()]),
        ];
        assert_eq!(
            check.run("existse", &cited, &c),
            Err(CheckError::UndischargedAssumption(k))
        );
    }

    #[test]
    fn disjunction_elimination() {
        let check = Check::new();
        let c = Prop::atom("C");
        let cited = [
            line(1, Prop::or(a(), b())),
            scope(&[a()], &[a(), c.clone()]),
            scope(&[b()], &[b(), c.clone()]),
        ];
        assert_eq!(check.run("ore", &cited, &c), Ok(()));
        assert!(check.run("ore", &cited, &a()).is_err());
    }

    #[test]
    fn universal_elimination_and_introduction() {
        let mut check = Check::new();
        let general = Prop::forall(r("x"), Prop::pred("P", [r("x")]));
        let instance = Prop::pred("P", [r("c")]);
        assert_eq!(check.run("alle", &[line(1, general.clone())], &instance), Ok(()));
        assert_eq!(check.run("alli", &[line(2, instance.clone())], &general), Ok(()));

        check.open.insert(Ustr::from("c"));
        assert_eq!(
            check.run("alli", &[line(2, instance.clone())], &general),
            Err(CheckError::GeneralizesHypothesis(Ustr::from("c")))
        );

        check.open.clear();
        check.constants.insert(Ustr::from("c"));
        assert_eq!(
            check.run("alli", &[line(2, instance)], &general),
            Err(CheckError::GeneralizesConstant(Ustr::from("c")))
        );
    }

    #[test]
    fn generalized_term_must_not_stay_free() {
        let check = Check::new();
        let instance = Prop::pred("R", [r("c"), r("c")]);
        let claim = Prop::forall(r("x"), Prop::pred("R", [r("x"), r("c")]));
        assert_eq!(
            check.run("alli", &[line(1, instance)], &claim),
            Err(CheckError::EscapingEigenvariable(Ustr::from("c")))
        );
    }

    #[test]
    fn existential_rules() {
        let mut check = Check::new();
        let body = Prop::pred("P", [r("x")]);
        let general = Prop::exists(r("x"), body.clone());
        let q = Prop::atom("Q");

        assert_eq!(
            check.run("existsi", &[line(1, Prop::pred("P", [r("c")]))], &general),
            Ok(())
        );

        let cited = [
            line(1, general.clone()),
            scope(&[Prop::pred("P", [r("w")])], &[q.clone()]),
        ];
        assert_eq!(check.run("existse", &cited, &q), Ok(()));

        check.constants.insert(Ustr::from("w"));
        assert_eq!(
            check.run("existse", &cited, &q),
            Err(CheckError::EscapingEigenvariable(Ustr::from("w")))
        );
    }

    #[test]
    fn aliases_cover_every_arity() {
        let mut table = InferenceTable::builtin();
        assert!(table.add_alias(Ustr::from("mp"), Ustr::from("apply")));
        assert!(table.lookup(Ustr::from("mp"), 2).is_some());
        assert!(!table.add_alias(Ustr::from("x"), Ustr::from("nope")));

        table.remove(Ustr::from("apply"));
        assert!(table.lookup(Ustr::from("apply"), 2).is_none());
        assert!(table.lookup(Ustr::from("mp"), 2).is_some());
    }
}
