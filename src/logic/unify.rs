use rustc_hash::FxHashMap;
use ustr::Ustr;

use crate::{
    diagnostics::{CheckError, CheckResult},
    logic::prop::{Prop, Term},
};

/// Bindings produced by one unification.
///
/// Formula holes and reference holes live in separate namespaces so that a
/// formula metavariable can never absorb a term and the other way around.
/// A substitution belongs to a single top-level `unify` or `try_rewrite`
/// call; start every call from `Substitution::default()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitution {
    formulas: FxHashMap<Ustr, Prop>,
    refs: FxHashMap<Ustr, Ustr>,
}

impl Substitution {
    pub fn is_empty(&self) -> bool {
        self.formulas.is_empty() && self.refs.is_empty()
    }

    pub fn formula(&self, hole: Ustr) -> Option<&Prop> {
        self.formulas.get(&hole)
    }

    pub fn reference(&self, hole: Ustr) -> Option<Ustr> {
        self.refs.get(&hole).copied()
    }

    pub fn bind_formula(&mut self, hole: Ustr, exp: &Prop) -> bool {
        match self.formulas.get(&hole) {
            Some(bound) => bound == exp,
            None => {
                self.formulas.insert(hole, exp.clone());
                true
            }
        }
    }

    pub fn bind_ref(&mut self, hole: Ustr, name: Ustr) -> bool {
        match self.refs.get(&hole) {
            Some(bound) => *bound == name,
            None => {
                self.refs.insert(hole, name);
                true
            }
        }
    }

    /// Replaces every bound hole in `p`. Unbound holes are left in place.
    pub fn instantiate(&self, p: &Prop) -> Prop {
        match p {
            Prop::Hole(name) => self.formulas.get(name).cloned().unwrap_or_else(|| p.clone()),
            Prop::RefHole(name) => match self.refs.get(name) {
                Some(r) => Prop::Ref(*r),
                None => p.clone(),
            },
            Prop::Atom(_) | Prop::Ref(_) | Prop::Bool(_) => p.clone(),
            Prop::And(l, r) => Prop::and(self.instantiate(l), self.instantiate(r)),
            Prop::Or(l, r) => Prop::or(self.instantiate(l), self.instantiate(r)),
            Prop::Imp(l, r) => Prop::imp(self.instantiate(l), self.instantiate(r)),
            Prop::ForAll(var, body) => {
                Prop::forall(self.instantiate_term(*var), self.instantiate(body))
            }
            Prop::Exists(var, body) => {
                Prop::exists(self.instantiate_term(*var), self.instantiate(body))
            }
            Prop::Pred(name, args) => Prop::Pred(
                *name,
                args.iter().map(|a| self.instantiate_term(*a)).collect(),
            ),
        }
    }

    fn instantiate_term(&self, t: Term) -> Term {
        match t {
            Term::Hole(name) => self.refs.get(&name).map_or(t, |r| Term::Ref(*r)),
            Term::Ref(_) => t,
        }
    }
}

fn is_hole(p: &Prop) -> bool {
    matches!(p, Prop::Hole(_) | Prop::RefHole(_))
}

/// Unifies `p` with `q`, extending `subst`.
///
/// `Ok(false)` is an ordinary mismatch. Two metavariables meeting each other
/// is not supported and is reported as an error.
pub fn unify(p: &Prop, q: &Prop, subst: &mut Substitution) -> CheckResult<bool> {
    if is_hole(p) && is_hole(q) {
        return Err(CheckError::UnsupportedUnification {
            left: p.clone(),
            right: q.clone(),
        });
    }

    match (p, q) {
        (Prop::Hole(hole), exp) | (exp, Prop::Hole(hole)) => Ok(subst.bind_formula(*hole, exp)),
        (Prop::RefHole(hole), Prop::Ref(name)) | (Prop::Ref(name), Prop::RefHole(hole)) => {
            Ok(subst.bind_ref(*hole, *name))
        }
        (Prop::RefHole(_), _) | (_, Prop::RefHole(_)) => Ok(false),
        (Prop::And(a, b), Prop::And(c, d))
        | (Prop::Or(a, b), Prop::Or(c, d))
        | (Prop::Imp(a, b), Prop::Imp(c, d)) => Ok(unify(a, c, subst)? && unify(b, d, subst)?),
        (Prop::ForAll(v, a), Prop::ForAll(w, b)) | (Prop::Exists(v, a), Prop::Exists(w, b)) => {
            Ok(unify_term(*v, *w, subst)? && unify(a, b, subst)?)
        }
        (Prop::Bool(a), Prop::Bool(b)) => Ok(a == b),
        (Prop::Atom(a), Prop::Atom(b)) | (Prop::Ref(a), Prop::Ref(b)) => Ok(a == b),
        (Prop::Pred(f, xs), Prop::Pred(g, ys)) => {
            if f != g || xs.len() != ys.len() {
                return Ok(false);
            }
            for (x, y) in xs.iter().zip(ys) {
                if !unify_term(*x, *y, subst)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        _ => Ok(false),
    }
}

pub fn unify_term(s: Term, t: Term, subst: &mut Substitution) -> CheckResult<bool> {
    match (s, t) {
        (Term::Hole(a), Term::Hole(b)) => Err(CheckError::UnsupportedUnification {
            left: Prop::RefHole(a),
            right: Prop::RefHole(b),
        }),
        (Term::Hole(hole), Term::Ref(name)) | (Term::Ref(name), Term::Hole(hole)) => {
            Ok(subst.bind_ref(hole, name))
        }
        (Term::Ref(a), Term::Ref(b)) => Ok(a == b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u(s: &str) -> Ustr {
        Ustr::from(s)
    }

    #[test]
    fn formula_hole_binds_once() {
        let pattern = Prop::or(Prop::hole("a"), Prop::hole("a"));
        let ab = Prop::and(Prop::atom("A"), Prop::atom("B"));

        let mut subst = Substitution::default();
        assert_eq!(unify(&Prop::or(ab.clone(), ab.clone()), &pattern, &mut subst), Ok(true));
        assert_eq!(subst.formula(u("a")), Some(&ab));

        let mut subst = Substitution::default();
        assert_eq!(
            unify(&Prop::or(ab, Prop::atom("A")), &pattern, &mut subst),
            Ok(false)
        );
    }

    #[test]
    fn reference_hole_never_binds_formula() {
        let mut subst = Substitution::default();
        let p = Prop::and(Prop::atom("A"), Prop::atom("B"));
        assert_eq!(unify(&p, &Prop::ref_hole("x"), &mut subst), Ok(false));
        assert!(subst.is_empty());

        assert_eq!(unify(&Prop::reference("c"), &Prop::ref_hole("x"), &mut subst), Ok(true));
        assert_eq!(subst.reference(u("x")), Some(u("c")));
    }

    #[test]
    fn namespaces_do_not_cross_bind() {
        let x = Term::Hole(u("x"));
        let pattern = Prop::forall(x, Prop::hole("x"));
        let c = Term::Ref(u("c"));
        let target = Prop::forall(c, Prop::pred("P", [c]));

        let mut subst = Substitution::default();
        assert_eq!(unify(&target, &pattern, &mut subst), Ok(true));
        assert_eq!(subst.reference(u("x")), Some(u("c")));
        assert_eq!(subst.formula(u("x")), Some(&Prop::pred("P", [c])));
    }

    #[test]
    fn quantifiers_unify_variable_then_body() {
        let x = Term::Ref(u("x"));
        let y = Term::Ref(u("y"));
        let mut subst = Substitution::default();
        let p = Prop::forall(x, Prop::pred("P", [x]));
        assert_eq!(unify(&p, &Prop::forall(y, Prop::pred("P", [x])), &mut subst), Ok(false));
        assert_eq!(unify(&p, &Prop::exists(x, Prop::pred("P", [x])), &mut subst), Ok(false));
        assert_eq!(unify(&p, &p.clone(), &mut subst), Ok(true));
    }

    #[test]
    fn predicates_compare_name_and_arity() {
        let c = Term::Ref(u("c"));
        let d = Term::Ref(u("d"));
        let mut subst = Substitution::default();
        assert_eq!(unify(&Prop::pred("P", [c]), &Prop::pred("P", [c, d]), &mut subst), Ok(false));
        assert_eq!(unify(&Prop::pred("P", [c]), &Prop::pred("Q", [c]), &mut subst), Ok(false));
        assert_eq!(
            unify(&Prop::pred("P", [c, d]), &Prop::pred("P", [Term::Hole(u("x")), d]), &mut subst),
            Ok(true)
        );
    }

    #[test]
    fn literals_and_mismatched_shapes() {
        let mut subst = Substitution::default();
        assert_eq!(unify(&Prop::Bool(true), &Prop::Bool(true), &mut subst), Ok(true));
        assert_eq!(unify(&Prop::Bool(true), &Prop::Bool(false), &mut subst), Ok(false));
        assert_eq!(unify(&Prop::atom("A"), &Prop::Bool(false), &mut subst), Ok(false));
        assert_eq!(unify(&Prop::atom("A"), &Prop::reference("A"), &mut subst), Ok(false));
    }

    #[test]
    fn hole_against_hole_is_unsupported() {
        let mut subst = Substitution::default();
        assert!(matches!(
            unify(&Prop::hole("a"), &Prop::hole("b"), &mut subst),
            Err(CheckError::UnsupportedUnification { .. })
        ));
        assert!(matches!(
            unify(&Prop::hole("a"), &Prop::ref_hole("x"), &mut subst),
            Err(CheckError::UnsupportedUnification { .. })
        ));
    }

    #[test]
    fn instantiate_fills_both_namespaces() {
        let x = Term::Hole(u("x"));
        let pattern = Prop::not(Prop::forall(x, Prop::hole("a")));
        let mut subst = Substitution::default();
        let body = Prop::pred("P", [Term::Ref(u("y"))]);
        assert!(subst.bind_formula(u("a"), &body));
        assert!(subst.bind_ref(u("x"), u("y")));

        assert_eq!(
            subst.instantiate(&pattern),
            Prop::not(Prop::forall(Term::Ref(u("y")), body))
        );
    }
}
