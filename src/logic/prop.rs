use std::fmt;

use itertools::Itertools;
use rustc_hash::FxHashSet;
use ustr::Ustr;

use crate::logic::unify::{Substitution, unify};

/// A proposition of the mixed propositional/first-order language.
///
/// Holes only appear in rule patterns. Lines asserted by a proof are expected
/// to be hole-free.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Prop {
    Atom(Ustr),
    /// Metavariable over propositions.
    Hole(Ustr),
    /// A domain element used as a proposition-level atom.
    Ref(Ustr),
    /// Metavariable over domain elements.
    RefHole(Ustr),
    And(Box<Prop>, Box<Prop>),
    Or(Box<Prop>, Box<Prop>),
    Imp(Box<Prop>, Box<Prop>),
    ForAll(Term, Box<Prop>),
    Exists(Term, Box<Prop>),
    Pred(Ustr, Vec<Term>),
    Bool(bool),
}

/// Quantifier variables and predicate arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Term {
    Ref(Ustr),
    Hole(Ustr),
}

impl Term {
    pub fn name(&self) -> Ustr {
        match self {
            Term::Ref(name) | Term::Hole(name) => *name,
        }
    }
}

impl Prop {
    pub fn atom(name: &str) -> Self {
        Prop::Atom(Ustr::from(name))
    }

    pub fn hole(name: &str) -> Self {
        Prop::Hole(Ustr::from(name))
    }

    pub fn reference(name: &str) -> Self {
        Prop::Ref(Ustr::from(name))
    }

    pub fn ref_hole(name: &str) -> Self {
        Prop::RefHole(Ustr::from(name))
    }

    pub fn and(p: Prop, q: Prop) -> Self {
        Prop::And(Box::new(p), Box::new(q))
    }

    pub fn or(p: Prop, q: Prop) -> Self {
        Prop::Or(Box::new(p), Box::new(q))
    }

    pub fn imp(p: Prop, q: Prop) -> Self {
        Prop::Imp(Box::new(p), Box::new(q))
    }

    /// Negation is implication into `false`.
    pub fn not(p: Prop) -> Self {
        Prop::imp(p, Prop::Bool(false))
    }

    pub fn forall(var: Term, body: Prop) -> Self {
        Prop::ForAll(var, Box::new(body))
    }

    pub fn exists(var: Term, body: Prop) -> Self {
        Prop::Exists(var, Box::new(body))
    }

    pub fn pred(name: &str, args: impl IntoIterator<Item = Term>) -> Self {
        Prop::Pred(Ustr::from(name), args.into_iter().collect())
    }

    pub fn is_negation(&self) -> bool {
        matches!(self, Prop::Imp(_, q) if **q == Prop::Bool(false))
    }

    pub fn has_holes(&self) -> bool {
        match self {
            Prop::Hole(_) | Prop::RefHole(_) => true,
            Prop::Atom(_) | Prop::Ref(_) | Prop::Bool(_) => false,
            Prop::And(p, q) | Prop::Or(p, q) | Prop::Imp(p, q) => p.has_holes() || q.has_holes(),
            Prop::ForAll(var, body) | Prop::Exists(var, body) => {
                matches!(var, Term::Hole(_)) || body.has_holes()
            }
            Prop::Pred(_, args) => args.iter().any(|a| matches!(a, Term::Hole(_))),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Ref(name) => write!(f, "{name}"),
            Term::Hole(name) => write!(f, "?{name}"),
        }
    }
}

impl fmt::Display for Prop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prop::Atom(name) | Prop::Ref(name) => write!(f, "{name}"),
            Prop::Hole(name) | Prop::RefHole(name) => write!(f, "?{name}"),
            Prop::And(p, q) => write!(f, r"({p} /\ {q})"),
            Prop::Or(p, q) => write!(f, r"({p} \/ {q})"),
            Prop::Imp(p, _) if self.is_negation() => write!(f, "~{p}"),
            Prop::Imp(p, q) => write!(f, "({p} -> {q})"),
            Prop::ForAll(var, body) => write!(f, "(forall {var}, {body})"),
            Prop::Exists(var, body) => write!(f, "(exists {var}, {body})"),
            Prop::Pred(name, args) => write!(f, "{name}({})", args.iter().join(", ")),
            Prop::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Domain references occurring in a proposition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Symbols {
    /// Every reference name, quantifier variables included.
    pub all: FxHashSet<Ustr>,
    /// Every name bound by some quantifier.
    pub bound: FxHashSet<Ustr>,
}

impl Symbols {
    /// References that are not bound anywhere in the proposition.
    pub fn free(&self) -> FxHashSet<Ustr> {
        self.all.difference(&self.bound).copied().collect()
    }
}

pub fn symbols(p: &Prop) -> Symbols {
    let mut syms = Symbols::default();
    collect_symbols(p, &mut syms);
    syms
}

fn collect_symbols(p: &Prop, syms: &mut Symbols) {
    match p {
        Prop::Ref(name) => {
            syms.all.insert(*name);
        }
        Prop::Atom(_) | Prop::Hole(_) | Prop::RefHole(_) | Prop::Bool(_) => {}
        Prop::And(p, q) | Prop::Or(p, q) | Prop::Imp(p, q) => {
            collect_symbols(p, syms);
            collect_symbols(q, syms);
        }
        Prop::ForAll(var, body) | Prop::Exists(var, body) => {
            if let Term::Ref(name) = var {
                syms.all.insert(*name);
                syms.bound.insert(*name);
            }
            collect_symbols(body, syms);
        }
        Prop::Pred(_, args) => {
            for arg in args {
                if let Term::Ref(name) = arg {
                    syms.all.insert(*name);
                }
            }
        }
    }
}

/// Recognizes the excluded-middle shapes `p \/ ~p` and `~p \/ p`.
pub fn is_axiom(p: &Prop) -> bool {
    let a = Prop::Hole(*crate::strings::HOLE_A);
    let shapes = [
        Prop::or(a.clone(), Prop::not(a.clone())),
        Prop::or(Prop::not(a.clone()), a),
    ];

    shapes
        .iter()
        .any(|shape| unify(p, shape, &mut Substitution::default()).unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Term {
        Term::Ref(Ustr::from("x"))
    }

    #[test]
    fn negation_displays_with_tilde() {
        let p = Prop::not(Prop::atom("A"));
        assert_eq!(p.to_string(), "~A");
        assert_eq!(Prop::not(p).to_string(), "~~A");
        assert_eq!(Prop::imp(Prop::atom("A"), Prop::atom("B")).to_string(), "(A -> B)");
        assert!(Prop::not(Prop::atom("A")).is_negation());
        assert!(!Prop::imp(Prop::Bool(false), Prop::atom("A")).is_negation());
    }

    #[test]
    fn compound_display() {
        let p = Prop::forall(
            x(),
            Prop::or(Prop::pred("P", [x()]), Prop::and(Prop::atom("Q"), Prop::Bool(true))),
        );
        assert_eq!(p.to_string(), r"(forall x, (P(x) \/ (Q /\ true)))");
    }

    #[test]
    fn symbols_of_universal() {
        let c = Term::Ref(Ustr::from("c"));
        let p = Prop::forall(x(), Prop::pred("P", [x(), c]));
        let syms = symbols(&p);

        let all: FxHashSet<Ustr> = ["x", "c"].into_iter().map(Ustr::from).collect();
        let bound: FxHashSet<Ustr> = ["x"].into_iter().map(Ustr::from).collect();
        assert_eq!(syms.all, all);
        assert_eq!(syms.bound, bound);
        assert_eq!(syms.free(), ["c"].into_iter().map(Ustr::from).collect());
    }

    #[test]
    fn excluded_middle_is_axiom() {
        let a = Prop::and(Prop::atom("A"), Prop::atom("B"));
        assert!(is_axiom(&Prop::or(a.clone(), Prop::not(a.clone()))));
        assert!(is_axiom(&Prop::or(Prop::not(a.clone()), a.clone())));
        assert!(!is_axiom(&Prop::or(a.clone(), a)));
        assert!(!is_axiom(&Prop::or(
            Prop::atom("A"),
            Prop::not(Prop::atom("B"))
        )));
    }
}
