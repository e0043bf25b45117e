//! Structural operations on propositions, read as arrows of the proof category.
//!
//! None of these look at a context. Each one is total or fails with the
//! [`RuleMismatch`] describing the violated precondition.

use crate::{diagnostics::RuleMismatch, logic::prop::Prop};

type AlgebraResult = Result<Prop, RuleMismatch>;

fn as_imp(f: &Prop) -> Result<(&Prop, &Prop), RuleMismatch> {
    match f {
        Prop::Imp(p, q) => Ok((p, q)),
        _ => Err(RuleMismatch::NotAnImplication(f.clone())),
    }
}

pub fn apply(f: &Prop, x: &Prop) -> AlgebraResult {
    let (ant, cons) = as_imp(f)?;
    if ant != x {
        return Err(RuleMismatch::AntecedentMismatch {
            expected: ant.clone(),
            got: x.clone(),
        });
    }
    Ok(cons.clone())
}

pub fn compose(f: &Prop, g: &Prop) -> AlgebraResult {
    let (f_ant, f_cons) = as_imp(f)?;
    let (g_ant, g_cons) = as_imp(g)?;
    if f_cons != g_ant {
        return Err(RuleMismatch::CompositionMismatch {
            f: f.clone(),
            g: g.clone(),
        });
    }
    Ok(Prop::imp(f_ant.clone(), g_cons.clone()))
}

pub fn proj_l(p: &Prop) -> AlgebraResult {
    match p {
        Prop::And(l, _) => Ok((**l).clone()),
        _ => Err(RuleMismatch::NotAConjunction(p.clone())),
    }
}

pub fn proj_r(p: &Prop) -> AlgebraResult {
    match p {
        Prop::And(_, r) => Ok((**r).clone()),
        _ => Err(RuleMismatch::NotAConjunction(p.clone())),
    }
}

pub fn inj_l(p: &Prop, q: &Prop) -> Prop {
    Prop::or(p.clone(), q.clone())
}

pub fn inj_r(p: &Prop, q: &Prop) -> Prop {
    Prop::or(q.clone(), p.clone())
}

pub fn diag(p: &Prop) -> Prop {
    Prop::and(p.clone(), p.clone())
}

pub fn codiag(p: &Prop) -> AlgebraResult {
    match p {
        Prop::Or(l, r) if l == r => Ok((**l).clone()),
        Prop::Or(..) => Err(RuleMismatch::NoCodiagonal(p.clone())),
        _ => Err(RuleMismatch::NotADisjunction(p.clone())),
    }
}

/// `a -> b` and `a -> c` give `a -> (b /\ c)`.
pub fn univ_prod(f: &Prop, g: &Prop) -> AlgebraResult {
    let (f_ant, f_cons) = as_imp(f)?;
    let (g_ant, g_cons) = as_imp(g)?;
    if f_ant != g_ant {
        return Err(RuleMismatch::DomainMismatch(f.clone(), g.clone()));
    }
    Ok(Prop::imp(
        f_ant.clone(),
        Prop::and(f_cons.clone(), g_cons.clone()),
    ))
}

/// `a -> c` and `b -> c` give `(a \/ b) -> c`.
pub fn univ_coprod(f: &Prop, g: &Prop) -> AlgebraResult {
    let (f_ant, f_cons) = as_imp(f)?;
    let (g_ant, g_cons) = as_imp(g)?;
    if f_cons != g_cons {
        return Err(RuleMismatch::CodomainMismatch(f.clone(), g.clone()));
    }
    Ok(Prop::imp(
        Prop::or(f_ant.clone(), g_ant.clone()),
        f_cons.clone(),
    ))
}

pub fn inspect_not(p: &Prop) -> AlgebraResult {
    match p {
        Prop::Imp(negated, q) if **q == Prop::Bool(false) => Ok((**negated).clone()),
        _ => Err(RuleMismatch::NotANegation(p.clone())),
    }
}
