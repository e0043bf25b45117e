//! Recovering the term substituted for a quantified variable.
//!
//! The quantifier rules cite `forall x, phi` (or `exists x, phi`) next to a
//! proposition that should be `phi[t/x]`. We walk both trees side by side,
//! read `t` off the positions where `x` occurs free, and reject the
//! instantiation if it is ambiguous or if `t` would be captured.

use ustr::Ustr;

use crate::{
    diagnostics::AlphaError,
    logic::prop::{Prop, Term},
};

struct Recovery<'p> {
    var: Ustr,
    general: &'p Prop,
    instance: &'p Prop,
    found: Option<Ustr>,
    /// Names bound by the quantifiers we are currently under.
    binders: Vec<Ustr>,
}

/// Finds `t` such that `instance == general[t/var]`.
///
/// `Ok(None)` means `var` does not occur free in `general` and the two
/// propositions are identical.
pub fn recover_instance(
    general: &Prop,
    instance: &Prop,
    var: Ustr,
) -> Result<Option<Ustr>, AlphaError> {
    let mut recovery = Recovery {
        var,
        general,
        instance,
        found: None,
        binders: Vec::new(),
    };
    recovery.walk(general, instance)?;
    Ok(recovery.found)
}

/// Replaces the free occurrences of `var` by `target`.
pub fn substitute(p: &Prop, var: Ustr, target: Ustr) -> Prop {
    let term = |t: &Term| match t {
        Term::Ref(name) if *name == var => Term::Ref(target),
        _ => *t,
    };

    match p {
        Prop::Ref(name) if *name == var => Prop::Ref(target),
        Prop::Atom(_) | Prop::Ref(_) | Prop::Hole(_) | Prop::RefHole(_) | Prop::Bool(_) => {
            p.clone()
        }
        Prop::And(l, r) => Prop::and(substitute(l, var, target), substitute(r, var, target)),
        Prop::Or(l, r) => Prop::or(substitute(l, var, target), substitute(r, var, target)),
        Prop::Imp(l, r) => Prop::imp(substitute(l, var, target), substitute(r, var, target)),
        Prop::ForAll(v, _) | Prop::Exists(v, _) if v.name() == var => p.clone(),
        Prop::ForAll(v, body) => Prop::forall(*v, substitute(body, var, target)),
        Prop::Exists(v, body) => Prop::exists(*v, substitute(body, var, target)),
        Prop::Pred(name, args) => Prop::Pred(*name, args.iter().map(term).collect()),
    }
}

impl Recovery<'_> {
    fn mismatch(&self) -> AlphaError {
        AlphaError::ShapeMismatch {
            general: self.general.clone(),
            instance: self.instance.clone(),
        }
    }

    fn shadowed(&self) -> bool {
        self.binders.contains(&self.var)
    }

    fn record(&mut self, target: Ustr) -> Result<(), AlphaError> {
        if self.binders.contains(&target) {
            return Err(AlphaError::CaptureViolation {
                var: self.var,
                target,
            });
        }

        match self.found {
            Some(first) if first != target => Err(AlphaError::AmbiguousSubstitution {
                var: self.var,
                first,
                second: target,
            }),
            _ => {
                self.found = Some(target);
                Ok(())
            }
        }
    }

    fn reference(&mut self, general: Ustr, instance: Ustr) -> Result<(), AlphaError> {
        if general == self.var && !self.shadowed() {
            self.record(instance)
        } else if general == instance {
            Ok(())
        } else {
            Err(self.mismatch())
        }
    }

    fn term(&mut self, general: Term, instance: Term) -> Result<(), AlphaError> {
        match (general, instance) {
            (Term::Ref(g), Term::Ref(i)) => self.reference(g, i),
            _ if general == instance => Ok(()),
            _ => Err(self.mismatch()),
        }
    }

    fn walk(&mut self, general: &Prop, instance: &Prop) -> Result<(), AlphaError> {
        match (general, instance) {
            (Prop::Ref(g), Prop::Ref(i)) => self.reference(*g, *i),
            (Prop::And(a, b), Prop::And(c, d))
            | (Prop::Or(a, b), Prop::Or(c, d))
            | (Prop::Imp(a, b), Prop::Imp(c, d)) => {
                self.walk(a, c)?;
                self.walk(b, d)
            }
            (Prop::ForAll(v, a), Prop::ForAll(w, b)) | (Prop::Exists(v, a), Prop::Exists(w, b))
                if v == w =>
            {
                self.binders.push(v.name());
                let res = self.walk(a, b);
                self.binders.pop();
                res
            }
            (Prop::Pred(f, xs), Prop::Pred(g, ys)) if f == g && xs.len() == ys.len() => {
                for (x, y) in xs.iter().zip(ys) {
                    self.term(*x, *y)?;
                }
                Ok(())
            }
            (Prop::Atom(_) | Prop::Bool(_) | Prop::Hole(_) | Prop::RefHole(_), _)
                if general == instance =>
            {
                Ok(())
            }
            _ => Err(self.mismatch()),
        }
    }
}
