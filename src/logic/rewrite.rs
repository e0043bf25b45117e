use rustc_hash::FxHashMap;
use tracing::trace;
use ustr::Ustr;

use crate::{
    diagnostics::{CheckError, CheckResult},
    logic::{
        prop::{Prop, Term},
        unify::{Substitution, unify},
    },
    strings,
};

/// A bidirectional equivalence between two patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteRule {
    name: Ustr,
    label: Ustr,
    left: Prop,
    right: Prop,
}

impl RewriteRule {
    pub fn new(name: Ustr, label: &str, left: Prop, right: Prop) -> Self {
        Self {
            name,
            label: Ustr::from(label),
            left,
            right,
        }
    }

    /// The citation name a proof uses for this rule.
    pub fn name(&self) -> Ustr {
        self.name
    }

    /// Unique among all catalog entries.
    pub fn label(&self) -> Ustr {
        self.label
    }

    pub fn left(&self) -> &Prop {
        &self.left
    }

    pub fn right(&self) -> &Prop {
        &self.right
    }
}

/// Finds the smallest pair of corresponding subtrees where `old` and `new`
/// differ.
///
/// Must not be called on equal trees.
pub fn diff_tree<'p>(old: &'p Prop, new: &'p Prop) -> CheckResult<(&'p Prop, &'p Prop)> {
    let mut path = diff_path(old, new)?;
    Ok(path.pop().unwrap_or((old, new)))
}

/// The corresponding subtree pairs from the roots down to the divergence
/// point, outermost first.
fn diff_path<'p>(
    mut old: &'p Prop,
    mut new: &'p Prop,
) -> CheckResult<Vec<(&'p Prop, &'p Prop)>> {
    let inconsistent = |old: &Prop, new: &Prop| CheckError::InconsistentContext {
        old: old.clone(),
        new: new.clone(),
    };

    let mut path = Vec::new();
    loop {
        path.push((old, new));
        let next = match (old, new) {
            (Prop::And(a, b), Prop::And(c, d))
            | (Prop::Or(a, b), Prop::Or(c, d))
            | (Prop::Imp(a, b), Prop::Imp(c, d)) => {
                if a != c && b != d {
                    None
                } else if a == c && b != d {
                    Some((b, d))
                } else if b == d && a != c {
                    Some((a, c))
                } else {
                    return Err(inconsistent(old, new));
                }
            }
            (Prop::ForAll(v, a), Prop::ForAll(w, b)) | (Prop::Exists(v, a), Prop::Exists(w, b))
                if v == w =>
            {
                if a == b {
                    return Err(inconsistent(old, new));
                }
                Some((a, b))
            }
            _ if old == new => return Err(inconsistent(old, new)),
            _ => None,
        };

        match next {
            Some((o, n)) => (old, new) = (&**o, &**n),
            None => return Ok(path),
        }
    }
}

/// Checks that `new` follows from `old` by one application of `rule`, in
/// either direction, somewhere inside the formula.
///
/// The divergence point is tried first, then each enclosing pair in turn.
pub fn try_rewrite(old: &Prop, new: &Prop, rule: &RewriteRule) -> CheckResult<Substitution> {
    if old == new {
        return Ok(Substitution::default());
    }

    for (old_part, new_part) in diff_path(old, new)?.into_iter().rev() {
        trace!(rule = %rule.label, %old_part, %new_part, "trying rewrite");

        for (from, to) in [(&rule.left, &rule.right), (&rule.right, &rule.left)] {
            let mut subst = Substitution::default();
            if unify(old_part, from, &mut subst)? && unify(new_part, to, &mut subst)? {
                return Ok(subst);
            }
        }
    }

    Err(CheckError::RuleNotApplicable {
        rule: rule.label,
        left: rule.left.clone(),
        right: rule.right.clone(),
        old: old.clone(),
        new: new.clone(),
    })
}

/// The rewrite rules available to a proof, grouped by citation name.
#[derive(Debug, Clone)]
pub struct RuleCatalog {
    by_name: FxHashMap<Ustr, Vec<RewriteRule>>,
}

impl RuleCatalog {
    pub fn builtin() -> Self {
        let mut catalog = Self {
            by_name: FxHashMap::default(),
        };
        for rule in builtin_rules() {
            catalog.by_name.entry(rule.name).or_default().push(rule);
        }
        catalog
    }

    pub fn lookup(&self, name: Ustr) -> Option<&[RewriteRule]> {
        self.by_name.get(&name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: Ustr) -> bool {
        self.by_name.contains_key(&name)
    }

    /// Makes `alias` cite the same rules as `target`. Returns false if
    /// `target` is unknown.
    pub fn add_alias(&mut self, alias: Ustr, target: Ustr) -> bool {
        let Some(rules) = self.by_name.get(&target).cloned() else {
            return false;
        };
        self.by_name.insert(alias, rules);
        true
    }

    pub fn remove(&mut self, name: Ustr) {
        self.by_name.remove(&name);
    }

    pub fn rules(&self) -> impl Iterator<Item = &RewriteRule> {
        self.by_name.values().flatten()
    }
}

impl Default for RuleCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

pub fn builtin_rules() -> Vec<RewriteRule> {
    let a = || Prop::Hole(*strings::HOLE_A);
    let b = || Prop::Hole(*strings::HOLE_B);
    let c = || Prop::Hole(*strings::HOLE_C);
    let x = || Term::Hole(*strings::HOLE_X);
    let not = Prop::not;

    vec![
        RewriteRule::new(*strings::COMM, "or_comm", Prop::or(a(), b()), Prop::or(b(), a())),
        RewriteRule::new(*strings::COMM, "and_comm", Prop::and(a(), b()), Prop::and(b(), a())),
        RewriteRule::new(
            *strings::ASSOC,
            "or_assoc",
            Prop::or(Prop::or(a(), b()), c()),
            Prop::or(a(), Prop::or(b(), c())),
        ),
        RewriteRule::new(
            *strings::ASSOC,
            "and_assoc",
            Prop::and(Prop::and(a(), b()), c()),
            Prop::and(a(), Prop::and(b(), c())),
        ),
        RewriteRule::new(*strings::DOUBLE_NEG, "double_neg", a(), not(not(a()))),
        RewriteRule::new(
            *strings::IMPL,
            "impl_or",
            Prop::imp(a(), b()),
            Prop::or(not(a()), b()),
        ),
        RewriteRule::new(
            *strings::DE_MORGAN,
            "dm_and",
            not(Prop::and(a(), b())),
            Prop::or(not(a()), not(b())),
        ),
        RewriteRule::new(
            *strings::DE_MORGAN,
            "dm_or",
            not(Prop::or(a(), b())),
            Prop::and(not(a()), not(b())),
        ),
        RewriteRule::new(
            *strings::DE_MORGAN,
            "dm_forall",
            not(Prop::forall(x(), a())),
            Prop::exists(x(), not(a())),
        ),
        RewriteRule::new(
            *strings::DE_MORGAN,
            "dm_exists",
            not(Prop::exists(x(), a())),
            Prop::forall(x(), not(a())),
        ),
        RewriteRule::new(
            *strings::DIST,
            "and_dist",
            Prop::and(a(), Prop::or(b(), c())),
            Prop::or(Prop::and(a(), b()), Prop::and(a(), c())),
        ),
        RewriteRule::new(
            *strings::DIST,
            "or_dist",
            Prop::or(a(), Prop::and(b(), c())),
            Prop::and(Prop::or(a(), b()), Prop::or(a(), c())),
        ),
        RewriteRule::new(*strings::IDEM, "or_idem", Prop::or(a(), a()), a()),
        RewriteRule::new(*strings::IDEM, "and_idem", Prop::and(a(), a()), a()),
        RewriteRule::new(
            *strings::EXPORTATION,
            "exportation",
            Prop::imp(Prop::and(a(), b()), c()),
            Prop::imp(a(), Prop::imp(b(), c())),
        ),
        RewriteRule::new(
            *strings::CONTRAPOSITIVE,
            "contrapositive",
            Prop::imp(a(), b()),
            Prop::imp(not(b()), not(a())),
        ),
    ]
}
