use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::{SecondaryMap, SlotMap, new_key_type};

use crate::semant::{
    line::LineNo,
    proof::{Proof, ProofType},
};

new_key_type! { pub struct ProofId; }

/// Every scope announced to the context, plus the types of those compiled so far.
#[derive(Debug, Clone, Default)]
pub struct ProofRegistry {
    proofs: SlotMap<ProofId, Proof>,
    /// The scope each line number was announced in.
    owners: FxHashMap<LineNo, ProofId>,
    compiled: SecondaryMap<ProofId, ProofType>,
}

impl ProofRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, proof: Proof) -> ProofId {
        let lines = proof.lines().to_vec();
        let id = self.proofs.insert(proof);
        self.owners.extend(lines.into_iter().map(|n| (n, id)));
        id
    }

    pub fn get(&self, id: ProofId) -> Option<&Proof> {
        self.proofs.get(id)
    }

    /// The scope running exactly from `first` to `last`.
    pub fn find_span(&self, first: LineNo, last: LineNo) -> Option<ProofId> {
        let id = self.owner(first)?;
        let proof = self.proofs.get(id)?;
        (proof.first() == Some(first) && proof.last() == Some(last)).then_some(id)
    }

    pub fn owner(&self, line: LineNo) -> Option<ProofId> {
        self.owners.get(&line).copied()
    }

    /// Uncompiled scopes whose lines have all been checked, in insertion order.
    pub fn ready(&self, checked: &FxHashSet<LineNo>) -> Vec<ProofId> {
        self.proofs
            .iter()
            .filter(|(id, proof)| {
                !self.compiled.contains_key(*id)
                    && proof.lines().iter().all(|n| checked.contains(n))
            })
            .map(|(id, _)| id)
            .collect()
    }

    pub fn register_type(&mut self, id: ProofId, ty: ProofType) {
        self.compiled.insert(id, ty);
    }

    pub fn compiled(&self, id: ProofId) -> Option<&ProofType> {
        self.compiled.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = ProofId> + '_ {
        self.proofs.keys()
    }

    pub fn len(&self) -> usize {
        self.proofs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proofs.is_empty()
    }
}
