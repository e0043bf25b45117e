use crate::{
    context::registry::ProofId,
    diagnostics::CheckFailure,
    logic::prop::Prop,
    semant::{line::LineNo, proof::ProofType},
};

/// Progress notifications from a check run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckEvent {
    Started { lines: usize, proofs: usize },
    LineVerified { number: LineNo, prop: Prop },
    ScopeCompiled { proof: ProofId, ty: ProofType },
    LineFailed(CheckFailure),
    Finished { verified: bool },
}

pub trait EventSink {
    fn event(&mut self, event: &CheckEvent);
}

impl<F: FnMut(&CheckEvent)> EventSink for F {
    fn event(&mut self, event: &CheckEvent) {
        self(event)
    }
}

impl EventSink for Vec<CheckEvent> {
    fn event(&mut self, event: &CheckEvent) {
        self.push(event.clone());
    }
}

impl EventSink for () {
    fn event(&mut self, _: &CheckEvent) {}
}
