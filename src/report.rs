use std::fmt;

use im::OrdSet;
use itertools::Itertools;

use crate::{
    context::{CheckStatus, Ctx},
    diagnostics::CheckFailure,
    logic::prop::Prop,
    util::{
        ansi::{ANSI_BOLD, ANSI_GREEN, ANSI_RED, ANSI_RESET},
        plural,
    },
};

/// What a finished run established, detached from the context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckSummary {
    pub lines: usize,
    pub scopes: usize,
    pub compiled: usize,
    pub constants: usize,
    /// Assumptions of the main proof that are not axioms.
    pub assumptions: OrdSet<Prop>,
    pub failure: Option<CheckFailure>,
}

impl CheckSummary {
    pub fn new(ctx: &Ctx) -> Self {
        let compiled = ctx
            .proofs()
            .filter(|&id| ctx.proof_type(id).is_some())
            .count();

        Self {
            lines: ctx.lines().count(),
            scopes: ctx.proofs().count(),
            compiled,
            constants: ctx.constants().len(),
            assumptions: ctx.main_assumptions().unwrap_or_default(),
            failure: match ctx.status() {
                CheckStatus::Failed(failure) => Some(failure.clone()),
                _ => None,
            },
        }
    }

    pub fn verified(&self) -> bool {
        self.failure.is_none() && self.compiled == self.scopes && self.scopes > 0
    }

    /// Renders the summary for a terminal.
    pub fn display(&self, styled: bool) -> String {
        let (red, green, bold, reset) = if styled {
            (ANSI_RED, ANSI_GREEN, ANSI_BOLD, ANSI_RESET)
        } else {
            ("", "", "", "")
        };

        let mut out = format!(
            "Checked {} line{} in {} scope{}:\n",
            self.lines,
            plural(self.lines),
            self.scopes,
            plural(self.scopes)
        );

        match &self.failure {
            None => out.push_str(&format!(
                " {green}✓{reset} {bold}{}{reset} scope{} compiled.\n",
                self.compiled,
                plural(self.compiled)
            )),
            Some(CheckFailure::Empty) => out.push_str(&format!(" {red}✗{reset} nothing to check.\n")),
            Some(CheckFailure::Line(failure)) => {
                out.push_str(&format!(" {red}✗{reset} {}\n", failure));
                out.push_str(&failure.render(styled));
                out.push('\n');
            }
        }

        if !self.assumptions.is_empty() {
            out.push_str(&format!(
                " {bold}{}{reset} open assumption{}: {}\n",
                self.assumptions.len(),
                plural(self.assumptions.len()),
                self.assumptions.iter().join(", ")
            ));
        }

        out
    }
}

impl fmt::Display for CheckSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display(false))
    }
}
