use std::fmt;

use crate::{logic::prop::Prop, semant::justification::Justification};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineNo(pub u32);

impl fmt::Display for LineNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    number: LineNo,
    prop: Prop,
    justification: Justification,
}

impl Line {
    pub fn new(number: u32, prop: Prop, justification: Justification) -> Self {
        Self {
            number: LineNo(number),
            prop,
            justification,
        }
    }

    pub fn number(&self) -> LineNo {
        self.number
    }

    pub fn prop(&self) -> &Prop {
        &self.prop
    }

    pub fn justification(&self) -> &Justification {
        &self.justification
    }

    pub fn is_premise(&self) -> bool {
        matches!(self.justification, Justification::Premise)
    }

    pub fn is_hypothesis(&self) -> bool {
        matches!(self.justification, Justification::Hypothesis)
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}  {}", self.number, self.prop, self.justification)
    }
}
