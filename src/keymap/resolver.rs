//! The two questions the table asks its host before taking an accelerator
//! away from a binding.

/// An accelerator that is already held by another binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reassignment {
    pub accelerator: String,
    /// Label of the binding that currently holds the accelerator.
    pub current_holder: String,
    /// Label of the binding asking for it.
    pub requested_by: String,
}

pub trait ConflictResolver {
    /// "This combination is currently assigned to X. Reassign it to Y?"
    fn confirm_reassign(&mut self, request: &Reassignment) -> bool;

    /// Picks which of `candidates` keeps `accelerator`. `None` leaves every
    /// holder as it is.
    fn choose_survivor(&mut self, accelerator: &str, candidates: &[&str]) -> Option<usize>;
}

/// Accepts every reassignment; the first candidate keeps a shared accelerator.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysReassign;

impl ConflictResolver for AlwaysReassign {
    fn confirm_reassign(&mut self, _request: &Reassignment) -> bool {
        true
    }

    fn choose_survivor(&mut self, _accelerator: &str, candidates: &[&str]) -> Option<usize> {
        (!candidates.is_empty()).then_some(0)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NeverReassign;

impl ConflictResolver for NeverReassign {
    fn confirm_reassign(&mut self, _request: &Reassignment) -> bool {
        false
    }

    fn choose_survivor(&mut self, _accelerator: &str, _candidates: &[&str]) -> Option<usize> {
        None
    }
}
