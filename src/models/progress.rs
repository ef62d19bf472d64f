//! Progress counters of a running study session.
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub total: usize,
    pub completed: usize,
    pub remaining: usize,
}

impl Progress {
    pub fn message(&self) -> String {
        format!("{} of {} cards learned", self.completed, self.total)
    }
}
