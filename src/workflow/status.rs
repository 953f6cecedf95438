use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseStatusError;

/// The four states of a task.
///
/// Tasks start in `Pending`. `Done` has no outgoing transitions; `Cancelled`
/// can be reopened back to `Pending`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "PENDENTE")]
    Pending,
    #[serde(rename = "EM_PROGRESSO")]
    InProgress,
    #[serde(rename = "CONCLUIDA")]
    Done,
    #[serde(rename = "CANCELADA")]
    Cancelled,
}

use TaskStatus::{Cancelled, Done, InProgress, Pending};

// Rule table: source state -> permitted targets.
static TRANSITIONS: [(TaskStatus, &[TaskStatus]); 4] = [
    (Pending, &[InProgress, Cancelled]),
    (InProgress, &[Done, Cancelled, Pending]),
    (Done, &[]),
    (Cancelled, &[Pending]),
];

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [Pending, InProgress, Done, Cancelled];

    /// Targets reachable from `self` in one transition.
    pub fn allowed_targets(self) -> &'static [TaskStatus] {
        TRANSITIONS[self.index()].1
    }

    pub fn can_transition_to(self, target: TaskStatus) -> bool {
        self.allowed_targets().contains(&target)
    }

    /// Stable code used for storage and parsing.
    pub fn code(self) -> &'static str {
        match self {
            Pending => "PENDENTE",
            InProgress => "EM_PROGRESSO",
            Done => "CONCLUIDA",
            Cancelled => "CANCELADA",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Pending => "Pendente",
            InProgress => "Em Progresso",
            Done => "Concluída",
            Cancelled => "Cancelada",
        }
    }

    /// Work is still expected on the task (neither done nor cancelled).
    pub fn is_open(self) -> bool {
        matches!(self, Pending | InProgress)
    }

    fn index(self) -> usize {
        match self {
            Pending => 0,
            InProgress => 1,
            Done => 2,
            Cancelled => 3,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for TaskStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.code().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_rows_are_indexed_by_source_state() {
        for status in TaskStatus::ALL {
            assert_eq!(TRANSITIONS[status.index()].0, status);
        }
    }

    #[test]
    fn allowed_targets_per_state() {
        assert_eq!(Pending.allowed_targets(), &[InProgress, Cancelled]);
        assert_eq!(InProgress.allowed_targets(), &[Done, Cancelled, Pending]);
        assert!(Done.allowed_targets().is_empty());
        assert_eq!(Cancelled.allowed_targets(), &[Pending]);
    }

    #[test]
    fn no_state_transitions_to_itself() {
        for status in TaskStatus::ALL {
            assert!(!status.can_transition_to(status), "{status} -> {status}");
        }
    }

    #[test]
    fn pending_cannot_skip_to_done() {
        assert!(!Pending.can_transition_to(Done));
    }

    #[test]
    fn display_uses_codes() {
        assert_eq!(Pending.to_string(), "PENDENTE");
        assert_eq!(InProgress.to_string(), "EM_PROGRESSO");
        assert_eq!(Done.to_string(), "CONCLUIDA");
        assert_eq!(Cancelled.to_string(), "CANCELADA");
        assert_eq!(InProgress.label(), "Em Progresso");
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("em_progresso".parse::<TaskStatus>().unwrap(), InProgress);
        assert_eq!(" CANCELADA ".parse::<TaskStatus>().unwrap(), Cancelled);
        let err = "DONE".parse::<TaskStatus>().unwrap_err();
        assert_eq!(err, ParseStatusError("DONE".into()));
    }

    #[test]
    fn serializes_as_code() {
        assert_eq!(serde_json::to_string(&Done).unwrap(), "\"CONCLUIDA\"");
        let parsed: TaskStatus = serde_json::from_str("\"EM_PROGRESSO\"").unwrap();
        assert_eq!(parsed, InProgress);
    }

    #[test]
    fn only_pending_and_in_progress_are_open() {
        assert!(Pending.is_open());
        assert!(InProgress.is_open());
        assert!(!Done.is_open());
        assert!(!Cancelled.is_open());
    }
}
