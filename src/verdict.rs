//! The closed verdict alphabets, represented as tagged unions rather
//! than loose strings. `Display` is the only place a verdict becomes
//! the literal string the persisted CSV requires.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeadEndVerdict {
    Ok,
    /// Semicolon-joined offending metabolite IDs.
    BlockedBy(Vec<String>),
    OnlyForwards,
    OnlyBackwards,
}

impl fmt::Display for DeadEndVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeadEndVerdict::Ok => write!(f, "ok"),
            DeadEndVerdict::BlockedBy(ids) => write!(f, "{}", ids.join(";")),
            DeadEndVerdict::OnlyForwards => write!(f, "only when going forwards"),
            DeadEndVerdict::OnlyBackwards => write!(f, "only when going backwards"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DilutionVerdict {
    Ok,
    AlwaysBlocked,
    /// Metabolite IDs whose dilution experiment blocked this reaction.
    BlockedByDilution(Vec<String>),
    UnblockedByDilution,
}

impl fmt::Display for DilutionVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DilutionVerdict::Ok => write!(f, "ok"),
            DilutionVerdict::AlwaysBlocked => write!(f, "always blocked"),
            DilutionVerdict::BlockedByDilution(_) => write!(f, "blocked by dilution"),
            DilutionVerdict::UnblockedByDilution => write!(f, "unblocked by dilution"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiphosphateVerdict {
    Ok,
    ShouldBeIrreversible,
    ShouldBeFlippedAndIrreversible,
}

impl fmt::Display for DiphosphateVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiphosphateVerdict::Ok => write!(f, "ok"),
            DiphosphateVerdict::ShouldBeIrreversible => write!(f, "should be irreversible"),
            DiphosphateVerdict::ShouldBeFlippedAndIrreversible => {
                write!(f, "should be flipped and made irreversible")
            }
        }
    }
}

/// One of the duplicate test's four sub-columns: `ok`, or the
/// semicolon-joined IDs of the other members of the equivalence class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DuplicateVerdict {
    Ok,
    DuplicateOf(Vec<String>),
}

impl fmt::Display for DuplicateVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicateVerdict::Ok => write!(f, "ok"),
            DuplicateVerdict::DuplicateOf(ids) => write!(f, "{}", ids.join(";")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopVerdict {
    Ok,
    InLoop,
}

impl fmt::Display for LoopVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopVerdict::Ok => write!(f, "ok"),
            LoopVerdict::InLoop => write!(f, "in loop"),
        }
    }
}
