use thiserror::Error;

// Programmer errors: breaking the ordered-set or editing-transaction rules.
// The offending operation is rejected and the state is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    #[error("section is already in an editing transaction")]
    AlreadyEditing,
    #[error("section is not in an editing transaction")]
    NotEditing,
    #[error("section must be sorted before editing can end")]
    SortPending,
    #[error("duplicate element at position {position}")]
    DuplicateElement {
        position: usize,
    },
    #[error("position {position} is out of bounds for length {len}")]
    PositionOutOfBounds {
        position: usize,
        len: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    #[error("protocol violation in section {section}: {source}")]
    Section {
        section: usize,
        #[source]
        source: ProtocolViolation,
    },
    #[error(transparent)]
    Violation(#[from] ProtocolViolation),
}

impl ControllerError {
    pub fn violation(&self) -> &ProtocolViolation {
        match self {
            Self::Section { source, .. } => source,
            Self::Violation(source) => source,
        }
    }
}
