use super::errors::{
    ControllerError,
    ProtocolViolation,
};

pub type SectionResult<T> = Result<T, ProtocolViolation>;
pub type ControllerResult<T> = Result<T, ControllerError>;
