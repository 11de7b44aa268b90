use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("history cycling can only be attached to a field bound to a named control or a control")]
    MissingValueAccessor,
    #[error("cannot find control with name: {0}")]
    UnknownControl(String),
    #[error("must supply a value for control: {0}")]
    MissingControlValue(String),
    #[error("no field at index {0}")]
    UnknownField(usize),
}
