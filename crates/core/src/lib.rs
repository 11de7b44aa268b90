//! Attachable input behaviors for terminal form fields: arrow-key history
//! cycling and Ctrl+Enter submission.

pub mod accessor;
pub mod behavior;
pub mod ctrl_enter;
pub mod error;
pub mod field;
pub mod form;
pub mod history;
pub mod input;

pub use accessor::{Binding, ValueAccessor};
pub use behavior::{Behavior, KeyDispatch};
pub use ctrl_enter::CtrlEnterSubmitter;
pub use error::{Error, Result};
pub use field::{Field, FieldId, Form};
pub use form::{
    BeforeSubmit, ControlRef, FormControl, FormGroup, FormHost, FormState, SubmitEvent,
    SubmitHandler, SubmitStep,
};
pub use history::{Direction, HistoryCycler, HistoryOptions, HistoryView};
pub use input::{TextCursor, TextInput, UpdateOn};
