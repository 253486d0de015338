pub mod conversion;
pub mod definition;
pub mod kind;
pub mod mode;

pub use conversion::*;
pub use definition::*;
pub use kind::StepKind;
pub use mode::*;
