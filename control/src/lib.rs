//! Flight software control laws. Controllers compute commands only, they never
//! integrate spacecraft state.

pub mod bdot;
pub mod pd;

pub use bdot::{BDotController, BDotErrors, BDotOutput, BDotState, average_field};
pub use pd::{PdController, PdErrors, RateDamping};
