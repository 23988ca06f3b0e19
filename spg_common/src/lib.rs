mod money;

pub mod op;
mod secret;

pub use money::{Cents, CentsConversionError, DEFAULT_CURRENCY};
pub use secret::Secret;
