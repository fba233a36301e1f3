mod money;
mod secret;

pub mod op;
pub mod serde_helpers;

pub use money::{Money, CENTS_PER_UNIT};
pub use secret::Secret;
