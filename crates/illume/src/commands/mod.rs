//! CLI command implementations.

mod enhance;

pub(crate) use enhance::EnhanceArgs;
