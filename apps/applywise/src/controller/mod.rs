//! Controller layer: command dispatch and user-facing error modeling.

pub mod commands;
pub mod events;
