//! Wire types shared between the ApplyWise client library and its front-ends.

pub mod domain;
pub mod error;
pub mod protocol;
