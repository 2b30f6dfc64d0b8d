//! Route tree construction and matching.

mod builder;
pub(crate) mod matcher;
pub(crate) mod node;

pub use builder::{AppBuilder, NodeBuilder};
