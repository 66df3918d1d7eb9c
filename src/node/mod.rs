//! The node tree for a LaTeX document containing fractions and limits.
//!
//! A document is a flat [NodeList](tree::NodeList) of text runs and composite nodes, where each
//! composite owns two editable regions of its own. Trees are built by [parsing](parser) LaTeX
//! source, edited through the [navigation] state machine, and turned back into LaTeX with
//! [Serializable](crate::serialize::Serializable).

pub mod tree;
pub mod parser;
pub mod navigation;
mod serialize;
