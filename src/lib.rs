pub mod error;
pub mod config;
pub mod node;
pub mod nav;
pub mod serialize;
pub mod sync;
pub mod panel;

#[cfg(test)]
pub mod tests;

pub use crate::{
    config::EditorConfig,
    nav::{Caret, Region},
    node::{
        navigation::{FocusState, Intent, Key},
        tree::{Document, Node, NodeId, NodeList, Slot},
    },
    serialize::{Deserializable, Serializable},
    sync::{EditSync, Host},
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
