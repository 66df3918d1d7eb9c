//! Paths into a node tree, and the caret which rides on top of them.

use crate::node::tree::{NodeId, Slot};

/// One movement down a node tree: into the item at `index` of the current list, and then into that
/// item's `slot` region.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct PathStep {
    pub index: usize,
    pub slot: Slot,
}

/// Describes the movements which must be taken down a node tree to reach a particular node.
///
/// The final entry is always an index into a list - every step before it also names the region of
/// that item to descend into.
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct NodePath {
    steps: Vec<PathStep>,
    index: usize,
}

impl NodePath {
    pub fn new(steps: Vec<PathStep>, index: usize) -> Self { Self { steps, index } }

    /// A path to the item at `index` of the document's root list.
    pub fn root(index: usize) -> Self { Self::new(vec![], index) }

    /// The steps taken through composite nodes before the final index.
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// The index into the list which the path terminates in.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns a path which descends one level further, into `slot` of the item this path points
    /// at, and then to `index` within that region.
    pub fn child(&self, slot: Slot, index: usize) -> NodePath {
        let mut steps = self.steps.clone();
        steps.push(PathStep { index: self.index, slot });
        NodePath { steps, index }
    }
}

/// An editable region of a document: either the root list, or one named slot of a composite node.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum Region {
    Root,
    Slot(NodeId, Slot),
}

/// Where the caret currently sits.
///
/// `index` is an index into the region's items. If the item at `index` is a text run, `offset` is
/// a character offset into it; if it is a continuation, the caret is inside that continuation;
/// otherwise the caret sits just before the item (or at the end of the region, if `index` equals
/// the number of items).
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct Caret {
    pub region: Region,
    pub index: usize,
    pub offset: usize,

    /// Whether the entire content of the region is selected, ready to be overwritten by the next
    /// typed character. This is the only kind of selection the editor produces itself.
    pub selected: bool,
}

impl Caret {
    pub fn new(region: Region, index: usize, offset: usize) -> Self {
        Self { region, index, offset, selected: false }
    }

    /// A caret at the very start of the document.
    pub fn start() -> Self {
        Self::new(Region::Root, 0, 0)
    }

    /// Returns a copy of this caret with the region's content selected.
    pub fn selecting(mut self) -> Self {
        self.selected = true;
        self
    }
}

impl Default for Caret {
    fn default() -> Self {
        Self::start()
    }
}
