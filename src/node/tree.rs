//! The definition of the node tree itself, and the identity index used to find composite nodes
//! again from a region reference.

use std::collections::HashMap;

use crate::{config::LimitDefaults, nav::{NodePath, PathStep, Region}};

use super::parser::Parser;

/// Characters which exist purely to give the caret somewhere to sit. They are never part of the
/// content of a region.
pub const PLACEHOLDERS: [char; 2] = ['\u{00A0}', '\u{200B}'];

/// Identifies a composite or continuation node within one live [Document].
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Hands out fresh [NodeId]s, in increasing order.
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn allocate(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }
}

/// One of the two named child regions of a composite node.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum Slot {
    /// The top of a fraction.
    Numerator,

    /// The bottom of a fraction.
    Denominator,

    /// The approach condition of a limit, written under "lim".
    Subscript,

    /// The expression whose limit is taken.
    Expression,
}

impl Slot {
    /// The slot which forward navigation moves to from this one, if it stays within the same
    /// composite node.
    pub fn sibling(self) -> Option<Slot> {
        match self {
            Slot::Numerator => Some(Slot::Denominator),
            Slot::Subscript => Some(Slot::Expression),
            Slot::Denominator | Slot::Expression => None,
        }
    }
}

/// A node in the tree. Text runs are opaque to navigation; fractions and limits each own exactly
/// two child regions.
#[derive(PartialEq, Eq, Debug, Clone)]
pub enum Node {
    /// A run of literal characters.
    Text(String),

    /// A fraction, with a numerator and denominator region.
    Fraction { id: NodeId, numerator: NodeList, denominator: NodeList },

    /// A limit, with the approach condition in `subscript` and the limited expression in
    /// `expression`.
    Limit { id: NodeId, subscript: NodeList, expression: NodeList },

    /// A landing spot for the caret after it leaves a composite node. Until something is typed
    /// into it, its content is only a placeholder character. The first typed character turns it
    /// into a plain [Node::Text].
    Continuation { id: NodeId, content: String },
}

impl Node {
    /// Creates an empty fraction.
    pub fn fraction(id: NodeId) -> Self {
        Node::Fraction { id, numerator: NodeList::new(), denominator: NodeList::new() }
    }

    /// Creates a continuation holding only the given placeholder.
    pub fn continuation(id: NodeId, placeholder: char) -> Self {
        Node::Continuation { id, content: placeholder.to_string() }
    }

    /// The identity of this node, or `None` for text runs.
    pub fn id(&self) -> Option<NodeId> {
        match self {
            Node::Fraction { id, .. } | Node::Limit { id, .. } | Node::Continuation { id, .. }
                => Some(*id),
            Node::Text(_) => None,
        }
    }

    /// Compares two nodes by content alone, ignoring identities.
    pub fn same_structure(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Text(a), Node::Text(b)) => a == b,
            (Node::Continuation { content: a, .. }, Node::Continuation { content: b, .. }) => a == b,
            (
                Node::Fraction { numerator: an, denominator: ad, .. },
                Node::Fraction { numerator: bn, denominator: bd, .. },
            ) => an.same_structure(bn) && ad.same_structure(bd),
            (
                Node::Limit { subscript: a_sub, expression: a_expr, .. },
                Node::Limit { subscript: b_sub, expression: b_expr, .. },
            ) => a_sub.same_structure(b_sub) && a_expr.same_structure(b_expr),
            _ => false,
        }
    }

    /// Returns true if this node owns child regions.
    pub fn is_composite(&self) -> bool {
        matches!(self, Node::Fraction { .. } | Node::Limit { .. })
    }

    /// The child regions of this node, in navigation order.
    pub fn slots(&self) -> &'static [Slot] {
        match self {
            Node::Fraction { .. } => &[Slot::Numerator, Slot::Denominator],
            Node::Limit { .. } => &[Slot::Subscript, Slot::Expression],
            Node::Text(_) | Node::Continuation { .. } => &[],
        }
    }

    /// The child region named by `slot`, if this node has one.
    pub fn region(&self, slot: Slot) -> Option<&NodeList> {
        match (self, slot) {
            (Node::Fraction { numerator, .. }, Slot::Numerator) => Some(numerator),
            (Node::Fraction { denominator, .. }, Slot::Denominator) => Some(denominator),
            (Node::Limit { subscript, .. }, Slot::Subscript) => Some(subscript),
            (Node::Limit { expression, .. }, Slot::Expression) => Some(expression),
            _ => None,
        }
    }

    /// The child region named by `slot`, if this node has one.
    pub fn region_mut(&mut self, slot: Slot) -> Option<&mut NodeList> {
        match (self, slot) {
            (Node::Fraction { numerator, .. }, Slot::Numerator) => Some(numerator),
            (Node::Fraction { denominator, .. }, Slot::Denominator) => Some(denominator),
            (Node::Limit { subscript, .. }, Slot::Subscript) => Some(subscript),
            (Node::Limit { expression, .. }, Slot::Expression) => Some(expression),
            _ => None,
        }
    }
}

/// An ordered sequence of nodes. Every editable region is one of these.
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct NodeList {
    pub items: Vec<Node>
}

impl NodeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Compares two lists by content alone, ignoring identities.
    pub fn same_structure(&self, other: &NodeList) -> bool {
        self.items.len() == other.items.len()
            && self.items.iter().zip(&other.items).all(|(a, b)| a.same_structure(b))
    }
}

/// The root of a node tree, plus the bookkeeping needed to address its regions by identity.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub root: NodeList,
    ids: IdAllocator,
    owners: HashMap<NodeId, NodePath>,
}

/// Documents are equal when their trees have the same content. Identities only mean something
/// within one document, so they are not compared.
impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.root.same_structure(&other.root)
    }
}

impl Eq for Document {}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a document from parsed LaTeX. Identities are allocated in document order, starting
    /// from zero.
    pub fn parse(latex: &str) -> Self {
        Self::parse_with(latex, IdAllocator::default())
    }

    /// Builds a document from parsed LaTeX, drawing identities from `ids`.
    pub fn parse_with(latex: &str, mut ids: IdAllocator) -> Self {
        let root = Parser::new(latex, &mut ids).parse();
        let mut document = Document { root, ids, owners: HashMap::new() };
        document.reindex();
        document
    }

    /// Replaces the whole tree with parsed LaTeX. Identities keep counting up from where this
    /// document left off, so none from the old tree resolve in the new one.
    pub fn reparse(&mut self, latex: &str) {
        let ids = std::mem::take(&mut self.ids);
        *self = Self::parse_with(latex, ids);
    }

    pub fn allocate_id(&mut self) -> NodeId {
        self.ids.allocate()
    }

    /// Creates a new, empty fraction with a fresh identity. The node is not inserted anywhere.
    pub fn create_fraction(&mut self) -> Node {
        Node::fraction(self.allocate_id())
    }

    /// Creates a new limit with a fresh identity, with both regions pre-filled from `defaults`.
    /// The node is not inserted anywhere.
    pub fn create_limit(&mut self, defaults: &LimitDefaults) -> Node {
        let id = self.allocate_id();
        let subscript = Parser::new(defaults.subscript.trim(), &mut self.ids).parse();
        let expression = Parser::new(defaults.expression.trim(), &mut self.ids).parse();
        Node::Limit { id, subscript, expression }
    }

    /// Rebuilds the identity index from the current tree. Must be called after any structural
    /// change to the tree.
    pub fn reindex(&mut self) {
        fn walk(list: &NodeList, steps: &[PathStep], owners: &mut HashMap<NodeId, NodePath>) {
            for (index, node) in list.items.iter().enumerate() {
                if let Some(id) = node.id() {
                    owners.insert(id, NodePath::new(steps.to_vec(), index));
                }

                for &slot in node.slots() {
                    if let Some(child) = node.region(slot) {
                        let mut child_steps = steps.to_vec();
                        child_steps.push(PathStep { index, slot });
                        walk(child, &child_steps, owners);
                    }
                }
            }
        }

        self.owners.clear();
        walk(&self.root, &[], &mut self.owners);
    }

    /// The path to the node with the given identity, or `None` if no such node is in the tree.
    pub fn path_of(&self, id: NodeId) -> Option<&NodePath> {
        self.owners.get(&id)
    }

    /// The list reached by following `steps` down from the root.
    pub fn list_at(&self, steps: &[PathStep]) -> Option<&NodeList> {
        let mut list = &self.root;
        for step in steps {
            list = list.items.get(step.index)?.region(step.slot)?;
        }
        Some(list)
    }

    /// The list reached by following `steps` down from the root.
    pub fn list_at_mut(&mut self, steps: &[PathStep]) -> Option<&mut NodeList> {
        let mut list = &mut self.root;
        for step in steps {
            list = list.items.get_mut(step.index)?.region_mut(step.slot)?;
        }
        Some(list)
    }

    /// The node which `path` points at.
    pub fn node_at(&self, path: &NodePath) -> Option<&Node> {
        self.list_at(path.steps())?.items.get(path.index())
    }

    /// Finds the composite node owning a region, by the composite's identity. Returns `None` if
    /// the identity is stale, or belongs to something which owns no regions.
    pub fn resolve_owner(&self, id: NodeId) -> Option<&Node> {
        let node = self.node_at(self.path_of(id)?)?;
        if node.is_composite() { Some(node) } else { None }
    }

    /// The node list backing a region, or `None` if the region's owner no longer exists.
    pub fn region(&self, region: &Region) -> Option<&NodeList> {
        match *region {
            Region::Root => Some(&self.root),
            Region::Slot(id, slot) => self.resolve_owner(id)?.region(slot),
        }
    }

    /// The node list backing a region, or `None` if the region's owner no longer exists.
    pub fn region_mut(&mut self, region: &Region) -> Option<&mut NodeList> {
        match *region {
            Region::Root => Some(&mut self.root),
            Region::Slot(id, slot) => {
                let path = self.path_of(id)?.clone();
                self.list_at_mut(path.steps())?
                    .items
                    .get_mut(path.index())?
                    .region_mut(slot)
            }
        }
    }

    /// The region containing the list which `path` indexes into.
    pub fn region_containing(&self, path: &NodePath) -> Option<Region> {
        let Some((last, outer)) = path.steps().split_last() else {
            return Some(Region::Root);
        };

        let owner = self.list_at(outer)?.items.get(last.index)?;
        Some(Region::Slot(owner.id()?, last.slot))
    }
}
