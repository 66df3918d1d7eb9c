//! The focus navigation state machine: which region holds the caret, and how each [Intent] moves
//! it or reshapes the tree around it.

use crate::{config::EditorConfig, nav::{Caret, NodePath, Region}};

use super::tree::{Document, Node, NodeId, NodeList, Slot};

/// What kind of region the caret is currently in.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum FocusState {
    /// Ordinary top-level text.
    Root,
    InNumerator,
    InDenominator,
    InSubscript,
    InExpression,
    InContinuation,
}

impl From<Slot> for FocusState {
    fn from(slot: Slot) -> Self {
        match slot {
            Slot::Numerator => FocusState::InNumerator,
            Slot::Denominator => FocusState::InDenominator,
            Slot::Subscript => FocusState::InSubscript,
            Slot::Expression => FocusState::InExpression,
        }
    }
}

/// An editing request, independent of whichever key or gesture produced it.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Intent {
    /// Forward navigation (Tab).
    Next,

    /// The trigger character was typed: inserts a limit if the text before the caret ends with
    /// `lim`, or a fraction otherwise.
    Trigger,

    InsertFraction,
    InsertLimit,
    TypeChar(char),

    /// Deletes the character or construct before the caret. At the start of a construct's region,
    /// deletes that whole construct.
    Backspace,

    /// Moves the caret somewhere else, as when a region is clicked into. Out-of-range positions
    /// are pulled back inside the region.
    Focus(Caret),

    /// Places the caret just after the given construct, as when it is clicked.
    ExitAfter(NodeId),
}

/// A key press, as reported by whatever is hosting the editor.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Key {
    Tab,
    Backspace,
    Char(char),
    Other,
}

impl Intent {
    /// Maps a key press to the intent it expresses, if any.
    pub fn from_key(key: Key, trigger: char) -> Option<Intent> {
        match key {
            Key::Tab => Some(Intent::Next),
            Key::Backspace => Some(Intent::Backspace),
            Key::Char(c) if c == trigger => Some(Intent::Trigger),
            Key::Char(c) => Some(Intent::TypeChar(c)),
            Key::Other => None,
        }
    }
}

/// What the caret is touching within its region.
enum Under {
    Text,
    Continuation,
    Other,
}

/// Where the caret ends up when leaving a construct.
enum Landing {
    Existing,
    TextEnd(usize),
    Create,
}

fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices().nth(chars).map(|(i, _)| i).unwrap_or(text.len())
}

/// A caret just before the item at `index`, preferring the end of a text run right before it.
fn settle(list: &NodeList, region: Region, index: usize) -> Caret {
    match index.checked_sub(1).and_then(|i| list.items.get(i)) {
        Some(Node::Text(text)) => Caret::new(region, index - 1, text.chars().count()),
        _ => Caret::new(region, index, 0),
    }
}

/// Removes the item at `index`, joining up the text runs either side of it. Returns where the
/// caret should go.
fn remove_item(list: &mut NodeList, region: Region, index: usize) -> Caret {
    list.items.remove(index);
    let caret = settle(list, region, index);

    let joinable = index > 0 && matches!(
        (list.items.get(index - 1), list.items.get(index)),
        (Some(Node::Text(_)), Some(Node::Text(_)))
    );
    if joinable {
        if let Node::Text(right) = list.items.remove(index) {
            if let Some(Node::Text(left)) = list.items.get_mut(index - 1) {
                left.push_str(&right);
            }
        }
    }
    caret
}

fn under(list: &NodeList, index: usize) -> Under {
    match list.items.get(index) {
        Some(Node::Text(_)) => Under::Text,
        Some(Node::Continuation { .. }) => Under::Continuation,
        _ => Under::Other,
    }
}

/// A caret at the very end of `list`.
fn end_of(list: &NodeList, region: Region) -> Caret {
    match list.items.last() {
        Some(Node::Text(text)) => Caret::new(region, list.items.len() - 1, text.chars().count()),
        _ => Caret::new(region, list.items.len(), 0),
    }
}

/// Empties a region whose whole content is selected, ready for new input.
fn take_selection(list: &mut NodeList, caret: &mut Caret) {
    if caret.selected {
        list.items.clear();
        caret.index = 0;
        caret.offset = 0;
        caret.selected = false;
    }
}

impl Document {
    /// Derives the focus state for a caret. A caret whose region no longer exists is treated as
    /// being in ordinary text.
    pub fn focus_state(&self, caret: &Caret) -> FocusState {
        let Some(list) = self.region(&caret.region) else {
            return FocusState::Root;
        };

        if let Under::Continuation = under(list, caret.index) {
            return FocusState::InContinuation;
        }

        match caret.region {
            Region::Root => FocusState::Root,
            Region::Slot(_, slot) => slot.into(),
        }
    }

    /// A caret at the end of the document.
    pub fn end_caret(&self) -> Caret {
        end_of(&self.root, Region::Root)
    }

    /// Applies an intent at the caret, updating both the tree and the caret. Returns the focus
    /// state afterwards.
    ///
    /// If the caret's region has gone away, the intent is dropped and the caret is moved to the
    /// end of the document.
    pub fn apply(&mut self, caret: &mut Caret, intent: Intent, config: &EditorConfig) -> FocusState {
        if let Intent::Focus(target) = intent {
            *caret = target;
        }
        if !self.clamp(caret) {
            *caret = self.end_caret();
            return FocusState::Root;
        }

        match intent {
            Intent::Next => { self.move_next(caret, config.placeholder); }
            Intent::Trigger => {
                if !caret.selected && self.consume_lim(caret) {
                    self.insert_limit(caret, config);
                } else {
                    self.insert_fraction(caret);
                }
            }
            Intent::InsertFraction => { self.insert_fraction(caret); }
            Intent::InsertLimit => { self.insert_limit(caret, config); }
            Intent::TypeChar(c) => { self.type_char(caret, c); }
            Intent::Backspace => { self.backspace(caret); }
            Intent::Focus(_) => {}
            Intent::ExitAfter(id) => { self.exit_after(id, caret, config.placeholder); }
        }

        self.focus_state(caret)
    }

    /// Pulls an out-of-range caret back inside its region. Returns false if the region is gone.
    fn clamp(&self, caret: &mut Caret) -> bool {
        let Some(list) = self.region(&caret.region) else {
            return false;
        };

        if caret.index > list.items.len() {
            *caret = end_of(list, caret.region);
        }
        caret.offset = match list.items.get(caret.index) {
            Some(Node::Text(text)) => caret.offset.min(text.chars().count()),
            _ => 0,
        };
        true
    }

    /// Forward navigation. Returns false when there is nowhere to go.
    pub fn move_next(&mut self, caret: &mut Caret, placeholder: char) -> bool {
        let Region::Slot(owner, slot) = caret.region else {
            return false;
        };
        if self.focus_state(caret) == FocusState::InContinuation {
            return false;
        }

        match slot.sibling() {
            Some(sibling) => {
                let region = Region::Slot(owner, sibling);
                let Some(list) = self.region(&region) else {
                    return false;
                };
                *caret = end_of(list, region);
                true
            }
            None => self.land_after(owner, caret, placeholder, false),
        }
    }

    /// Moves the caret just after the construct `id`, as when the construct is clicked.
    pub fn exit_after(&mut self, id: NodeId, caret: &mut Caret, placeholder: char) -> bool {
        if self.resolve_owner(id).is_none() {
            return false;
        }
        self.land_after(id, caret, placeholder, true)
    }

    /// Puts the caret into the continuation directly after node `id`, creating one if needed. If
    /// `onto_text` is set and a text run follows instead, the caret goes to the end of that run.
    fn land_after(&mut self, id: NodeId, caret: &mut Caret, placeholder: char, onto_text: bool) -> bool {
        let Some(path) = self.path_of(id).cloned() else {
            return false;
        };
        let Some(region) = self.region_containing(&path) else {
            return false;
        };
        let after = path.index() + 1;

        let landing = match self.list_at(path.steps()).map(|list| list.items.get(after)) {
            None => return false,
            Some(Some(Node::Continuation { .. })) => Landing::Existing,
            Some(Some(Node::Text(text))) if onto_text => Landing::TextEnd(text.chars().count()),
            Some(_) => Landing::Create,
        };

        match landing {
            Landing::Existing => *caret = Caret::new(region, after, 0),
            Landing::TextEnd(len) => *caret = Caret::new(region, after, len),
            Landing::Create => {
                let continuation = Node::continuation(self.allocate_id(), placeholder);
                let Some(list) = self.list_at_mut(path.steps()) else {
                    return false;
                };
                list.items.insert(after, continuation);
                self.reindex();
                *caret = Caret::new(region, after, 0);
            }
        }
        true
    }

    /// Inserts a new, empty fraction at the caret and moves into its numerator.
    pub fn insert_fraction(&mut self, caret: &mut Caret) -> bool {
        let node = self.create_fraction();
        let Some(id) = node.id() else {
            return false;
        };
        if !self.insert_node(caret, node) {
            return false;
        }

        *caret = Caret::new(Region::Slot(id, Slot::Numerator), 0, 0);
        true
    }

    /// Inserts a new limit at the caret, and selects its default subscript for overwriting.
    pub fn insert_limit(&mut self, caret: &mut Caret, config: &EditorConfig) -> bool {
        let node = self.create_limit(&config.limit);
        let Some(id) = node.id() else {
            return false;
        };
        if !self.insert_node(caret, node) {
            return false;
        }

        *caret = Caret::new(Region::Slot(id, Slot::Subscript), 0, 0).selecting();
        true
    }

    /// Inserts `node` at the caret, splitting a text run if the caret is inside one. A selected
    /// region is emptied first, and a continuation under the caret is replaced. The caret is left
    /// unchanged; callers move it.
    fn insert_node(&mut self, caret: &mut Caret, node: Node) -> bool {
        let Some(list) = self.region_mut(&caret.region) else {
            return false;
        };
        take_selection(list, caret);

        let at = match under(list, caret.index) {
            Under::Text => {
                let Some(Node::Text(text)) = list.items.get_mut(caret.index) else {
                    return false;
                };
                let split = byte_offset(text, caret.offset);
                if split == 0 {
                    caret.index
                } else if split == text.len() {
                    caret.index + 1
                } else {
                    let right = text.split_off(split);
                    list.items.insert(caret.index + 1, Node::Text(right));
                    caret.index + 1
                }
            }
            Under::Continuation => {
                list.items.remove(caret.index);
                caret.index
            }
            Under::Other => caret.index,
        };

        list.items.insert(at, node);
        self.reindex();
        true
    }

    /// If the text just before the caret ends with `lim`, removes those characters and returns
    /// true.
    fn consume_lim(&mut self, caret: &mut Caret) -> bool {
        const TOKEN: &str = "lim";

        let Some(list) = self.region_mut(&caret.region) else {
            return false;
        };

        let (index, offset) = match under(list, caret.index) {
            Under::Text => (caret.index, caret.offset),
            _ => match caret.index.checked_sub(1).map(|i| (i, list.items.get(i))) {
                Some((i, Some(Node::Text(text)))) => (i, text.chars().count()),
                _ => return false,
            },
        };

        let Some(Node::Text(text)) = list.items.get_mut(index) else {
            return false;
        };
        let end = byte_offset(text, offset);
        if !text[..end].ends_with(TOKEN) {
            return false;
        }

        text.replace_range(end - TOKEN.len()..end, "");
        caret.index = index;
        caret.offset = offset - TOKEN.len();
        if text.is_empty() {
            list.items.remove(index);
            caret.offset = 0;
            self.reindex();
        }
        true
    }

    /// Types one character at the caret.
    ///
    /// A continuation under the caret becomes a plain text run holding just `c`; this happens
    /// once, after which it is ordinary text.
    pub fn type_char(&mut self, caret: &mut Caret, c: char) -> bool {
        let Some(list) = self.region_mut(&caret.region) else {
            return false;
        };
        take_selection(list, caret);

        match under(list, caret.index) {
            Under::Continuation => {
                // Swallow a text run which follows, so the result is one run
                let mut text = c.to_string();
                if let Some(Node::Text(next)) = list.items.get(caret.index + 1) {
                    text.push_str(next);
                    list.items.remove(caret.index + 1);
                }
                list.items[caret.index] = Node::Text(text);
                caret.offset = 1;
            }
            Under::Text => {
                if let Some(Node::Text(text)) = list.items.get_mut(caret.index) {
                    let at = byte_offset(text, caret.offset);
                    text.insert(at, c);
                    caret.offset += 1;
                }
            }
            Under::Other => {
                let previous = caret.index.checked_sub(1);
                match previous.and_then(|i| list.items.get_mut(i)) {
                    Some(Node::Text(text)) => {
                        text.push(c);
                        caret.offset = text.chars().count();
                        caret.index -= 1;
                    }
                    _ => {
                        list.items.insert(caret.index, Node::Text(c.to_string()));
                        caret.offset = 1;
                    }
                }
            }
        }

        self.reindex();
        true
    }

    /// Deletes backwards from the caret. Returns false if there was nothing to delete.
    ///
    /// A selected region is emptied. Otherwise the character before the caret goes, or the whole
    /// construct or continuation before it. At the very start of a construct's region the
    /// construct itself is deleted, and the caret goes to where it was.
    pub fn backspace(&mut self, caret: &mut Caret) -> bool {
        let region = caret.region;
        let Some(list) = self.region_mut(&region) else {
            return false;
        };

        if caret.selected {
            take_selection(list, caret);
            self.reindex();
            return true;
        }

        match under(list, caret.index) {
            Under::Text if caret.offset > 0 => {
                let Some(Node::Text(text)) = list.items.get_mut(caret.index) else {
                    return false;
                };
                let at = byte_offset(text, caret.offset - 1);
                text.remove(at);
                caret.offset -= 1;

                if text.is_empty() {
                    *caret = remove_item(list, region, caret.index);
                }
            }
            Under::Continuation => *caret = remove_item(list, region, caret.index),
            Under::Text | Under::Other => {
                let Some(previous) = caret.index.checked_sub(1) else {
                    // Nothing before us in this region, so take out the construct which owns it
                    let Region::Slot(owner, _) = region else {
                        return false;
                    };
                    return self.remove_construct(owner, caret);
                };

                match list.items.get_mut(previous) {
                    Some(Node::Text(text)) => {
                        text.pop();
                        *caret = if text.is_empty() {
                            remove_item(list, region, previous)
                        } else {
                            Caret::new(region, previous, text.chars().count())
                        };
                    }
                    Some(_) => *caret = remove_item(list, region, previous),
                    None => return false,
                }
            }
        }

        self.reindex();
        true
    }

    fn remove_construct(&mut self, id: NodeId, caret: &mut Caret) -> bool {
        let Some(path) = self.path_of(id).cloned() else {
            return false;
        };
        let Some(region) = self.region_containing(&path) else {
            return false;
        };
        let Some(list) = self.list_at_mut(path.steps()) else {
            return false;
        };

        *caret = remove_item(list, region, path.index());
        self.reindex();
        true
    }

    /// The path to the item under the caret, if its region still exists.
    pub fn caret_path(&self, caret: &Caret) -> Option<NodePath> {
        match caret.region {
            Region::Root => Some(NodePath::root(caret.index)),
            Region::Slot(owner, slot) => Some(self.path_of(owner)?.child(slot, caret.index)),
        }
    }
}
