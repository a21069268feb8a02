use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::rc::Rc;

use host::{
    ActivityHub, ComputedStyle, CssRule, HostError, NodeKey, SheetKey, SheetOwner, Signal,
};
use indextree::{Arena, Node, NodeId};
use log::trace;
use smallvec::SmallVec;

mod printing;
mod updating;

#[derive(Debug, Clone)]
pub enum FrameContent {
    /// Same-origin frame whose document root lives in the same arena.
    SameOrigin(NodeId),
    /// A frame whose document cannot be reached.
    CrossOrigin,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Element { tag: String },
    Frame { content: FrameContent },
}

#[derive(Debug, Clone)]
pub struct DomNode {
    pub key: NodeKey,
    pub kind: NodeKind,
    pub attrs: SmallVec<(String, String), 4>,
    /// Resolved values before any settable overrides.
    pub computed: ComputedStyle,
    /// Settable style overrides, in the order they were first written.
    pub inline: Vec<(String, String)>,
    /// Simulates an element whose style computation throws.
    pub style_fails: bool,
}

impl DomNode {
    fn element(key: NodeKey, tag: &str, computed: ComputedStyle) -> Self {
        Self {
            key,
            kind: NodeKind::Element {
                tag: tag.to_owned(),
            },
            attrs: SmallVec::new(),
            computed,
            inline: Vec::new(),
            style_fails: false,
        }
    }

    pub fn tag(&self) -> &str {
        match &self.kind {
            NodeKind::Element { tag } => tag,
            NodeKind::Frame { .. } => "iframe",
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn inline_value(&self, property: &str) -> Option<&str> {
        self.inline
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone)]
pub enum SheetState {
    Loaded(Vec<CssRule>),
    NotLoaded,
    Restricted,
}

#[derive(Debug, Clone)]
pub(crate) struct SheetEntry {
    pub(crate) key: SheetKey,
    pub(crate) owner: SheetOwner,
    pub(crate) state: SheetState,
}

/// A document tree with embedded same-origin documents and a stylesheet list.
///
/// Builder methods (`append_*`, `remove`, `set_attr`) count as structural
/// changes and notify the connected mutation observer. Writes made through the
/// host traits do not.
#[derive(Debug)]
pub struct Document {
    dom: Arena<DomNode>,
    root: NodeId,
    keys: HashMap<NodeKey, NodeId>,
    next_key: u64,
    sheets: Vec<SheetEntry>,
    next_sheet: u64,
    visible: bool,
    observer: Option<ActivityHub>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// A visible document containing only its `html` root element.
    pub fn new() -> Self {
        let mut dom = Arena::new();
        let root_key = NodeKey(0);
        let root = dom.new_node(DomNode::element(root_key, "html", ComputedStyle::default()));
        Self {
            dom,
            root,
            keys: HashMap::from([(root_key, root)]),
            next_key: 1,
            sheets: Vec::new(),
            next_sheet: 1,
            visible: true,
            observer: None,
        }
    }

    pub fn root_key(&self) -> NodeKey {
        self.key_of(self.root)
    }

    pub fn node(&self, key: NodeKey) -> Option<&DomNode> {
        let id = self.keys.get(&key)?;
        self.dom.get(*id).map(Node::get)
    }

    pub(crate) fn node_mut(&mut self, key: NodeKey) -> Result<&mut DomNode, HostError> {
        let id = self.live_id(key)?;
        self.dom
            .get_mut(id)
            .map(Node::get_mut)
            .ok_or(HostError::UnknownNode(key))
    }

    /// Append an element with the given resolved style under `parent`.
    ///
    /// # Errors
    /// Returns an error when `parent` is not a live node.
    pub fn append_element(
        &mut self,
        parent: NodeKey,
        tag: &str,
        computed: &[(&str, &str)],
    ) -> Result<NodeKey, HostError> {
        let style = ComputedStyle::from_pairs(computed.iter().copied());
        let key = self.mint_key();
        self.attach(parent, DomNode::element(key, tag, style))
    }

    /// Append a same-origin frame under `parent`. Returns the frame node and
    /// the root element of its embedded document.
    ///
    /// # Errors
    /// Returns an error when `parent` is not a live node.
    pub fn append_frame(&mut self, parent: NodeKey) -> Result<(NodeKey, NodeKey), HostError> {
        let inner_key = self.mint_key();
        let inner = self
            .dom
            .new_node(DomNode::element(inner_key, "html", ComputedStyle::default()));
        self.keys.insert(inner_key, inner);

        let frame_key = self.mint_key();
        let mut frame = DomNode::element(frame_key, "iframe", ComputedStyle::default());
        frame.kind = NodeKind::Frame {
            content: FrameContent::SameOrigin(inner),
        };
        self.attach(parent, frame)?;
        Ok((frame_key, inner_key))
    }

    /// Append a frame whose document is not accessible.
    ///
    /// # Errors
    /// Returns an error when `parent` is not a live node.
    pub fn append_cross_origin_frame(&mut self, parent: NodeKey) -> Result<NodeKey, HostError> {
        let key = self.mint_key();
        let mut frame = DomNode::element(key, "iframe", ComputedStyle::default());
        frame.kind = NodeKind::Frame {
            content: FrameContent::CrossOrigin,
        };
        self.attach(parent, frame)
    }

    /// Detach `node` and its subtree.
    ///
    /// # Errors
    /// Returns an error when `node` is not a live node.
    pub fn remove(&mut self, node: NodeKey) -> Result<(), HostError> {
        let id = self.live_id(node)?;
        id.remove_subtree(&mut self.dom);
        self.notify_mutation();
        Ok(())
    }

    /// Set an attribute as page script would (a structural change).
    ///
    /// # Errors
    /// Returns an error when `node` is not a live node.
    pub fn set_attr(&mut self, node: NodeKey, name: &str, value: &str) -> Result<(), HostError> {
        self.write_attr(node, name, value)?;
        self.notify_mutation();
        Ok(())
    }

    /// Drop an attribute, for instance to clear a processed marker.
    ///
    /// # Errors
    /// Returns an error when `node` is not a live node.
    pub fn remove_attr(&mut self, node: NodeKey, name: &str) -> Result<(), HostError> {
        self.node_mut(node)?.attrs.retain(|(attr, _)| *attr != name);
        self.notify_mutation();
        Ok(())
    }

    /// Make style computation of `node` fail from now on.
    ///
    /// # Errors
    /// Returns an error when `node` is not a live node.
    pub fn break_style(&mut self, node: NodeKey) -> Result<(), HostError> {
        self.node_mut(node)?.style_fails = true;
        Ok(())
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn observer_connected(&self) -> bool {
        self.observer.is_some()
    }

    // ---- stylesheets ----

    pub fn add_linked_sheet(&mut self, rules: Vec<CssRule>) -> SheetKey {
        self.push_sheet(SheetOwner::Linked, SheetState::Loaded(rules))
    }

    /// Add a `<style>` element under `parent` owning `rules`.
    ///
    /// # Errors
    /// Returns an error when `parent` is not a live node.
    pub fn add_inline_sheet(
        &mut self,
        parent: NodeKey,
        rules: Vec<CssRule>,
    ) -> Result<(NodeKey, SheetKey), HostError> {
        let node = self.append_element(parent, "style", &[])?;
        let sheet = self.push_sheet(SheetOwner::Inline { node }, SheetState::Loaded(rules));
        Ok((node, sheet))
    }

    /// A linked sheet whose rules are security-restricted.
    pub fn add_restricted_sheet(&mut self) -> SheetKey {
        self.push_sheet(SheetOwner::Linked, SheetState::Restricted)
    }

    /// A linked sheet still loading; see [`Document::finish_loading`].
    pub fn add_pending_sheet(&mut self) -> SheetKey {
        self.push_sheet(SheetOwner::Linked, SheetState::NotLoaded)
    }

    /// Deliver the rules of a pending sheet.
    ///
    /// # Errors
    /// Returns an error when `sheet` is unknown.
    pub fn finish_loading(&mut self, sheet: SheetKey, rules: Vec<CssRule>) -> Result<(), HostError> {
        let entry = self.sheet_mut(sheet)?;
        entry.state = SheetState::Loaded(rules);
        self.notify_mutation();
        Ok(())
    }

    /// Insert `rule` at `index` of a loaded sheet, as `CSSStyleSheet.insertRule` does.
    ///
    /// # Errors
    /// Returns an error when the sheet is unknown or not loaded, or `index`
    /// is past the end of its rule list.
    pub fn insert_rule(
        &mut self,
        sheet: SheetKey,
        index: usize,
        rule: CssRule,
    ) -> Result<(), HostError> {
        match &mut self.sheet_mut(sheet)?.state {
            SheetState::Loaded(rules) if index <= rules.len() => {
                rules.insert(index, rule);
                Ok(())
            }
            SheetState::Loaded(_) | SheetState::NotLoaded | SheetState::Restricted => {
                Err(HostError::UnknownRule { sheet, index })
            }
        }
    }

    pub fn rules(&self, sheet: SheetKey) -> Option<&[CssRule]> {
        self.sheets
            .iter()
            .find(|entry| entry.key == sheet)
            .and_then(|entry| match &entry.state {
                SheetState::Loaded(rules) => Some(rules.as_slice()),
                SheetState::NotLoaded | SheetState::Restricted => None,
            })
    }

    // ---- internals ----

    fn mint_key(&mut self) -> NodeKey {
        let key = NodeKey(self.next_key);
        self.next_key = self.next_key.wrapping_add(1);
        key
    }

    fn key_of(&self, id: NodeId) -> NodeKey {
        self.dom
            .get(id)
            .map_or(NodeKey(u64::MAX), |node| node.get().key)
    }

    pub(crate) fn live_id(&self, key: NodeKey) -> Result<NodeId, HostError> {
        let id = *self.keys.get(&key).ok_or(HostError::UnknownNode(key))?;
        if id.is_removed(&self.dom) {
            return Err(HostError::Detached(key));
        }
        Ok(id)
    }

    fn attach(&mut self, parent: NodeKey, node: DomNode) -> Result<NodeKey, HostError> {
        let parent_id = self.live_id(parent)?;
        let key = node.key;
        let id = self.dom.new_node(node);
        parent_id.append(id, &mut self.dom);
        self.keys.insert(key, id);
        trace!("attached {key} under {parent}");
        self.notify_mutation();
        Ok(key)
    }

    pub(crate) fn write_attr(&mut self, node: NodeKey, name: &str, value: &str) -> Result<(), HostError> {
        let target = self.node_mut(node)?;
        if let Some(slot) = target.attrs.iter_mut().find(|(attr, _)| attr == name) {
            value.clone_into(&mut slot.1);
        } else {
            target.attrs.push((name.to_owned(), value.to_owned()));
        }
        Ok(())
    }

    fn push_sheet(&mut self, owner: SheetOwner, state: SheetState) -> SheetKey {
        let key = SheetKey(self.next_sheet);
        self.next_sheet = self.next_sheet.wrapping_add(1);
        self.sheets.push(SheetEntry { key, owner, state });
        self.notify_mutation();
        key
    }

    pub(crate) fn sheet_entry(&self, sheet: SheetKey) -> Result<&SheetEntry, HostError> {
        self.sheets
            .iter()
            .find(|entry| entry.key == sheet)
            .ok_or(HostError::UnknownSheet(sheet))
    }

    pub(crate) fn sheet_mut(&mut self, sheet: SheetKey) -> Result<&mut SheetEntry, HostError> {
        self.sheets
            .iter_mut()
            .find(|entry| entry.key == sheet)
            .ok_or(HostError::UnknownSheet(sheet))
    }

    fn notify_mutation(&self) {
        if let Some(hub) = &self.observer {
            hub.notify(Signal::Mutation);
        }
    }

    /// Primary tree first, then each reachable embedded document in the
    /// order its frame was encountered.
    pub(crate) fn ordered_nodes(&self) -> Vec<NodeKey> {
        let mut out = Vec::new();
        let mut documents = vec![self.root];
        let mut next = 0;
        while let Some(&doc_root) = documents.get(next) {
            next += 1;
            for id in doc_root.descendants(&self.dom) {
                let Some(node) = self.dom.get(id).map(Node::get) else {
                    continue;
                };
                out.push(node.key);
                if let NodeKind::Frame {
                    content: FrameContent::SameOrigin(inner),
                } = &node.kind
                {
                    documents.push(*inner);
                }
            }
        }
        out
    }
}

/// A reference-counted handle so a document can be mutated while the engine
/// holds it as its host. Single-threaded by construction.
#[derive(Clone, Debug, Default)]
pub struct SharedDocument(Rc<RefCell<Document>>);

impl SharedDocument {
    pub fn new(document: Document) -> Self {
        Self(Rc::new(RefCell::new(document)))
    }

    pub fn borrow(&self) -> Ref<'_, Document> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Document> {
        self.0.borrow_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumerates_primary_then_frames() -> Result<(), HostError> {
        let mut doc = Document::new();
        let root = doc.root_key();
        let body = doc.append_element(root, "body", &[])?;
        let (frame, inner_root) = doc.append_frame(body)?;
        let inner_div = doc.append_element(inner_root, "div", &[])?;
        let after = doc.append_element(body, "p", &[])?;
        let blocked = doc.append_cross_origin_frame(body)?;

        assert_eq!(
            doc.ordered_nodes(),
            vec![root, body, frame, after, blocked, inner_root, inner_div]
        );
        Ok(())
    }

    #[test]
    fn nested_frames_are_enumerated() -> Result<(), HostError> {
        let mut doc = Document::new();
        let root = doc.root_key();
        let (_, inner) = doc.append_frame(root)?;
        let (_, innermost) = doc.append_frame(inner)?;
        let leaf = doc.append_element(innermost, "span", &[])?;
        assert!(doc.ordered_nodes().contains(&leaf));
        Ok(())
    }

    #[test]
    fn removed_nodes_are_detached() -> Result<(), HostError> {
        let mut doc = Document::new();
        let root = doc.root_key();
        let div = doc.append_element(root, "div", &[])?;
        doc.remove(div)?;
        assert_eq!(doc.live_id(div), Err(HostError::Detached(div)));
        assert_eq!(doc.ordered_nodes(), vec![root]);
        Ok(())
    }

    #[test]
    fn builder_mutations_notify_observer() -> Result<(), HostError> {
        let hub = ActivityHub::new();
        let mut signals = hub.subscribe();
        let mut doc = Document::new();
        doc.observer = Some(hub);
        let root = doc.root_key();
        doc.append_element(root, "div", &[])?;
        assert_eq!(signals.try_recv().ok(), Some(Signal::Mutation));
        Ok(())
    }
}
