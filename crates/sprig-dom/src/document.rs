//! The document: node arena, tree mutation and queries.

use crate::config::DocumentConfig;
use crate::dirty::DirtyFlags;
use crate::error::{DomError, DomResult};
use crate::event::{Event, Listener, ListenerId, RegisteredListener};
use crate::html::{self, ParsedNode};
use crate::layout::{self, LayoutCache, LayoutRect};
use crate::node::{ElementData, Node, NodeId, NodeKind, NodeType, is_valid_name};
use crate::selector::SelectorList;
use crate::style::{InlineStyle, initial_value, normalize_property, parse_px};
use sprig_core::alloc::SparseSet;
use sprig_core::math::Vec2;
use sprig_core::profiling::profile_function;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

pub(crate) struct DocumentTree {
    nodes: SparseSet<Node>,
    root: NodeId,
    document_element: NodeId,
    head: NodeId,
    body: NodeId,
    config: DocumentConfig,
    dirty: DirtyFlags,
    layout: LayoutCache,
    mutation_count: u64,
    next_listener: u64,
    scroll: Vec2,
}

impl DocumentTree {
    fn new(config: DocumentConfig) -> Self {
        let mut nodes = SparseSet::new();
        let mut alloc = |kind| NodeId(nodes.push(Node::new(kind)));
        let root = alloc(NodeKind::Document);
        let document_element = alloc(NodeKind::Element(ElementData::new("html".into())));
        let head = alloc(NodeKind::Element(ElementData::new("head".into())));
        let body = alloc(NodeKind::Element(ElementData::new("body".into())));

        let mut tree = Self {
            nodes,
            root,
            document_element,
            head,
            body,
            config,
            dirty: DirtyFlags::LAYOUT_GROUP,
            layout: LayoutCache::default(),
            mutation_count: 0,
            next_listener: 0,
            scroll: Vec2::ZERO,
        };
        tree.link(root, document_element);
        tree.link(document_element, head);
        tree.link(document_element, body);
        tree
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        self.nodes.get_mut(child.0).parent = Some(parent);
        self.nodes.get_mut(parent.0).children.push(child);
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        NodeId(self.nodes.push(Node::new(kind)))
    }

    fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.nodes.try_get(id.0).ok_or(DomError::StaleNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> DomResult<&mut Node> {
        self.nodes.try_get_mut(id.0).ok_or(DomError::StaleNode(id))
    }

    fn element(&self, id: NodeId) -> DomResult<&ElementData> {
        self.node(id)?.as_element().ok_or(DomError::WrongNodeKind {
            node: id,
            expected: "an element",
        })
    }

    fn element_mut(&mut self, id: NodeId) -> DomResult<&mut ElementData> {
        self.node_mut(id)?
            .as_element_mut()
            .ok_or(DomError::WrongNodeKind {
                node: id,
                expected: "an element",
            })
    }

    fn touch(&mut self, flags: DirtyFlags) {
        self.dirty |= flags;
        self.mutation_count += 1;
    }

    fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.try_get(id.0).and_then(|node| node.parent)
    }

    /// Whether `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent_of(id);
        }
        false
    }

    fn is_connected(&self, id: NodeId) -> bool {
        self.nodes.contains(id.0) && self.contains(self.root, id)
    }

    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent_of(id) else {
            return;
        };
        if let Some(parent) = self.nodes.try_get_mut(parent.0) {
            parent.children.retain(|child| *child != id);
        }
        if let Some(node) = self.nodes.try_get_mut(id.0) {
            node.parent = None;
        }
    }

    /// Insert `child` under `parent` before `reference` (or at the end).
    fn insert(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) -> DomResult<()> {
        let parent_node = self.node(parent)?;
        if !parent_node.is_container() {
            return Err(DomError::HierarchyRequest(format!(
                "{:?} nodes cannot have children",
                parent_node.node_type()
            )));
        }
        let child_type = self.node(child)?.node_type();
        if child_type == NodeType::Document {
            return Err(DomError::HierarchyRequest(
                "the document node cannot be inserted".into(),
            ));
        }
        if self.contains(child, parent) {
            return Err(DomError::HierarchyRequest(
                "a node cannot be inserted into itself or its descendants".into(),
            ));
        }
        let mut reference = match reference {
            Some(reference) => {
                self.node(reference)?;
                if self.parent_of(reference) != Some(parent) {
                    return Err(DomError::NotAChild {
                        parent,
                        child: reference,
                    });
                }
                Some(reference)
            }
            None => None,
        };

        let moved = if child_type == NodeType::Fragment {
            std::mem::take(&mut self.node_mut(child)?.children)
        } else {
            if reference == Some(child) {
                reference = self.next_sibling(child);
            }
            self.detach(child);
            vec![child]
        };

        let siblings = &self.nodes.get(parent.0).children;
        let mut index = reference
            .and_then(|reference| siblings.iter().position(|sibling| *sibling == reference))
            .unwrap_or(siblings.len());
        for id in moved {
            self.nodes.get_mut(id.0).parent = Some(parent);
            self.nodes.get_mut(parent.0).children.insert(index, id);
            index += 1;
        }
        self.touch(DirtyFlags::CHILDREN);
        Ok(())
    }

    fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent_of(id)?;
        let siblings = &self.nodes.try_get(parent.0)?.children;
        let index = siblings.iter().position(|sibling| *sibling == id)?;
        siblings.get(index + 1).copied()
    }

    /// Free `id` and its descendants. Returns the number of nodes freed.
    fn release_subtree(&mut self, id: NodeId) -> usize {
        let mut freed = 0;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.try_remove(current.0) {
                stack.extend(node.children);
                freed += 1;
            }
        }
        freed
    }

    /// Detach and free every child of `id`.
    fn clear_children(&mut self, id: NodeId) -> DomResult<usize> {
        let children = std::mem::take(&mut self.node_mut(id)?.children);
        let freed: usize = children
            .into_iter()
            .map(|child| self.release_subtree(child))
            .sum();
        if freed > 0 {
            self.touch(DirtyFlags::CHILDREN);
        }
        Ok(freed)
    }

    /// Descendants of `id` in document order, excluding `id` itself.
    fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = match self.nodes.try_get(id.0) {
            Some(node) => node.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.try_get(current.0) {
                out.push(current);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.nodes.try_get(id.0) else {
            return;
        };
        match &node.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Comment(_) => {}
            _ => {
                for child in &node.children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    fn build_parsed(&mut self, parent: NodeId, parsed: Vec<ParsedNode>) {
        for item in parsed {
            let (kind, children) = match item {
                ParsedNode::Text(text) => (NodeKind::Text(text), Vec::new()),
                ParsedNode::Comment(text) => (NodeKind::Comment(text), Vec::new()),
                ParsedNode::Element {
                    tag_name,
                    attributes,
                    children,
                } => {
                    let mut element = ElementData::new(tag_name);
                    element.attributes.extend(attributes);
                    (NodeKind::Element(element), children)
                }
            };
            let id = self.alloc(kind);
            self.link(parent, id);
            self.build_parsed(id, children);
        }
    }

    fn inline_style(&self, id: NodeId) -> DomResult<InlineStyle> {
        Ok(self
            .element(id)?
            .attributes
            .get("style")
            .map(|css| InlineStyle::parse(css))
            .unwrap_or_default())
    }

    fn computed_style(&self, id: NodeId, property: &str) -> DomResult<String> {
        let property = normalize_property(property);
        let style = self.inline_style(id)?;
        let tag_name = &self.element(id)?.tag_name;
        Ok(style
            .resolve(&property)
            .unwrap_or_else(|| initial_value(tag_name, &property))
            .to_string())
    }

    fn ensure_layout(&mut self) {
        if !self.dirty.needs_layout() {
            return;
        }
        self.layout = layout::compute(&self.nodes, self.document_element, &self.config);
        self.dirty = DirtyFlags::NONE;
    }

    /// Page-space rectangle of a connected, rendered node.
    fn page_rect(&mut self, id: NodeId) -> DomResult<Option<LayoutRect>> {
        self.node(id)?;
        if !self.is_connected(id) {
            return Ok(None);
        }
        self.ensure_layout();
        Ok(self.layout.get(id))
    }

    fn offset_parent(&mut self, id: NodeId) -> DomResult<Option<NodeId>> {
        self.element(id)?;
        if id == self.body || id == self.document_element || self.page_rect(id)?.is_none() {
            return Ok(None);
        }
        let mut current = self.parent_of(id);
        while let Some(ancestor) = current {
            if ancestor == self.body {
                return Ok(Some(ancestor));
            }
            if self.element(ancestor).is_ok() && self.computed_style(ancestor, "position")? != "static" {
                return Ok(Some(ancestor));
            }
            current = self.parent_of(ancestor);
        }
        Ok(None)
    }

    /// Offset of `id` relative to its offset parent's padding edge.
    fn offset(&mut self, id: NodeId) -> DomResult<Vec2> {
        let Some(rect) = self.page_rect(id)? else {
            return Ok(Vec2::ZERO);
        };
        let parent = match self.offset_parent(id)? {
            Some(parent) if parent != self.body => parent,
            _ => return Ok(rect.position()),
        };
        let Some(parent_rect) = self.page_rect(parent)? else {
            return Ok(rect.position());
        };
        let border_left = parse_px(&self.computed_style(parent, "border-left-width")?);
        let border_top = parse_px(&self.computed_style(parent, "border-top-width")?);
        Ok(Vec2::new(
            rect.x - parent_rect.x - border_left,
            rect.y - parent_rect.y - border_top,
        ))
    }
}

/// An in-memory document.
///
/// `Document` is a cheap, reference-counted handle; clones refer to the same
/// tree. All node access goes through [`NodeId`]s.
#[derive(Clone)]
pub struct Document {
    inner: Rc<RefCell<DocumentTree>>,
}

/// Non-owning handle to a [`Document`].
#[derive(Clone)]
pub struct WeakDocument {
    inner: Weak<RefCell<DocumentTree>>,
}

impl WeakDocument {
    pub fn upgrade(&self) -> Option<Document> {
        self.inner.upgrade().map(|inner| Document { inner })
    }
}

impl fmt::Debug for WeakDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WeakDocument")
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Document {}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(tree) => f
                .debug_struct("Document")
                .field("nodes", &tree.nodes.len())
                .field("mutation_count", &tree.mutation_count)
                .finish(),
            Err(_) => f.write_str("Document { <borrowed> }"),
        }
    }
}

impl Document {
    /// Create a document containing `html > (head, body)`.
    pub fn new() -> Self {
        Self::with_config(DocumentConfig::default())
    }

    pub fn with_config(config: DocumentConfig) -> Self {
        Self {
            inner: Rc::new(RefCell::new(DocumentTree::new(config))),
        }
    }

    pub fn downgrade(&self) -> WeakDocument {
        WeakDocument {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn config(&self) -> DocumentConfig {
        self.inner.borrow().config
    }

    /// Resize the viewport. Invalidates layout.
    pub fn set_viewport(&self, width: f32, height: f32) {
        let mut tree = self.inner.borrow_mut();
        tree.config.viewport = sprig_core::geometry::Size::new(width, height);
        tree.touch(DirtyFlags::VIEWPORT);
    }

    /// The document node.
    pub fn root(&self) -> NodeId {
        self.inner.borrow().root
    }

    /// The `html` element.
    pub fn document_element(&self) -> NodeId {
        self.inner.borrow().document_element
    }

    pub fn head(&self) -> NodeId {
        self.inner.borrow().head
    }

    pub fn body(&self) -> NodeId {
        self.inner.borrow().body
    }

    /// Number of mutations applied so far. Never decreases.
    pub fn mutation_count(&self) -> u64 {
        self.inner.borrow().mutation_count
    }

    /// Changes since the last layout pass.
    pub fn dirty_flags(&self) -> DirtyFlags {
        self.inner.borrow().dirty
    }

    // Node creation

    /// Create a detached element. The tag name is lower-cased.
    pub fn create_element(&self, tag_name: &str) -> DomResult<NodeId> {
        let tag_name = tag_name.trim().to_ascii_lowercase();
        if !is_valid_name(&tag_name) {
            return Err(DomError::InvalidName(tag_name));
        }
        let mut tree = self.inner.borrow_mut();
        let id = tree.alloc(NodeKind::Element(ElementData::new(tag_name)));
        tree.touch(DirtyFlags::NONE);
        Ok(id)
    }

    pub fn create_text_node(&self, text: &str) -> NodeId {
        let mut tree = self.inner.borrow_mut();
        let id = tree.alloc(NodeKind::Text(text.to_string()));
        tree.touch(DirtyFlags::NONE);
        id
    }

    pub fn create_comment(&self, text: &str) -> NodeId {
        let mut tree = self.inner.borrow_mut();
        let id = tree.alloc(NodeKind::Comment(text.to_string()));
        tree.touch(DirtyFlags::NONE);
        id
    }

    pub fn create_document_fragment(&self) -> NodeId {
        let mut tree = self.inner.borrow_mut();
        let id = tree.alloc(NodeKind::Fragment);
        tree.touch(DirtyFlags::NONE);
        id
    }

    // Tree structure

    pub fn node_type(&self, node: NodeId) -> DomResult<NodeType> {
        Ok(self.inner.borrow().node(node)?.node_type())
    }

    /// Lower-cased tag name of an element.
    pub fn tag_name(&self, node: NodeId) -> DomResult<String> {
        Ok(self.inner.borrow().element(node)?.tag_name.clone())
    }

    /// Whether `node` still refers to a node (it has not been released).
    pub fn is_live(&self, node: NodeId) -> bool {
        self.inner.borrow().nodes.contains(node.0)
    }

    /// Whether `node` is reachable from the document node.
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.inner.borrow().is_connected(node)
    }

    /// Whether `node` is `ancestor` or one of its descendants.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let tree = self.inner.borrow();
        tree.nodes.contains(ancestor.0) && tree.contains(ancestor, node)
    }

    pub fn parent(&self, node: NodeId) -> DomResult<Option<NodeId>> {
        Ok(self.inner.borrow().node(node)?.parent)
    }

    pub fn children(&self, node: NodeId) -> DomResult<Vec<NodeId>> {
        Ok(self.inner.borrow().node(node)?.children.clone())
    }

    // Mutation

    /// Append `child` to `parent`, moving it from its current parent. A
    /// fragment moves its children and is left empty.
    pub fn append_child(&self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.inner.borrow_mut().insert(parent, child, None)
    }

    /// Insert `child` before `reference`; `None` appends.
    pub fn insert_before(
        &self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<()> {
        self.inner.borrow_mut().insert(parent, child, reference)
    }

    /// Detach `child` from `parent`. The child stays live.
    pub fn remove_child(&self, parent: NodeId, child: NodeId) -> DomResult<()> {
        let mut tree = self.inner.borrow_mut();
        tree.node(parent)?;
        tree.node(child)?;
        if tree.parent_of(child) != Some(parent) {
            return Err(DomError::NotAChild { parent, child });
        }
        tree.detach(child);
        tree.touch(DirtyFlags::CHILDREN);
        Ok(())
    }

    /// Put `new_child` where `old_child` is. `old_child` is detached, not
    /// released.
    pub fn replace_child(&self, parent: NodeId, new_child: NodeId, old_child: NodeId) -> DomResult<()> {
        let mut tree = self.inner.borrow_mut();
        tree.node(parent)?;
        tree.node(old_child)?;
        if tree.parent_of(old_child) != Some(parent) {
            return Err(DomError::NotAChild {
                parent,
                child: old_child,
            });
        }
        if new_child == old_child {
            tree.node(new_child)?;
            return Ok(());
        }
        tree.insert(parent, new_child, Some(old_child))?;
        tree.detach(old_child);
        tree.touch(DirtyFlags::CHILDREN);
        Ok(())
    }

    /// Detach `node` from its parent, if it has one.
    pub fn remove(&self, node: NodeId) -> DomResult<()> {
        let mut tree = self.inner.borrow_mut();
        if tree.node(node)?.parent.is_some() {
            tree.detach(node);
            tree.touch(DirtyFlags::CHILDREN);
        }
        Ok(())
    }

    /// Free a detached subtree. Every id into it becomes stale.
    pub fn release(&self, node: NodeId) -> DomResult<()> {
        let mut tree = self.inner.borrow_mut();
        tree.node(node)?;
        if tree.is_connected(node) {
            return Err(DomError::HierarchyRequest(
                "cannot release a node that is connected to the document".into(),
            ));
        }
        tree.detach(node);
        let freed = tree.release_subtree(node);
        tree.touch(DirtyFlags::NONE);
        tracing::debug!("Released {} nodes from {:?}", freed, node);
        Ok(())
    }

    /// Release every child of `node`.
    pub fn empty(&self, node: NodeId) -> DomResult<()> {
        let freed = self.inner.borrow_mut().clear_children(node)?;
        if freed > 0 {
            tracing::trace!("Emptied {:?}, released {} nodes", node, freed);
        }
        Ok(())
    }

    // Attributes

    pub fn get_attribute(&self, node: NodeId, name: &str) -> DomResult<Option<String>> {
        let tree = self.inner.borrow();
        let element = tree.element(node)?;
        Ok(element
            .attributes
            .get(name.to_ascii_lowercase().as_str())
            .cloned())
    }

    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> DomResult<()> {
        let name = name.trim().to_ascii_lowercase();
        if !is_valid_name(&name) {
            return Err(DomError::InvalidName(name));
        }
        let mut tree = self.inner.borrow_mut();
        let flags = if name == "style" {
            DirtyFlags::STYLE
        } else {
            DirtyFlags::ATTRIBUTES
        };
        tree.element_mut(node)?
            .attributes
            .insert(name, value.to_string());
        tree.touch(flags);
        Ok(())
    }

    /// Returns whether the attribute was present.
    pub fn remove_attribute(&self, node: NodeId, name: &str) -> DomResult<bool> {
        let name = name.to_ascii_lowercase();
        let mut tree = self.inner.borrow_mut();
        let removed = tree
            .element_mut(node)?
            .attributes
            .shift_remove(&name)
            .is_some();
        if removed {
            tree.touch(if name == "style" {
                DirtyFlags::STYLE
            } else {
                DirtyFlags::ATTRIBUTES
            });
        }
        Ok(removed)
    }

    pub fn has_attribute(&self, node: NodeId, name: &str) -> DomResult<bool> {
        Ok(self
            .inner
            .borrow()
            .element(node)?
            .attributes
            .contains_key(name.to_ascii_lowercase().as_str()))
    }

    /// Attribute names in insertion order.
    pub fn attribute_names(&self, node: NodeId) -> DomResult<Vec<String>> {
        Ok(self
            .inner
            .borrow()
            .element(node)?
            .attributes
            .keys()
            .cloned()
            .collect())
    }

    // Classes

    /// Add whitespace-separated class tokens, skipping ones already present.
    pub fn add_class(&self, node: NodeId, classes: &str) -> DomResult<()> {
        let mut tree = self.inner.borrow_mut();
        let element = tree.element_mut(node)?;
        let mut tokens: Vec<String> = element.class_tokens().map(str::to_string).collect();
        let before = tokens.len();
        for class_name in classes.split_ascii_whitespace() {
            if !tokens.iter().any(|token| token == class_name) {
                tokens.push(class_name.to_string());
            }
        }
        if tokens.len() != before {
            element.attributes.insert("class".into(), tokens.join(" "));
            tree.touch(DirtyFlags::ATTRIBUTES);
        }
        Ok(())
    }

    /// Remove whitespace-separated class tokens.
    pub fn remove_class(&self, node: NodeId, classes: &str) -> DomResult<()> {
        let mut tree = self.inner.borrow_mut();
        let element = tree.element_mut(node)?;
        let removed: Vec<&str> = classes.split_ascii_whitespace().collect();
        let tokens: Vec<String> = element
            .class_tokens()
            .filter(|token| !removed.contains(token))
            .map(str::to_string)
            .collect();
        if element.class_tokens().count() != tokens.len() {
            element.attributes.insert("class".into(), tokens.join(" "));
            tree.touch(DirtyFlags::ATTRIBUTES);
        }
        Ok(())
    }

    pub fn has_class(&self, node: NodeId, class_name: &str) -> DomResult<bool> {
        Ok(self.inner.borrow().element(node)?.has_class(class_name))
    }

    // Inline style

    /// Declared inline value of a property (camelCase or kebab-case).
    pub fn style_property(&self, node: NodeId, property: &str) -> DomResult<Option<String>> {
        let style = self.inner.borrow().inline_style(node)?;
        Ok(style.resolve(property).map(str::to_string))
    }

    /// Set an inline style property; an empty value removes it.
    pub fn set_style_property(&self, node: NodeId, property: &str, value: &str) -> DomResult<()> {
        let mut tree = self.inner.borrow_mut();
        let mut style = tree.inline_style(node)?;
        style.set(property, value);
        let element = tree.element_mut(node)?;
        if style.is_empty() {
            element.attributes.shift_remove("style");
        } else {
            element
                .attributes
                .insert("style".into(), style.to_css_text());
        }
        tree.touch(DirtyFlags::STYLE);
        Ok(())
    }

    /// Inline value of a property, or the element's default for it.
    pub fn computed_style(&self, node: NodeId, property: &str) -> DomResult<String> {
        self.inner.borrow().computed_style(node, property)
    }

    // Events

    pub fn add_event_listener(
        &self,
        node: NodeId,
        event_type: &str,
        callback: Listener,
    ) -> DomResult<ListenerId> {
        let mut tree = self.inner.borrow_mut();
        tree.next_listener += 1;
        let id = ListenerId(tree.next_listener);
        tree.node_mut(node)?.listeners.push(RegisteredListener {
            event_type: event_type.to_string(),
            id,
            callback,
        });
        tree.touch(DirtyFlags::LISTENERS);
        Ok(id)
    }

    /// Returns whether a listener was removed.
    pub fn remove_event_listener(
        &self,
        node: NodeId,
        event_type: &str,
        id: ListenerId,
    ) -> DomResult<bool> {
        let mut tree = self.inner.borrow_mut();
        let listeners = &mut tree.node_mut(node)?.listeners;
        let before = listeners.len();
        listeners.retain(|listener| !(listener.id == id && listener.event_type == event_type));
        let removed = listeners.len() != before;
        if removed {
            tree.touch(DirtyFlags::LISTENERS);
        }
        Ok(removed)
    }

    /// Dispatch an event at `target`, bubbling through its ancestors.
    ///
    /// The propagation path is fixed before any listener runs, and each
    /// node's listeners are snapshotted when the event reaches it, so
    /// listeners may mutate the document. Returns the number of listeners
    /// invoked.
    pub fn dispatch_event(&self, target: NodeId, event_type: &str) -> DomResult<usize> {
        profile_function!();

        let path = {
            let tree = self.inner.borrow();
            tree.node(target)?;
            let mut path = vec![target];
            let mut current = tree.parent_of(target);
            while let Some(ancestor) = current {
                path.push(ancestor);
                current = tree.parent_of(ancestor);
            }
            path
        };

        let event = Event::new(event_type, target);
        let mut invoked = 0;
        for node in path {
            let callbacks: Vec<Listener> = {
                let tree = self.inner.borrow();
                let Some(node) = tree.nodes.try_get(node.0) else {
                    continue;
                };
                node.listeners
                    .iter()
                    .filter(|listener| listener.event_type == event_type)
                    .map(|listener| listener.callback.clone())
                    .collect()
            };
            event.set_current_target(node);
            for callback in callbacks {
                callback(&event);
                invoked += 1;
            }
            if event.is_propagation_stopped() {
                break;
            }
        }
        tracing::trace!(
            "Dispatched '{}' at {:?} to {} listeners",
            event_type,
            target,
            invoked
        );
        Ok(invoked)
    }

    pub fn click(&self, node: NodeId) -> DomResult<usize> {
        self.dispatch_event(node, "click")
    }

    // Text and HTML

    pub fn text_content(&self, node: NodeId) -> DomResult<String> {
        let tree = self.inner.borrow();
        let mut out = String::new();
        match &tree.node(node)?.kind {
            NodeKind::Comment(text) => out.push_str(text),
            _ => tree.collect_text(node, &mut out),
        }
        Ok(out)
    }

    /// Replace the node's children with a single text node (none when `text`
    /// is empty). Text and comment nodes have their data replaced.
    pub fn set_text_content(&self, node: NodeId, text: &str) -> DomResult<()> {
        let mut tree = self.inner.borrow_mut();
        match &mut tree.node_mut(node)?.kind {
            NodeKind::Text(data) | NodeKind::Comment(data) => {
                *data = text.to_string();
            }
            _ => {
                tree.clear_children(node)?;
                if !text.is_empty() {
                    let text = tree.alloc(NodeKind::Text(text.to_string()));
                    tree.link(node, text);
                }
            }
        }
        tree.touch(DirtyFlags::TEXT | DirtyFlags::CHILDREN);
        Ok(())
    }

    pub fn inner_html(&self, node: NodeId) -> DomResult<String> {
        let tree = self.inner.borrow();
        tree.node(node)?;
        let mut out = String::new();
        html::serialize(&tree.nodes, node, false, &mut out);
        Ok(out)
    }

    /// Replace the node's children with the parsed fragment.
    pub fn set_inner_html(&self, node: NodeId, markup: &str) -> DomResult<()> {
        let mut tree = self.inner.borrow_mut();
        if !tree.node(node)?.is_container() {
            return Err(DomError::WrongNodeKind {
                node,
                expected: "a container node",
            });
        }
        tree.clear_children(node)?;
        tree.build_parsed(node, html::parse_fragment(markup));
        tree.touch(DirtyFlags::CHILDREN | DirtyFlags::TEXT);
        Ok(())
    }

    pub fn outer_html(&self, node: NodeId) -> DomResult<String> {
        let tree = self.inner.borrow();
        tree.node(node)?;
        let mut out = String::new();
        html::serialize(&tree.nodes, node, true, &mut out);
        Ok(out)
    }

    // Selectors

    /// First descendant of `scope` matching `selector`, in document order.
    pub fn query_selector(&self, scope: NodeId, selector: &str) -> DomResult<Option<NodeId>> {
        profile_function!();
        let selector = SelectorList::parse(selector)?;
        let tree = self.inner.borrow();
        tree.node(scope)?;
        Ok(tree
            .descendants(scope)
            .into_iter()
            .find(|node| selector.matches(&tree.nodes, *node)))
    }

    /// Every descendant of `scope` matching `selector`, in document order.
    pub fn query_selector_all(&self, scope: NodeId, selector: &str) -> DomResult<Vec<NodeId>> {
        profile_function!();
        let selector = SelectorList::parse(selector)?;
        let tree = self.inner.borrow();
        tree.node(scope)?;
        Ok(tree
            .descendants(scope)
            .into_iter()
            .filter(|node| selector.matches(&tree.nodes, *node))
            .collect())
    }

    pub fn matches(&self, node: NodeId, selector: &str) -> DomResult<bool> {
        let selector = SelectorList::parse(selector)?;
        let tree = self.inner.borrow();
        tree.node(node)?;
        Ok(selector.matches(&tree.nodes, node))
    }

    /// First connected element whose `id` attribute equals `id`.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        let tree = self.inner.borrow();
        tree.descendants(tree.root).into_iter().find(|node| {
            tree.nodes
                .try_get(node.0)
                .and_then(Node::as_element)
                .and_then(ElementData::id)
                == Some(id)
        })
    }

    // Geometry

    /// Border box in viewport coordinates. Empty for hidden or detached
    /// nodes.
    pub fn bounding_client_rect(&self, node: NodeId) -> DomResult<LayoutRect> {
        let mut tree = self.inner.borrow_mut();
        let scroll = tree.scroll;
        Ok(tree
            .page_rect(node)?
            .map(|rect| rect.translate(-scroll.x, -scroll.y))
            .unwrap_or(LayoutRect::ZERO))
    }

    /// Border box in page coordinates, if the node is rendered.
    pub fn layout_rect(&self, node: NodeId) -> DomResult<Option<LayoutRect>> {
        self.inner.borrow_mut().page_rect(node)
    }

    pub fn offset_width(&self, node: NodeId) -> DomResult<f32> {
        Ok(self.layout_rect(node)?.map_or(0.0, |rect| rect.width))
    }

    pub fn offset_height(&self, node: NodeId) -> DomResult<f32> {
        Ok(self.layout_rect(node)?.map_or(0.0, |rect| rect.height))
    }

    /// Nearest positioned ancestor, else `body`.
    pub fn offset_parent(&self, node: NodeId) -> DomResult<Option<NodeId>> {
        self.inner.borrow_mut().offset_parent(node)
    }

    pub fn offset_left(&self, node: NodeId) -> DomResult<f32> {
        Ok(self.inner.borrow_mut().offset(node)?.x)
    }

    pub fn offset_top(&self, node: NodeId) -> DomResult<f32> {
        Ok(self.inner.borrow_mut().offset(node)?.y)
    }

    pub fn scroll_position(&self) -> Vec2 {
        self.inner.borrow().scroll
    }

    pub fn set_scroll_position(&self, x: f32, y: f32) {
        self.inner.borrow_mut().scroll = Vec2::new(x, y);
    }

    /// Run layout now if anything invalidated it.
    pub fn update_layout(&self) {
        self.inner.borrow_mut().ensure_layout();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::listener;
    use std::cell::Cell;

    #[test]
    fn test_new_document_shape() {
        let doc = Document::new();
        assert_eq!(doc.node_type(doc.root()).unwrap(), NodeType::Document);
        assert_eq!(doc.children(doc.root()).unwrap(), vec![doc.document_element()]);
        assert_eq!(
            doc.children(doc.document_element()).unwrap(),
            vec![doc.head(), doc.body()]
        );
        assert_eq!(doc.tag_name(doc.body()).unwrap(), "body");
    }

    #[test]
    fn test_create_element_lowercases_and_validates() {
        let doc = Document::new();
        let div = doc.create_element("DIV").unwrap();
        assert_eq!(doc.tag_name(div).unwrap(), "div");
        assert_eq!(
            doc.create_element("not valid"),
            Err(DomError::InvalidName("not valid".into()))
        );
    }

    #[test]
    fn test_append_moves_node() {
        let doc = Document::new();
        let a = doc.create_element("div").unwrap();
        let b = doc.create_element("div").unwrap();
        let child = doc.create_element("span").unwrap();
        doc.append_child(a, child).unwrap();
        doc.append_child(b, child).unwrap();
        assert!(doc.children(a).unwrap().is_empty());
        assert_eq!(doc.children(b).unwrap(), vec![child]);
        assert_eq!(doc.parent(child).unwrap(), Some(b));
    }

    #[test]
    fn test_fragment_children_move() {
        let doc = Document::new();
        let fragment = doc.create_document_fragment();
        let one = doc.create_text_node("1");
        let two = doc.create_text_node("2");
        doc.append_child(fragment, one).unwrap();
        doc.append_child(fragment, two).unwrap();

        let div = doc.create_element("div").unwrap();
        doc.append_child(div, fragment).unwrap();
        assert_eq!(doc.children(div).unwrap(), vec![one, two]);
        assert!(doc.children(fragment).unwrap().is_empty());
        assert_eq!(doc.parent(fragment).unwrap(), None);
    }

    #[test]
    fn test_hierarchy_errors() {
        let doc = Document::new();
        let outer = doc.create_element("div").unwrap();
        let inner = doc.create_element("div").unwrap();
        doc.append_child(outer, inner).unwrap();

        assert!(matches!(
            doc.append_child(inner, outer),
            Err(DomError::HierarchyRequest(_))
        ));
        assert!(matches!(
            doc.append_child(outer, outer),
            Err(DomError::HierarchyRequest(_))
        ));
        let text = doc.create_text_node("x");
        assert!(matches!(
            doc.append_child(text, inner),
            Err(DomError::HierarchyRequest(_))
        ));
        assert!(matches!(
            doc.append_child(outer, doc.root()),
            Err(DomError::HierarchyRequest(_))
        ));
    }

    #[test]
    fn test_insert_before_and_replace() {
        let doc = Document::new();
        let list = doc.create_element("ul").unwrap();
        let a = doc.create_element("li").unwrap();
        let b = doc.create_element("li").unwrap();
        let c = doc.create_element("li").unwrap();
        doc.append_child(list, a).unwrap();
        doc.append_child(list, c).unwrap();
        doc.insert_before(list, b, Some(c)).unwrap();
        assert_eq!(doc.children(list).unwrap(), vec![a, b, c]);

        let d = doc.create_element("li").unwrap();
        doc.replace_child(list, d, b).unwrap();
        assert_eq!(doc.children(list).unwrap(), vec![a, d, c]);
        assert!(doc.is_live(b));
        assert_eq!(doc.parent(b).unwrap(), None);

        assert_eq!(
            doc.remove_child(list, b),
            Err(DomError::NotAChild {
                parent: list,
                child: b
            })
        );
    }

    #[test]
    fn test_release_invalidates_subtree() {
        let doc = Document::new();
        let div = doc.create_element("div").unwrap();
        let text = doc.create_text_node("x");
        doc.append_child(div, text).unwrap();
        doc.append_child(doc.body(), div).unwrap();

        assert!(matches!(doc.release(div), Err(DomError::HierarchyRequest(_))));
        doc.remove(div).unwrap();
        doc.release(div).unwrap();
        assert!(!doc.is_live(div));
        assert_eq!(doc.text_content(text), Err(DomError::StaleNode(text)));
    }

    #[test]
    fn test_mutation_count_increases() {
        let doc = Document::new();
        let before = doc.mutation_count();
        let div = doc.create_element("div").unwrap();
        doc.set_attribute(div, "title", "x").unwrap();
        assert!(doc.mutation_count() >= before + 2);
        let stable = doc.mutation_count();
        doc.get_attribute(div, "title").unwrap();
        doc.outer_html(div).unwrap();
        assert_eq!(doc.mutation_count(), stable);
    }

    #[test]
    fn test_classes() {
        let doc = Document::new();
        let div = doc.create_element("div").unwrap();
        doc.add_class(div, "a b").unwrap();
        doc.add_class(div, "b c").unwrap();
        assert_eq!(doc.get_attribute(div, "class").unwrap().as_deref(), Some("a b c"));
        doc.remove_class(div, "b").unwrap();
        assert!(doc.has_class(div, "a").unwrap());
        assert!(!doc.has_class(div, "b").unwrap());
    }

    #[test]
    fn test_inline_style_and_computed() {
        let doc = Document::new();
        let div = doc.create_element("div").unwrap();
        doc.set_style_property(div, "marginTop", "4px").unwrap();
        doc.set_style_property(div, "display", "none").unwrap();
        assert_eq!(
            doc.get_attribute(div, "style").unwrap().as_deref(),
            Some("margin-top: 4px; display: none;")
        );
        assert_eq!(doc.computed_style(div, "margin-top").unwrap(), "4px");
        assert_eq!(doc.computed_style(div, "padding-left").unwrap(), "0px");

        doc.set_style_property(div, "display", "").unwrap();
        assert_eq!(doc.computed_style(div, "display").unwrap(), "block");
    }

    #[test]
    fn test_dispatch_bubbles_and_stops() {
        let doc = Document::new();
        let outer = doc.create_element("div").unwrap();
        let inner = doc.create_element("button").unwrap();
        doc.append_child(outer, inner).unwrap();

        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        doc.add_event_listener(outer, "click", listener(move |_| counter.set(counter.get() + 1)))
            .unwrap();
        assert_eq!(doc.click(inner).unwrap(), 1);
        assert_eq!(hits.get(), 1);

        let stopper = doc
            .add_event_listener(inner, "click", listener(|event| event.stop_propagation()))
            .unwrap();
        assert_eq!(doc.click(inner).unwrap(), 1);
        assert_eq!(hits.get(), 1);

        assert!(doc.remove_event_listener(inner, "click", stopper).unwrap());
        assert!(!doc.remove_event_listener(inner, "click", stopper).unwrap());
        doc.click(inner).unwrap();
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn test_listener_may_mutate_document() {
        let doc = Document::new();
        let button = doc.create_element("button").unwrap();
        doc.append_child(doc.body(), button).unwrap();
        let handle = doc.clone();
        doc.add_event_listener(
            button,
            "click",
            listener(move |event| {
                handle.set_text_content(event.target(), "clicked").unwrap();
            }),
        )
        .unwrap();
        doc.click(button).unwrap();
        assert_eq!(doc.text_content(button).unwrap(), "clicked");
    }

    #[test]
    fn test_set_text_content_releases_children() {
        let doc = Document::new();
        let div = doc.create_element("div").unwrap();
        let span = doc.create_element("span").unwrap();
        doc.append_child(div, span).unwrap();
        doc.set_text_content(div, "hello").unwrap();
        assert!(!doc.is_live(span));
        assert_eq!(doc.inner_html(div).unwrap(), "hello");
    }

    #[test]
    fn test_inner_html_roundtrip() {
        let doc = Document::new();
        let div = doc.create_element("div").unwrap();
        doc.set_inner_html(div, r#"<p class="x">a &amp; b</p><br>"#).unwrap();
        assert_eq!(doc.inner_html(div).unwrap(), r#"<p class="x">a &amp; b</p><br>"#);
        assert_eq!(doc.text_content(div).unwrap(), "a & b");
    }

    #[test]
    fn test_get_element_by_id_connected_only() {
        let doc = Document::new();
        let div = doc.create_element("div").unwrap();
        doc.set_attribute(div, "id", "x").unwrap();
        assert_eq!(doc.get_element_by_id("x"), None);
        doc.append_child(doc.body(), div).unwrap();
        assert_eq!(doc.get_element_by_id("x"), Some(div));
    }

    #[test]
    fn test_weak_document() {
        let doc = Document::new();
        let weak = doc.downgrade();
        assert_eq!(weak.upgrade(), Some(doc.clone()));
        drop(doc);
        assert!(weak.upgrade().is_none());
    }
}
