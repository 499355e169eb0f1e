use super::node::XmlNodeData;
use super::xname::XName;
use indextree::{Arena, NodeId};

#[derive(Debug)]
pub struct XmlDocument {
    arena: Arena<XmlNodeData>,
    root: Option<NodeId>,
}

impl XmlDocument {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&XmlNodeData> {
        self.arena.get(id).map(|node| node.get())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut XmlNodeData> {
        self.arena.get_mut(id).map(|node| node.get_mut())
    }

    pub fn add_root(&mut self, data: XmlNodeData) -> NodeId {
        let id = self.arena.new_node(data);
        self.root = Some(id);
        id
    }

    pub fn add_child(&mut self, parent: NodeId, data: XmlNodeData) -> NodeId {
        let child = self.arena.new_node(data);
        parent.append(child, &mut self.arena);
        child
    }

    pub fn add_first_child(&mut self, parent: NodeId, data: XmlNodeData) -> NodeId {
        let child = self.arena.new_node(data);
        parent.prepend(child, &mut self.arena);
        child
    }

    pub fn add_before(&mut self, sibling: NodeId, data: XmlNodeData) -> NodeId {
        let new_node = self.arena.new_node(data);
        sibling.insert_before(new_node, &mut self.arena);
        new_node
    }

    pub fn add_after(&mut self, sibling: NodeId, data: XmlNodeData) -> NodeId {
        let new_node = self.arena.new_node(data);
        sibling.insert_after(new_node, &mut self.arena);
        new_node
    }

    /// Removes a node together with its whole subtree.
    pub fn remove(&mut self, node: NodeId) {
        node.remove_subtree(&mut self.arena);
    }

    pub fn detach(&mut self, node: NodeId) {
        node.detach(&mut self.arena);
    }

    pub fn append_existing(&mut self, parent: NodeId, child: NodeId) {
        parent.append(child, &mut self.arena);
    }

    pub fn insert_existing_after(&mut self, sibling: NodeId, node: NodeId) {
        sibling.insert_after(node, &mut self.arena);
    }

    /// Copies a subtree into new, detached nodes and returns the copy's root.
    pub fn deep_clone(&mut self, source: NodeId) -> Option<NodeId> {
        let data = self.get(source)?.clone();
        let copy_root = self.arena.new_node(data);
        let mut stack = vec![(source, copy_root)];
        while let Some((from, to)) = stack.pop() {
            let children: Vec<NodeId> = self.children(from).collect();
            for child in children {
                let Some(child_data) = self.get(child).cloned() else {
                    continue;
                };
                let new_child = self.arena.new_node(child_data);
                to.append(new_child, &mut self.arena);
                stack.push((child, new_child));
            }
        }
        Some(copy_root)
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &XName, value: &str) {
        if let Some(node_data) = self.get_mut(node) {
            node_data.set_attr(name, value);
        }
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &XName) {
        if let Some(node_data) = self.get_mut(node) {
            node_data.remove_attr(name);
        }
    }

    /// Value of an attribute with no namespace, e.g. `id` or `typeface`.
    pub fn attr(&self, node: NodeId, local_name: &str) -> Option<&str> {
        self.get(node)?
            .attributes()?
            .iter()
            .find(|a| a.name.namespace.is_none() && a.name.local_name == local_name)
            .map(|a| a.value.as_str())
    }

    pub fn attr_ns(&self, node: NodeId, name: &XName) -> Option<&str> {
        self.get(node)?.attr(name)
    }

    pub fn name(&self, node: NodeId) -> Option<&XName> {
        self.get(node)?.name()
    }

    pub fn is(&self, node: NodeId, name: &XName) -> bool {
        self.name(node).map(|n| n == name).unwrap_or(false)
    }

    /// Text of a direct text child, if any.
    pub fn text(&self, node: NodeId) -> Option<&str> {
        self.get(node)?.text_content()
    }

    /// Concatenated text of all text descendants.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut text = String::new();
        for id in self.descendants(node) {
            if let Some(content) = self.get(id).and_then(|d| d.text_content()) {
                text.push_str(content);
            }
        }
        text
    }

    pub fn children(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        parent.children(&self.arena)
    }

    pub fn child_elements(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(parent)
            .filter(move |&id| self.get(id).map(|d| d.is_element()).unwrap_or(false))
    }

    pub fn descendants(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        node.descendants(&self.arena)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.arena.get(node)?.parent()
    }

    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        node.ancestors(&self.arena)
    }

    pub fn elements_by_name<'a>(
        &'a self,
        parent: NodeId,
        name: &'a XName,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.children(parent).filter(move |&child_id| {
            self.get(child_id)
                .and_then(|data| data.name())
                .map(|n| n == name)
                .unwrap_or(false)
        })
    }

    pub fn first_child(&self, parent: NodeId, name: &XName) -> Option<NodeId> {
        self.elements_by_name(parent, name).next()
    }

    /// Follows a path of element names from `start`, taking the first match at each step.
    pub fn find_path(&self, start: NodeId, path: &[XName]) -> Option<NodeId> {
        path.iter()
            .try_fold(start, |current, name| self.first_child(current, name))
    }

    pub fn descendants_by_name<'a>(
        &'a self,
        node: NodeId,
        name: &'a XName,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.descendants(node).filter(move |&id| self.is(id, name))
    }

    /// Returns the existing child named `name`, or creates it at the position
    /// dictated by `order` (the local names of the parent's schema sequence).
    pub fn ensure_child(&mut self, parent: NodeId, name: &XName, order: &[&str]) -> NodeId {
        if let Some(existing) = self.first_child(parent, name) {
            return existing;
        }
        self.insert_in_order(parent, XmlNodeData::element(name.clone()), order)
    }

    /// Inserts a new element before the first sibling that must follow it in `order`.
    pub fn insert_in_order(&mut self, parent: NodeId, data: XmlNodeData, order: &[&str]) -> NodeId {
        let rank = |local: &str| order.iter().position(|n| *n == local);
        let new_rank = data
            .name()
            .and_then(|n| rank(&n.local_name))
            .unwrap_or(order.len());

        let successor = self.child_elements(parent).find(|&child| {
            self.name(child)
                .and_then(|n| rank(&n.local_name))
                .map(|r| r > new_rank)
                .unwrap_or(false)
        });

        match successor {
            Some(next) => self.add_before(next, data),
            None => self.add_child(parent, data),
        }
    }
}

impl Default for XmlDocument {
    fn default() -> Self {
        Self::new()
    }
}
