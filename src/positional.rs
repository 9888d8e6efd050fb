//! Anchor/offset position hierarchy.
//!
//! Nodes live in an arena. A root stores an absolute anchor; every other node
//! stores an offset from its parent and derives its position by walking up
//! to the root. Parents own their children: removing a node removes its
//! subtree.

use slotmap::{SlotMap, new_key_type};

use crate::error::{PhysicsError, Result};
use crate::types::{Point, Vector};

new_key_type! {
    /// Handle to a node in [`Positions`].
    pub struct PositionKey;
}

#[derive(Clone, Debug)]
struct Node {
    /// Set on roots only.
    anchor: Option<Point>,
    offset: Vector,
    parent: Option<PositionKey>,
    children: Vec<PositionKey>,
}

/// Arena of positional nodes.
#[derive(Clone, Debug, Default)]
pub struct Positions {
    nodes: SlotMap<PositionKey, Node>,
}

impl Positions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, key: PositionKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// New root anchored at `anchor` with a zero offset.
    pub fn insert_root(&mut self, anchor: Point) -> PositionKey {
        self.nodes.insert(Node { anchor: Some(anchor), offset: Vector::ZERO, parent: None, children: Vec::new() })
    }

    /// New node `offset` away from `parent`.
    pub fn insert_child(&mut self, parent: PositionKey, offset: Vector) -> Result<PositionKey> {
        if !self.nodes.contains_key(parent) {
            return Err(PhysicsError::PositionNotFound(parent));
        }
        let key = self.nodes.insert(Node { anchor: None, offset, parent: Some(parent), children: Vec::new() });
        self.node_mut(parent)?.children.push(key);
        Ok(key)
    }

    /// Removes `key` and everything beneath it.
    pub fn remove(&mut self, key: PositionKey) -> Result<()> {
        let parent = self.node(key)?.parent;
        if let Some(parent) = parent {
            self.node_mut(parent)?.children.retain(|&c| c != key);
        }
        let mut stack = vec![key];
        while let Some(k) = stack.pop() {
            if let Some(node) = self.nodes.remove(k) {
                stack.extend(node.children);
            }
        }
        Ok(())
    }

    pub fn parent(&self, key: PositionKey) -> Result<Option<PositionKey>> {
        Ok(self.node(key)?.parent)
    }

    pub fn children(&self, key: PositionKey) -> Result<&[PositionKey]> {
        Ok(&self.node(key)?.children)
    }

    /// `anchor + absolute offset`.
    pub fn position(&self, key: PositionKey) -> Result<Point> {
        Ok(self.anchor(key)? + self.absolute_offset(key)?)
    }

    /// The root's anchor.
    pub fn anchor(&self, key: PositionKey) -> Result<Point> {
        let root = self.root_of(key)?;
        let node = self.node(root)?;
        assert!(node.anchor.is_some(), "root position node without an anchor");
        Ok(node.anchor.unwrap_or_default())
    }

    /// Own offset relative to the parent (or the anchor, for a root).
    pub fn offset(&self, key: PositionKey) -> Result<Vector> {
        Ok(self.node(key)?.offset)
    }

    /// Sum of offsets from the root down to and including `key`.
    pub fn absolute_offset(&self, key: PositionKey) -> Result<Vector> {
        let mut total = Vector::ZERO;
        let mut cur = Some(key);
        while let Some(k) = cur {
            let node = self.node(k)?;
            total += node.offset;
            cur = node.parent;
        }
        Ok(total)
    }

    /// Places `key` at `position`, keeping the rest of its chain where it is.
    pub fn set_position(&mut self, key: PositionKey, position: Point) -> Result<()> {
        match self.node(key)?.parent {
            None => {
                let offset = self.node(key)?.offset;
                self.node_mut(key)?.anchor = Some(position - offset);
            }
            Some(parent) => {
                let base = self.anchor(parent)? + self.absolute_offset(parent)?;
                self.node_mut(key)?.offset = base.vec_to(position);
            }
        }
        Ok(())
    }

    /// Replaces a root's anchor.
    ///
    /// # Panics
    /// Panics if `key` has a parent; only roots carry an anchor.
    pub fn set_anchor(&mut self, key: PositionKey, anchor: Point) -> Result<()> {
        let node = self.node_mut(key)?;
        assert!(node.parent.is_none(), "set_anchor on a parented position node");
        node.anchor = Some(anchor);
        Ok(())
    }

    pub fn set_offset(&mut self, key: PositionKey, offset: Vector) -> Result<()> {
        self.node_mut(key)?.offset = offset;
        Ok(())
    }

    /// Shifts `key` (and so its subtree) by `v` through its own offset.
    pub fn move_by(&mut self, key: PositionKey, v: Vector) -> Result<()> {
        self.node_mut(key)?.offset += v;
        Ok(())
    }

    /// Parents a root under `parent` without moving it in world space.
    pub fn attach(&mut self, child: PositionKey, parent: PositionKey) -> Result<()> {
        if self.node(child)?.parent.is_some() {
            return Err(PhysicsError::AlreadyParented(child));
        }
        // Walking up from `parent` must never reach `child`.
        let mut cur = Some(parent);
        while let Some(k) = cur {
            if k == child {
                return Err(PhysicsError::CyclicParent { child, parent });
            }
            cur = self.node(k)?.parent;
        }

        let world = self.position(child)?;
        let base = self.anchor(parent)? + self.absolute_offset(parent)?;
        self.node_mut(parent)?.children.push(child);
        let node = self.node_mut(child)?;
        node.parent = Some(parent);
        node.anchor = None;
        node.offset = base.vec_to(world);
        Ok(())
    }

    /// Turns `key` into a root without moving it in world space.
    pub fn detach(&mut self, key: PositionKey) -> Result<()> {
        let Some(parent) = self.node(key)?.parent else {
            return Ok(());
        };
        let world = self.position(key)?;
        self.node_mut(parent)?.children.retain(|&c| c != key);
        let node = self.node_mut(key)?;
        node.parent = None;
        node.anchor = Some(world - node.offset);
        Ok(())
    }

    fn root_of(&self, key: PositionKey) -> Result<PositionKey> {
        let mut cur = key;
        while let Some(parent) = self.node(cur)?.parent {
            cur = parent;
        }
        Ok(cur)
    }

    fn node(&self, key: PositionKey) -> Result<&Node> {
        self.nodes.get(key).ok_or(PhysicsError::PositionNotFound(key))
    }

    fn node_mut(&mut self, key: PositionKey) -> Result<&mut Node> {
        self.nodes.get_mut(key).ok_or(PhysicsError::PositionNotFound(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_root_position_is_anchor_plus_offset() {
        let mut p = Positions::new();
        let root = p.insert_root(Point::new(1.0, 2.0));
        assert_eq!(p.position(root).unwrap(), Point::new(1.0, 2.0));
        p.move_by(root, Vector::new(3.0, 0.0)).unwrap();
        assert_eq!(p.offset(root).unwrap(), Vector::new(3.0, 0.0));
        assert_eq!(p.anchor(root).unwrap(), Point::new(1.0, 2.0));
        assert_eq!(p.position(root).unwrap(), Point::new(4.0, 2.0));

        p.set_position(root, Point::new(10.0, 10.0)).unwrap();
        assert_eq!(p.anchor(root).unwrap(), Point::new(7.0, 10.0));
        assert_eq!(p.position(root).unwrap(), Point::new(10.0, 10.0));
    }

    #[test]
    fn test_children_follow_parent() {
        let mut p = Positions::new();
        let root = p.insert_root(Point::new(0.0, 0.0));
        let child = p.insert_child(root, Vector::new(1.0, 1.0)).unwrap();
        let grandchild = p.insert_child(child, Vector::new(0.0, 2.0)).unwrap();
        assert_eq!(p.position(grandchild).unwrap(), Point::new(1.0, 3.0));

        p.move_by(root, Vector::new(5.0, 0.0)).unwrap();
        assert_eq!(p.position(child).unwrap(), Point::new(6.0, 1.0));
        assert_eq!(p.position(grandchild).unwrap(), Point::new(6.0, 3.0));
        assert_eq!(p.anchor(grandchild).unwrap(), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_parented_move_and_set_position_touch_offset_only() {
        let mut p = Positions::new();
        let root = p.insert_root(Point::new(2.0, 2.0));
        let child = p.insert_child(root, Vector::new(1.0, 0.0)).unwrap();

        p.move_by(child, Vector::new(0.0, 4.0)).unwrap();
        assert_eq!(p.offset(child).unwrap(), Vector::new(1.0, 4.0));
        assert_eq!(p.position(root).unwrap(), Point::new(2.0, 2.0));

        p.set_position(child, Point::new(0.0, 0.0)).unwrap();
        assert_eq!(p.offset(child).unwrap(), Vector::new(-2.0, -2.0));
        assert_eq!(p.position(child).unwrap(), Point::new(0.0, 0.0));
        assert_eq!(p.position(root).unwrap(), Point::new(2.0, 2.0));
    }

    #[test]
    #[should_panic(expected = "set_anchor on a parented")]
    fn test_set_anchor_on_child_panics() {
        let mut p = Positions::new();
        let root = p.insert_root(Point::ORIGIN);
        let child = p.insert_child(root, Vector::ZERO).unwrap();
        let _ = p.set_anchor(child, Point::new(1.0, 1.0));
    }

    #[test]
    fn test_attach_detach_preserve_world_position() {
        let mut p = Positions::new();
        let a = p.insert_root(Point::new(10.0, 0.0));
        let b = p.insert_root(Point::new(3.0, 4.0));
        p.attach(b, a).unwrap();
        assert_eq!(p.parent(b).unwrap(), Some(a));
        assert_eq!(p.children(a).unwrap(), &[b]);
        assert_eq!(p.position(b).unwrap(), Point::new(3.0, 4.0));
        assert_eq!(p.offset(b).unwrap(), Vector::new(-7.0, 4.0));

        p.move_by(a, Vector::new(1.0, 0.0)).unwrap();
        assert_eq!(p.position(b).unwrap(), Point::new(4.0, 4.0));

        p.detach(b).unwrap();
        assert_eq!(p.parent(b).unwrap(), None);
        assert!(p.children(a).unwrap().is_empty());
        assert_eq!(p.position(b).unwrap(), Point::new(4.0, 4.0));
        p.set_anchor(b, Point::ORIGIN).unwrap();
    }

    #[test]
    fn test_attach_rejects_cycles_and_double_parent() {
        let mut p = Positions::new();
        let root = p.insert_root(Point::ORIGIN);
        let child = p.insert_child(root, Vector::UNIT_X).unwrap();
        assert_eq!(p.attach(child, root), Err(PhysicsError::AlreadyParented(child)));
        assert_eq!(p.attach(root, child), Err(PhysicsError::CyclicParent { child: root, parent: child }));
        assert_eq!(p.attach(root, root), Err(PhysicsError::CyclicParent { child: root, parent: root }));
    }

    #[test]
    fn test_remove_drops_subtree() {
        let mut p = Positions::new();
        let root = p.insert_root(Point::ORIGIN);
        let child = p.insert_child(root, Vector::UNIT_X).unwrap();
        let leaf = p.insert_child(child, Vector::UNIT_Y).unwrap();
        let sibling = p.insert_child(root, Vector::UNIT_Y).unwrap();
        p.remove(child).unwrap();
        assert!(!p.contains(child));
        assert!(!p.contains(leaf));
        assert_eq!(p.children(root).unwrap(), &[sibling]);
        assert_eq!(p.position(leaf), Err(PhysicsError::PositionNotFound(leaf)));
        assert_eq!(p.len(), 2);
    }

    proptest! {
        #[test]
        fn prop_chain_position_is_anchor_plus_offsets(
            anchor in (-100.0f64..100.0, -100.0f64..100.0),
            offsets in prop::collection::vec((-10.0f64..10.0, -10.0f64..10.0), 1..12),
        ) {
            let mut p = Positions::new();
            let root = p.insert_root(Point::new(anchor.0, anchor.1));
            let mut expected = Point::new(anchor.0, anchor.1);
            let mut cur = root;
            for (x, y) in offsets {
                cur = p.insert_child(cur, Vector::new(x, y)).unwrap();
                expected += Vector::new(x, y);
            }
            let got = p.position(cur).unwrap();
            assert_relative_eq!(got.x(), expected.x(), epsilon = 1e-9);
            assert_relative_eq!(got.y(), expected.y(), epsilon = 1e-9);
        }
    }
}
