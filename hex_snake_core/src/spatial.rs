// Bounded point index: octree and quadtree over arbitrary payloads.
//
// One generic tree, `SpatialTree<P, T>`, parameterized by the point type.
// `P = Vec3` gives an octree (8 children per split), `P = Vec2` a quadtree
// (4 children). Each node is an axis-aligned cube/square `center ± half`.
//
// Nodes live in a flat `Vec` (children of a divided node are contiguous and
// addressed by the index of the first one); payloads live in a second `Vec`
// in insertion order, and leaves store `(point, payload index)` pairs.
//
// Insertion descends from the root. A leaf that already holds `capacity`
// points and still has division budget splits into equal children around its
// center, and its existing points move down into those children, so a divided
// node never holds data directly. A leaf with no budget left keeps
// accumulating. Points outside the root are dropped.
//
// Range queries visit every node whose bounds overlap the query box and test
// each stored point against the box (inclusive on all faces).
//
// See also: `grid.rs`, which indexes hex cells by their `(r, q, s)` triple.

use glam::{Vec2, Vec3};
use std::fmt;

// ---------------------------------------------------------------------------
// Point abstraction
// ---------------------------------------------------------------------------

/// A point type the tree can split space around.
pub trait TreePoint: Copy + fmt::Debug {
    /// Children per division: 2^dimensions.
    const CHILDREN: usize;

    fn splat(v: f32) -> Self;

    /// Inclusive box containment.
    fn within(self, center: Self, half: Self) -> bool;

    /// Whether two boxes share any point (faces included).
    fn boxes_overlap(center_a: Self, half_a: Self, center_b: Self, half_b: Self) -> bool;

    /// Which child of a node centred at `center` a point routes to. Bit `k`
    /// is set when the point is on the positive side of axis `k`.
    fn child_slot(center: Self, point: Self) -> usize;

    /// Center of child `slot` of a node centred at `center`, where `offset`
    /// is the child's half-width.
    fn child_center(center: Self, offset: f32, slot: usize) -> Self;
}

fn signed(offset: f32, slot: usize, axis: usize) -> f32 {
    if slot & (1 << axis) != 0 {
        offset
    } else {
        -offset
    }
}

impl TreePoint for Vec3 {
    const CHILDREN: usize = 8;

    fn splat(v: f32) -> Self {
        Vec3::splat(v)
    }

    fn within(self, center: Self, half: Self) -> bool {
        (self - center).abs().cmple(half).all()
    }

    fn boxes_overlap(center_a: Self, half_a: Self, center_b: Self, half_b: Self) -> bool {
        (center_a - center_b).abs().cmple(half_a + half_b).all()
    }

    fn child_slot(center: Self, point: Self) -> usize {
        usize::from(point.x >= center.x)
            | usize::from(point.y >= center.y) << 1
            | usize::from(point.z >= center.z) << 2
    }

    fn child_center(center: Self, offset: f32, slot: usize) -> Self {
        center
            + Vec3::new(
                signed(offset, slot, 0),
                signed(offset, slot, 1),
                signed(offset, slot, 2),
            )
    }
}

impl TreePoint for Vec2 {
    const CHILDREN: usize = 4;

    fn splat(v: f32) -> Self {
        Vec2::splat(v)
    }

    fn within(self, center: Self, half: Self) -> bool {
        (self - center).abs().cmple(half).all()
    }

    fn boxes_overlap(center_a: Self, half_a: Self, center_b: Self, half_b: Self) -> bool {
        (center_a - center_b).abs().cmple(half_a + half_b).all()
    }

    fn child_slot(center: Self, point: Self) -> usize {
        usize::from(point.x >= center.x) | usize::from(point.y >= center.y) << 1
    }

    fn child_center(center: Self, offset: f32, slot: usize) -> Self {
        center + Vec2::new(signed(offset, slot, 0), signed(offset, slot, 1))
    }
}

// ---------------------------------------------------------------------------
// Query boxes
// ---------------------------------------------------------------------------

/// Axis-aligned box given by center and half-extents.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb<P> {
    pub center: P,
    pub half_extents: P,
}

impl<P: TreePoint> Aabb<P> {
    pub fn from_center_half_extents(center: P, half_extents: P) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    /// Box of the given full edge lengths.
    pub fn from_center_size(center: P, size: P) -> Self
    where
        P: std::ops::Mul<f32, Output = P>,
    {
        Self {
            center,
            half_extents: size * 0.5,
        }
    }

    #[inline]
    pub fn contains_point(&self, point: P) -> bool {
        point.within(self.center, self.half_extents)
    }

    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        P::boxes_overlap(self.center, self.half_extents, other.center, other.half_extents)
    }
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
enum NodeKind<P> {
    Leaf(Vec<(P, usize)>),
    /// Index of the first of `P::CHILDREN` contiguous children.
    Divided(usize),
}

#[derive(Clone, Debug)]
struct Node<P> {
    bounds: Aabb<P>,
    half_width: f32,
    divisions_left: u32,
    kind: NodeKind<P>,
}

/// Point index over payloads of type `T`.
#[derive(Clone, Debug)]
pub struct SpatialTree<P, T> {
    nodes: Vec<Node<P>>,
    data: Vec<T>,
    capacity: usize,
}

pub type Octree<T> = SpatialTree<Vec3, T>;
pub type Quadtree<T> = SpatialTree<Vec2, T>;

impl<P: TreePoint, T> SpatialTree<P, T> {
    /// A tree covering `center ± width / 2` on every axis. Each split spends
    /// one of `max_divisions`; a leaf splits once it holds `capacity` points.
    pub fn new(center: P, width: f32, max_divisions: u32, capacity: usize) -> Self {
        let half_width = width * 0.5;
        let root = Node {
            bounds: Aabb::from_center_half_extents(center, P::splat(half_width)),
            half_width,
            divisions_left: max_divisions,
            kind: NodeKind::Leaf(Vec::new()),
        };
        Self {
            nodes: vec![root],
            data: Vec::new(),
            capacity,
        }
    }

    /// Number of stored payloads.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Total nodes, leaves and interior alike.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn bounds(&self) -> Aabb<P> {
        self.nodes[0].bounds
    }

    /// Payloads in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Store `data` at `point`. Returns `false`, storing nothing, when the
    /// point lies outside the root bounds.
    pub fn insert(&mut self, data: T, point: P) -> bool {
        if !self.nodes[0].bounds.contains_point(point) {
            return false;
        }
        let payload = self.data.len();
        self.data.push(data);

        let mut node = 0;
        loop {
            match &self.nodes[node].kind {
                NodeKind::Divided(first) => {
                    node = first + P::child_slot(self.nodes[node].bounds.center, point);
                }
                NodeKind::Leaf(points) => {
                    if points.len() >= self.capacity && self.nodes[node].divisions_left > 0 {
                        self.subdivide(node);
                        continue;
                    }
                    if let NodeKind::Leaf(points) = &mut self.nodes[node].kind {
                        points.push((point, payload));
                    }
                    return true;
                }
            }
        }
    }

    /// All payloads whose point lies inside `center ± half_extents`.
    pub fn get_data_inside_area(&self, center: P, half_extents: P) -> Vec<&T> {
        self.query(&Aabb::from_center_half_extents(center, half_extents))
    }

    pub fn query(&self, area: &Aabb<P>) -> Vec<&T> {
        let mut found = Vec::new();
        let mut stack = vec![0usize];
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            if !node.bounds.overlaps(area) {
                continue;
            }
            match &node.kind {
                NodeKind::Leaf(points) => {
                    found.extend(
                        points
                            .iter()
                            .filter(|(p, _)| area.contains_point(*p))
                            .map(|&(_, i)| &self.data[i]),
                    );
                }
                NodeKind::Divided(first) => stack.extend(*first..*first + P::CHILDREN),
            }
        }
        found
    }

    fn subdivide(&mut self, idx: usize) {
        let first = self.nodes.len();
        let parent_center = self.nodes[idx].bounds.center;
        let child_half = self.nodes[idx].half_width * 0.5;
        let divisions_left = self.nodes[idx].divisions_left - 1;

        for slot in 0..P::CHILDREN {
            self.nodes.push(Node {
                bounds: Aabb::from_center_half_extents(
                    P::child_center(parent_center, child_half, slot),
                    P::splat(child_half),
                ),
                half_width: child_half,
                divisions_left,
                kind: NodeKind::Leaf(Vec::new()),
            });
        }

        let old = std::mem::replace(&mut self.nodes[idx].kind, NodeKind::Divided(first));
        if let NodeKind::Leaf(points) = old {
            for (point, payload) in points {
                let child = first + P::child_slot(parent_center, point);
                if let NodeKind::Leaf(held) = &mut self.nodes[child].kind {
                    held.push((point, payload));
                }
            }
        }
    }
}

impl<'a, P: TreePoint, T> IntoIterator for &'a SpatialTree<P, T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
