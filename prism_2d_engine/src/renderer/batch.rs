//! Draw-item pool and batch stack.
//!
//! Draw submissions are grouped into `DrawBatch` nodes keyed by render state
//! (graphic, coloring flags, blend mode, smoothing, shader). Nodes live in a
//! `BatchPool` arena shared by all cameras and are addressed by `BatchId`
//! indices; free lists are per-kind stacks of indices, so a released node is
//! never reachable from an active stack and reuse never allocates.
//!
//! Each camera owns a `DrawStack`: an insertion-ordered chain of node ids.
//! Merge-or-allocate only inspects the stack tail — an O(1) heuristic that
//! gives full merging to callers submitting in a state-coherent order and
//! degrades to one batch per call otherwise, without changing output.

use bitflags::bitflags;
use glam::{Affine2, Vec2};
use crate::color::{Color, ColorOffset};
use crate::geom::Rect;
use crate::resource::GraphicKey;

// ============================================================================
// State key
// ============================================================================

bitflags! {
    /// Render-state flags that participate in the batch merge key.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BatchFlags: u8 {
        /// Items carry multiplicative coloring
        const COLOR_MULT = 1 << 0;
        /// Items carry additive color offsets
        const COLOR_OFFSET = 1 << 1;
        /// Sample source texels with bilinear smoothing
        const SMOOTHING = 1 << 2;
    }
}

/// Opaque shader handle. The shader registry belongs to the host; the
/// engine only compares ids for batch mergeability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderId(pub u32);

/// Blend mode applied when compositing a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    #[default]
    Normal,
    Add,
    Multiply,
    Screen,
}

/// Full merge key for a draw batch.
///
/// Two submissions land in the same batch only when their keys are equal
/// AND the batch is the current stack tail (see `DrawStack`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchKey {
    /// Source graphic; `None` for untextured (solid-color) geometry
    pub graphic: Option<GraphicKey>,
    /// Coloring/smoothing flags
    pub flags: BatchFlags,
    /// Blend mode
    pub blend: BlendMode,
    /// Optional shader
    pub shader: Option<ShaderId>,
}

impl BatchKey {
    pub fn new(
        graphic: Option<GraphicKey>,
        flags: BatchFlags,
        blend: BlendMode,
        shader: Option<ShaderId>,
    ) -> Self {
        Self { graphic, flags, blend, shader }
    }
}

// ============================================================================
// Geometry
// ============================================================================

/// Batch kind. Kinds have separate free lists and never convert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    Quad,
    Triangle,
}

/// One quad submission: a source frame, its placement matrix, and its
/// color transform.
#[derive(Debug, Clone, Copy)]
pub struct QuadGeom {
    /// Source frame in texel coordinates of the batch's graphic
    pub source: Rect,
    /// Maps the frame (origin at its top-left, texel-sized) into camera space
    pub matrix: Affine2,
    /// Multiplicative color (identity when the key lacks COLOR_MULT)
    pub color: Color,
    /// Additive offset (zero when the key lacks COLOR_OFFSET)
    pub offset: ColorOffset,
}

/// Accumulated triangle geometry for one batch.
///
/// Positions are camera-space; uvs are normalized to the graphic; colors are
/// per-vertex multipliers (an empty vec means all-white). `bounds` grows with
/// every submission and drives playback culling on the batched backend.
#[derive(Debug, Clone, Default)]
pub struct TriangleGeometry {
    pub positions: Vec<Vec2>,
    pub uvs: Vec<Vec2>,
    pub colors: Vec<Color>,
    pub indices: Vec<u16>,
    pub bounds: Option<Rect>,
}

impl TriangleGeometry {
    /// Number of indexed triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Number of accumulated vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Grow `bounds` to cover `point`.
    pub fn expand_bounds(&mut self, point: Vec2) {
        match &mut self.bounds {
            Some(rect) => rect.expand_to_point(point),
            None => self.bounds = Some(Rect::new(point.x, point.y, 0.0, 0.0)),
        }
    }

    fn clear(&mut self) {
        self.positions.clear();
        self.uvs.clear();
        self.colors.clear();
        self.indices.clear();
        self.bounds = None;
    }
}

/// Geometry buffer of a batch node. The variant matches the node's kind and
/// is fixed for the node's lifetime; clearing retains vector capacity.
#[derive(Debug, Clone)]
pub enum BatchGeometry {
    Quads(Vec<QuadGeom>),
    Triangles(TriangleGeometry),
}

impl BatchGeometry {
    fn clear(&mut self) {
        match self {
            BatchGeometry::Quads(quads) => quads.clear(),
            BatchGeometry::Triangles(tris) => tris.clear(),
        }
    }

    /// Number of submitted items (quads, or indexed triangles).
    pub fn len(&self) -> usize {
        match self {
            BatchGeometry::Quads(quads) => quads.len(),
            BatchGeometry::Triangles(tris) => tris.triangle_count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Pooled node
// ============================================================================

/// Index of a batch node within the pool arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BatchId(u32);

impl BatchId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A pooled node describing one contiguous run of draw operations.
#[derive(Debug)]
pub struct DrawBatch {
    key: BatchKey,
    geometry: BatchGeometry,
    /// Chain of active same-kind nodes, newest first (clear walk)
    next_of_kind: Option<BatchId>,
    /// Global render order (insertion order)
    next_in_stack: Option<BatchId>,
}

impl DrawBatch {
    fn new(kind: BatchKind, key: BatchKey) -> Self {
        let geometry = match kind {
            BatchKind::Quad => BatchGeometry::Quads(Vec::new()),
            BatchKind::Triangle => BatchGeometry::Triangles(TriangleGeometry::default()),
        };
        Self {
            key,
            geometry,
            next_of_kind: None,
            next_in_stack: None,
        }
    }

    pub fn kind(&self) -> BatchKind {
        match self.geometry {
            BatchGeometry::Quads(_) => BatchKind::Quad,
            BatchGeometry::Triangles(_) => BatchKind::Triangle,
        }
    }

    pub fn key(&self) -> &BatchKey {
        &self.key
    }

    pub fn geometry(&self) -> &BatchGeometry {
        &self.geometry
    }

    /// Append one quad. Panics if this is a triangle node; the `DrawStack`
    /// acquire methods keep kinds and nodes paired.
    pub fn push_quad(&mut self, quad: QuadGeom) {
        match &mut self.geometry {
            BatchGeometry::Quads(quads) => quads.push(quad),
            BatchGeometry::Triangles(_) => unreachable!("quad pushed into a triangle batch"),
        }
    }

    /// Mutable triangle buffer. Panics if this is a quad node.
    pub fn triangles_mut(&mut self) -> &mut TriangleGeometry {
        match &mut self.geometry {
            BatchGeometry::Triangles(tris) => tris,
            BatchGeometry::Quads(_) => unreachable!("triangle access on a quad batch"),
        }
    }

    pub fn next_in_stack(&self) -> Option<BatchId> {
        self.next_in_stack
    }

    /// Re-arm a recycled node: new key, no links. Geometry was already
    /// cleared on release, so the buffer is empty here.
    fn rearm(&mut self, key: BatchKey) {
        self.key = key;
        self.next_of_kind = None;
        self.next_in_stack = None;
    }
}

// ============================================================================
// Pool
// ============================================================================

/// Arena of batch nodes with per-kind free-index stacks.
///
/// Shared by every camera through the `RenderContext`. Checkout pops a free
/// index (or grows the arena on first need); release clears the node's
/// geometry and pushes the index back. Steady-state frames allocate nothing.
pub struct BatchPool {
    nodes: Vec<DrawBatch>,
    free_quads: Vec<BatchId>,
    free_triangles: Vec<BatchId>,
}

impl BatchPool {
    /// Create a new empty pool
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free_quads: Vec::new(),
            free_triangles: Vec::new(),
        }
    }

    /// Take a node of `kind` out of the pool, keyed and empty.
    pub fn checkout(&mut self, kind: BatchKind, key: BatchKey) -> BatchId {
        let free = match kind {
            BatchKind::Quad => &mut self.free_quads,
            BatchKind::Triangle => &mut self.free_triangles,
        };
        match free.pop() {
            Some(id) => {
                self.nodes[id.index()].rearm(key);
                id
            }
            None => {
                let id = BatchId(self.nodes.len() as u32);
                self.nodes.push(DrawBatch::new(kind, key));
                id
            }
        }
    }

    /// Return a node to its kind's free list, clearing its geometry.
    ///
    /// The caller must have unlinked the node from any active stack first;
    /// `DrawStack::clear` is the only call site in the engine.
    pub fn release(&mut self, id: BatchId) {
        let node = &mut self.nodes[id.index()];
        node.geometry.clear();
        node.next_of_kind = None;
        node.next_in_stack = None;
        match node.kind() {
            BatchKind::Quad => self.free_quads.push(id),
            BatchKind::Triangle => self.free_triangles.push(id),
        }
    }

    pub fn get(&self, id: BatchId) -> &DrawBatch {
        &self.nodes[id.index()]
    }

    pub fn get_mut(&mut self, id: BatchId) -> &mut DrawBatch {
        &mut self.nodes[id.index()]
    }

    /// Total nodes ever allocated (arena size).
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Currently free nodes of `kind`.
    pub fn free_count(&self, kind: BatchKind) -> usize {
        match kind {
            BatchKind::Quad => self.free_quads.len(),
            BatchKind::Triangle => self.free_triangles.len(),
        }
    }
}

impl Default for BatchPool {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Per-camera stack
// ============================================================================

/// Insertion-ordered stack of batch ids, one per camera.
///
/// Playback must follow insertion order exactly — transparency compositing
/// is order-dependent, so equal-key non-adjacent batches are never merged
/// or reordered.
#[derive(Debug, Default)]
pub struct DrawStack {
    head: Option<BatchId>,
    tail: Option<BatchId>,
    quad_head: Option<BatchId>,
    triangle_head: Option<BatchId>,
}

impl DrawStack {
    /// Create a new empty stack
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Current tail id, if any.
    pub fn tail(&self) -> Option<BatchId> {
        self.tail
    }

    /// Batch ready to receive quad geometry for `key`.
    ///
    /// Returns the tail unchanged when it already matches (merge), else
    /// checks a node out of the pool and links it at the stack tail.
    pub fn acquire_quad_batch(&mut self, pool: &mut BatchPool, key: BatchKey) -> BatchId {
        self.acquire(pool, BatchKind::Quad, key)
    }

    /// Batch ready to receive triangle geometry for `key`.
    pub fn acquire_triangle_batch(&mut self, pool: &mut BatchPool, key: BatchKey) -> BatchId {
        self.acquire(pool, BatchKind::Triangle, key)
    }

    fn acquire(&mut self, pool: &mut BatchPool, kind: BatchKind, key: BatchKey) -> BatchId {
        // Merge-or-allocate looks at the tail only.
        if let Some(tail) = self.tail {
            let node = pool.get(tail);
            if node.kind() == kind && *node.key() == key {
                return tail;
            }
        }

        let id = pool.checkout(kind, key);

        // Link render order.
        match self.tail {
            Some(tail) => pool.get_mut(tail).next_in_stack = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);

        // Link kind chain (newest first).
        let kind_head = match kind {
            BatchKind::Quad => &mut self.quad_head,
            BatchKind::Triangle => &mut self.triangle_head,
        };
        pool.get_mut(id).next_of_kind = kind_head.take();
        *kind_head = Some(id);

        id
    }

    /// Iterate ids in render (insertion) order.
    pub fn iter<'p>(&self, pool: &'p BatchPool) -> StackIter<'p> {
        StackIter { pool, next: self.head }
    }

    /// Number of batches in the stack.
    pub fn len(&self, pool: &BatchPool) -> usize {
        self.iter(pool).count()
    }

    /// Return every node to the pool and forget all links.
    ///
    /// Linear in the number of batches. Must run exactly once per camera per
    /// frame, after playback and before the next frame's first acquire.
    pub fn clear(&mut self, pool: &mut BatchPool) {
        let mut next = self.quad_head.take();
        while let Some(id) = next {
            next = pool.get(id).next_of_kind;
            pool.release(id);
        }
        let mut next = self.triangle_head.take();
        while let Some(id) = next {
            next = pool.get(id).next_of_kind;
            pool.release(id);
        }
        self.head = None;
        self.tail = None;
    }
}

/// Iterator over a stack's ids in render order.
pub struct StackIter<'p> {
    pool: &'p BatchPool,
    next: Option<BatchId>,
}

impl<'p> Iterator for StackIter<'p> {
    type Item = (BatchId, &'p DrawBatch);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let node = self.pool.get(id);
        self.next = node.next_in_stack();
        Some((id, node))
    }
}

#[cfg(test)]
#[path = "batch_tests.rs"]
mod tests;
