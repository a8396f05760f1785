//! Mesh block: node properties and the field set of one structured block.

use super::coordinates::Coordinates;
use super::shape::{BlockShape, IndexRange};
use crate::boundary::SurfaceBoundary;
use crate::error::{LbmError, Result};
use crate::field::{ComponentField, DistributionField, MacroVarField};
use crate::geometry::{classify_node, GeometryTag, VertexType};
use crate::lattice::Lattice;
use crate::types::{BlockIndex, DirectionIndex, MacroVarIndex, NodeIndex};

/// Per-node classification, fixed after setup.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeProperties {
    vertex: Vec<VertexType>,
    tag: Vec<GeometryTag>,
    owner: Vec<Option<usize>>,
    bulk: Vec<bool>,
}

impl NodeProperties {
    fn new(shape: &BlockShape) -> Self {
        let n = shape.n_nodes();
        let bulk = (0..n)
            .map(|i| shape.in_bulk(shape.position(NodeIndex::new(i))))
            .collect();
        Self {
            vertex: vec![VertexType::Fluid; n],
            tag: vec![GeometryTag::Interior; n],
            owner: vec![None; n],
            bulk,
        }
    }

    /// Vertex type of a node.
    #[inline]
    pub fn vertex(&self, node: NodeIndex) -> VertexType {
        self.vertex[node]
    }

    /// Geometry tag of a node.
    #[inline]
    pub fn tag(&self, node: NodeIndex) -> GeometryTag {
        self.tag[node]
    }

    /// Surface boundary owning a node, by definition index.
    #[inline]
    pub fn owner(&self, node: NodeIndex) -> Option<usize> {
        self.owner[node]
    }

    /// Whether a node is owned (not halo).
    #[inline]
    pub fn in_bulk(&self, node: NodeIndex) -> bool {
        self.bulk[node]
    }

    /// Whether the kernels update a node: owned and not solid.
    #[inline]
    pub fn is_active(&self, node: NodeIndex) -> bool {
        self.bulk[node] && !self.vertex[node].is_solid()
    }
}

/// One structured block with its fields.
#[derive(Clone, Debug)]
pub struct Block {
    pub(crate) index: BlockIndex,
    pub(crate) shape: BlockShape,
    pub(crate) coordinates: Coordinates,
    pub(crate) nodes: NodeProperties,
    pub(crate) surfaces: Vec<SurfaceBoundary>,
    pub(crate) offsets: Vec<isize>,
    pub(crate) f: DistributionField,
    pub(crate) f_stage: DistributionField,
    pub(crate) feq: DistributionField,
    pub(crate) body_force: DistributionField,
    pub(crate) macro_vars: MacroVarField,
    pub(crate) macro_snapshot: MacroVarField,
    pub(crate) tau: ComponentField,
}

impl Block {
    /// Allocate an all-fluid block.
    pub fn new(
        index: BlockIndex,
        shape: BlockShape,
        coordinates: Coordinates,
        lattice: &Lattice,
    ) -> Result<Self> {
        if shape.dimension() != lattice.dimension() {
            return Err(LbmError::DimensionMismatch {
                context: "block dimension",
                expected: lattice.dimension(),
                actual: shape.dimension(),
            });
        }
        let n = shape.n_nodes();
        let q = lattice.n_directions();
        let offsets = lattice
            .velocities()
            .iter()
            .map(|c| shape.linear_offset(*c))
            .collect();

        Ok(Self {
            index,
            nodes: NodeProperties::new(&shape),
            shape,
            coordinates,
            surfaces: Vec::new(),
            offsets,
            f: DistributionField::zeros(n, q),
            f_stage: DistributionField::zeros(n, q),
            feq: DistributionField::zeros(n, q),
            body_force: DistributionField::zeros(n, q),
            macro_vars: MacroVarField::zeros(n, lattice.n_macro_vars()),
            macro_snapshot: MacroVarField::zeros(n, lattice.n_macro_vars()),
            tau: ComponentField::zeros(n, lattice.n_components()),
        })
    }

    // =========================================================================
    // Setup
    // =========================================================================

    /// Mark owned cells as immersed solid. `solid` receives positions
    /// relative to the first owned cell.
    pub fn mark_solid<F>(&mut self, solid: F)
    where
        F: Fn([usize; 3]) -> bool,
    {
        for p in self.shape.bulk().iter() {
            if solid(self.local_position(p)) {
                let node = self.shape.node_index(p);
                self.nodes.vertex[node] = VertexType::ImmersedSolid;
            }
        }
    }

    /// Attach a boundary condition to a surface.
    ///
    /// Nodes shared with earlier surfaces (edges, corners) are taken over by
    /// this one. Solid nodes are left alone.
    pub fn assign_surface(&mut self, boundary: SurfaceBoundary) -> Result<()> {
        let range = self.shape.surface(boundary.surface).ok_or_else(|| {
            LbmError::invalid_config(format!(
                "surface {:?} does not exist in a {}D block",
                boundary.surface,
                self.shape.dimension()
            ))
        })?;
        let id = self.surfaces.len();
        let vertex = boundary.condition.vertex_type();
        for p in range.iter() {
            let node = self.shape.node_index(p);
            if !self.nodes.vertex[node].is_solid() {
                self.nodes.vertex[node] = vertex;
                self.nodes.owner[node] = Some(id);
            }
        }
        self.surfaces.push(boundary);
        Ok(())
    }

    /// Turn fluid nodes with a solid lattice neighbour into immersed-boundary
    /// nodes.
    pub fn mark_immersed_boundaries(&mut self, lattice: &Lattice, connected: [bool; 3]) {
        let mut marked = Vec::new();
        for p in self.shape.bulk().iter() {
            let node = self.shape.node_index(p);
            if self.nodes.vertex[node] != VertexType::Fluid {
                continue;
            }
            let touches_solid = lattice.velocities().iter().any(|c| {
                self.shape
                    .wrap(p, *c, connected)
                    .is_some_and(|q| self.nodes.vertex[self.shape.node_index(q)].is_solid())
            });
            if touches_solid {
                marked.push(node);
            }
        }
        for node in marked {
            self.nodes.vertex[node] = VertexType::ImmersedBoundary;
        }
    }

    /// Assign geometry tags to every owned boundary node.
    ///
    /// Neighbours outside the owned cells count as missing unless their axis
    /// is flagged in `connected` (halo filled by an exchange).
    pub fn classify(&mut self, lattice: &Lattice, connected: [bool; 3]) -> Result<usize> {
        let mut n_tagged = 0;
        for p in self.shape.bulk().iter() {
            let node = self.shape.node_index(p);
            if !self.nodes.vertex[node].is_boundary() {
                continue;
            }
            let present = |c: [i32; 3]| {
                self.shape
                    .wrap(p, c, connected)
                    .is_some_and(|q| !self.nodes.vertex[self.shape.node_index(q)].is_solid())
            };
            let tag = classify_node(self.shape.dimension(), lattice.velocities(), present)
                .map_err(|reason| LbmError::geometry(self.index, self.local_position(p), reason))?;
            self.nodes.tag[node] = tag;
            if tag != GeometryTag::Interior {
                n_tagged += 1;
            }
        }
        Ok(n_tagged)
    }

    /// Copy vertex types and tags of owned cells into the halo cells that
    /// image them along the `connected` axes.
    ///
    /// Halo cells across a non-connected axis keep the fluid default.
    pub fn mirror_halo_properties(&mut self, connected: [bool; 3]) {
        for p in self.shape.whole().iter() {
            if self.shape.in_bulk(p) {
                continue;
            }
            let Some(image) = self.shape.wrap(p, [0; 3], connected) else {
                continue;
            };
            let (node, src) = (self.shape.node_index(p), self.shape.node_index(image));
            self.nodes.vertex[node] = self.nodes.vertex[src];
            self.nodes.tag[node] = self.nodes.tag[src];
        }
    }

    fn local_position(&self, p: [usize; 3]) -> [usize; 3] {
        std::array::from_fn(|axis| p[axis] - self.shape.lo(axis))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Block index in its grid.
    pub fn index(&self) -> BlockIndex {
        self.index
    }

    /// Block shape.
    pub fn shape(&self) -> &BlockShape {
        &self.shape
    }

    /// Node coordinates.
    pub fn coordinates(&self) -> &Coordinates {
        &self.coordinates
    }

    /// Node classification.
    pub fn nodes(&self) -> &NodeProperties {
        &self.nodes
    }

    /// Surface boundaries in definition order.
    pub fn surfaces(&self) -> &[SurfaceBoundary] {
        &self.surfaces
    }

    /// Linear-index shift of every lattice velocity.
    pub fn direction_offsets(&self) -> &[isize] {
        &self.offsets
    }

    /// Node index of a position relative to the first owned cell.
    pub fn node_at(&self, local: [usize; 3]) -> NodeIndex {
        self.shape
            .node_index(std::array::from_fn(|axis| local[axis] + self.shape.lo(axis)))
    }

    /// Working distribution field.
    pub fn f(&self) -> &DistributionField {
        &self.f
    }

    /// Mutable working distribution field.
    pub fn f_mut(&mut self) -> &mut DistributionField {
        &mut self.f
    }

    /// Staging field (post-collision or gradient values).
    pub fn f_stage(&self) -> &DistributionField {
        &self.f_stage
    }

    /// Mutable staging field.
    pub fn f_stage_mut(&mut self) -> &mut DistributionField {
        &mut self.f_stage
    }

    /// Equilibrium field.
    pub fn feq(&self) -> &DistributionField {
        &self.feq
    }

    /// Body-force field.
    pub fn body_force(&self) -> &DistributionField {
        &self.body_force
    }

    /// Macroscopic variables.
    pub fn macro_vars(&self) -> &MacroVarField {
        &self.macro_vars
    }

    /// Relaxation times.
    pub fn tau(&self) -> &ComponentField {
        &self.tau
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Sum of all distributions over the active nodes.
    pub fn total_mass(&self) -> f64 {
        let q = self.f.width();
        self.f
            .as_slice()
            .chunks(q)
            .enumerate()
            .filter(|(i, _)| self.nodes.is_active(NodeIndex::new(*i)))
            .map(|(_, row)| row.iter().sum::<f64>())
            .sum()
    }

    /// Mean of one macroscopic variable over the active nodes of `range`.
    pub fn mean_macro_var(&self, range: &IndexRange, var: MacroVarIndex) -> f64 {
        let (sum, count) = range
            .iter()
            .map(|p| self.shape.node_index(p))
            .filter(|n| self.nodes.is_active(*n))
            .fold((0.0, 0usize), |(s, c), n| (s + self.macro_vars.get(n, var), c + 1));
        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    }

    /// Upwind node read by direction `d` when streaming into `node`.
    #[inline]
    pub(crate) fn upwind(&self, node: NodeIndex, d: DirectionIndex) -> NodeIndex {
        NodeIndex::new((node.get() as isize - self.offsets[d]) as usize)
    }
}
