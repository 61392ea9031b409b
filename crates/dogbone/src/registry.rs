//! Selection bookkeeping: which faces and corner edges are picked for relief.
//!
//! Records live in slotmap arenas and are found again through maps keyed by
//! the provider's entity ids. A face record is built in two steps:
//! [`SelectionRegistry::create_face_record`] fixes the face data, then
//! [`SelectionRegistry::populate_face_record`] derives its corner edges.

use std::collections::HashMap;

use dogbone_kernel::geometry::surfaces::Plane;
use dogbone_kernel::geometry::vector::Vec3;
use slotmap::{new_key_type, SlotMap};
use tracing::{debug, info, instrument};

use crate::angle::face_normal;
use crate::corners::{find_inner_corners_with, CornerCandidate};
use crate::error::{id, DogboneError, Result};
use crate::faces::{parallel_faces, top_face_plane};
use crate::params::ToolParameters;
use crate::query::BRepQuery;

new_key_type! {
    pub struct FaceRecordId;
    pub struct EdgeRecordId;
}

/// A registered face.
#[derive(Debug, Clone)]
pub struct FaceRecord<F> {
    pub face: F,
    pub normal: Vec3,
    /// Plane of the body's outermost face along `normal`, used for
    /// from-top cuts.
    pub top_plane: Option<Plane>,
    pub selected: bool,
    pub edges: Vec<EdgeRecordId>,
}

/// A corner edge found on a registered face.
#[derive(Debug, Clone)]
pub struct EdgeRecord<V, E, F> {
    pub corner: CornerCandidate<V, E, F>,
    pub face_record: FaceRecordId,
    pub selected: bool,
}

/// [`EdgeRecord`] keyed by a provider's id types.
pub type EdgeRecordOf<Q> = EdgeRecord<<Q as BRepQuery>::Vertex, <Q as BRepQuery>::Edge, <Q as BRepQuery>::Face>;

/// Faces and corner edges picked for relief, with their selection state.
///
/// Selecting a face selects all its edges; selecting an edge selects its
/// face; deselecting the last selected edge of a face deselects the face.
pub struct SelectionRegistry<Q: BRepQuery> {
    faces: SlotMap<FaceRecordId, FaceRecord<Q::Face>>,
    edges: SlotMap<EdgeRecordId, EdgeRecordOf<Q>>,
    face_index: HashMap<Q::Face, FaceRecordId>,
    edge_index: HashMap<(Q::Face, Q::Edge), EdgeRecordId>,
}

impl<Q: BRepQuery> Default for SelectionRegistry<Q> {
    fn default() -> Self {
        Self {
            faces: SlotMap::with_key(),
            edges: SlotMap::with_key(),
            face_index: HashMap::new(),
            edge_index: HashMap::new(),
        }
    }
}

impl<Q: BRepQuery> SelectionRegistry<Q> {
    pub fn new() -> Self {
        Self::default()
    }

    /// First construction step: record the face with its normal and top
    /// plane, selected, with no edges yet. A face already on record keeps
    /// its existing record.
    pub fn create_face_record(&mut self, query: &Q, face: Q::Face) -> Result<FaceRecordId> {
        if let Some(&existing) = self.face_index.get(&face) {
            return Ok(existing);
        }
        if !query.is_valid_face(face) {
            return Err(DogboneError::UnknownFace { face: id(face) });
        }
        if !query.is_planar(face) {
            return Err(DogboneError::NonPlanarFace { face: id(face) });
        }
        let normal = face_normal(query, face).ok_or_else(|| DogboneError::NonPlanarFace { face: id(face) })?;
        let top_plane = top_face_plane(query, face).map(|(plane, _)| plane);

        let record_id = self.faces.insert(FaceRecord {
            face,
            normal,
            top_plane,
            selected: true,
            edges: Vec::new(),
        });
        self.face_index.insert(face, record_id);
        Ok(record_id)
    }

    /// Second construction step: find the face's inner corners and attach
    /// one selected edge record per corner, replacing any earlier ones. A
    /// face without corners ends up deselected. Returns the corner count.
    pub fn populate_face_record(&mut self, query: &Q, record_id: FaceRecordId, params: &ToolParameters) -> Result<usize> {
        let face = self.face(record_id)?.face;
        self.drop_edges(record_id);

        let corners = find_inner_corners_with(query, face, params);
        let edges: Vec<EdgeRecordId> = corners
            .into_iter()
            .map(|corner| {
                let edge_id = self.edges.insert(EdgeRecord {
                    corner,
                    face_record: record_id,
                    selected: true,
                });
                self.edge_index.insert((face, corner.edge), edge_id);
                edge_id
            })
            .collect();

        let count = edges.len();
        let record = self.face_mut(record_id)?;
        record.edges = edges;
        record.selected = count > 0;
        Ok(count)
    }

    /// Register `face`, or return its existing record.
    #[instrument(skip(self, query, params))]
    pub fn register_face(&mut self, query: &Q, face: Q::Face, params: &ToolParameters) -> Result<FaceRecordId> {
        if let Some(&existing) = self.face_index.get(&face) {
            debug!("face already registered");
            return Ok(existing);
        }
        let record_id = self.create_face_record(query, face)?;
        let corners = self.populate_face_record(query, record_id, params)?;
        info!(corners, "face registered");
        Ok(record_id)
    }

    /// Register `face` and every other face of its body facing the same way.
    pub fn register_all_faces(&mut self, query: &Q, face: Q::Face, params: &ToolParameters) -> Result<Vec<FaceRecordId>> {
        let mut ids = vec![self.register_face(query, face, params)?];
        for other in parallel_faces(query, face) {
            if other != face {
                ids.push(self.register_face(query, other, params)?);
            }
        }
        Ok(ids)
    }

    pub fn select_face(&mut self, record_id: FaceRecordId) -> Result<()> {
        self.set_face_selection(record_id, true)
    }

    pub fn deselect_face(&mut self, record_id: FaceRecordId) -> Result<()> {
        self.set_face_selection(record_id, false)
    }

    pub fn select_edge(&mut self, edge_id: EdgeRecordId) -> Result<()> {
        let edge = self.edge_mut(edge_id)?;
        edge.selected = true;
        let parent = edge.face_record;
        self.face_mut(parent)?.selected = true;
        Ok(())
    }

    pub fn deselect_edge(&mut self, edge_id: EdgeRecordId) -> Result<()> {
        let edge = self.edge_mut(edge_id)?;
        edge.selected = false;
        let parent = edge.face_record;

        let any_left = self
            .face(parent)?
            .edges
            .iter()
            .any(|e| self.edges.get(*e).is_some_and(|r| r.selected));
        if !any_left {
            self.face_mut(parent)?.selected = false;
        }
        Ok(())
    }

    /// Replace the plane from-top cuts on this face run up to.
    pub fn set_top_plane(&mut self, record_id: FaceRecordId, plane: Option<Plane>) -> Result<()> {
        self.face_mut(record_id)?.top_plane = plane;
        Ok(())
    }

    /// Drop a face record together with its edge records.
    pub fn remove_face(&mut self, record_id: FaceRecordId) -> Result<FaceRecord<Q::Face>> {
        self.drop_edges(record_id);
        let record = self
            .faces
            .remove(record_id)
            .ok_or_else(|| DogboneError::UnknownFace { face: id(record_id) })?;
        self.face_index.remove(&record.face);
        Ok(record)
    }

    /// Forget every record.
    pub fn clear(&mut self) {
        self.faces.clear();
        self.edges.clear();
        self.face_index.clear();
        self.edge_index.clear();
    }

    pub fn face_record(&self, record_id: FaceRecordId) -> Option<&FaceRecord<Q::Face>> {
        self.faces.get(record_id)
    }

    pub fn edge_record(&self, edge_id: EdgeRecordId) -> Option<&EdgeRecordOf<Q>> {
        self.edges.get(edge_id)
    }

    pub fn face_record_id(&self, face: Q::Face) -> Option<FaceRecordId> {
        self.face_index.get(&face).copied()
    }

    /// The record of `edge` as found on `face`.
    pub fn edge_record_id(&self, face: Q::Face, edge: Q::Edge) -> Option<EdgeRecordId> {
        self.edge_index.get(&(face, edge)).copied()
    }

    pub fn face_ids(&self) -> Vec<FaceRecordId> {
        self.faces.keys().collect()
    }

    /// Selected edge records, face by face.
    pub fn selected_edges(&self) -> Vec<EdgeRecordId> {
        self.faces
            .values()
            .flat_map(|face| face.edges.iter().copied())
            .filter(|e| self.edges.get(*e).is_some_and(|r| r.selected))
            .collect()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    fn set_face_selection(&mut self, record_id: FaceRecordId, selected: bool) -> Result<()> {
        let record = self.face_mut(record_id)?;
        record.selected = selected;
        let edges = record.edges.clone();
        for edge_id in edges {
            if let Some(edge) = self.edges.get_mut(edge_id) {
                edge.selected = selected;
            }
        }
        Ok(())
    }

    fn drop_edges(&mut self, record_id: FaceRecordId) {
        let Some(record) = self.faces.get_mut(record_id) else {
            return;
        };
        for edge_id in std::mem::take(&mut record.edges) {
            if let Some(edge) = self.edges.remove(edge_id) {
                self.edge_index.remove(&(edge.corner.face, edge.corner.edge));
            }
        }
    }

    fn face(&self, record_id: FaceRecordId) -> Result<&FaceRecord<Q::Face>> {
        self.faces
            .get(record_id)
            .ok_or_else(|| DogboneError::UnknownFace { face: id(record_id) })
    }

    fn face_mut(&mut self, record_id: FaceRecordId) -> Result<&mut FaceRecord<Q::Face>> {
        self.faces
            .get_mut(record_id)
            .ok_or_else(|| DogboneError::UnknownFace { face: id(record_id) })
    }

    fn edge_mut(&mut self, edge_id: EdgeRecordId) -> Result<&mut EdgeRecordOf<Q>> {
        self.edges
            .get_mut(edge_id)
            .ok_or_else(|| DogboneError::UnknownEdge { edge: id(edge_id) })
    }
}
