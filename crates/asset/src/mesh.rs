//! CPU-side model representation: one shared vertex buffer with named ranges.

use std::ops::Range;

/// Vertex with position/uv/normal. Values are in object space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub normal: [f32; 3],
}

impl MeshVertex {
    pub fn new(position: [f32; 3], uv: [f32; 2], normal: [f32; 3]) -> Self {
        Self {
            position,
            uv,
            normal,
        }
    }
}

/// Named half-open range `[start_index, end_index)` of a model's vertex buffer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MeshSegment {
    pub name: String,
    pub start_index: usize,
    pub end_index: usize,
}

impl MeshSegment {
    pub fn new(name: impl Into<String>, start_index: usize, end_index: usize) -> Self {
        debug_assert!(start_index <= end_index);
        Self {
            name: name.into(),
            start_index,
            end_index,
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.start_index..self.end_index
    }

    /// Zero for an inverted range.
    pub fn len(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn triangle_count(&self) -> usize {
        self.len() / 3
    }
}

/// Successfully parsed model. Immutable once built.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedModel {
    vertices: Vec<MeshVertex>,
    segments: Vec<MeshSegment>,
    has_non_triangular_faces: bool,
}

impl ParsedModel {
    pub(crate) fn new(
        vertices: Vec<MeshVertex>,
        segments: Vec<MeshSegment>,
        has_non_triangular_faces: bool,
    ) -> Self {
        Self {
            vertices,
            segments,
            has_non_triangular_faces,
        }
    }

    pub fn vertices(&self) -> &[MeshVertex] {
        &self.vertices
    }

    /// Segments in declaration order.
    pub fn segments(&self) -> &[MeshSegment] {
        &self.segments
    }

    /// Faces with other than three corners were skipped while parsing.
    pub fn has_non_triangular_faces(&self) -> bool {
        self.has_non_triangular_faces
    }

    pub fn segment(&self, index: usize) -> Option<&MeshSegment> {
        self.segments.get(index)
    }

    /// First segment called `name`.
    pub fn segment_by_name(&self, name: &str) -> Option<&MeshSegment> {
        self.segments.iter().find(|s| s.name == name)
    }

    /// Vertices covered by `segment`; empty if it does not belong to this model.
    pub fn segment_vertices(&self, segment: &MeshSegment) -> &[MeshVertex] {
        self.vertices.get(segment.range()).unwrap_or(&[])
    }

    pub fn into_parts(self) -> (Vec<MeshVertex>, Vec<MeshSegment>, bool) {
        (self.vertices, self.segments, self.has_non_triangular_faces)
    }
}
