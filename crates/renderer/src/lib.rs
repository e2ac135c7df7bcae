//! Renderer-side geometry: per-segment vertex buffers built lazily from a
//! parsed model.
//!
//! A segment's device buffer is created on first use, reused afterwards and
//! rebuilt on the next use after it has been released. Issuing frames is the
//! host's job; [`draw_segment`] only records the draw into a pass.

use std::sync::Arc;

use asset::{MeshSegment, MeshVertex, ParsedModel};
use bytemuck::{Pod, Zeroable};
use parking_lot::Mutex;
use thiserror::Error;
use wgpu::{
    BufferUsages, RenderPass, VertexBufferLayout, VertexStepMode,
    util::{BufferInitDescriptor, DeviceExt},
};

/// Minimum vertices for a drawable buffer (one triangle).
const MIN_VERTICES: usize = 3;

/// Vertex: position + uv + normal.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct GpuVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub normal: [f32; 3],
}

impl GpuVertex {
    pub const LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
        array_stride: std::mem::size_of::<GpuVertex>() as u64,
        step_mode: VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2, 2 => Float32x3],
    };
}

impl From<&MeshVertex> for GpuVertex {
    fn from(v: &MeshVertex) -> Self {
        Self {
            position: v.position,
            uv: v.uv,
            normal: v.normal,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RendererError {
    #[error("Not enough vertices to build a buffer for segment '{segment}' (found {vertices})")]
    InsufficientVertices { segment: String, vertices: usize },

    #[error("Segment '{segment}' covers {start}..{end} but the model has {available} vertices")]
    SegmentOutOfRange {
        segment: String,
        start: usize,
        end: usize,
        available: usize,
    },
}

/// Creates device-side vertex buffers.
pub trait BufferAllocator {
    type Buffer;

    fn create_vertex_buffer(&self, label: &str, contents: &[u8]) -> Self::Buffer;
}

impl BufferAllocator for wgpu::Device {
    type Buffer = wgpu::Buffer;

    fn create_vertex_buffer(&self, label: &str, contents: &[u8]) -> wgpu::Buffer {
        self.create_buffer_init(&BufferInitDescriptor {
            label: Some(label),
            contents,
            usage: BufferUsages::VERTEX,
        })
    }
}

/// Lazily built device buffer for one segment.
pub struct SegmentBuffer<B> {
    segment: MeshSegment,
    buffer: Mutex<Option<Arc<B>>>,
}

impl<B> SegmentBuffer<B> {
    pub fn new(segment: MeshSegment) -> Self {
        Self {
            segment,
            buffer: Mutex::new(None),
        }
    }

    pub fn segment(&self) -> &MeshSegment {
        &self.segment
    }

    /// Vertices to draw for this segment.
    pub fn vertex_count(&self) -> u32 {
        u32::try_from(self.segment.len()).unwrap_or(u32::MAX)
    }

    /// Whether a device buffer currently exists.
    pub fn is_resident(&self) -> bool {
        self.buffer.lock().is_some()
    }

    /// Return the cached buffer, building it from `vertices` if there is none.
    pub fn get_or_build<A>(
        &self,
        allocator: &A,
        vertices: &[MeshVertex],
    ) -> Result<Arc<B>, RendererError>
    where
        A: BufferAllocator<Buffer = B>,
    {
        let mut slot = self.buffer.lock();
        if let Some(buffer) = slot.as_ref() {
            return Ok(Arc::clone(buffer));
        }

        let segment = &self.segment;
        let range = vertices
            .get(segment.range())
            .ok_or_else(|| RendererError::SegmentOutOfRange {
                segment: segment.name.clone(),
                start: segment.start_index,
                end: segment.end_index,
                available: vertices.len(),
            })?;
        if range.len() < MIN_VERTICES {
            return Err(RendererError::InsufficientVertices {
                segment: segment.name.clone(),
                vertices: range.len(),
            });
        }

        let gpu: Vec<GpuVertex> = range.iter().map(GpuVertex::from).collect();
        let contents: &[u8] = bytemuck::cast_slice(&gpu);
        let buffer = Arc::new(allocator.create_vertex_buffer(&segment.name, contents));
        log::debug!(
            "Built vertex buffer for segment '{}' ({} vertices)",
            segment.name,
            gpu.len()
        );

        *slot = Some(Arc::clone(&buffer));
        Ok(buffer)
    }

    /// Drop the cached buffer; the next use rebuilds it. Returns whether one existed.
    pub fn release(&self) -> bool {
        self.buffer.lock().take().is_some()
    }
}

/// A parsed model together with one lazy buffer per segment.
pub struct ModelBuffers<B> {
    model: ParsedModel,
    segments: Vec<SegmentBuffer<B>>,
}

impl<B> ModelBuffers<B> {
    pub fn new(model: ParsedModel) -> Self {
        let segments = model
            .segments()
            .iter()
            .cloned()
            .map(SegmentBuffer::new)
            .collect();
        Self { model, segments }
    }

    pub fn model(&self) -> &ParsedModel {
        &self.model
    }

    pub fn segments(&self) -> &[SegmentBuffer<B>] {
        &self.segments
    }

    /// Buffer for segment `index`, or `None` if out of range.
    pub fn buffer<A>(&self, allocator: &A, index: usize) -> Result<Option<Arc<B>>, RendererError>
    where
        A: BufferAllocator<Buffer = B>,
    {
        self.segments
            .get(index)
            .map(|s| s.get_or_build(allocator, self.model.vertices()))
            .transpose()
    }

    /// Buffer for the first segment called `name`.
    pub fn buffer_by_name<A>(
        &self,
        allocator: &A,
        name: &str,
    ) -> Result<Option<Arc<B>>, RendererError>
    where
        A: BufferAllocator<Buffer = B>,
    {
        self.segments
            .iter()
            .find(|s| s.segment().name == name)
            .map(|s| s.get_or_build(allocator, self.model.vertices()))
            .transpose()
    }

    /// Build every segment that is not resident yet.
    pub fn build_all<A>(&self, allocator: &A) -> Result<(), RendererError>
    where
        A: BufferAllocator<Buffer = B>,
    {
        for segment in &self.segments {
            segment.get_or_build(allocator, self.model.vertices())?;
        }
        Ok(())
    }

    pub fn release_all(&self) {
        for segment in &self.segments {
            segment.release();
        }
    }
}

/// Record a non-indexed triangle-list draw of one segment buffer.
pub fn draw_segment(pass: &mut RenderPass<'_>, buffer: &wgpu::Buffer, vertex_count: u32) {
    pass.set_vertex_buffer(0, buffer.slice(..));
    pass.draw(0..vertex_count, 0..1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Records every allocation instead of touching a device.
    #[derive(Default)]
    struct RecordingAllocator {
        created: RefCell<Vec<String>>,
    }

    impl BufferAllocator for RecordingAllocator {
        type Buffer = Vec<GpuVertex>;

        fn create_vertex_buffer(&self, label: &str, contents: &[u8]) -> Vec<GpuVertex> {
            self.created.borrow_mut().push(label.to_string());
            bytemuck::pod_collect_to_vec(contents)
        }
    }

    fn model() -> ParsedModel {
        asset::obj::load_obj_from_str(
            "\
v 0 0 0
v 1 0 0
v 0 1 0
vt 0 0
vt 1 0
vt 0 1
vn 0 0 1
o Body
f 1/1/1 2/2/1 3/3/1
f 3/3/1 2/2/1 1/1/1
o Lid
f 1/1/1 2/2/1 3/3/1
",
        )
        .expect("parse model")
    }

    #[test]
    fn vertex_layout_is_packed() {
        assert_eq!(std::mem::size_of::<GpuVertex>(), 32);
        assert_eq!(GpuVertex::LAYOUT.array_stride, 32);
        assert_eq!(GpuVertex::LAYOUT.attributes.len(), 3);
        assert_eq!(GpuVertex::LAYOUT.attributes[1].offset, 12);
        assert_eq!(GpuVertex::LAYOUT.attributes[2].offset, 20);
    }

    #[test]
    fn builds_on_first_use_only() {
        let alloc = RecordingAllocator::default();
        let buffers = ModelBuffers::new(model());
        assert!(!buffers.segments()[0].is_resident());

        let first = buffers.buffer(&alloc, 0).unwrap().unwrap();
        let second = buffers.buffer(&alloc, 0).unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*alloc.created.borrow(), ["Body"]);
        assert_eq!(first.len(), 6);
        assert_eq!(buffers.segments()[0].vertex_count(), 6);
    }

    #[test]
    fn rebuilds_after_release() {
        let alloc = RecordingAllocator::default();
        let buffers = ModelBuffers::new(model());
        buffers.build_all(&alloc).unwrap();
        assert_eq!(alloc.created.borrow().len(), 2);

        buffers.release_all();
        assert!(buffers.segments().iter().all(|s| !s.is_resident()));
        assert!(!buffers.segments()[1].release());

        let lid = buffers.buffer_by_name(&alloc, "Lid").unwrap().unwrap();
        assert_eq!(*alloc.created.borrow(), ["Body", "Lid", "Lid"]);
        assert_eq!(lid.len(), 3);
        assert_eq!(lid[0].uv, [0.0, 1.0]);
    }

    #[test]
    fn missing_segments_yield_none() {
        let alloc = RecordingAllocator::default();
        let buffers = ModelBuffers::new(model());
        assert_eq!(buffers.buffer(&alloc, 9), Ok(None));
        assert_eq!(buffers.buffer_by_name(&alloc, "Wheel"), Ok(None));
        assert!(alloc.created.borrow().is_empty());
    }

    #[test]
    fn refuses_degenerate_segments() {
        let alloc = RecordingAllocator::default();
        let vertices = vec![MeshVertex::default(); 4];

        let short = SegmentBuffer::<Vec<GpuVertex>>::new(MeshSegment::new("Short", 2, 4));
        assert_eq!(
            short.get_or_build(&alloc, &vertices),
            Err(RendererError::InsufficientVertices {
                segment: "Short".into(),
                vertices: 2
            })
        );

        let outside = SegmentBuffer::<Vec<GpuVertex>>::new(MeshSegment::new("Outside", 3, 9));
        assert!(matches!(
            outside.get_or_build(&alloc, &vertices),
            Err(RendererError::SegmentOutOfRange { available: 4, .. })
        ));
        assert!(!short.is_resident() && !outside.is_resident());

        let inverted = SegmentBuffer::<Vec<GpuVertex>>::new(MeshSegment {
            name: "Inverted".into(),
            start_index: 3,
            end_index: 1,
        });
        assert_eq!(inverted.vertex_count(), 0);
        assert!(matches!(
            inverted.get_or_build(&alloc, &vertices),
            Err(RendererError::SegmentOutOfRange { .. })
        ));
    }
}
