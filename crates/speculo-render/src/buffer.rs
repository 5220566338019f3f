//! GPU buffer management.

use wgpu::util::DeviceExt;

/// Creates a vertex buffer from data.
pub fn create_vertex_buffer<T: bytemuck::Pod>(
    device: &wgpu::Device,
    data: &[T],
    label: Option<&str>,
) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label,
        contents: bytemuck::cast_slice(data),
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
    })
}

/// Creates an index buffer from data.
pub fn create_index_buffer(
    device: &wgpu::Device,
    data: &[u32],
    label: Option<&str>,
) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label,
        contents: bytemuck::cast_slice(data),
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
    })
}

/// Creates a uniform buffer from data.
pub fn create_uniform_buffer<T: bytemuck::Pod>(
    device: &wgpu::Device,
    data: &T,
    label: Option<&str>,
) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label,
        contents: bytemuck::bytes_of(data),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

/// Creates a storage buffer of `len` zeroed records.
///
/// Used for the mirror plane-parameter buffer, which is allocated once at
/// full capacity and rewritten (active prefix only) each frame.
pub fn create_storage_buffer_zeroed(
    device: &wgpu::Device,
    len: u64,
    label: Option<&str>,
) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label,
        size: len,
        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Updates a buffer with new data.
pub fn update_buffer<T: bytemuck::Pod>(queue: &wgpu::Queue, buffer: &wgpu::Buffer, data: &[T]) {
    queue.write_buffer(buffer, 0, bytemuck::cast_slice(data));
}
