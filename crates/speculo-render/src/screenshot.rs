//! Frame capture: texture readback and image saving.

use std::path::Path;

use image::{ImageBuffer, Rgba};

/// Error type for screenshot operations.
#[derive(Debug, thiserror::Error)]
pub enum ScreenshotError {
    /// The pixel data did not match the expected dimensions.
    #[error("invalid image data")]
    InvalidImageData,

    /// Mapping the readback buffer failed.
    #[error("buffer map failed")]
    BufferMapFailed,

    /// The requested file extension is not supported.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// Image encoding failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

fn aligned_bytes_per_row(width: u32, bytes_per_pixel: u32) -> u32 {
    let unaligned = width * bytes_per_pixel;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unaligned.div_ceil(align) * align
}

/// Reads back a 2D texture's base level as tightly packed bytes.
///
/// Blocks until the GPU copy completes. `bytes_per_pixel` must match the
/// texture format (4 for `Rgba8UnormSrgb`, 8 for `Rgba16Float`).
pub fn read_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    width: u32,
    height: u32,
    bytes_per_pixel: u32,
) -> Result<Vec<u8>, ScreenshotError> {
    let bytes_per_row = aligned_bytes_per_row(width, bytes_per_pixel);

    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("readback buffer"),
        size: u64::from(bytes_per_row) * u64::from(height),
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("readback encoder"),
    });

    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );

    queue.submit(std::iter::once(encoder.finish()));

    let buffer_slice = buffer.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    let _ = device.poll(wgpu::PollType::wait_indefinitely());
    rx.recv()
        .map_err(|_| ScreenshotError::BufferMapFailed)?
        .map_err(|_| ScreenshotError::BufferMapFailed)?;

    // Copy data, removing row padding
    let data = buffer_slice.get_mapped_range();
    let row_bytes = (width * bytes_per_pixel) as usize;
    let mut result = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height {
        let start = (row * bytes_per_row) as usize;
        result.extend_from_slice(&data[start..start + row_bytes]);
    }
    drop(data);
    buffer.unmap();

    Ok(result)
}

/// Converts tightly packed `Rgba16Float` texel bytes to 8-bit RGBA.
///
/// Values are clamped to [0, 1]; used to inspect the HDR reflection target.
pub fn rgba16f_to_rgba8(data: &[u8]) -> Vec<u8> {
    data.chunks_exact(2)
        .map(|pair| {
            let value = half::f16::from_le_bytes([pair[0], pair[1]]).to_f32();
            (value.clamp(0.0, 1.0) * 255.0).round() as u8
        })
        .collect()
}

/// Saves tightly packed RGBA8 pixel data to an image file.
///
/// Supports `.png`, `.jpg`, and `.jpeg` by extension.
pub fn save_image(
    filename: &str,
    data: &[u8],
    width: u32,
    height: u32,
) -> Result<(), ScreenshotError> {
    let path = Path::new(filename);
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
        ImageBuffer::from_raw(width, height, data.to_vec())
            .ok_or(ScreenshotError::InvalidImageData)?;

    match extension.as_str() {
        "png" => {
            img.save_with_format(path, image::ImageFormat::Png)?;
        }
        "jpg" | "jpeg" => {
            // Convert to RGB for JPEG (no alpha)
            let rgb_img = image::DynamicImage::ImageRgba8(img).to_rgb8();
            rgb_img.save_with_format(path, image::ImageFormat::Jpeg)?;
        }
        _ => {
            return Err(ScreenshotError::UnsupportedFormat(extension));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aligned_bytes_per_row() {
        // 800 * 4 = 3200, already a multiple of 256.
        assert_eq!(aligned_bytes_per_row(800, 4), 3200);
        // 30 * 4 = 120 rounds up to 256.
        assert_eq!(aligned_bytes_per_row(30, 4), 256);
    }

    #[test]
    fn test_rgba16f_conversion() {
        let one = half::f16::from_f32(1.0).to_le_bytes();
        let half_val = half::f16::from_f32(0.5).to_le_bytes();
        let over = half::f16::from_f32(3.0).to_le_bytes();
        let data = [one, half_val, over, one].concat();

        let rgba = rgba16f_to_rgba8(&data);
        assert_eq!(rgba, vec![255, 128, 255, 255]);
    }

    #[test]
    fn test_unsupported_format_rejected() {
        let result = save_image("frame.bmp", &[0; 4], 1, 1);
        assert!(matches!(result, Err(ScreenshotError::UnsupportedFormat(_))));
    }
}
