//! Frame capture to PNG.
//!
//! A requested frame is rendered a second time into an offscreen target that
//! can be copied from, then read back through a mapped buffer.

use std::path::Path;

use anyhow::{Context as _, anyhow};
use instant::Duration;

use crate::data_structures::texture::Texture;

/// Rows copied out of a texture must start on this boundary.
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * 4;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Drop the row padding of a readback and turn BGRA into RGBA if needed.
pub fn to_rgba(data: &[u8], width: u32, height: u32, padded: u32, bgra: bool) -> Vec<u8> {
    let row = (width * 4) as usize;
    let mut pixels = Vec::with_capacity(row * height as usize);
    for chunk in data.chunks(padded as usize).take(height as usize) {
        pixels.extend_from_slice(&chunk[..row]);
    }
    if bgra {
        pixels.chunks_exact_mut(4).for_each(|px| px.swap(0, 2));
    }
    pixels
}

fn is_bgra(format: wgpu::TextureFormat) -> bool {
    matches!(
        format,
        wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb
    )
}

/// Offscreen color and depth targets with the size and format of the surface.
pub struct Snapshot {
    target: wgpu::Texture,
    pub depth: Texture,
    buffer: wgpu::Buffer,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
}

impl Snapshot {
    pub fn new(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> Self {
        let (width, height) = (config.width.max(1), config.height.max(1));
        let target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Snapshot Target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: config.format,
            usage: wgpu::TextureUsages::COPY_SRC | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth = Texture::create_depth_texture(device, [width, height], "snapshot_depth");
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Snapshot Buffer"),
            size: (padded_bytes_per_row(width) * height) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        Self {
            target,
            depth,
            buffer,
            width,
            height,
            format: config.format,
        }
    }

    pub fn view(&self) -> wgpu::TextureView {
        self.target
            .create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Record the copy of the rendered target into the readback buffer.
    pub fn copy(&self, encoder: &mut wgpu::CommandEncoder) {
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &self.target,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row(self.width)),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Map the buffer after the copy was submitted and decode it.
    pub async fn read(&self, device: &wgpu::Device) -> anyhow::Result<image::RgbaImage> {
        let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
        let slice = self.buffer.slice(..);
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: Some(Duration::from_secs(3)),
            })
            .map_err(|e| anyhow!("waiting for the snapshot copy failed: {e}"))?;
        rx.receive()
            .await
            .context("snapshot buffer was dropped before mapping")??;

        let pixels = {
            let data = slice.get_mapped_range();
            to_rgba(
                &data,
                self.width,
                self.height,
                padded_bytes_per_row(self.width),
                is_bgra(self.format),
            )
        };
        self.buffer.unmap();
        image::RgbaImage::from_raw(self.width, self.height, pixels)
            .context("snapshot buffer is smaller than the frame")
    }

    pub async fn save(&self, device: &wgpu::Device, path: &Path) -> anyhow::Result<()> {
        let img = self.read(device).await?;
        img.save(path)
            .with_context(|| format!("could not write {}", path.display()))?;
        log::info!("snapshot written to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_padded_to_the_copy_alignment() {
        assert_eq!(padded_bytes_per_row(64), 256);
        assert_eq!(padded_bytes_per_row(65), 512);
        assert_eq!(padded_bytes_per_row(960) % wgpu::COPY_BYTES_PER_ROW_ALIGNMENT, 0);
    }

    #[test]
    fn padding_is_removed_and_channels_swapped() {
        let padded = padded_bytes_per_row(2) as usize;
        let mut data = vec![0u8; padded * 2];
        data[..8].copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        data[padded..padded + 8].copy_from_slice(&[9, 10, 11, 12, 13, 14, 15, 16]);

        let rgba = to_rgba(&data, 2, 2, padded as u32, false);
        assert_eq!(rgba, (1..=16).collect::<Vec<u8>>());

        let swapped = to_rgba(&data, 2, 2, padded as u32, true);
        assert_eq!(&swapped[..4], &[3, 2, 1, 4]);
        assert_eq!(swapped.len(), 16);
    }
}
