//! Final compositing pass
//!
//! Blends the filtered scene against a tiling paper texture for a canvas
//! grain. Optional: when the texture is unavailable the chain simply runs
//! without this pass.

use bytemuck::{Pod, Zeroable};

use super::pass::{resolution_vec4, FullscreenPass, PostPass};

/// Blend weight toward `color * paper`
const PAPER_BLEND: f32 = 0.3;

/// Decoded RGBA8 paper texture data
pub struct PaperImage {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct CompositeUniforms {
    resolution: [f32; 4],
    blend: f32,
    _pad: [f32; 3],
}

pub struct CompositePass {
    pass: FullscreenPass,
    paper: wgpu::Texture,
    paper_view: wgpu::TextureView,
    paper_sampler: wgpu::Sampler,
    enabled: bool,
}

impl CompositePass {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        output_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        image: &PaperImage,
    ) -> Self {
        let pass = FullscreenPass::new(
            device,
            include_str!("composite.wgsl"),
            "composite_pass",
            output_format,
            std::mem::size_of::<CompositeUniforms>() as u64,
            true,
        );
        pass.write_uniforms(
            queue,
            bytemuck::bytes_of(&CompositeUniforms {
                resolution: resolution_vec4(width, height),
                blend: PAPER_BLEND,
                _pad: [0.0; 3],
            }),
        );

        let paper = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("paper_texture"),
            size: wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &paper,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width),
                rows_per_image: Some(image.height),
            },
            wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
        );
        let paper_view = paper.create_view(&wgpu::TextureViewDescriptor::default());

        // The paper tiles across the surface
        let paper_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("paper_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            pass,
            paper,
            paper_view,
            paper_sampler,
            enabled: true,
        }
    }

    pub fn encode(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        input: &wgpu::TextureView,
        target: &wgpu::TextureView,
    ) {
        self.pass.encode(
            device,
            encoder,
            input,
            Some((&self.paper_view, &self.paper_sampler)),
            target,
        );
    }
}

impl PostPass for CompositePass {
    fn label(&self) -> &'static str {
        "composite"
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, on: bool) {
        self.enabled = on;
    }

    fn resize(&mut self, _device: &wgpu::Device, queue: &wgpu::Queue, width: u32, height: u32) {
        self.pass.write_uniforms(
            queue,
            bytemuck::bytes_of(&CompositeUniforms {
                resolution: resolution_vec4(width, height),
                blend: PAPER_BLEND,
                _pad: [0.0; 3],
            }),
        );
    }

    fn dispose(&mut self) {
        self.paper.destroy();
    }
}
