//! Structure-tensor pass
//!
//! Sobel-convolves the scene and packs the per-pixel gradient covariance
//! into a float target for the Kuwahara pass to steer by.

use bytemuck::{Pod, Zeroable};

use super::pass::{resolution_vec4, FullscreenPass, PostPass, RenderTarget};

/// Tensor components exceed 1.0, so the output needs a float format
const TENSOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct TensorUniforms {
    resolution: [f32; 4],
}

pub struct TensorPass {
    pass: FullscreenPass,
    output: RenderTarget,
    enabled: bool,
}

impl TensorPass {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, width: u32, height: u32) -> Self {
        let pass = FullscreenPass::new(
            device,
            include_str!("tensor.wgsl"),
            "tensor_pass",
            TENSOR_FORMAT,
            std::mem::size_of::<TensorUniforms>() as u64,
            false,
        );
        pass.write_uniforms(
            queue,
            bytemuck::bytes_of(&TensorUniforms {
                resolution: resolution_vec4(width, height),
            }),
        );
        let output = RenderTarget::new(device, width, height, TENSOR_FORMAT, "tensor_target");
        Self {
            pass,
            output,
            enabled: true,
        }
    }

    pub fn output_view(&self) -> &wgpu::TextureView {
        &self.output.view
    }

    pub fn encode(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        input: &wgpu::TextureView,
    ) {
        self.pass.encode(device, encoder, input, None, &self.output.view);
    }
}

impl PostPass for TensorPass {
    fn label(&self) -> &'static str {
        "tensor"
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, on: bool) {
        self.enabled = on;
    }

    fn resize(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, width: u32, height: u32) {
        self.pass.write_uniforms(
            queue,
            bytemuck::bytes_of(&TensorUniforms {
                resolution: resolution_vec4(width, height),
            }),
        );
        self.output.destroy();
        self.output = RenderTarget::new(device, width, height, TENSOR_FORMAT, "tensor_target");
    }

    fn dispose(&mut self) {
        self.output.destroy();
    }
}
