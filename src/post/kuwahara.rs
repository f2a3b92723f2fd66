//! Anisotropic Kuwahara pass
//!
//! Region-based smoothing: each pixel's neighborhood is split into four
//! overlapping quadrant sectors (rotated along the structure-tensor
//! orientation), and the pixel takes the mean of the lowest-variance sector.
//! Sector statistics are computed over the *unfiltered* original scene, which
//! is bound alongside the tensor input.

use bytemuck::{Pod, Zeroable};

use super::pass::{resolution_vec4, FullscreenPass, PostPass, RenderTarget};

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct KuwaharaUniforms {
    resolution: [f32; 4],
    radius: i32,
    _pad: [i32; 3],
}

pub struct KuwaharaPass {
    pass: FullscreenPass,
    /// Intermediate target; present only when a compositing pass follows,
    /// otherwise this pass presents straight to the surface.
    output: Option<RenderTarget>,
    format: wgpu::TextureFormat,
    radius: u32,
    size: (u32, u32),
    enabled: bool,
}

impl KuwaharaPass {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        output_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        radius: u32,
        with_intermediate: bool,
    ) -> Self {
        let pass = FullscreenPass::new(
            device,
            include_str!("kuwahara.wgsl"),
            "kuwahara_pass",
            output_format,
            std::mem::size_of::<KuwaharaUniforms>() as u64,
            true,
        );
        let output = with_intermediate
            .then(|| RenderTarget::new(device, width, height, output_format, "kuwahara_target"));

        let mut this = Self {
            pass,
            output,
            format: output_format,
            radius,
            size: (width, height),
            enabled: true,
        };
        this.write_uniforms(queue);
        this
    }

    fn write_uniforms(&self, queue: &wgpu::Queue) {
        self.pass.write_uniforms(
            queue,
            bytemuck::bytes_of(&KuwaharaUniforms {
                resolution: resolution_vec4(self.size.0, self.size.1),
                radius: self.radius as i32,
                _pad: [0; 3],
            }),
        );
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn set_radius(&mut self, queue: &wgpu::Queue, radius: u32) {
        self.radius = radius;
        self.write_uniforms(queue);
    }

    pub fn output_view(&self) -> Option<&wgpu::TextureView> {
        self.output.as_ref().map(|t| &t.view)
    }

    /// Run the filter. `input` is the previous pass's output (normally the
    /// tensor); `original` is the unfiltered scene capture.
    pub fn encode(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        input: &wgpu::TextureView,
        original: &wgpu::TextureView,
        target: &wgpu::TextureView,
    ) {
        self.pass.encode(
            device,
            encoder,
            input,
            Some((original, self.pass.sampler())),
            target,
        );
    }
}

impl PostPass for KuwaharaPass {
    fn label(&self) -> &'static str {
        "kuwahara"
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, on: bool) {
        self.enabled = on;
    }

    fn resize(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, width: u32, height: u32) {
        self.size = (width, height);
        self.write_uniforms(queue);
        if let Some(target) = &self.output {
            target.destroy();
            self.output = Some(RenderTarget::new(
                device,
                width,
                height,
                self.format,
                "kuwahara_target",
            ));
        }
    }

    fn dispose(&mut self) {
        if let Some(target) = &self.output {
            target.destroy();
        }
    }
}

#[cfg(test)]
mod tests {
    /// CPU mirror of the shader's sector statistics, axis-aligned (phi = 0).
    /// Sector normalization uses n = (radius+1)^2 for all four sectors.
    fn kuwahara_pixel(
        sample: &dyn Fn(i32, i32) -> [f32; 3],
        x: i32,
        y: i32,
        radius: i32,
    ) -> [f32; 3] {
        let n = ((radius + 1) * (radius + 1)) as f32;
        let sectors = [
            ((-radius, 0), (-radius, 0)),
            ((0, radius), (-radius, 0)),
            ((0, radius), (0, radius)),
            ((-radius, 0), (0, radius)),
        ];

        let mut best = [0.0f32; 3];
        let mut min_sigma2 = f32::MAX;
        for ((i0, i1), (j0, j1)) in sectors {
            let mut m = [0.0f32; 3];
            let mut s = [0.0f32; 3];
            for j in j0..=j1 {
                for i in i0..=i1 {
                    let c = sample(x + i, y + j);
                    for k in 0..3 {
                        m[k] += c[k];
                        s[k] += c[k] * c[k];
                    }
                }
            }
            for k in 0..3 {
                m[k] /= n;
                s[k] = (s[k] / n - m[k] * m[k]).abs();
            }
            let sigma2 = s[0] + s[1] + s[2];
            if sigma2 < min_sigma2 {
                min_sigma2 = sigma2;
                best = m;
            }
        }
        best
    }

    #[test]
    fn test_uniform_input_passes_through() {
        // Zero variance in all four sectors: any sector's mean is the input
        let color = [0.3f32, 0.5, 0.7];
        let out = kuwahara_pixel(&|_, _| color, 10, 10, 4);
        for k in 0..3 {
            assert!((out[k] - color[k]).abs() < 1e-5, "component {k}");
        }
    }

    #[test]
    fn test_step_edge_is_preserved() {
        // Hard vertical edge: black for x < 0, white from x >= 0. A pixel a
        // little into the white side must stay pure white (its right-hand
        // sectors have zero variance), not blur toward gray.
        let edge = |x: i32, _y: i32| {
            if x < 0 {
                [0.0f32, 0.0, 0.0]
            } else {
                [1.0f32, 1.0, 1.0]
            }
        };
        let out = kuwahara_pixel(&edge, 2, 0, 4);
        for k in 0..3 {
            assert!((out[k] - 1.0).abs() < 1e-5);
        }

        let out = kuwahara_pixel(&edge, -3, 0, 4);
        for k in 0..3 {
            assert!(out[k].abs() < 1e-5);
        }
    }

    #[test]
    fn test_flat_regions_smooth_noise() {
        // Single bright outlier in an otherwise flat field: some sector
        // excludes it and wins, so the outlier never leaks into the result.
        let noisy = |x: i32, y: i32| {
            if x == 3 && y == 3 {
                [1.0f32, 1.0, 1.0]
            } else {
                [0.2f32, 0.2, 0.2]
            }
        };
        let out = kuwahara_pixel(&noisy, 0, 0, 4);
        for k in 0..3 {
            assert!((out[k] - 0.2).abs() < 1e-5);
        }
    }
}
