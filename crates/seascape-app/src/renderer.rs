//! wgpu implementation of the scene [`Renderer`].
//!
//! Uploads the camera, sky, water and light uniforms every frame and clears
//! the surface to a sky color derived from the baked environment lighting.

use glam::Vec3;
use seascape_scene::{
    CameraUniform, EnvironmentLighting, LightUniforms, RenderError, Renderer, SceneFrame,
    SceneParameters, SkyUniforms, WaterUniforms,
};

use crate::gpu::GpuContext;

/// Color behind everything when the sky layer is hidden.
pub const VOID_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

struct UniformBuffers {
    camera: wgpu::Buffer,
    sky: wgpu::Buffer,
    water: wgpu::Buffer,
    lights: wgpu::Buffer,
}

impl UniformBuffers {
    fn new(device: &wgpu::Device) -> Self {
        let buffer = |label: &'static str, size: usize| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: size as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };
        Self {
            camera: buffer("camera-uniforms", size_of::<CameraUniform>()),
            sky: buffer("sky-uniforms", size_of::<SkyUniforms>()),
            water: buffer("water-uniforms", size_of::<WaterUniforms>()),
            lights: buffer("light-uniforms", size_of::<LightUniforms>()),
        }
    }
}

pub struct WgpuRenderer {
    gpu: GpuContext,
    uniforms: UniformBuffers,
}

impl WgpuRenderer {
    pub fn new(gpu: GpuContext) -> Self {
        let uniforms = UniformBuffers::new(&gpu.device);
        Self { gpu, uniforms }
    }

    fn upload(&self, frame: &SceneFrame<'_>) {
        let queue = &self.gpu.queue;
        queue.write_buffer(
            &self.uniforms.camera,
            0,
            bytemuck::bytes_of(&frame.camera.to_uniform()),
        );
        queue.write_buffer(&self.uniforms.sky, 0, bytemuck::bytes_of(frame.sky));
        queue.write_buffer(&self.uniforms.water, 0, bytemuck::bytes_of(frame.water));
        queue.write_buffer(&self.uniforms.lights, 0, bytemuck::bytes_of(&frame.lights));
    }
}

impl Renderer for WgpuRenderer {
    fn render(&mut self, frame: &SceneFrame<'_>) -> Result<(), RenderError> {
        self.upload(frame);

        let surface_texture = self.gpu.acquire()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });

        {
            let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("sky-clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color(frame.environment, frame.params)),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }

        self.gpu.queue.submit([encoder.finish()]);
        surface_texture.present();
        Ok(())
    }

    fn set_viewport_size(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
    }
}

/// Background color for a frame: the sky's horizon blended toward the
/// zenith, or [`VOID_COLOR`] when the sky is hidden.
pub fn clear_color(lighting: &EnvironmentLighting, params: &SceneParameters) -> wgpu::Color {
    if !params.sky_visible {
        return VOID_COLOR;
    }
    let sky = lighting
        .horizon_color
        .lerp(lighting.zenith_color, 0.35)
        .clamp(Vec3::ZERO, Vec3::ONE);
    wgpu::Color {
        r: f64::from(sky.x),
        g: f64::from(sky.y),
        b: f64::from(sky.z),
        a: 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lighting() -> EnvironmentLighting {
        EnvironmentLighting {
            zenith_color: Vec3::new(0.1, 0.3, 0.9),
            horizon_color: Vec3::new(0.8, 0.7, 0.6),
            ..EnvironmentLighting::default()
        }
    }

    #[test]
    fn test_hidden_sky_clears_to_void() {
        let params = SceneParameters {
            sky_visible: false,
            ..SceneParameters::default()
        };
        assert_eq!(clear_color(&lighting(), &params), VOID_COLOR);
    }

    #[test]
    fn test_clear_color_between_horizon_and_zenith() {
        let color = clear_color(&lighting(), &SceneParameters::default());
        assert!(color.r < 0.8 && color.r > 0.1);
        assert!(color.b > 0.6 && color.b < 0.9);
        assert_eq!(color.a, 1.0);
    }

    #[test]
    fn test_clear_color_clamped() {
        let bright = EnvironmentLighting {
            horizon_color: Vec3::splat(4.0),
            zenith_color: Vec3::splat(3.0),
            ..EnvironmentLighting::default()
        };
        let color = clear_color(&bright, &SceneParameters::default());
        assert_eq!((color.r, color.g, color.b), (1.0, 1.0, 1.0));
    }
}
