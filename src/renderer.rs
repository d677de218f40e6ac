use std::collections::HashMap;
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::camera::clamp_pixel_ratio;
use crate::core::{GpuContext, DEPTH_FORMAT};
use crate::driver::DrawCommand;
use crate::error::RenderError;
use crate::gui::DebugGui;
use crate::loaders::AlphaMap;
use crate::scene::{Material, NodeId, Scene, SceneNode};
use crate::types::{srgb_to_linear, GlobalsUniform, MeshUniform, StarInstance, StarUniform, Vertex};

type Result<T> = std::result::Result<T, RenderError>;

/// Billboard corners drawn per star instance
const STAR_VERTICES: u32 = 6;

/// Buffers for one tessellated node
struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl GpuMesh {
    fn destroy(self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
        self.uniform_buffer.destroy();
    }
}

struct GpuStars {
    node: NodeId,
    instance_buffer: wgpu::Buffer,
    count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Draws the road, the starfield and the live ring, then the debug overlay
pub struct SceneRenderer {
    gpu: GpuContext,
    mesh_pipeline: wgpu::RenderPipeline,
    star_pipeline: wgpu::RenderPipeline,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    mesh_layout: wgpu::BindGroupLayout,
    meshes: HashMap<NodeId, GpuMesh>,
    stars: GpuStars,
    egui_renderer: egui_wgpu::Renderer,
    egui_state: egui_winit::State,
    egui_ctx: egui::Context,
}

impl SceneRenderer {
    pub async fn new(
        window: Arc<Window>,
        scene: &Scene,
        ring: &SceneNode,
        star_alpha: &AlphaMap,
    ) -> Result<Self> {
        let gpu = GpuContext::new(Arc::clone(&window)).await?;
        let device = gpu.device();

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_bind_group_layout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT)],
        });
        let mesh_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("mesh_bind_group_layout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT)],
        });
        let star_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("star_bind_group_layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Globals Buffer"),
            contents: bytemuck::cast_slice(&[globals_uniform(scene)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bind_group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let mesh_pipeline = Self::create_mesh_pipeline(device, gpu.surface_format(), &globals_layout, &mesh_layout);
        let star_pipeline = Self::create_star_pipeline(device, gpu.surface_format(), &globals_layout, &star_layout);

        let mut meshes = HashMap::new();
        for node in [&scene.road, ring] {
            if let Some(mesh) = upload_mesh(&gpu, &mesh_layout, node) {
                meshes.insert(node.id, mesh);
            }
        }
        let stars = upload_stars(&gpu, &star_layout, &scene.stars, star_alpha);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            gpu.device(),
            gpu.surface_format(),
            egui_wgpu::RendererOptions::default(),
        );

        log::info!(
            "Scene renderer initialized: {} meshes, {} stars",
            meshes.len(),
            stars.count
        );

        Ok(Self {
            gpu,
            mesh_pipeline,
            star_pipeline,
            globals_buffer,
            globals_bind_group,
            mesh_layout,
            meshes,
            stars,
            egui_renderer,
            egui_state,
            egui_ctx,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        self.gpu.size()
    }

    /// Follow a window resize or scale-factor change; the drawing buffer
    /// stays at the capped pixel ratio
    pub fn resize(&mut self, window: &Window) {
        self.gpu.fit_window(window);
    }

    /// Swap the retired ring's GPU buffers for the new ring's
    pub fn sync_ring(&mut self, retired: NodeId, ring: &SceneNode) {
        if let Some(mesh) = self.meshes.remove(&retired) {
            mesh.destroy();
        }
        if let Some(mesh) = upload_mesh(&self.gpu, &self.mesh_layout, ring) {
            self.meshes.insert(ring.id, mesh);
        }
    }

    /// Render one frame. Returns true if the debug panel changed a value.
    ///
    /// Opaque commands are drawn first, then point clouds, each group in
    /// command order.
    pub fn render(
        &mut self,
        window: &Window,
        scene: &Scene,
        commands: &[DrawCommand],
        gui: &mut DebugGui,
        fps: f32,
    ) -> Result<bool> {
        let queue = self.gpu.queue();
        queue.write_buffer(&self.globals_buffer, 0, bytemuck::cast_slice(&[globals_uniform(scene)]));

        for command in commands {
            match command.material {
                Material::Standard { color } | Material::Basic { color } => {
                    let lit = matches!(command.material, Material::Standard { .. });
                    if let Some(mesh) = self.meshes.get(&command.node) {
                        let uniform = MeshUniform::new(command.model, color, lit);
                        queue.write_buffer(&mesh.uniform_buffer, 0, bytemuck::cast_slice(&[uniform]));
                    } else {
                        log::warn!("No GPU mesh for node {:?}", command.node);
                    }
                }
                Material::Points { color, size } => {
                    let uniform = StarUniform {
                        model: command.model.to_cols_array_2d(),
                        color: srgb_to_linear(color),
                        size,
                    };
                    queue.write_buffer(&self.stars.uniform_buffer, 0, bytemuck::cast_slice(&[uniform]));
                }
            }
        }

        let output = match self.gpu.current_texture() {
            Ok(output) => output,
            Err(RenderError::Surface(err @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated))) => {
                log::warn!("Surface {:?}, reconfiguring", err);
                self.gpu.reconfigure();
                return Ok(false);
            }
            Err(err) => return Err(err),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let [r, g, b] = srgb_to_linear(scene.clear_color);
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.gpu.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.mesh_pipeline);
            render_pass.set_bind_group(0, &self.globals_bind_group, &[]);
            for command in commands {
                if matches!(command.material, Material::Points { .. }) {
                    continue;
                }
                let Some(mesh) = self.meshes.get(&command.node) else {
                    continue;
                };
                render_pass.set_bind_group(1, &mesh.bind_group, &[]);
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }

            let draws_stars = commands
                .iter()
                .any(|command| command.node == self.stars.node);
            if draws_stars && self.stars.count > 0 {
                render_pass.set_pipeline(&self.star_pipeline);
                render_pass.set_bind_group(0, &self.globals_bind_group, &[]);
                render_pass.set_bind_group(1, &self.stars.bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.stars.instance_buffer.slice(..));
                render_pass.draw(0..STAR_VERTICES, 0..self.stars.count);
            }
        }

        let changed = self.render_gui(window, &mut encoder, &view, gui, fps);

        self.gpu.queue().submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(changed)
    }

    fn render_gui(
        &mut self,
        window: &Window,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        gui: &mut DebugGui,
        fps: f32,
    ) -> bool {
        let raw_input = self.egui_state.take_egui_input(window);
        let mut changed = false;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            changed = gui.show(ctx, fps);
        });

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        // egui lays out in logical points; the surface holds them at the capped ratio
        let pixels_per_point = clamp_pixel_ratio(window.scale_factor());

        let tris = self
            .egui_ctx
            .tessellate(full_output.shapes, pixels_per_point);
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(self.gpu.device(), self.gpu.queue(), *id, image_delta);
        }

        let (width, height) = self.gpu.size();
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point,
        };

        self.egui_renderer.update_buffers(
            self.gpu.device(),
            self.gpu.queue(),
            encoder,
            &tris,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                })
                .forget_lifetime();

            self.egui_renderer
                .render(&mut render_pass, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        changed
    }

    /// Feed a window event to egui; true if egui consumed it
    pub fn handle_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.egui_state.on_window_event(window, event).consumed
    }

    fn create_mesh_pipeline(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        globals_layout: &wgpu::BindGroupLayout,
        mesh_layout: &wgpu::BindGroupLayout,
    ) -> wgpu::RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[globals_layout, mesh_layout],
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Mesh Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Road and ring are single-sided geometry seen from both sides
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        })
    }

    fn create_star_pipeline(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        globals_layout: &wgpu::BindGroupLayout,
        star_layout: &wgpu::BindGroupLayout,
    ) -> wgpu::RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Star Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/stars.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Star Pipeline Layout"),
            bind_group_layouts: &[globals_layout, star_layout],
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Star Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[StarInstance::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            // Transparent sprites test against depth but never write it
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        })
    }
}

/// Camera and light data as the shaders read it
pub fn globals_uniform(scene: &Scene) -> GlobalsUniform {
    let camera = &scene.camera;
    let ambient = srgb_to_linear(scene.ambient.color).map(|c| c * scene.ambient.intensity);
    let light = &scene.point_light;
    let light_color = srgb_to_linear(light.color).map(|c| c * light.intensity);

    GlobalsUniform {
        view: camera.view_matrix().to_cols_array_2d(),
        projection: camera.projection_matrix().to_cols_array_2d(),
        camera_position: camera.position.to_array(),
        _pad0: 0.0,
        ambient,
        _pad1: 0.0,
        light_position: light.position.to_array(),
        light_range: light.range,
        light_color,
        light_decay: light.decay,
    }
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn upload_mesh(gpu: &GpuContext, layout: &wgpu::BindGroupLayout, node: &SceneNode) -> Option<GpuMesh> {
    let data = node.shape.tessellate()?;
    let device = gpu.device();

    let (color, lit) = match node.material {
        Material::Standard { color } => (color, true),
        Material::Basic { color } => (color, false),
        Material::Points { .. } => return None,
    };

    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Mesh Vertex Buffer"),
        contents: bytemuck::cast_slice(&data.vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Mesh Index Buffer"),
        contents: bytemuck::cast_slice(&data.indices),
        usage: wgpu::BufferUsages::INDEX,
    });
    let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Mesh Uniform Buffer"),
        contents: bytemuck::cast_slice(&[MeshUniform::new(node.transform.matrix(), color, lit)]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("mesh_bind_group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: uniform_buffer.as_entire_binding(),
        }],
    });

    log::debug!(
        "Uploaded mesh for node {:?}: {} triangles",
        node.id,
        data.triangle_count()
    );

    Some(GpuMesh {
        vertex_buffer,
        index_buffer,
        index_count: data.indices.len() as u32,
        uniform_buffer,
        bind_group,
    })
}

fn upload_stars(
    gpu: &GpuContext,
    layout: &wgpu::BindGroupLayout,
    node: &SceneNode,
    alpha: &AlphaMap,
) -> GpuStars {
    let device = gpu.device();
    let points: &[StarInstance] = node
        .shape
        .as_points()
        .map(|cloud| cloud.points.as_slice())
        .unwrap_or(&[]);

    // Zero-sized vertex buffers are invalid
    let placeholder = [StarInstance { position: [0.0; 3] }];
    let contents: &[StarInstance] = if points.is_empty() { &placeholder } else { points };
    let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Star Instance Buffer"),
        contents: bytemuck::cast_slice(contents),
        usage: wgpu::BufferUsages::VERTEX,
    });

    let (color, size) = match node.material {
        Material::Points { color, size } => (color, size),
        Material::Standard { color } | Material::Basic { color } => (color, 1.0),
    };
    let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Star Uniform Buffer"),
        contents: bytemuck::cast_slice(&[StarUniform {
            model: node.transform.matrix().to_cols_array_2d(),
            color: srgb_to_linear(color),
            size,
        }]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });

    let texture_size = wgpu::Extent3d {
        width: alpha.width,
        height: alpha.height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Star Alpha Map"),
        size: texture_size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    gpu.queue().write_texture(
        texture.as_image_copy(),
        &alpha.rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * alpha.width),
            rows_per_image: Some(alpha.height),
        },
        texture_size,
    );
    let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("star_bind_group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&texture_view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(&sampler),
            },
        ],
    });

    GpuStars {
        node: node.id,
        instance_buffer,
        count: points.len() as u32,
        uniform_buffer,
        bind_group,
    }
}
