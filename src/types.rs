use glam::Mat4;

/// Mesh vertex: position + normal
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x3,
                offset: 0,
                shader_location: 0,
            },
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x3,
                offset: 12,
                shader_location: 1,
            },
        ],
    };
}

/// One star of the point cloud, drawn as an instanced billboard
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct StarInstance {
    pub position: [f32; 3],
}

impl StarInstance {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<StarInstance>() as u64,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &[wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x3,
            offset: 0,
            shader_location: 0,
        }],
    };
}

/// Per-frame camera and light data, bind group 0 of every pipeline
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalsUniform {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub camera_position: [f32; 3],
    pub _pad0: f32,
    /// rgb premultiplied by intensity
    pub ambient: [f32; 3],
    pub _pad1: f32,
    pub light_position: [f32; 3],
    pub light_range: f32,
    /// rgb premultiplied by intensity
    pub light_color: [f32; 3],
    pub light_decay: f32,
}

/// Per-node data for meshes
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshUniform {
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose of the model matrix for normals
    pub normal_matrix: [[f32; 4]; 4],
    pub color: [f32; 3],
    /// 1.0 for lit (standard) materials, 0.0 for unlit (basic)
    pub lit: f32,
}

impl MeshUniform {
    pub fn new(model: Mat4, color: [f32; 3], lit: bool) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: model.inverse().transpose().to_cols_array_2d(),
            color: srgb_to_linear(color),
            lit: if lit { 1.0 } else { 0.0 },
        }
    }
}

/// Per-node data for the starfield
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct StarUniform {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 3],
    pub size: f32,
}

/// Convert an sRGB colour to linear space for shading
pub fn srgb_to_linear(color: [f32; 3]) -> [f32; 3] {
    color.map(|c| {
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    })
}
