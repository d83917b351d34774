#![allow(unsafe_code)]

//! The slice of OpenGL the filter talks to.

use std::fmt::Debug;

/// The OpenGL (ES) 2.0 / 3.0 calls used by [`crate::CrtEffect`].
///
/// Implemented for [`glow::Context`], so a host that already renders with glow can hand over its
/// context directly. Hosts with their own bindings (or no bindings at all, see `crt_filter_ffi`)
/// implement this for an adapter.
///
/// Enum arguments (`shader_type`, `target`, `mode`, …) use the raw GL values, as found in [`glow`].
///
/// Every method assumes the context is current on the calling thread.
pub trait GlContext {
    type Shader: Copy + Debug;
    type Program: Copy + Debug;
    type Buffer: Copy + Debug;
    type VertexArray: Copy + Debug;
    type Texture: Copy + Debug;
    type UniformLocation: Clone + Debug;

    /// `GL_VERSION`, e.g. `"OpenGL ES 3.2 V@415.0"` or `"4.6.0 NVIDIA 535.54"`.
    fn version_string(&self) -> String;

    /// `GL_SHADING_LANGUAGE_VERSION`, e.g. `"OpenGL ES GLSL ES 3.20"` or `"1.30"`.
    fn shading_language_version(&self) -> String;

    fn has_extension(&self, name: &str) -> bool;

    fn get_error(&self) -> u32;

    /// `GL_VIEWPORT` as `[x, y, width, height]`.
    fn viewport(&self) -> [i32; 4];

    fn set_viewport(&self, x: i32, y: i32, width: i32, height: i32);

    // Shaders and programs:

    fn create_shader(&self, shader_type: u32) -> Result<Self::Shader, String>;
    fn shader_source(&self, shader: Self::Shader, source: &str);
    fn compile_shader(&self, shader: Self::Shader);
    fn get_shader_compile_status(&self, shader: Self::Shader) -> bool;
    fn get_shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);

    fn create_program(&self) -> Result<Self::Program, String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn link_program(&self, program: Self::Program);
    fn get_program_link_status(&self, program: Self::Program) -> bool;
    fn get_program_info_log(&self, program: Self::Program) -> String;
    fn delete_program(&self, program: Self::Program);
    fn use_program(&self, program: Option<Self::Program>);

    fn get_uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation>;
    fn get_attrib_location(&self, program: Self::Program, name: &str) -> Option<u32>;

    fn uniform_1_i32(&self, location: Option<&Self::UniformLocation>, x: i32);
    fn uniform_1_f32(&self, location: Option<&Self::UniformLocation>, x: f32);
    fn uniform_1_f32_slice(&self, location: Option<&Self::UniformLocation>, v: &[f32]);

    // Buffers and vertex arrays:

    fn create_buffer(&self) -> Result<Self::Buffer, String>;
    fn bind_buffer(&self, target: u32, buffer: Option<Self::Buffer>);
    fn buffer_data_u8_slice(&self, target: u32, data: &[u8], usage: u32);
    fn delete_buffer(&self, buffer: Self::Buffer);

    fn create_vertex_array(&self) -> Result<Self::VertexArray, String>;
    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>);
    fn delete_vertex_array(&self, vertex_array: Self::VertexArray);

    fn vertex_attrib_pointer_f32(
        &self,
        index: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    );
    fn enable_vertex_attrib_array(&self, index: u32);
    fn disable_vertex_attrib_array(&self, index: u32);

    // Textures and drawing:

    fn active_texture(&self, unit: u32);
    fn bind_texture(&self, target: u32, texture: Option<Self::Texture>);
    fn draw_arrays(&self, mode: u32, first: i32, count: i32);
}

// ----------------------------------------------------------------------------

type Glow = glow::Context;

impl GlContext for glow::Context {
    type Shader = <Glow as glow::HasContext>::Shader;
    type Program = <Glow as glow::HasContext>::Program;
    type Buffer = <Glow as glow::HasContext>::Buffer;
    type VertexArray = <Glow as glow::HasContext>::VertexArray;
    type Texture = <Glow as glow::HasContext>::Texture;
    type UniformLocation = <Glow as glow::HasContext>::UniformLocation;

    fn version_string(&self) -> String {
        unsafe { glow::HasContext::get_parameter_string(self, glow::VERSION) }
    }

    fn shading_language_version(&self) -> String {
        unsafe { glow::HasContext::get_parameter_string(self, glow::SHADING_LANGUAGE_VERSION) }
    }

    fn has_extension(&self, name: &str) -> bool {
        glow::HasContext::supported_extensions(self).contains(name)
    }

    fn get_error(&self) -> u32 {
        unsafe { glow::HasContext::get_error(self) }
    }

    fn viewport(&self) -> [i32; 4] {
        let mut viewport = [0; 4];
        unsafe { glow::HasContext::get_parameter_i32_slice(self, glow::VIEWPORT, &mut viewport) };
        viewport
    }

    fn set_viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { glow::HasContext::viewport(self, x, y, width, height) };
    }

    fn create_shader(&self, shader_type: u32) -> Result<Self::Shader, String> {
        unsafe { glow::HasContext::create_shader(self, shader_type) }
    }

    fn shader_source(&self, shader: Self::Shader, source: &str) {
        unsafe { glow::HasContext::shader_source(self, shader, source) };
    }

    fn compile_shader(&self, shader: Self::Shader) {
        unsafe { glow::HasContext::compile_shader(self, shader) };
    }

    fn get_shader_compile_status(&self, shader: Self::Shader) -> bool {
        unsafe { glow::HasContext::get_shader_compile_status(self, shader) }
    }

    fn get_shader_info_log(&self, shader: Self::Shader) -> String {
        unsafe { glow::HasContext::get_shader_info_log(self, shader) }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { glow::HasContext::delete_shader(self, shader) };
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        unsafe { glow::HasContext::create_program(self) }
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { glow::HasContext::attach_shader(self, program, shader) };
    }

    fn detach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { glow::HasContext::detach_shader(self, program, shader) };
    }

    fn link_program(&self, program: Self::Program) {
        unsafe { glow::HasContext::link_program(self, program) };
    }

    fn get_program_link_status(&self, program: Self::Program) -> bool {
        unsafe { glow::HasContext::get_program_link_status(self, program) }
    }

    fn get_program_info_log(&self, program: Self::Program) -> String {
        unsafe { glow::HasContext::get_program_info_log(self, program) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { glow::HasContext::delete_program(self, program) };
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe { glow::HasContext::use_program(self, program) };
    }

    fn get_uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        unsafe { glow::HasContext::get_uniform_location(self, program, name) }
    }

    fn get_attrib_location(&self, program: Self::Program, name: &str) -> Option<u32> {
        unsafe { glow::HasContext::get_attrib_location(self, program, name) }
    }

    fn uniform_1_i32(&self, location: Option<&Self::UniformLocation>, x: i32) {
        unsafe { glow::HasContext::uniform_1_i32(self, location, x) };
    }

    fn uniform_1_f32(&self, location: Option<&Self::UniformLocation>, x: f32) {
        unsafe { glow::HasContext::uniform_1_f32(self, location, x) };
    }

    fn uniform_1_f32_slice(&self, location: Option<&Self::UniformLocation>, v: &[f32]) {
        unsafe { glow::HasContext::uniform_1_f32_slice(self, location, v) };
    }

    fn create_buffer(&self) -> Result<Self::Buffer, String> {
        unsafe { glow::HasContext::create_buffer(self) }
    }

    fn bind_buffer(&self, target: u32, buffer: Option<Self::Buffer>) {
        unsafe { glow::HasContext::bind_buffer(self, target, buffer) };
    }

    fn buffer_data_u8_slice(&self, target: u32, data: &[u8], usage: u32) {
        unsafe { glow::HasContext::buffer_data_u8_slice(self, target, data, usage) };
    }

    fn delete_buffer(&self, buffer: Self::Buffer) {
        unsafe { glow::HasContext::delete_buffer(self, buffer) };
    }

    fn create_vertex_array(&self) -> Result<Self::VertexArray, String> {
        unsafe { glow::HasContext::create_vertex_array(self) }
    }

    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>) {
        unsafe { glow::HasContext::bind_vertex_array(self, vertex_array) };
    }

    fn delete_vertex_array(&self, vertex_array: Self::VertexArray) {
        unsafe { glow::HasContext::delete_vertex_array(self, vertex_array) };
    }

    fn vertex_attrib_pointer_f32(
        &self,
        index: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        unsafe {
            glow::HasContext::vertex_attrib_pointer_f32(
                self, index, size, data_type, normalized, stride, offset,
            );
        }
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        unsafe { glow::HasContext::enable_vertex_attrib_array(self, index) };
    }

    fn disable_vertex_attrib_array(&self, index: u32) {
        unsafe { glow::HasContext::disable_vertex_attrib_array(self, index) };
    }

    fn active_texture(&self, unit: u32) {
        unsafe { glow::HasContext::active_texture(self, unit) };
    }

    fn bind_texture(&self, target: u32, texture: Option<Self::Texture>) {
        unsafe { glow::HasContext::bind_texture(self, target, texture) };
    }

    fn draw_arrays(&self, mode: u32, first: i32, count: i32) {
        unsafe { glow::HasContext::draw_arrays(self, mode, first, count) };
    }
}
