//! A fake OpenGL context that records what the filter does with it.

#![allow(dead_code)] // not every test uses every helper

use std::{
    cell::{Cell, RefCell},
    collections::{BTreeMap, BTreeSet},
};

use crt_filter::{GlContext, glow};

/// Records calls, tracks object lifetimes and "compiles" shaders with a couple of sanity checks:
/// a source must contain `void main` and have balanced braces.
pub struct MockGl {
    pub version: String,
    pub glsl_version: String,
    pub viewport: Cell<[i32; 4]>,

    /// Make every link fail.
    pub fail_link: Cell<bool>,

    calls: RefCell<Vec<&'static str>>,
    next_id: Cell<u32>,
    live: RefCell<BTreeSet<(&'static str, u32)>>,

    shader_sources: RefCell<BTreeMap<u32, String>>,
    program_shaders: RefCell<BTreeMap<u32, Vec<u32>>>,
    compiled: RefCell<Vec<String>>,

    uniforms: RefCell<BTreeMap<String, Vec<f32>>>,
    draws: RefCell<Vec<(u32, i32, i32)>>,
    uploads: RefCell<Vec<usize>>,
    viewports_set: RefCell<Vec<[i32; 4]>>,
}

impl Default for MockGl {
    fn default() -> Self {
        Self::new("3.3.0 Mock", "3.30 Mock")
    }
}

impl MockGl {
    pub fn new(version: &str, glsl_version: &str) -> Self {
        Self {
            version: version.to_owned(),
            glsl_version: glsl_version.to_owned(),
            viewport: Cell::new([0, 0, 640, 480]),
            fail_link: Cell::new(false),
            calls: RefCell::default(),
            next_id: Cell::new(1),
            live: RefCell::default(),
            shader_sources: RefCell::default(),
            program_shaders: RefCell::default(),
            compiled: RefCell::default(),
            uniforms: RefCell::default(),
            draws: RefCell::default(),
            uploads: RefCell::default(),
            viewports_set: RefCell::default(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    pub fn reset_calls(&self) {
        self.calls.borrow_mut().clear();
        self.draws.borrow_mut().clear();
        self.uploads.borrow_mut().clear();
        self.viewports_set.borrow_mut().clear();
    }

    /// GL objects created and not yet deleted.
    pub fn live_objects(&self) -> Vec<(&'static str, u32)> {
        self.live.borrow().iter().copied().collect()
    }

    /// Every source handed to `shader_source`, in order.
    pub fn compiled_sources(&self) -> Vec<String> {
        self.compiled.borrow().clone()
    }

    pub fn uniform(&self, name: &str) -> Option<Vec<f32>> {
        self.uniforms.borrow().get(name).cloned()
    }

    /// `(mode, first, count)` of every draw call.
    pub fn draws(&self) -> Vec<(u32, i32, i32)> {
        self.draws.borrow().clone()
    }

    /// Byte sizes of every buffer upload.
    pub fn uploads(&self) -> Vec<usize> {
        self.uploads.borrow().clone()
    }

    pub fn viewports_set(&self) -> Vec<[i32; 4]> {
        self.viewports_set.borrow().clone()
    }

    fn record(&self, name: &'static str) {
        self.calls.borrow_mut().push(name);
    }

    fn create(&self, kind: &'static str) -> u32 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.live.borrow_mut().insert((kind, id));
        id
    }

    fn delete(&self, kind: &'static str, id: u32) {
        let existed = self.live.borrow_mut().remove(&(kind, id));
        assert!(existed, "deleted {kind} {id} which is not alive");
    }

    fn program_source(&self, program: u32) -> String {
        let sources = self.shader_sources.borrow();
        self.program_shaders
            .borrow()
            .get(&program)
            .into_iter()
            .flatten()
            .filter_map(|shader| sources.get(shader))
            .cloned()
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn looks_valid(source: &str) -> bool {
    source.contains("void main") && source.matches('{').count() == source.matches('}').count()
}

impl GlContext for MockGl {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type VertexArray = u32;
    type Texture = u32;
    type UniformLocation = String;

    fn version_string(&self) -> String {
        self.record("version_string");
        self.version.clone()
    }

    fn shading_language_version(&self) -> String {
        self.record("shading_language_version");
        self.glsl_version.clone()
    }

    fn has_extension(&self, _name: &str) -> bool {
        self.record("has_extension");
        false
    }

    fn get_error(&self) -> u32 {
        self.record("get_error");
        glow::NO_ERROR
    }

    fn viewport(&self) -> [i32; 4] {
        self.record("viewport");
        self.viewport.get()
    }

    fn set_viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record("set_viewport");
        self.viewports_set.borrow_mut().push([x, y, width, height]);
    }

    fn create_shader(&self, _shader_type: u32) -> Result<u32, String> {
        self.record("create_shader");
        Ok(self.create("shader"))
    }

    fn shader_source(&self, shader: u32, source: &str) {
        self.record("shader_source");
        self.shader_sources
            .borrow_mut()
            .insert(shader, source.to_owned());
        self.compiled.borrow_mut().push(source.to_owned());
    }

    fn compile_shader(&self, _shader: u32) {
        self.record("compile_shader");
    }

    fn get_shader_compile_status(&self, shader: u32) -> bool {
        self.record("get_shader_compile_status");
        self.shader_sources
            .borrow()
            .get(&shader)
            .is_some_and(|source| looks_valid(source))
    }

    fn get_shader_info_log(&self, _shader: u32) -> String {
        self.record("get_shader_info_log");
        "ERROR: 0:1: syntax error".to_owned()
    }

    fn delete_shader(&self, shader: u32) {
        self.record("delete_shader");
        self.delete("shader", shader);
    }

    fn create_program(&self) -> Result<u32, String> {
        self.record("create_program");
        Ok(self.create("program"))
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        self.record("attach_shader");
        self.program_shaders
            .borrow_mut()
            .entry(program)
            .or_default()
            .push(shader);
    }

    fn detach_shader(&self, _program: u32, _shader: u32) {
        self.record("detach_shader");
    }

    fn link_program(&self, _program: u32) {
        self.record("link_program");
    }

    fn get_program_link_status(&self, _program: u32) -> bool {
        self.record("get_program_link_status");
        !self.fail_link.get()
    }

    fn get_program_info_log(&self, _program: u32) -> String {
        self.record("get_program_info_log");
        "ERROR: varying v_uv not written by vertex shader".to_owned()
    }

    fn delete_program(&self, program: u32) {
        self.record("delete_program");
        self.delete("program", program);
    }

    fn use_program(&self, _program: Option<u32>) {
        self.record("use_program");
    }

    fn get_uniform_location(&self, program: u32, name: &str) -> Option<String> {
        self.record("get_uniform_location");
        self.program_source(program)
            .contains(name)
            .then(|| name.to_owned())
    }

    fn get_attrib_location(&self, program: u32, name: &str) -> Option<u32> {
        self.record("get_attrib_location");
        self.program_source(program).contains(name).then_some(0)
    }

    fn uniform_1_i32(&self, location: Option<&String>, x: i32) {
        self.record("uniform_1_i32");
        if let Some(name) = location {
            self.uniforms
                .borrow_mut()
                .insert(name.clone(), vec![x as f32]);
        }
    }

    fn uniform_1_f32(&self, location: Option<&String>, x: f32) {
        self.record("uniform_1_f32");
        if let Some(name) = location {
            self.uniforms.borrow_mut().insert(name.clone(), vec![x]);
        }
    }

    fn uniform_1_f32_slice(&self, location: Option<&String>, v: &[f32]) {
        self.record("uniform_1_f32_slice");
        if let Some(name) = location {
            self.uniforms.borrow_mut().insert(name.clone(), v.to_vec());
        }
    }

    fn create_buffer(&self) -> Result<u32, String> {
        self.record("create_buffer");
        Ok(self.create("buffer"))
    }

    fn bind_buffer(&self, _target: u32, _buffer: Option<u32>) {
        self.record("bind_buffer");
    }

    fn buffer_data_u8_slice(&self, _target: u32, data: &[u8], _usage: u32) {
        self.record("buffer_data_u8_slice");
        self.uploads.borrow_mut().push(data.len());
    }

    fn delete_buffer(&self, buffer: u32) {
        self.record("delete_buffer");
        self.delete("buffer", buffer);
    }

    fn create_vertex_array(&self) -> Result<u32, String> {
        self.record("create_vertex_array");
        Ok(self.create("vertex_array"))
    }

    fn bind_vertex_array(&self, _vertex_array: Option<u32>) {
        self.record("bind_vertex_array");
    }

    fn delete_vertex_array(&self, vertex_array: u32) {
        self.record("delete_vertex_array");
        self.delete("vertex_array", vertex_array);
    }

    fn vertex_attrib_pointer_f32(
        &self,
        _index: u32,
        _size: i32,
        _data_type: u32,
        _normalized: bool,
        _stride: i32,
        _offset: i32,
    ) {
        self.record("vertex_attrib_pointer_f32");
    }

    fn enable_vertex_attrib_array(&self, _index: u32) {
        self.record("enable_vertex_attrib_array");
    }

    fn disable_vertex_attrib_array(&self, _index: u32) {
        self.record("disable_vertex_attrib_array");
    }

    fn active_texture(&self, _unit: u32) {
        self.record("active_texture");
    }

    fn bind_texture(&self, _target: u32, _texture: Option<u32>) {
        self.record("bind_texture");
    }

    fn draw_arrays(&self, mode: u32, first: i32, count: i32) {
        self.record("draw_arrays");
        self.draws.borrow_mut().push((mode, first, count));
    }
}
