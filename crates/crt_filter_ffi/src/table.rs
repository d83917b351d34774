//! Graphics entry points handed over by the host, one C function pointer each.

use std::ffi::{CString, c_char, c_int, c_long, c_uchar, c_uint, c_void};

use crt_filter::{GlContext, glow};

/// The OpenGL ES 2.0 functions a host without a loader hands to [`crate::crt_filter_create`].
///
/// The layout is part of the C ABI (see `include/crt_filter.h`): fields must not be reordered.
/// Any entry may be null. Calls through a missing entry are skipped, and objects it would have
/// created fail to be created.
///
/// The entries from `clear_color` on to the end (except textures, viewport and drawing) are not
/// used by the filter; they are there so hosts can pass the same table they render with.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct GlFunctions {
    pub create_program: Option<unsafe extern "C" fn() -> c_uint>,
    pub create_shader: Option<unsafe extern "C" fn(shader_type: c_uint) -> c_uint>,
    pub shader_source: Option<
        unsafe extern "C" fn(
            shader: c_uint,
            count: c_int,
            string: *const *const c_char,
            length: *const c_int,
        ),
    >,
    pub compile_shader: Option<unsafe extern "C" fn(shader: c_uint)>,
    pub attach_shader: Option<unsafe extern "C" fn(program: c_uint, shader: c_uint)>,
    pub link_program: Option<unsafe extern "C" fn(program: c_uint)>,
    pub get_shaderiv:
        Option<unsafe extern "C" fn(shader: c_uint, pname: c_uint, params: *mut c_int)>,
    pub get_programiv:
        Option<unsafe extern "C" fn(program: c_uint, pname: c_uint, params: *mut c_int)>,
    pub get_shader_info_log: Option<
        unsafe extern "C" fn(
            shader: c_uint,
            buf_size: c_int,
            length: *mut c_int,
            info_log: *mut c_char,
        ),
    >,
    pub get_program_info_log: Option<
        unsafe extern "C" fn(
            program: c_uint,
            buf_size: c_int,
            length: *mut c_int,
            info_log: *mut c_char,
        ),
    >,
    pub get_uniform_location:
        Option<unsafe extern "C" fn(program: c_uint, name: *const c_char) -> c_int>,
    pub get_attrib_location:
        Option<unsafe extern "C" fn(program: c_uint, name: *const c_char) -> c_int>,
    pub delete_shader: Option<unsafe extern "C" fn(shader: c_uint)>,
    pub delete_program: Option<unsafe extern "C" fn(program: c_uint)>,
    pub use_program: Option<unsafe extern "C" fn(program: c_uint)>,
    pub gen_buffers: Option<unsafe extern "C" fn(n: c_int, buffers: *mut c_uint)>,
    pub delete_buffers: Option<unsafe extern "C" fn(n: c_int, buffers: *const c_uint)>,
    pub bind_buffer: Option<unsafe extern "C" fn(target: c_uint, buffer: c_uint)>,
    pub buffer_data: Option<
        unsafe extern "C" fn(target: c_uint, size: c_long, data: *const c_void, usage: c_uint),
    >,
    pub get_error: Option<unsafe extern "C" fn() -> c_uint>,
    pub uniform_1fv: Option<unsafe extern "C" fn(location: c_int, count: c_int, value: *const f32)>,
    pub uniform_1f: Option<unsafe extern "C" fn(location: c_int, v0: f32)>,
    pub uniform_1i: Option<unsafe extern "C" fn(location: c_int, v0: c_int)>,
    pub get_integerv: Option<unsafe extern "C" fn(pname: c_uint, params: *mut c_int)>,
    pub viewport: Option<unsafe extern "C" fn(x: c_int, y: c_int, width: c_int, height: c_int)>,
    pub clear_color: Option<unsafe extern "C" fn(red: f32, green: f32, blue: f32, alpha: f32)>,
    pub clear: Option<unsafe extern "C" fn(mask: c_uint)>,
    pub bind_framebuffer: Option<unsafe extern "C" fn(target: c_uint, framebuffer: c_uint)>,
    pub gen_framebuffers: Option<unsafe extern "C" fn(n: c_int, framebuffers: *mut c_uint)>,
    pub gen_textures: Option<unsafe extern "C" fn(n: c_int, textures: *mut c_uint)>,
    pub bind_texture: Option<unsafe extern "C" fn(target: c_uint, texture: c_uint)>,
    pub active_texture: Option<unsafe extern "C" fn(texture: c_uint)>,
    pub vertex_attrib_pointer: Option<
        unsafe extern "C" fn(
            index: c_uint,
            size: c_int,
            data_type: c_uint,
            normalized: c_uchar,
            stride: c_int,
            pointer: *const c_void,
        ),
    >,
    pub enable_vertex_attrib_array: Option<unsafe extern "C" fn(index: c_uint)>,
    pub draw_arrays: Option<unsafe extern "C" fn(mode: c_uint, first: c_int, count: c_int)>,
    pub disable_vertex_attrib_array: Option<unsafe extern "C" fn(index: c_uint)>,
    pub tex_image_2d: Option<
        unsafe extern "C" fn(
            target: c_uint,
            level: c_int,
            internal_format: c_int,
            width: c_int,
            height: c_int,
            border: c_int,
            format: c_uint,
            data_type: c_uint,
            pixels: *const c_void,
        ),
    >,
    pub tex_parameteri: Option<unsafe extern "C" fn(target: c_uint, pname: c_uint, param: c_int)>,
    pub framebuffer_texture_2d: Option<
        unsafe extern "C" fn(
            target: c_uint,
            attachment: c_uint,
            textarget: c_uint,
            texture: c_uint,
            level: c_int,
        ),
    >,
    pub check_framebuffer_status: Option<unsafe extern "C" fn(target: c_uint) -> c_uint>,
    pub delete_framebuffers: Option<unsafe extern "C" fn(n: c_int, framebuffers: *const c_uint)>,
    pub delete_textures: Option<unsafe extern "C" fn(n: c_int, textures: *const c_uint)>,
}

impl GlFunctions {
    /// Entry points the filter calls that this table lacks.
    pub fn missing_entry_points(&self) -> Vec<&'static str> {
        let required = [
            ("glCreateProgram", self.create_program.is_some()),
            ("glCreateShader", self.create_shader.is_some()),
            ("glShaderSource", self.shader_source.is_some()),
            ("glCompileShader", self.compile_shader.is_some()),
            ("glAttachShader", self.attach_shader.is_some()),
            ("glLinkProgram", self.link_program.is_some()),
            ("glGetShaderiv", self.get_shaderiv.is_some()),
            ("glGetProgramiv", self.get_programiv.is_some()),
            ("glGetShaderInfoLog", self.get_shader_info_log.is_some()),
            ("glGetProgramInfoLog", self.get_program_info_log.is_some()),
            ("glGetUniformLocation", self.get_uniform_location.is_some()),
            ("glGetAttribLocation", self.get_attrib_location.is_some()),
            ("glDeleteShader", self.delete_shader.is_some()),
            ("glDeleteProgram", self.delete_program.is_some()),
            ("glUseProgram", self.use_program.is_some()),
            ("glGenBuffers", self.gen_buffers.is_some()),
            ("glDeleteBuffers", self.delete_buffers.is_some()),
            ("glBindBuffer", self.bind_buffer.is_some()),
            ("glBufferData", self.buffer_data.is_some()),
            ("glGetError", self.get_error.is_some()),
            ("glUniform1fv", self.uniform_1fv.is_some()),
            ("glUniform1f", self.uniform_1f.is_some()),
            ("glUniform1i", self.uniform_1i.is_some()),
            ("glGetIntegerv", self.get_integerv.is_some()),
            ("glViewport", self.viewport.is_some()),
            ("glBindTexture", self.bind_texture.is_some()),
            ("glActiveTexture", self.active_texture.is_some()),
            ("glVertexAttribPointer", self.vertex_attrib_pointer.is_some()),
            (
                "glEnableVertexAttribArray",
                self.enable_vertex_attrib_array.is_some(),
            ),
            ("glDrawArrays", self.draw_arrays.is_some()),
            (
                "glDisableVertexAttribArray",
                self.disable_vertex_attrib_array.is_some(),
            ),
        ];
        required
            .into_iter()
            .filter(|(_, present)| !present)
            .map(|(name, _)| name)
            .collect()
    }
}

// ----------------------------------------------------------------------------

/// Call an optional entry point, returning `None` if the table lacks it.
macro_rules! gl_call {
    ($gl:expr, $name:ident($($arg:expr),* $(,)?)) => {
        $gl.functions.$name.map(|function| {
            // SAFETY: the host guarantees valid entry points for a context current on this thread.
            unsafe { function($($arg),*) }
        })
    };
}

/// A [`GlContext`] on top of a [`GlFunctions`] table.
///
/// The table is an OpenGL ES 2.0 subset without vertex array objects or `glGetString`,
/// so this reports itself as ES 2.0 with GLSL ES 1.00 and no extensions.
#[derive(Clone, Copy, Debug)]
pub struct TableGl {
    functions: GlFunctions,
}

impl TableGl {
    pub fn new(functions: GlFunctions) -> Self {
        Self { functions }
    }

    fn shader_parameter(&self, shader: u32, pname: u32) -> c_int {
        let mut value = 0;
        gl_call!(self, get_shaderiv(shader, pname, &raw mut value));
        value
    }

    fn program_parameter(&self, program: u32, pname: u32) -> c_int {
        let mut value = 0;
        gl_call!(self, get_programiv(program, pname, &raw mut value));
        value
    }

    /// Read an info log of (at most) `length` bytes, including the terminating nul.
    fn read_info_log(
        length: c_int,
        read: impl FnOnce(c_int, *mut c_int, *mut c_char) -> Option<()>,
    ) -> String {
        if length <= 0 {
            return String::new();
        }
        let mut buffer = vec![0_u8; length as usize];
        let mut written: c_int = 0;
        if read(length, &raw mut written, buffer.as_mut_ptr().cast()).is_none() {
            return String::new();
        }
        buffer.truncate((written.max(0) as usize).min(buffer.len()));
        String::from_utf8_lossy(&buffer).into_owned()
    }

    fn c_string(name: &str) -> Option<CString> {
        match CString::new(name) {
            Ok(name) => Some(name),
            Err(err) => {
                log::error!("Can't pass {name:?} to GL: {err}");
                None
            }
        }
    }
}

impl GlContext for TableGl {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type VertexArray = u32;
    type Texture = u32;
    type UniformLocation = i32;

    fn version_string(&self) -> String {
        "OpenGL ES 2.0 (host function table)".to_owned()
    }

    fn shading_language_version(&self) -> String {
        "OpenGL ES GLSL ES 1.00".to_owned()
    }

    fn has_extension(&self, _name: &str) -> bool {
        false
    }

    fn get_error(&self) -> u32 {
        gl_call!(self, get_error()).unwrap_or(glow::NO_ERROR)
    }

    fn viewport(&self) -> [i32; 4] {
        let mut viewport = [0; 4];
        gl_call!(self, get_integerv(glow::VIEWPORT, viewport.as_mut_ptr()));
        viewport
    }

    fn set_viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        gl_call!(self, viewport(x, y, width, height));
    }

    fn create_shader(&self, shader_type: u32) -> Result<u32, String> {
        match gl_call!(self, create_shader(shader_type)) {
            None => Err("glCreateShader is missing".to_owned()),
            Some(0) => Err("glCreateShader returned 0".to_owned()),
            Some(shader) => Ok(shader),
        }
    }

    fn shader_source(&self, shader: u32, source: &str) {
        let Some(source) = Self::c_string(source) else {
            return;
        };
        let strings = [source.as_ptr()];
        gl_call!(
            self,
            shader_source(shader, 1, strings.as_ptr(), std::ptr::null())
        );
    }

    fn compile_shader(&self, shader: u32) {
        gl_call!(self, compile_shader(shader));
    }

    fn get_shader_compile_status(&self, shader: u32) -> bool {
        self.shader_parameter(shader, glow::COMPILE_STATUS) != 0
    }

    fn get_shader_info_log(&self, shader: u32) -> String {
        let length = self.shader_parameter(shader, glow::INFO_LOG_LENGTH);
        Self::read_info_log(length, |size, written, log| {
            gl_call!(self, get_shader_info_log(shader, size, written, log))
        })
    }

    fn delete_shader(&self, shader: u32) {
        gl_call!(self, delete_shader(shader));
    }

    fn create_program(&self) -> Result<u32, String> {
        match gl_call!(self, create_program()) {
            None => Err("glCreateProgram is missing".to_owned()),
            Some(0) => Err("glCreateProgram returned 0".to_owned()),
            Some(program) => Ok(program),
        }
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        gl_call!(self, attach_shader(program, shader));
    }

    fn detach_shader(&self, _program: u32, _shader: u32) {
        // Not in the table. The shaders are deleted right after linking, and go away with the program.
    }

    fn link_program(&self, program: u32) {
        gl_call!(self, link_program(program));
    }

    fn get_program_link_status(&self, program: u32) -> bool {
        self.program_parameter(program, glow::LINK_STATUS) != 0
    }

    fn get_program_info_log(&self, program: u32) -> String {
        let length = self.program_parameter(program, glow::INFO_LOG_LENGTH);
        Self::read_info_log(length, |size, written, log| {
            gl_call!(self, get_program_info_log(program, size, written, log))
        })
    }

    fn delete_program(&self, program: u32) {
        gl_call!(self, delete_program(program));
    }

    fn use_program(&self, program: Option<u32>) {
        gl_call!(self, use_program(program.unwrap_or(0)));
    }

    fn get_uniform_location(&self, program: u32, name: &str) -> Option<i32> {
        let name = Self::c_string(name)?;
        gl_call!(self, get_uniform_location(program, name.as_ptr())).filter(|&loc| loc >= 0)
    }

    fn get_attrib_location(&self, program: u32, name: &str) -> Option<u32> {
        let name = Self::c_string(name)?;
        let location = gl_call!(self, get_attrib_location(program, name.as_ptr()))?;
        u32::try_from(location).ok()
    }

    fn uniform_1_i32(&self, location: Option<&i32>, x: i32) {
        if let Some(&location) = location {
            gl_call!(self, uniform_1i(location, x));
        }
    }

    fn uniform_1_f32(&self, location: Option<&i32>, x: f32) {
        if let Some(&location) = location {
            gl_call!(self, uniform_1f(location, x));
        }
    }

    fn uniform_1_f32_slice(&self, location: Option<&i32>, v: &[f32]) {
        if let Some(&location) = location {
            gl_call!(self, uniform_1fv(location, v.len() as c_int, v.as_ptr()));
        }
    }

    fn create_buffer(&self) -> Result<u32, String> {
        let mut buffer = 0;
        match gl_call!(self, gen_buffers(1, &raw mut buffer)) {
            None => Err("glGenBuffers is missing".to_owned()),
            Some(()) if buffer == 0 => Err("glGenBuffers returned 0".to_owned()),
            Some(()) => Ok(buffer),
        }
    }

    fn bind_buffer(&self, target: u32, buffer: Option<u32>) {
        gl_call!(self, bind_buffer(target, buffer.unwrap_or(0)));
    }

    fn buffer_data_u8_slice(&self, target: u32, data: &[u8], usage: u32) {
        gl_call!(
            self,
            buffer_data(target, data.len() as c_long, data.as_ptr().cast(), usage)
        );
    }

    fn delete_buffer(&self, buffer: u32) {
        gl_call!(self, delete_buffers(1, &raw const buffer));
    }

    fn create_vertex_array(&self) -> Result<u32, String> {
        Err("vertex array objects are not in the function table".to_owned())
    }

    fn bind_vertex_array(&self, _vertex_array: Option<u32>) {}

    fn delete_vertex_array(&self, _vertex_array: u32) {}

    fn vertex_attrib_pointer_f32(
        &self,
        index: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        // With a buffer bound, the "pointer" is a byte offset into it.
        let pointer = std::ptr::without_provenance::<c_void>(offset as usize);
        gl_call!(
            self,
            vertex_attrib_pointer(
                index,
                size,
                data_type,
                c_uchar::from(normalized),
                stride,
                pointer,
            )
        );
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        gl_call!(self, enable_vertex_attrib_array(index));
    }

    fn disable_vertex_attrib_array(&self, index: u32) {
        gl_call!(self, disable_vertex_attrib_array(index));
    }

    fn active_texture(&self, unit: u32) {
        gl_call!(self, active_texture(unit));
    }

    fn bind_texture(&self, target: u32, texture: Option<u32>) {
        gl_call!(self, bind_texture(target, texture.unwrap_or(0)));
    }

    fn draw_arrays(&self, mode: u32, first: i32, count: i32) {
        gl_call!(self, draw_arrays(mode, first, count));
    }
}
