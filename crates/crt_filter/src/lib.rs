//! A CRT emulation post-processing filter for [`glow`](https://github.com/grovesNL/glow)
//! (and other OpenGL / OpenGL ES bindings).
//!
//! Render your frame into an offscreen texture, bind the real render target, and hand the
//! texture to [`CrtEffect::draw`]. The filter bends the image like the glass of a tube,
//! lights a scanline that sweeps down the screen, masks every pixel into red, green and blue
//! phosphors and softens the result with a small horizontal blur.
//!
//! ```no_run
//! # fn host(gl: std::sync::Arc<glow::Context>, fbo_texture: glow::Texture) {
//! use crt_filter::{CrtEffect, CrtOptions};
//!
//! let mut crt = CrtEffect::new(gl, CrtOptions::default());
//! crt.init(640, 480).ok(); // errors are logged, and the effect then draws nothing
//! crt.register_redraw_callback(|| { /* wake up the event loop */ }).ok();
//!
//! // every frame, after rendering into `fbo_texture`:
//! crt.draw(fbo_texture, [640, 480]);
//!
//! // when done:
//! crt.destroy();
//! # }
//! ```
//!
//! The main type is [`CrtEffect`]. Graphics calls go through the [`GlContext`] trait,
//! which is implemented for [`glow::Context`].
//!
//! ## Feature flags
#![cfg_attr(feature = "document-features", doc = document_features::document_features!())]
//!

#![expect(clippy::undocumented_unsafe_blocks)]

mod effect;
mod error;
mod gl;
pub mod kernel;
pub mod logging;
mod mesh;
mod misc_util;
mod options;
mod program;
mod shader_version;
mod ticker;
mod vao;

pub use glow;

pub use effect::{CrtEffect, Lifecycle};
pub use error::{CrtError, ShaderStage};
pub use gl::GlContext;
pub use mesh::{CrtMesh, MIN_DIMENSION, Topology};
pub use options::{CrtOptions, DEFAULT_TICK_RATE_HZ, DEFAULT_TILE_SIZE};
pub use shader_version::ShaderVersion;
pub use ticker::{RedrawCallback, ScanlinePhase, Ticker};

/// Check for OpenGL error and report it using `log::error`.
///
/// Only active in debug builds!
///
/// ``` no_run
/// # let glow_context: glow::Context = todo!();
/// use crt_filter::check_for_gl_error;
/// check_for_gl_error!(&glow_context);
/// check_for_gl_error!(&glow_context, "during painting");
/// ```
#[macro_export]
macro_rules! check_for_gl_error {
    ($gl: expr) => {{
        if cfg!(debug_assertions) {
            $crate::check_for_gl_error_impl($gl, file!(), line!(), "")
        }
    }};
    ($gl: expr, $context: literal) => {{
        if cfg!(debug_assertions) {
            $crate::check_for_gl_error_impl($gl, file!(), line!(), $context)
        }
    }};
}

#[doc(hidden)]
pub fn check_for_gl_error_impl<G: GlContext + ?Sized>(
    gl: &G,
    file: &str,
    line: u32,
    context: &str,
) {
    let error_code = gl.get_error();
    if error_code != glow::NO_ERROR {
        let error_str = misc_util::gl_error_name(error_code);
        if context.is_empty() {
            log::error!("GL error, at {file}:{line}: {error_str} (0x{error_code:X})");
        } else {
            log::error!("GL error, at {file}:{line} ({context}): {error_str} (0x{error_code:X})");
        }
    }
}
