//! C ABI for [`crt_filter`], so hosts written in other languages can `dlopen("libcrtfilter.so")`.
//!
//! Every entry point takes the opaque handle returned by [`crt_filter_create`] or
//! [`crt_filter_create_with_loader`]; null handles are ignored. All calls except
//! [`crt_filter_register_callback`]'s callback happen on the thread with the current context.
//!
//! See `include/crt_filter.h` for the C declarations.

#![allow(unsafe_code)]

mod table;

use std::{
    ffi::{CStr, c_char, c_int, c_void},
    num::NonZeroU32,
    path::Path,
    sync::Arc,
};

use crt_filter::{CrtEffect, CrtOptions, glow};

pub use table::{GlFunctions, TableGl};

/// A host-side loader like `eglGetProcAddress` or `glfwGetProcAddress`.
pub type GetProcAddress = unsafe extern "C" fn(name: *const c_char) -> *const c_void;

/// A host-side "please render another frame".
pub type RedrawFn = unsafe extern "C" fn();

/// The effect behind a handle, over whichever graphics binding the host provided.
enum Binding {
    Glow(CrtEffect<glow::Context>),
    Table(CrtEffect<TableGl>),
}

/// Opaque to C.
pub struct CrtFilter {
    binding: Binding,
}

macro_rules! with_effect {
    ($filter:expr, $effect:ident => $body:expr) => {
        match &mut $filter.binding {
            Binding::Glow($effect) => $body,
            Binding::Table($effect) => $body,
        }
    };
}

impl CrtFilter {
    fn new(binding: Binding) -> *mut Self {
        Box::into_raw(Box::new(Self { binding }))
    }

    fn draw(&mut self, texture: u32, size: [u32; 2]) {
        match &mut self.binding {
            Binding::Glow(effect) => {
                if let Some(texture) = NonZeroU32::new(texture) {
                    effect.draw(glow::NativeTexture(texture), size);
                }
            }
            Binding::Table(effect) => effect.draw(texture, size),
        }
    }
}

// ----------------------------------------------------------------------------

/// Install the logger: to `log_path` if given, else to the platform's default sink.
///
/// # Safety
/// `log_path` must be null or a valid nul-terminated string.
unsafe fn init_logging(log_path: *const c_char) {
    let path = if log_path.is_null() {
        None
    } else {
        // SAFETY: non-null, and the caller promised a nul-terminated string.
        match unsafe { CStr::from_ptr(log_path) }.to_str() {
            Ok(path) => Some(Path::new(path)),
            Err(err) => {
                crt_filter::logging::init(None);
                log::warn!("Ignoring log path that is not UTF-8: {err}");
                return;
            }
        }
    };
    crt_filter::logging::init(path);
}

/// # Safety
/// `filter` must be null or a live handle from one of the `crt_filter_create*` functions.
unsafe fn filter_mut<'a>(filter: *mut CrtFilter) -> Option<&'a mut CrtFilter> {
    // SAFETY: live handles are unique boxes, only touched from the context thread.
    unsafe { filter.as_mut() }
}

/// Negative sizes from C count as empty.
fn size_from_c(width: c_int, height: c_int) -> [u32; 2] {
    [width, height].map(|d| u32::try_from(d).unwrap_or(0))
}

// ----------------------------------------------------------------------------

/// Create a filter drawing through a table of graphics entry points.
///
/// Returns null if `gl` is null. The table is copied.
/// Does not touch the GPU until [`crt_filter_init`].
///
/// # Safety
/// `log_path` must be null or a nul-terminated string.
/// `gl` must be null or point to a [`GlFunctions`] whose non-null entries are valid for the
/// context the filter is later used with.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn crt_filter_create(
    log_path: *const c_char,
    gl: *const GlFunctions,
) -> *mut CrtFilter {
    // SAFETY: forwarded from the caller.
    unsafe { init_logging(log_path) };

    // SAFETY: null or a valid table, as promised by the caller.
    let Some(functions) = (unsafe { gl.as_ref() }).copied() else {
        log::error!("crt_filter_create: no graphics functions given");
        return std::ptr::null_mut();
    };

    let missing = functions.missing_entry_points();
    if !missing.is_empty() {
        log::warn!("Graphics function table lacks: {}", missing.join(", "));
    }

    let gl = Arc::new(TableGl::new(functions));
    CrtFilter::new(Binding::Table(CrtEffect::new(gl, CrtOptions::default())))
}

/// Create a filter that loads its own graphics functions through `get_proc_address`.
///
/// Returns null if `get_proc_address` is null.
/// The context must be current, as the loader is called right away.
///
/// # Safety
/// `log_path` must be null or a nul-terminated string.
/// `get_proc_address` must return valid entry points (or null) for the current context.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn crt_filter_create_with_loader(
    log_path: *const c_char,
    get_proc_address: Option<GetProcAddress>,
) -> *mut CrtFilter {
    // SAFETY: forwarded from the caller.
    unsafe { init_logging(log_path) };

    let Some(get_proc_address) = get_proc_address else {
        log::error!("crt_filter_create_with_loader: no loader given");
        return std::ptr::null_mut();
    };

    // SAFETY: the caller promised a current context and a loader for it.
    let gl = unsafe {
        glow::Context::from_loader_function_cstr(|name| get_proc_address(name.as_ptr()))
    };
    CrtFilter::new(Binding::Glow(CrtEffect::new(
        Arc::new(gl),
        CrtOptions::default(),
    )))
}

/// Build the GPU resources, sized after the current viewport.
///
/// Failures are logged; the filter then draws nothing.
///
/// # Safety
/// `filter` must be null or a live handle. The context must be current.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn crt_filter_init(filter: *mut CrtFilter) {
    // SAFETY: forwarded from the caller.
    if let Some(filter) = unsafe { filter_mut(filter) } {
        with_effect!(filter, effect => effect.init_from_viewport().ok());
    }
}

/// The graphics context is about to go away. Deletes every GPU object the filter owns, so the
/// context must still be current. Draws do nothing until [`crt_filter_gl_context_restored`].
///
/// # Safety
/// `filter` must be null or a live handle. The context must be current.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn crt_filter_gl_context_lost(filter: *mut CrtFilter) {
    // SAFETY: forwarded from the caller.
    if let Some(filter) = unsafe { filter_mut(filter) } {
        with_effect!(filter, effect => effect.on_context_lost());
    }
}

/// A new graphics context is current. Rebuild everything at the last known size.
///
/// # Safety
/// `filter` must be null or a live handle. The new context must be current.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn crt_filter_gl_context_restored(filter: *mut CrtFilter) {
    // SAFETY: forwarded from the caller.
    if let Some(filter) = unsafe { filter_mut(filter) } {
        with_effect!(filter, effect => effect.on_context_restored().ok());
    }
}

/// Draw `texture` (a `GL_TEXTURE_2D` of `width` × `height` pixels) through the filter into the
/// currently bound render target.
///
/// # Safety
/// `filter` must be null or a live handle. The context must be current.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn crt_filter_draw(
    filter: *mut CrtFilter,
    texture: c_int,
    width: c_int,
    height: c_int,
) {
    // SAFETY: forwarded from the caller.
    if let Some(filter) = unsafe { filter_mut(filter) } {
        let Ok(texture) = u32::try_from(texture) else {
            return;
        };
        filter.draw(texture, size_from_c(width, height));
    }
}

/// Have `callback` called from a background thread, about 30 times a second, whenever the
/// scanline has moved. It should wake the host's render loop and must not use the context.
///
/// Replaces any earlier callback. A null `callback` is ignored.
///
/// # Safety
/// `filter` must be null or a live handle.
/// `callback` must be safe to call from any thread until [`crt_filter_destroy`] returns.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn crt_filter_register_callback(
    filter: *mut CrtFilter,
    callback: Option<RedrawFn>,
) {
    // SAFETY: forwarded from the caller.
    let Some(filter) = (unsafe { filter_mut(filter) }) else {
        return;
    };
    let Some(callback) = callback else {
        log::warn!("crt_filter_register_callback: null callback ignored");
        return;
    };
    let redraw = move || {
        // SAFETY: the caller promised the callback is callable from any thread.
        unsafe { callback() }
    };
    let registered = with_effect!(filter, effect => effect.register_redraw_callback(redraw));
    if let Err(err) = registered {
        log::error!("Failed to start the CRT ticker: {err}");
    }
}

/// Free the GPU objects, stop the ticker, and free the handle.
///
/// # Safety
/// `filter` must be null or a live handle, which is dangling afterwards.
/// The context must be current.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn crt_filter_destroy(filter: *mut CrtFilter) {
    if filter.is_null() {
        return;
    }
    // SAFETY: a live handle is a box we leaked in `CrtFilter::new`.
    let mut filter = unsafe { Box::from_raw(filter) };
    with_effect!(filter, effect => effect.destroy());
}
