use std::sync::Arc;

use crate::{
    CrtError, CrtOptions, GlContext, ShaderVersion, check_for_gl_error,
    mesh::{CrtMesh, GpuMesh},
    misc_util::drain_gl_errors,
    program::{CrtProgram, FRAG_SRC, FrameUniforms, VERT_SRC},
    ticker::{ScanlinePhase, Ticker},
};

/// Where a [`CrtEffect`] is in the life of its graphics context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    /// Created, but [`CrtEffect::init`] has not been called yet.
    Uninitialized,

    /// GPU resources have been built (or the build failed, see [`CrtEffect::is_operational`]).
    Initialized,

    /// The context went away; waiting for [`CrtEffect::on_context_restored`].
    ContextLost,

    /// [`CrtEffect::destroy`] was called. Terminal.
    Destroyed,
}

/// Everything that lives on the GPU, built and destroyed together.
struct GpuResources<G: GlContext> {
    program: CrtProgram<G>,
    mesh: GpuMesh<G>,
}

impl<G: GlContext> GpuResources<G> {
    fn new(
        gl: &G,
        shader_version: ShaderVersion,
        options: &CrtOptions,
        sources: &ShaderSources,
        size: [u32; 2],
    ) -> Result<Self, CrtError> {
        let program = CrtProgram::new(
            gl,
            shader_version,
            &options.shader_defines(),
            &sources.vertex,
            &sources.fragment,
        )?;

        let mesh = match GpuMesh::new(gl, &CrtMesh::new(size, options), program.a_pos()) {
            Ok(mesh) => mesh,
            Err(err) => {
                program.destroy(gl);
                return Err(err);
            }
        };

        drain_gl_errors(gl, "CRT filter setup");

        Ok(Self { program, mesh })
    }

    fn destroy(self, gl: &G) {
        self.program.destroy(gl);
        self.mesh.destroy(gl);
    }
}

/// GLSL bodies of the two stages, without any `#version` line.
#[derive(Clone, Debug)]
struct ShaderSources {
    vertex: String,
    fragment: String,
}

impl Default for ShaderSources {
    fn default() -> Self {
        Self {
            vertex: VERT_SRC.to_owned(),
            fragment: FRAG_SRC.to_owned(),
        }
    }
}

// ----------------------------------------------------------------------------

/// A CRT emulation pass: curvature, scanlines, phosphor mask and blur.
///
/// The host renders its frame into an offscreen texture, binds the real render target,
/// and calls [`Self::draw`] with that texture.
///
/// All methods must be called on the thread that owns the graphics context.
/// The only other thread involved is the ticker started by [`Self::register_redraw_callback`].
///
/// Nothing here panics or returns early on GPU trouble: a program that fails to build
/// is logged, and the effect then quietly draws nothing.
///
/// Call [`Self::destroy`] before dropping, to free the GPU objects.
pub struct CrtEffect<G: GlContext> {
    gl: Arc<G>,
    options: CrtOptions,
    shader_sources: ShaderSources,

    lifecycle: Lifecycle,

    /// `None` while not initialized, or when building them failed.
    resources: Option<GpuResources<G>>,

    /// Last known target size; what we rebuild with after a context loss.
    size: [u32; 2],

    scanline: Arc<ScanlinePhase>,
    ticker: Option<Ticker>,
}

impl<G: GlContext> CrtEffect<G> {
    /// Does not touch the GPU; call [`Self::init`] for that.
    pub fn new(gl: Arc<G>, options: CrtOptions) -> Self {
        Self {
            gl,
            options,
            shader_sources: ShaderSources::default(),
            lifecycle: Lifecycle::Uninitialized,
            resources: None,
            size: [0, 0],
            scanline: Arc::default(),
            ticker: None,
        }
    }

    /// Replace the GLSL of the effect.
    ///
    /// The sources must not contain a `#version` line; one is prepended together with
    /// precision and the `NEW_SHADER_INTERFACE`, `CRT_CURVATURE` and `CRT_BLUR` defines.
    /// The position attribute must be called `a_pos`.
    /// Takes effect the next time resources are built.
    #[must_use]
    pub fn with_shader_sources(
        mut self,
        vertex: impl Into<String>,
        fragment: impl Into<String>,
    ) -> Self {
        self.shader_sources = ShaderSources {
            vertex: vertex.into(),
            fragment: fragment.into(),
        };
        self
    }

    pub fn gl(&self) -> &Arc<G> {
        &self.gl
    }

    pub fn options(&self) -> &CrtOptions {
        &self.options
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// True if a draw would actually draw something.
    pub fn is_operational(&self) -> bool {
        self.lifecycle == Lifecycle::Initialized && self.resources.is_some()
    }

    /// The target size the geometry was last built for.
    pub fn size(&self) -> [u32; 2] {
        self.size
    }

    /// The animation counter, shared with the ticker.
    pub fn scanline(&self) -> &Arc<ScanlinePhase> {
        &self.scanline
    }

    /// Tile grid of the current mesh, if there is one.
    pub fn mesh_tiles(&self) -> Option<[u32; 2]> {
        self.resources.as_ref().map(|r| r.mesh.tiles())
    }

    /// Number of vertices drawn per frame, if there are resources.
    pub fn mesh_vertex_count(&self) -> Option<usize> {
        self.resources
            .as_ref()
            .map(|r| r.mesh.vertex_count() as usize)
    }

    // ------------------------------------------------------------------------
    // Lifecycle

    /// Build the GPU resources for a target of the given size.
    ///
    /// Does nothing if already initialized.
    ///
    /// # Errors
    /// If the program can't be built. The error has already been logged,
    /// and the effect is left initialized but inert.
    pub fn init(&mut self, width: u32, height: u32) -> Result<(), CrtError> {
        match self.lifecycle {
            Lifecycle::Uninitialized => {
                self.size = [width, height];
                self.lifecycle = Lifecycle::Initialized;
                log::debug!("Initializing CRT filter for {width}x{height}");
                self.rebuild()
            }
            Lifecycle::Initialized => Ok(()),
            Lifecycle::ContextLost => {
                // Nothing to build on right now; the restore will use this size.
                self.size = [width, height];
                Ok(())
            }
            Lifecycle::Destroyed => {
                log::warn!("Ignoring init of a destroyed CRT filter");
                Ok(())
            }
        }
    }

    /// Like [`Self::init`], sized after the currently set viewport.
    ///
    /// # Errors
    /// See [`Self::init`].
    pub fn init_from_viewport(&mut self) -> Result<(), CrtError> {
        let [_, _, width, height] = self.gl.viewport();
        self.init(width.max(0) as u32, height.max(0) as u32)
    }

    /// The graphics context is about to go away: delete all GPU objects.
    ///
    /// The old context must still be current. Until [`Self::on_context_restored`], draws are no-ops.
    pub fn on_context_lost(&mut self) {
        if self.lifecycle != Lifecycle::Initialized {
            return;
        }
        log::debug!("CRT filter: context lost");
        if let Some(resources) = self.resources.take() {
            resources.destroy(&self.gl);
        }
        self.lifecycle = Lifecycle::ContextLost;
    }

    /// A new graphics context is current: rebuild everything for the last known size.
    ///
    /// Does nothing unless the context was lost, so calling it twice is harmless.
    ///
    /// # Errors
    /// Same as [`Self::init`].
    pub fn on_context_restored(&mut self) -> Result<(), CrtError> {
        if self.lifecycle != Lifecycle::ContextLost {
            return Ok(());
        }
        log::debug!("CRT filter: context restored");
        self.lifecycle = Lifecycle::Initialized;
        self.rebuild()
    }

    /// Free all GPU objects and stop the ticker. The effect can't be used after this.
    pub fn destroy(&mut self) {
        if let Some(resources) = self.resources.take() {
            resources.destroy(&self.gl);
        }
        if let Some(mut ticker) = self.ticker.take() {
            ticker.stop();
        }
        self.lifecycle = Lifecycle::Destroyed;
    }

    fn rebuild(&mut self) -> Result<(), CrtError> {
        debug_assert!(self.resources.is_none(), "leaking GPU resources");

        let shader_version = self
            .options
            .shader_version
            .unwrap_or_else(|| ShaderVersion::get(&*self.gl));

        match GpuResources::new(
            &*self.gl,
            shader_version,
            &self.options,
            &self.shader_sources,
            self.size,
        ) {
            Ok(resources) => {
                self.resources = Some(resources);
                Ok(())
            }
            Err(err) => {
                log::error!("CRT filter disabled: {err}");
                Err(err)
            }
        }
    }

    // ------------------------------------------------------------------------
    // Animation

    /// Call `callback` at [`CrtOptions::tick_rate_hz`] from a background thread, advancing the
    /// scanline before each call.
    ///
    /// The callback should ask the host to render another frame (e.g. wake its event loop);
    /// it must not touch the graphics context. Registering a new callback replaces the old one.
    ///
    /// # Errors
    /// If the ticker thread can't be spawned.
    pub fn register_redraw_callback(
        &mut self,
        callback: impl Fn() + Send + 'static,
    ) -> Result<(), CrtError> {
        if self.lifecycle == Lifecycle::Destroyed {
            log::warn!("Ignoring redraw callback for a destroyed CRT filter");
            return Ok(());
        }
        if let Some(mut old) = self.ticker.take() {
            old.stop();
        }
        self.ticker = Some(Ticker::spawn(
            self.options.tick_interval(),
            self.scanline.clone(),
            Box::new(callback),
        )?);
        Ok(())
    }

    /// Is a ticker currently running?
    pub fn has_ticker(&self) -> bool {
        self.ticker.as_ref().is_some_and(Ticker::is_running)
    }

    // ------------------------------------------------------------------------
    // Drawing

    /// Draw `texture` through the CRT filter into whatever render target is currently bound.
    ///
    /// `size` is the size of `texture` in pixels, and is also taken as the size of the target.
    /// Does nothing unless [`Self::is_operational`].
    pub fn draw(&mut self, texture: G::Texture, size: [u32; 2]) {
        self.paint(texture, size, size, false);
    }

    /// Like [`Self::draw`], but for a target of a different size than the source.
    ///
    /// Sets the viewport to cover the whole target first.
    pub fn draw_with_target_size(
        &mut self,
        texture: G::Texture,
        source_size: [u32; 2],
        target_size: [u32; 2],
    ) {
        self.paint(texture, source_size, target_size, true);
    }

    fn paint(
        &mut self,
        texture: G::Texture,
        source_size: [u32; 2],
        target_size: [u32; 2],
        set_viewport: bool,
    ) {
        if self.lifecycle != Lifecycle::Initialized {
            return;
        }
        let Some(resources) = self.resources.as_mut() else {
            return;
        };
        let [width, height] = source_size;
        if width == 0 || height == 0 || target_size.contains(&0) {
            return;
        }

        profiling::function_scope!();

        let gl = &*self.gl;

        if CrtMesh::tiles_for(target_size, &self.options) != resources.mesh.tiles() {
            log::debug!(
                "CRT filter: regenerating mesh for {}x{}",
                target_size[0],
                target_size[1]
            );
            resources
                .mesh
                .update(gl, &CrtMesh::new(target_size, &self.options));
        }
        self.size = target_size;

        if set_viewport {
            gl.set_viewport(0, 0, target_size[0] as i32, target_size[1] as i32);
        }

        if self.options.advance_scanline_on_draw {
            self.scanline.advance();
        }

        gl.active_texture(glow::TEXTURE0);
        gl.bind_texture(glow::TEXTURE_2D, Some(texture));

        resources.program.bind(
            gl,
            &FrameUniforms {
                width: width as f32,
                height: height as f32,
                scanline: self.scanline.row(height) as f32,
            },
        );
        resources.mesh.draw(gl);

        CrtProgram::<G>::unbind(gl);
        gl.bind_texture(glow::TEXTURE_2D, None);

        check_for_gl_error!(gl, "CRT filter draw");
    }
}

impl<G: GlContext> Drop for CrtEffect<G> {
    fn drop(&mut self) {
        if self.resources.is_some() {
            log::warn!("CrtEffect dropped without calling destroy(); leaking GL objects");
        }
    }
}

impl<G: GlContext> std::fmt::Debug for CrtEffect<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrtEffect")
            .field("options", &self.options)
            .field("lifecycle", &self.lifecycle)
            .field("operational", &self.is_operational())
            .field("size", &self.size)
            .field("scanline", &self.scanline.ticks())
            .field("ticker", &self.has_ticker())
            .finish_non_exhaustive()
    }
}
