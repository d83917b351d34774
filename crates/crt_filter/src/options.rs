use std::time::Duration;

use crate::ShaderVersion;

/// Tile edge length of the curvature mesh, in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 20;

/// How often the animation ticker fires by default.
pub const DEFAULT_TICK_RATE_HZ: f32 = 30.0;

/// Options controlling the look and the cadence of a [`crate::CrtEffect`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CrtOptions {
    /// Bend the image like the glass of a CRT.
    ///
    /// If `false` the frame is drawn on a single flat quad.
    pub curvature: bool,

    /// Edge length of the tiles of the curvature mesh, in target pixels.
    ///
    /// Smaller tiles give a smoother curve at the cost of more vertices.
    pub tile_size: u32,

    /// Soften the phosphor mask and scanlines with a horizontal blur.
    ///
    /// This is where most of the per-pixel cost goes.
    pub blur: bool,

    /// How often the redraw callback fires and the scanline advances.
    pub tick_rate_hz: f32,

    /// Advance the scanline once per [`crate::CrtEffect::draw`] instead of once per tick.
    pub advance_scanline_on_draw: bool,

    /// Force a GLSL dialect instead of asking the context.
    pub shader_version: Option<ShaderVersion>,
}

impl Default for CrtOptions {
    fn default() -> Self {
        Self {
            curvature: true,
            tile_size: DEFAULT_TILE_SIZE,
            blur: true,
            tick_rate_hz: DEFAULT_TICK_RATE_HZ,
            advance_scanline_on_draw: false,
            shader_version: None,
        }
    }
}

impl CrtOptions {
    /// Time between two ticks. Non-positive or non-finite rates fall back to the default.
    pub fn tick_interval(&self) -> Duration {
        let hz = if self.tick_rate_hz.is_finite() && self.tick_rate_hz > 0.0 {
            self.tick_rate_hz
        } else {
            log::warn!(
                "Invalid tick rate {}, using {DEFAULT_TICK_RATE_HZ} Hz",
                self.tick_rate_hz
            );
            DEFAULT_TICK_RATE_HZ
        };
        Duration::from_secs_f32(1.0 / hz)
    }

    /// `#define`s to put in front of the shaders.
    pub(crate) fn shader_defines(&self) -> Vec<&'static str> {
        let mut defines = Vec::new();
        if self.curvature {
            defines.push("CRT_CURVATURE");
        }
        if self.blur {
            defines.push("CRT_BLUR");
        }
        defines
    }
}
