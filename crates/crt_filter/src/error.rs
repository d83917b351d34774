/// Which half of the CRT program a diagnostic belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub(crate) fn gl_type(self) -> u32 {
        match self {
            Self::Vertex => glow::VERTEX_SHADER,
            Self::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vertex => f.write_str("vertex"),
            Self::Fragment => f.write_str("fragment"),
        }
    }
}

/// Why the filter could not (re)build its GPU resources.
///
/// None of these are fatal: the effect logs them and turns into a no-op
/// until the next context-lost/restored cycle.
#[derive(Debug, thiserror::Error)]
pub enum CrtError {
    #[error("Failed to compile {stage} shader: {log}")]
    ShaderCompile { stage: ShaderStage, log: String },

    #[error("Failed to link CRT program: {0}")]
    ProgramLink(String),

    #[error("CRT program has no active `{0}` attribute")]
    MissingAttribute(&'static str),

    #[error("Failed to create GL object: {0}")]
    ResourceCreation(String),

    #[error("Failed to spawn the animation ticker: {0}")]
    Ticker(#[from] std::io::Error),
}
