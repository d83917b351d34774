use crate::GlContext;

/// The GLSL dialect the CRT shaders are compiled as.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ShaderVersion {
    /// Desktop GLSL 1.20 / 1.30.
    Gl120,

    /// Desktop GLSL 1.40 or later.
    Gl140,

    /// e.g. OpenGL ES 2.0 and WebGL1
    Es100,

    /// e.g. OpenGL ES 3.x and WebGL2
    Es300,
}

impl ShaderVersion {
    /// Ask the context which dialect it speaks.
    pub fn get(gl: &impl GlContext) -> Self {
        let shading_lang_string = gl.shading_language_version();
        let shader_version = Self::parse(&shading_lang_string);
        log::debug!("Shader version: {shader_version:?} ({shading_lang_string:?}).");
        shader_version
    }

    /// Parse a `GL_SHADING_LANGUAGE_VERSION` string.
    ///
    /// Anything unparseable is treated as the oldest desktop dialect.
    pub fn parse(glsl_ver: &str) -> Self {
        let Some(start) = glsl_ver.find(|c: char| c.is_ascii_digit()) else {
            return Self::Gl120;
        };
        let es = glsl_ver[..start].contains(" ES ");
        let ver = glsl_ver[start..]
            .split_once(' ')
            .map_or(&glsl_ver[start..], |x| x.0);
        let mut parts = ver
            .splitn(3, '.')
            .map(|x| x.parse::<u8>().unwrap_or_default());
        let maj = parts.next().unwrap_or_default();
        let min = parts.next().unwrap_or_default();
        if es {
            if maj >= 3 { Self::Es300 } else { Self::Es100 }
        } else if maj > 1 || (maj == 1 && min >= 40) {
            Self::Gl140
        } else {
            Self::Gl120
        }
    }

    /// Goes on top of the shader.
    pub fn version_declaration(&self) -> &'static str {
        match self {
            Self::Gl120 => "#version 120\n",
            Self::Gl140 => "#version 140\n",
            Self::Es100 => "#version 100\n",
            Self::Es300 => "#version 300 es\n",
        }
    }

    /// If true, use `in/out`. If `false`, use `varying` and `gl_FragColor`.
    pub fn is_new_shader_interface(&self) -> bool {
        match self {
            Self::Gl120 | Self::Es100 => false,
            Self::Es300 | Self::Gl140 => true,
        }
    }

    /// Embedded dialects need an explicit float precision.
    pub fn is_embedded(&self) -> bool {
        match self {
            Self::Gl120 | Self::Gl140 => false,
            Self::Es100 | Self::Es300 => true,
        }
    }

    /// Everything that goes in front of a shader body: version, precision and `#define`s.
    pub(crate) fn shader_prefix(&self, defines: &[&str]) -> String {
        let mut prefix = self.version_declaration().to_owned();
        if self.is_embedded() {
            prefix.push_str("precision highp float;\n");
        }
        if self.is_new_shader_interface() {
            prefix.push_str("#define NEW_SHADER_INTERFACE 1\n");
        }
        for define in defines {
            prefix.push_str("#define ");
            prefix.push_str(define);
            prefix.push_str(" 1\n");
        }
        prefix
    }
}

#[test]
fn test_shader_version() {
    use ShaderVersion::{Es100, Es300, Gl120, Gl140};
    for (s, v) in [
        ("1.2 OpenGL foo bar", Gl120),
        ("1.30", Gl120),
        ("1.40 NVIDIA via Cg compiler", Gl140),
        ("3.0", Gl140),
        ("4.60 NVIDIA", Gl140),
        ("0.0", Gl120),
        ("", Gl120),
        ("no digits here", Gl120),
        ("OpenGL ES GLSL ES 3.20", Es300),
        ("OpenGL ES GLSL 3.00 (WebGL2)", Es300),
        ("OpenGL ES GLSL 1.00 (WebGL)", Es100),
        ("OpenGL ES GLSL ES 1.00 foo bar", Es100),
        ("WebGL GLSL ES 3.00 foo bar", Es300),
        ("WebGL GLSL ES 1.0 foo bar", Es100),
    ] {
        assert_eq!(ShaderVersion::parse(s), v, "parsing {s:?}");
    }
}

#[test]
fn test_shader_prefix() {
    let es = ShaderVersion::Es100.shader_prefix(&["CRT_BLUR"]);
    assert!(es.starts_with("#version 100\n"));
    assert!(es.contains("precision highp float;"));
    assert!(!es.contains("NEW_SHADER_INTERFACE"));
    assert!(es.ends_with("#define CRT_BLUR 1\n"));

    let desktop = ShaderVersion::Gl140.shader_prefix(&[]);
    assert_eq!(desktop, "#version 140\n#define NEW_SHADER_INTERFACE 1\n");
}
