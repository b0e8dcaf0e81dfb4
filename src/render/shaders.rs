//! GLSL sources and the names the pipeline binds.
//!
//! Every entity kind currently shares the ellipsoid programs; the alias is
//! still derived from the kind so a kind can get its own program later
//! without touching the cache.

use crate::scene::EntityKind;

pub const U_MVP: &str = "u_ModelViewProjectionMatrix";
pub const U_NORMAL_MATRIX: &str = "u_NormalMatrix";
pub const U_AMBIENT: &str = "u_ambientLight";
pub const U_LIGHT_COLOR: &str = "u_directionalLightColor";
pub const U_LIGHT_DIRECTION: &str = "u_directionalVector";
pub const U_COLOR: &str = "u_Color3";
pub const U_OBJECT_ID: &str = "u_ObjectId4";

pub const A_POSITION: &str = "a_Position3";
pub const A_NORMAL: &str = "a_Normal3";

/// Which of the two per-frame passes is drawing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RenderPass {
    /// Off-screen, colour encodes entity identity
    Identity,
    /// On-screen, ambient + directional lighting
    Shaded,
}

impl RenderPass {
    fn alias_suffix(self) -> &'static str {
        match self {
            RenderPass::Identity => "Picking",
            RenderPass::Shaded => "",
        }
    }
}

/// Sources plus the uniform and attribute names to look up once.
#[derive(Clone, Copy, Debug)]
pub struct ShaderSet {
    pub vertex: &'static str,
    pub fragment: &'static str,
    pub uniforms: &'static [&'static str],
    pub attributes: &'static [&'static str],
}

const SHADED_VERTEX: &str = r#"
precision mediump float;

uniform mat4 u_ModelViewProjectionMatrix;
uniform mat4 u_NormalMatrix;
uniform vec3 u_ambientLight;
uniform vec3 u_directionalLightColor;
uniform vec3 u_directionalVector;

attribute vec3 a_Position3;
attribute vec3 a_Normal3;

varying vec3 v_Lighting;

void main() {
    gl_Position = u_ModelViewProjectionMatrix * vec4(a_Position3, 1.0);

    vec3 transformedNormal = normalize((u_NormalMatrix * vec4(a_Normal3, 0.0)).xyz);
    float directionalRatio = max(dot(transformedNormal, normalize(u_directionalVector)), 0.0);
    v_Lighting = u_ambientLight + (u_directionalLightColor * directionalRatio);
}
"#;

const SHADED_FRAGMENT: &str = r#"
precision mediump float;

uniform vec3 u_Color3;

varying vec3 v_Lighting;

void main() {
    gl_FragColor = vec4(u_Color3 * v_Lighting, 1.0);
}
"#;

const IDENTITY_VERTEX: &str = r#"
precision mediump float;

uniform mat4 u_ModelViewProjectionMatrix;

attribute vec3 a_Position3;

void main() {
    gl_Position = u_ModelViewProjectionMatrix * vec4(a_Position3, 1.0);
}
"#;

const IDENTITY_FRAGMENT: &str = r#"
precision mediump float;

uniform vec4 u_ObjectId4;

void main() {
    gl_FragColor = u_ObjectId4;
}
"#;

const SHADED: ShaderSet = ShaderSet {
    vertex: SHADED_VERTEX,
    fragment: SHADED_FRAGMENT,
    uniforms: &[U_MVP, U_NORMAL_MATRIX, U_AMBIENT, U_LIGHT_COLOR, U_LIGHT_DIRECTION, U_COLOR],
    attributes: &[A_POSITION, A_NORMAL],
};

const IDENTITY: ShaderSet = ShaderSet {
    vertex: IDENTITY_VERTEX,
    fragment: IDENTITY_FRAGMENT,
    uniforms: &[U_MVP, U_OBJECT_ID],
    attributes: &[A_POSITION],
};

/// Shaders for `kind` in `pass`.
pub fn shader_set(_kind: &EntityKind, pass: RenderPass) -> &'static ShaderSet {
    match pass {
        RenderPass::Identity => &IDENTITY,
        RenderPass::Shaded => &SHADED,
    }
}

/// Cache key: the kind's program family plus the pass.
pub fn program_alias(kind: &EntityKind, pass: RenderPass) -> String {
    let family = match kind {
        EntityKind::Ellipsoid
        | EntityKind::Sphere
        | EntityKind::Hemisphere
        | EntityKind::Bacterium(_) => "Ellipsoid",
    };
    format!("{family}{}", pass.alias_suffix())
}
