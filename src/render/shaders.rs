//! Embedded GLSL for the card quad pipeline.
//!
//! One program draws everything: each quad gets its own MVP and tint, and
//! either samples its texture or falls back to the flat tint color.

pub const VERTEX_SHADER: &str = r#"
#version 330 core

layout (location = 0) in vec2 a_pos;
layout (location = 1) in vec2 a_uv;

uniform mat4 u_mvp;

out vec2 v_uv;

void main() {
    gl_Position = u_mvp * vec4(a_pos, 0.0, 1.0);
    v_uv = a_uv;
}
"#;

pub const FRAGMENT_SHADER: &str = r#"
#version 330 core

in vec2 v_uv;
out vec4 FragColor;

uniform sampler2D u_texture;
uniform vec4 u_tint;       // Flat color, also multiplies the texture
uniform int u_use_texture; // 1 to sample u_texture, 0 for flat tint

void main() {
    if (u_use_texture == 1) {
        FragColor = texture(u_texture, v_uv) * u_tint;
    } else {
        FragColor = u_tint;
    }
}
"#;
