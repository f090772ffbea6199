//! Pixel-space to clip-space projection.

use vesper_ui::Rect;

/// Column-major 4x4 matrix, laid out as WGSL's `mat4x4<f32>`.
pub type Mat4 = [[f32; 4]; 4];

/// Identity matrix.
pub const IDENTITY: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Orthographic projection mapping `target` (y down) onto clip space:
/// the top-left corner goes to (-1, 1), the bottom-right to (1, -1).
///
/// A target with no area yields the identity; nothing drawn with it is
/// visible anyway.
#[must_use]
pub fn orthographic(target: Rect) -> Mat4 {
    if target.width <= 0.0 || target.height <= 0.0 {
        return IDENTITY;
    }

    let (left, right) = (target.x, target.right());
    let (top, bottom) = (target.y, target.bottom());
    [
        [2.0 / (right - left), 0.0, 0.0, 0.0],
        [0.0, 2.0 / (top - bottom), 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [
            -(right + left) / (right - left),
            -(top + bottom) / (top - bottom),
            0.0,
            1.0,
        ],
    ]
}

/// Applies `m` to the point (x, y, 0, 1) and returns clip (x, y).
#[must_use]
pub fn transform(m: &Mat4, x: f32, y: f32) -> [f32; 2] {
    [
        m[0][0] * x + m[1][0] * y + m[3][0],
        m[0][1] * x + m[1][1] * y + m[3][1],
    ]
}
