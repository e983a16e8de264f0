//! Built-in geometry generators.
//!
//! Every generator returns an unrealized [`Geometry`] with positions at
//! location 0 and, where the shape has them, normals at location 1. The
//! [`axis`] gizmo carries per-vertex colors at location 2 instead.
//!
//! | Generator | Mode | Indexed |
//! |-----------|------|---------|
//! | [`axis`] | lines | yes |
//! | [`grid`] | lines | no |
//! | [`cube`] | triangles | yes |
//! | [`sphere`] | triangles | yes |
//! | [`quad`] | triangles | yes |
//! | [`triangle`] | triangles | no |
//! | [`pyramid`] | triangles | yes |
//! | [`circle`] | triangle fan | no |

use std::f32::consts::PI;

use glam::Vec3;
use log::warn;

use crate::geometry::Geometry;
use crate::gl::DrawMode;

/// Largest sphere/circle subdivision whose vertex indices still fit in `u16`.
pub const MAX_DIVISIONS: u32 = 254;

/// Colored X (red), Y (green) and Z (blue) line segments spanning each range.
pub fn axis(x: [f32; 2], y: [f32; 2], z: [f32; 2]) -> Geometry {
    #[rustfmt::skip]
    let vertices = vec![
        x[0], 0.0,  0.0,
        x[1], 0.0,  0.0,
        0.0,  y[0], 0.0,
        0.0,  y[1], 0.0,
        0.0,  0.0,  z[0],
        0.0,  0.0,  z[1],
    ];
    #[rustfmt::skip]
    let colors = vec![
        1.0, 0.0, 0.0,
        1.0, 0.0, 0.0,
        0.0, 1.0, 0.0,
        0.0, 1.0, 0.0,
        0.0, 0.0, 1.0,
        0.0, 0.0, 1.0,
    ];

    Geometry::new(DrawMode::Lines)
        .with_attribute(0, 3, vertices)
        .with_attribute(2, 3, colors)
        .with_indices(vec![0, 1, 2, 3, 4, 5])
}

/// A square line grid on the XZ plane covering `[min, max]` on both axes,
/// with a line every `step` units.
pub fn grid(min: f32, max: f32, step: f32) -> Geometry {
    let lines = if step > 0.0 && max >= min {
        ((max - min) / step).round() as usize + 1
    } else {
        warn!("grid with step {step} over [{min}, {max}] has no lines");
        0
    };

    let mut vertices = Vec::with_capacity(lines * 12);
    for k in 0..lines {
        let i = min + k as f32 * step;
        vertices.extend_from_slice(&[i, 0.0, min, i, 0.0, max, min, 0.0, i, max, 0.0, i]);
    }

    Geometry::new(DrawMode::Lines).with_attribute(0, 3, vertices)
}

/// One face of the [`cube`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CubeFace {
    Top,
    Bottom,
    Right,
    Left,
    Front,
    Back,
}

impl CubeFace {
    /// All six faces in emission order.
    pub const ALL: [CubeFace; 6] = [
        CubeFace::Top,
        CubeFace::Bottom,
        CubeFace::Right,
        CubeFace::Left,
        CubeFace::Front,
        CubeFace::Back,
    ];

    /// Corner positions of the unit face, and its outward normal.
    #[rustfmt::skip]
    fn corners(self) -> ([[f32; 3]; 4], [f32; 3]) {
        match self {
            CubeFace::Top => (
                [[-0.5, 0.5, -0.5], [0.5, 0.5, -0.5], [-0.5, 0.5, 0.5], [0.5, 0.5, 0.5]],
                [0.0, 1.0, 0.0],
            ),
            CubeFace::Bottom => (
                [[0.5, -0.5, -0.5], [-0.5, -0.5, -0.5], [0.5, -0.5, 0.5], [-0.5, -0.5, 0.5]],
                [0.0, -1.0, 0.0],
            ),
            CubeFace::Right => (
                [[0.5, 0.5, 0.5], [0.5, 0.5, -0.5], [0.5, -0.5, 0.5], [0.5, -0.5, -0.5]],
                [1.0, 0.0, 0.0],
            ),
            CubeFace::Left => (
                [[-0.5, 0.5, -0.5], [-0.5, 0.5, 0.5], [-0.5, -0.5, -0.5], [-0.5, -0.5, 0.5]],
                [-1.0, 0.0, 0.0],
            ),
            CubeFace::Front => (
                [[-0.5, 0.5, 0.5], [0.5, 0.5, 0.5], [-0.5, -0.5, 0.5], [0.5, -0.5, 0.5]],
                [0.0, 0.0, 1.0],
            ),
            CubeFace::Back => (
                [[0.5, 0.5, -0.5], [-0.5, 0.5, -0.5], [0.5, -0.5, -0.5], [-0.5, -0.5, -0.5]],
                [0.0, 0.0, -1.0],
            ),
        }
    }
}

/// Two counter-clockwise triangles over corners laid out
/// top-left, top-right, bottom-left, bottom-right.
const QUAD_INDICES: [u16; 6] = [0, 2, 3, 0, 3, 1];

/// An axis-aligned cube of edge `size` centered at the origin, built from
/// the requested faces. Each face has its own four vertices so normals stay flat.
pub fn cube(size: f32, faces: &[CubeFace]) -> Geometry {
    let mut vertices = Vec::with_capacity(faces.len() * 12);
    let mut normals = Vec::with_capacity(faces.len() * 12);
    let mut indices = Vec::with_capacity(faces.len() * 6);

    for face in faces {
        let offset = (vertices.len() / 3) as u16;
        let (corners, normal) = face.corners();
        for corner in corners {
            vertices.extend(corner.iter().map(|c| c * size));
            normals.extend_from_slice(&normal);
        }
        indices.extend(QUAD_INDICES.iter().map(|i| i + offset));
    }

    Geometry::new(DrawMode::Triangles)
        .with_attribute(0, 3, vertices)
        .with_attribute(1, 3, normals)
        .with_indices(indices)
}

fn clamp_divisions(shape: &str, divisions: u32) -> u32 {
    let clamped = divisions.clamp(1, MAX_DIVISIONS);
    if clamped != divisions {
        warn!("{shape} divisions {divisions} clamped to {clamped}");
    }
    clamped
}

/// A latitude/longitude sphere of radius `radius` with `divisions` steps
/// around and from pole to pole.
pub fn sphere(radius: f32, divisions: u32) -> Geometry {
    let d = clamp_divisions("sphere", divisions);
    let ring = d + 1;
    let count = (ring * ring) as usize;
    let mut vertices = Vec::with_capacity(count * 3);
    let mut normals = Vec::with_capacity(count * 3);

    for j in 0..=d {
        let aj = j as f32 * PI / d as f32;
        let (sj, cj) = aj.sin_cos();
        for i in 0..=d {
            let ai = i as f32 * 2.0 * PI / d as f32;
            let (si, ci) = ai.sin_cos();
            let n = [si * sj, cj, ci * sj];
            vertices.extend(n.iter().map(|c| c * radius));
            normals.extend_from_slice(&n);
        }
    }

    let mut indices = Vec::with_capacity((d * d * 6) as usize);
    for j in 0..d {
        for i in 0..d {
            let p1 = (j * ring + i) as u16;
            let p2 = p1 + ring as u16;
            indices.extend_from_slice(&[p1, p2, p1 + 1, p1 + 1, p2, p2 + 1]);
        }
    }

    Geometry::new(DrawMode::Triangles)
        .with_attribute(0, 3, vertices)
        .with_attribute(1, 3, normals)
        .with_indices(indices)
}

/// A square of edge `size` on the XY plane facing +Z.
pub fn quad(size: f32) -> Geometry {
    #[rustfmt::skip]
    let corners = [
        -0.5,  0.5, 0.0,
         0.5,  0.5, 0.0,
        -0.5, -0.5, 0.0,
         0.5, -0.5, 0.0,
    ];

    Geometry::new(DrawMode::Triangles)
        .with_attribute(0, 3, corners.iter().map(|c| c * size).collect())
        .with_attribute(1, 3, [0.0, 0.0, 1.0].repeat(4))
        .with_indices(QUAD_INDICES.to_vec())
}

/// A single triangle on the XY plane facing +Z.
pub fn triangle(size: f32) -> Geometry {
    #[rustfmt::skip]
    let corners = [
        -0.5, -0.5, 0.0,
         0.5, -0.5, 0.0,
         0.0,  0.5, 0.0,
    ];

    Geometry::new(DrawMode::Triangles)
        .with_attribute(0, 3, corners.iter().map(|c| c * size).collect())
        .with_attribute(1, 3, [0.0, 0.0, 1.0].repeat(3))
}

/// A square pyramid with apex at +Y: four flat-shaded sides and a base.
pub fn pyramid(size: f32) -> Geometry {
    let top = Vec3::new(0.0, 0.5, 0.0) * size;
    let base = [
        Vec3::new(-0.5, -0.5, -0.5) * size,
        Vec3::new(-0.5, -0.5, 0.5) * size,
        Vec3::new(0.5, -0.5, 0.5) * size,
        Vec3::new(0.5, -0.5, -0.5) * size,
    ];

    let mut vertices = Vec::with_capacity(16 * 3);
    let mut normals = Vec::with_capacity(16 * 3);
    let mut indices = Vec::with_capacity(18);

    for (i, &v1) in base.iter().enumerate() {
        let offset = (vertices.len() / 3) as u16;
        let v2 = base[(i + 1) % base.len()];
        let normal = (v1 - top).cross(v2 - top).normalize();
        for v in [top, v1, v2] {
            vertices.extend_from_slice(&v.to_array());
            normals.extend_from_slice(&normal.to_array());
        }
        indices.extend_from_slice(&[offset, offset + 1, offset + 2]);
    }

    let offset = (vertices.len() / 3) as u16;
    for v in base {
        vertices.extend_from_slice(&v.to_array());
        normals.extend_from_slice(&[0.0, -1.0, 0.0]);
    }
    indices.extend_from_slice(&[offset, offset + 2, offset + 1, offset, offset + 3, offset + 2]);

    Geometry::new(DrawMode::Triangles)
        .with_attribute(0, 3, vertices)
        .with_attribute(1, 3, normals)
        .with_indices(indices)
}

/// A disc of radius `radius` on the XY plane facing +Z, drawn as a fan
/// around the origin with `divisions` segments.
pub fn circle(radius: f32, divisions: u32) -> Geometry {
    let d = clamp_divisions("circle", divisions);
    let step = 2.0 * PI / d as f32;
    let mut vertices = vec![0.0, 0.0, 0.0];
    let mut normals = vec![0.0, 0.0, 1.0];

    for i in 0..=d {
        let (s, c) = (step * i as f32).sin_cos();
        vertices.extend_from_slice(&[radius * c, radius * s, 0.0]);
        normals.extend_from_slice(&[0.0, 0.0, 1.0]);
    }

    Geometry::new(DrawMode::TriangleFan)
        .with_attribute(0, 3, vertices)
        .with_attribute(1, 3, normals)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(geo: &Geometry) -> &[f32] {
        &geo.attributes()[0].data
    }

    #[test]
    fn axis_spans_ranges_with_colors_at_location_two() {
        let geo = axis([-2.0, 3.0], [-1.0, 1.0], [0.0, 5.0]);
        assert_eq!(geo.mode(), DrawMode::Lines);
        assert_eq!(geo.index_count(), 6);
        assert_eq!(geo.attributes()[1].location, 2);
        assert_eq!(positions(&geo)[3], 3.0);
        assert_eq!(positions(&geo)[17], 5.0);
    }

    #[test]
    fn grid_emits_two_lines_per_step() {
        let geo = grid(-10.0, 10.0, 1.0);
        assert_eq!(geo.mode(), DrawMode::Lines);
        assert_eq!(geo.vertex_count(), 21 * 4);
        assert!(geo.indices().is_none());

        let fine = grid(-10.0, 10.0, 0.1);
        assert_eq!(fine.vertex_count(), 201 * 4);
    }

    #[test]
    fn full_cube_has_24_vertices_and_36_indices() {
        let geo = cube(1.0, &CubeFace::ALL);
        assert_eq!(geo.vertex_count(), 24);
        assert_eq!(geo.index_count(), 36);
        assert_eq!(geo.indices().unwrap().iter().max(), Some(&23));
    }

    #[test]
    fn partial_cube_offsets_indices_per_face() {
        let geo = cube(2.0, &[CubeFace::Front, CubeFace::Back]);
        assert_eq!(geo.vertex_count(), 8);
        assert_eq!(geo.indices().unwrap(), &[0, 2, 3, 0, 3, 1, 4, 6, 7, 4, 7, 5]);
        assert!(positions(&geo).iter().all(|c| c.abs() == 1.0));
    }

    #[test]
    fn cube_faces_wind_counter_clockwise_outward() {
        let geo = cube(1.0, &CubeFace::ALL);
        let p = positions(&geo);
        let n = &geo.attributes()[1].data;
        let at = |i: u16| Vec3::from_slice(&p[i as usize * 3..i as usize * 3 + 3]);
        for tri in geo.indices().unwrap().chunks(3) {
            let face_normal = (at(tri[1]) - at(tri[0])).cross(at(tri[2]) - at(tri[0]));
            let stored = Vec3::from_slice(&n[tri[0] as usize * 3..tri[0] as usize * 3 + 3]);
            assert!(face_normal.dot(stored) > 0.0);
        }
    }

    #[test]
    fn sphere_counts_follow_divisions() {
        let geo = sphere(1.0, 36);
        assert_eq!(geo.vertex_count(), 37 * 37);
        assert_eq!(geo.index_count(), 36 * 36 * 6);

        let small = sphere(2.0, 8);
        let p = positions(&small);
        for v in p.chunks(3) {
            assert!((Vec3::from_slice(v).length() - 2.0).abs() < 1e-5);
        }
    }

    #[test]
    fn sphere_divisions_are_clamped_to_u16_range() {
        let geo = sphere(1.0, 1000);
        assert_eq!(geo.vertex_count(), 255 * 255);
        assert_eq!(geo.indices().unwrap().iter().max(), Some(&(255 * 255 - 1)));
    }

    #[test]
    fn quad_and_triangle() {
        let q = quad(2.0);
        assert_eq!((q.vertex_count(), q.index_count()), (4, 6));
        assert_eq!(positions(&q)[0], -1.0);

        let t = triangle(1.0);
        assert_eq!((t.vertex_count(), t.index_count()), (3, 0));
    }

    #[test]
    fn pyramid_has_four_sides_and_a_base() {
        let geo = pyramid(1.0);
        assert_eq!(geo.vertex_count(), 16);
        assert_eq!(geo.index_count(), 18);

        let n = &geo.attributes()[1].data;
        let first_side = Vec3::from_slice(&n[0..3]);
        assert!(first_side.x < 0.0 && first_side.y > 0.0);
        assert_eq!(&n[12 * 3..12 * 3 + 3], &[0.0, -1.0, 0.0]);
    }

    #[test]
    fn circle_is_a_closed_fan() {
        let geo = circle(1.0, 36);
        assert_eq!(geo.mode(), DrawMode::TriangleFan);
        assert_eq!(geo.vertex_count(), 38);
        let p = positions(&geo);
        let first = Vec3::from_slice(&p[3..6]);
        let last = Vec3::from_slice(&p[p.len() - 3..]);
        assert!(first.abs_diff_eq(last, 1e-5));
    }
}
