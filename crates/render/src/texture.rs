//! Texture and bump map lookups.
use std::ops::{Add, Mul};

use geom::{v64, Uv};
use scene::{Grid, Object, Scene};

use crate::primitive::primitive;

/// Bilinear lookup. `(0, 0)` is the center of the upper-left cell and
/// `(1, 1)` the center of the lower-right one; coordinates outside of
/// `[0, 1]` are clamped.
pub fn sample<T>(grid: &Grid<T>, at: Uv) -> T
where
    T: Copy + Add<Output = T> + Mul<f64, Output = T>,
{
    let axis = |c: f64, n: u32| {
        let last = n.saturating_sub(1);
        let c = if c.is_nan() { 0.0 } else { c.clamp(0.0, 1.0) } * last as f64;
        let i = (c.floor() as u32).min(last);
        (i, (i + 1).min(last), c - i as f64)
    };
    let (x0, x1, fx) = axis(at.u, grid.width());
    let (y0, y1, fy) = axis(at.v, grid.height());

    let top = grid.get(x0, y0) * (1.0 - fx) + grid.get(x1, y0) * fx;
    let bottom = grid.get(x0, y1) * (1.0 - fx) + grid.get(x1, y1) * fx;
    top * (1.0 - fy) + bottom * fy
}

/// Texture space position of point `p` on `object`.
pub fn texture_coordinate(scene: &Scene, object: Object, p: v64) -> Option<Uv> {
    primitive(scene, object).uv_at(p)
}

/// Shading normal at `p` with the object's bump map applied. Returns `n`
/// unchanged if the object has no bump map or no usable tangent frame.
pub fn bump_normal(scene: &Scene, object: Object, p: v64, n: v64) -> v64 {
    let prim = primitive(scene, object);
    let Some(bump) = prim.surface().bump else {
        return n;
    };
    let Some(at) = prim.uv_at(p) else {
        return n;
    };
    let Some((t, b)) = prim.tangent_frame(n) else {
        return n;
    };
    let m = sample(scene.bump(bump), at);
    (t * m.x + b * m.y + n * m.z).checked_unit().unwrap_or(n)
}

#[cfg(test)]
mod tests {
    use geom::{uv, v64};
    use scene::{
        BumpId, Camera, Color, Grid, MaterialId, Object, Scene, Sphere, Surface, Triangle,
    };

    use super::{bump_normal, sample};

    fn texture() -> Grid<Color> {
        Grid::from_fn(3, 2, |x, y| Color::new(x as f64 / 7.0, y as f64 / 3.0, 0.125))
    }

    #[test]
    fn lattice_points_are_exact() {
        let t = texture();
        for y in 0..2 {
            for x in 0..3 {
                let at = uv(x as f64 / 2.0, y as f64);
                assert_eq!(sample(&t, at), t.get(x, y), "({x}, {y})");
            }
        }
    }

    #[test]
    fn interpolates_between_cells() {
        let t = texture();
        let c = sample(&t, uv(0.25, 0.5));
        assert!((c.r - 0.5 / 7.0).abs() < 1e-12);
        assert!((c.g - 0.5 / 3.0).abs() < 1e-12);
        assert!((c.b - 0.125).abs() < 1e-12);
    }

    #[test]
    fn out_of_range_is_clamped() {
        let t = texture();
        assert_eq!(sample(&t, uv(-3.0, 7.0)), t.get(0, 1));
        assert_eq!(sample(&t, uv(1.5, -0.1)), t.get(2, 0));
        assert_eq!(sample(&t, uv(f64::NAN, 0.0)), t.get(0, 0));
    }

    #[test]
    fn single_cell() {
        let grid = Grid::from_fn(1, 1, |_, _| v64(0.0, 0.0, 1.0));
        assert_eq!(sample(&grid, uv(0.3, 0.9)), v64(0.0, 0.0, 1.0));
    }

    fn bumpy_scene(m: v64) -> Scene {
        let camera = Camera {
            eye: v64(0.0, 0.0, 5.0),
            view_dir: v64(0.0, 0.0, -1.0),
            up: v64(0.0, 1.0, 0.0),
            vfov: 60.0,
            width: 4,
            height: 4,
        };
        let mut scene = Scene::new(camera, Color::BLACK);
        scene.bumps.push(Grid::from_fn(2, 2, |_, _| m));
        let surface = Surface { bump: Some(BumpId(0)), ..Surface::new(MaterialId(0)) };
        scene.spheres.push(Sphere { center: v64::ZERO, radius: 1.0, surface });
        scene.triangles.push(Triangle {
            v: [v64(0.0, 0.0, 0.0), v64(2.0, 0.0, 0.0), v64(0.0, 2.0, 0.0)],
            n: None,
            uv: None,
            surface,
        });
        scene
    }

    #[test]
    fn bump_map_tilts_the_normal() {
        let m = v64(0.3, 0.4, 0.8);
        let scene = bumpy_scene(m);
        let n = v64(1.0, 0.0, 0.0);
        // On the equator the tangent runs along +y and the bitangent along +z.
        let expected = (v64(0.0, 1.0, 0.0) * m.x + v64(0.0, 0.0, 1.0) * m.y + n * m.z).to_unit();
        let actual = bump_normal(&scene, Object::Sphere(0), v64(1.0, 0.0, 0.0), n);
        assert!((actual - expected).norm() < 1e-12, "{actual} != {expected}");
        assert!((actual.norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn bump_map_falls_back_to_the_normal() {
        let scene = bumpy_scene(v64(0.3, 0.4, 0.8));
        // Pole, no tangent frame.
        let pole = v64(0.0, 0.0, 1.0);
        assert_eq!(bump_normal(&scene, Object::Sphere(0), pole, pole), pole);
        // Triangle without texture coordinates.
        let n = v64(0.0, 0.0, 1.0);
        assert_eq!(bump_normal(&scene, Object::Triangle(0), v64(0.5, 0.5, 0.0), n), n);
        // Zero perturbation.
        let flat = bumpy_scene(v64::ZERO);
        let n = v64(1.0, 0.0, 0.0);
        assert_eq!(bump_normal(&flat, Object::Sphere(0), n, n), n);
        // No bump map at all.
        let mut plain = bumpy_scene(v64(0.3, 0.4, 0.8));
        plain.spheres[0].surface.bump = None;
        assert_eq!(bump_normal(&plain, Object::Sphere(0), n, n), n);
    }
}
