use std::f64::consts::PI;

use geom::{cross, dot, uv, v64, Ray, Uv};
use scene::{Object, Scene, Sphere, Surface, Triangle};

/// Hits closer than this to the ray origin are ignored, so that secondary
/// rays don't hit the surface they start from.
pub(crate) const T_MIN: f64 = 1e-4;

/// Rays more parallel than this to a triangle's plane miss it.
const PARALLEL_EPS: f64 = 1e-9;

/// Slack for points on triangle edges.
const BARYCENTRIC_EPS: f64 = 1e-9;

pub(crate) trait Primitive {
    /// Distance along `ray` to the nearest intersection beyond `T_MIN`.
    fn intersect(&self, ray: &Ray) -> Option<f64>;
    /// Unit shading normal at a point on the surface.
    fn normal_at(&self, p: v64) -> v64;
    /// Texture coordinate of a point on the surface, if it has any.
    fn uv_at(&self, p: v64) -> Option<Uv>;
    /// Unit tangent and bitangent around the normal `n`, aligned with the
    /// texture parametrization.
    fn tangent_frame(&self, n: v64) -> Option<(v64, v64)>;
    fn surface(&self) -> &Surface;
}

pub(crate) fn primitive(scene: &Scene, object: Object) -> &dyn Primitive {
    match object {
        Object::Sphere(i) => &scene.spheres[i],
        Object::Triangle(i) => &scene.triangles[i],
    }
}

impl Primitive for Sphere {
    fn intersect(&self, ray: &Ray) -> Option<f64> {
        // |o + t d|^2 = r^2 with |d| = 1.
        let o = ray.origin() - self.center;
        let k = dot(ray.dir(), o);
        let c = dot(o, o) - self.radius.powi(2);

        let disc = k * k - c;
        if !(disc >= 0.0) {
            return None;
        }
        let t1 = -k - disc.sqrt();
        let t2 = -k + disc.sqrt();
        if t1 > T_MIN {
            Some(t1)
        } else if t2 > T_MIN {
            Some(t2)
        } else {
            None
        }
    }

    fn normal_at(&self, p: v64) -> v64 {
        (p - self.center) / self.radius
    }

    fn uv_at(&self, p: v64) -> Option<Uv> {
        let n = self.normal_at(p);
        let u = 0.5 + n.y.atan2(n.x) / (2.0 * PI);
        let v = n.z.clamp(-1.0, 1.0).acos() / PI;
        Some(uv(u, v))
    }

    fn tangent_frame(&self, n: v64) -> Option<(v64, v64)> {
        // Along the parallel; undefined at the poles.
        let t = v64(-n.y, n.x, 0.0).checked_unit()?;
        let b = cross(n, t);
        Some((t, b))
    }

    fn surface(&self) -> &Surface {
        &self.surface
    }
}

impl Primitive for Triangle {
    fn intersect(&self, ray: &Ray) -> Option<f64> {
        let [p0, p1, p2] = self.v;
        let n = cross(p1 - p0, p2 - p0).checked_unit()?;
        let denom = dot(n, ray.dir());
        if !(denom.abs() > PARALLEL_EPS) {
            return None;
        }
        let t = dot(n, p0 - ray.origin()) / denom;
        if !(t > T_MIN) {
            return None;
        }
        let inside = barycentric(&self.v, ray.at(t))?
            .iter()
            .all(|&w| -BARYCENTRIC_EPS <= w && w <= 1.0 + BARYCENTRIC_EPS);
        if !inside {
            return None;
        }
        Some(t)
    }

    fn normal_at(&self, p: v64) -> v64 {
        let [p0, p1, p2] = self.v;
        let flat = cross(p1 - p0, p2 - p0).checked_unit().unwrap_or(v64::ZERO);
        let (Some(n), Some(w)) = (self.n, barycentric(&self.v, p)) else {
            return flat;
        };
        (n[0] * w[0] + n[1] * w[1] + n[2] * w[2]).checked_unit().unwrap_or(flat)
    }

    fn uv_at(&self, p: v64) -> Option<Uv> {
        let t = self.uv?;
        let w = barycentric(&self.v, p)?;
        Some(t[0] * w[0] + t[1] * w[1] + t[2] * w[2])
    }

    fn tangent_frame(&self, n: v64) -> Option<(v64, v64)> {
        let [t0, t1, t2] = self.uv?;
        let [p0, p1, p2] = self.v;
        let (e1, e2) = (p1 - p0, p2 - p1);
        let (d1, d2) = (t1 - t0, t2 - t1);
        let det = d1.u * d2.v - d1.v * d2.u;
        if !(det.abs() > 1e-12) {
            return None;
        }
        let t = (e1 * d2.v - e2 * d1.v) / det;
        let b = (e2 * d1.u - e1 * d2.u) / det;

        // Smooth normals leave the face plane, so project the gradients.
        let t = (t - n * dot(n, t)).checked_unit()?;
        let b_ortho = cross(n, t);
        let b = if dot(b_ortho, b) < 0.0 { -b_ortho } else { b_ortho };
        Some((t, b))
    }

    fn surface(&self) -> &Surface {
        &self.surface
    }
}

/// Barycentric coordinates `[alpha, beta, gamma]` of `p` projected onto the
/// triangle's plane, weights of `v[0]`, `v[1]`, `v[2]` respectively. `None`
/// for degenerate triangles.
pub fn barycentric(v: &[v64; 3], p: v64) -> Option<[f64; 3]> {
    let e1 = v[1] - v[0];
    let e2 = v[2] - v[0];
    let ep = p - v[0];
    let d11 = dot(e1, e1);
    let d12 = dot(e1, e2);
    let d22 = dot(e2, e2);
    let dp1 = dot(ep, e1);
    let dp2 = dot(ep, e2);

    let d = d11 * d22 - d12 * d12;
    if !(d.abs() > f64::MIN_POSITIVE) {
        return None;
    }
    let beta = (d22 * dp1 - d12 * dp2) / d;
    let gamma = (d11 * dp2 - d12 * dp1) / d;
    Some([1.0 - beta - gamma, beta, gamma])
}

#[cfg(test)]
mod tests {
    use geom::{dot, uv, v64, Ray};
    use scene::{MaterialId, Sphere, Surface, Triangle};

    use super::{barycentric, Primitive};

    fn sphere(center: v64, radius: f64) -> Sphere {
        Sphere { center, radius, surface: Surface::new(MaterialId(0)) }
    }

    fn triangle() -> Triangle {
        Triangle {
            v: [v64(0.0, 0.0, 0.0), v64(2.0, 0.0, 0.0), v64(0.0, 2.0, 0.0)],
            n: None,
            uv: None,
            surface: Surface::new(MaterialId(0)),
        }
    }

    #[test]
    fn sphere_hit_distance() {
        let s = sphere(v64(1.0, 2.0, -3.0), 2.0);
        for (origin, dir, expected) in [
            (v64(1.0, 2.0, 10.0), v64(0.0, 0.0, -1.0), 11.0),
            (v64(-9.0, 2.0, -3.0), v64(1.0, 0.0, 0.0), 8.0),
            // From inside, the far side.
            (v64(1.0, 2.0, -3.0), v64(0.0, 1.0, 0.0), 2.0),
            // Grazing.
            (v64(3.0, 2.0, 10.0), v64(0.0, 0.0, -1.0), 13.0),
        ] {
            let t = s.intersect(&Ray::new(origin, dir)).unwrap();
            assert!((t - expected).abs() < 1e-6, "{t} != {expected}");
        }
        assert_eq!(s.intersect(&Ray::new(v64(1.0, 2.0, 10.0), v64(0.0, 0.0, 1.0))), None);
        assert_eq!(s.intersect(&Ray::new(v64(3.5, 2.0, 10.0), v64(0.0, 0.0, -1.0))), None);
    }

    #[test]
    fn ray_starting_on_sphere_does_not_hit_its_origin() {
        let s = sphere(v64::ZERO, 1.0);
        let t = s.intersect(&Ray::new(v64(0.0, 0.0, 1.0), v64(0.0, 0.0, -1.0))).unwrap();
        assert!((t - 2.0).abs() < 1e-9);
        assert_eq!(s.intersect(&Ray::new(v64(0.0, 0.0, 1.0), v64(0.0, 0.0, 1.0))), None);
    }

    #[test]
    fn sphere_texture_coordinates() {
        let s = sphere(v64::ZERO, 2.0);
        let at = s.uv_at(v64(2.0, 0.0, 0.0)).unwrap();
        assert!((at.u - 0.5).abs() < 1e-12 && (at.v - 0.5).abs() < 1e-12);
        let at = s.uv_at(v64(0.0, 0.0, 2.0)).unwrap();
        assert!(at.v.abs() < 1e-12);
        let at = s.uv_at(v64(0.0, 2.0, 0.0)).unwrap();
        assert!((at.u - 0.75).abs() < 1e-12);
    }

    #[test]
    fn sphere_tangent_frame() {
        let s = sphere(v64::ZERO, 1.0);
        let n = v64(1.0, 0.0, 0.0);
        let (t, b) = s.tangent_frame(n).unwrap();
        assert_eq!(t, v64(0.0, 1.0, 0.0));
        assert_eq!(b, v64(0.0, 0.0, 1.0));
        assert!(s.tangent_frame(v64(0.0, 0.0, 1.0)).is_none());
    }

    #[test]
    fn triangle_hit() {
        let tr = triangle();
        let t = tr.intersect(&Ray::new(v64(0.5, 0.5, 3.0), v64(0.0, 0.0, -1.0))).unwrap();
        assert!((t - 3.0).abs() < 1e-12);
        // Back side hits too.
        let t = tr.intersect(&Ray::new(v64(0.5, 0.5, -1.0), v64(0.0, 0.0, 1.0))).unwrap();
        assert!((t - 1.0).abs() < 1e-12);
        // Edge.
        assert!(tr.intersect(&Ray::new(v64(1.0, 1.0, 1.0), v64(0.0, 0.0, -1.0))).is_some());
        // Outside, behind, parallel.
        assert!(tr.intersect(&Ray::new(v64(1.5, 1.5, 1.0), v64(0.0, 0.0, -1.0))).is_none());
        assert!(tr.intersect(&Ray::new(v64(0.5, 0.5, 1.0), v64(0.0, 0.0, 1.0))).is_none());
        assert!(tr.intersect(&Ray::new(v64(0.5, 0.5, 1.0), v64(1.0, 0.0, 0.0))).is_none());
    }

    #[test]
    fn degenerate_triangle_is_never_hit() {
        let mut tr = triangle();
        tr.v[2] = v64(1.0, 0.0, 0.0);
        assert!(tr.intersect(&Ray::new(v64(0.5, 0.0, 1.0), v64(0.0, 0.0, -1.0))).is_none());
        assert!(barycentric(&tr.v, v64(0.5, 0.0, 0.0)).is_none());
    }

    #[test]
    fn barycentric_weights_sum_to_one() {
        let v = [v64(1.0, -2.0, 0.5), v64(3.0, 1.0, -1.0), v64(-1.0, 4.0, 2.0)];
        for &(a, b) in &[(0.2, 0.3), (0.0, 0.0), (1.0, 0.0), (0.7, 0.1), (-0.5, 2.0)] {
            let p = v[0] * (1.0 - a - b) + v[1] * a + v[2] * b;
            let w = barycentric(&v, p).unwrap();
            assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-12);
            assert!((w[1] - a).abs() < 1e-9 && (w[2] - b).abs() < 1e-9, "{w:?}");
        }
    }

    #[test]
    fn smooth_normal_is_interpolated() {
        let mut tr = triangle();
        let a = v64(0.0, 0.0, 1.0);
        let b = v64(1.0, 0.0, 0.0);
        tr.n = Some([a, b, a]);
        assert_eq!(tr.normal_at(v64(0.0, 0.0, 0.0)), a);
        let mid = tr.normal_at(v64(1.0, 0.0, 0.0));
        assert!((mid.norm() - 1.0).abs() < 1e-12);
        assert!((dot(mid, a) - dot(mid, b)).abs() < 1e-12);
        // Flat shading.
        assert_eq!(triangle().normal_at(v64(0.3, 0.3, 0.0)), v64(0.0, 0.0, 1.0));
    }

    #[test]
    fn triangle_texture_coordinates_and_frame() {
        let mut tr = triangle();
        tr.uv = Some([uv(0.0, 0.0), uv(1.0, 0.0), uv(0.0, 1.0)]);
        let at = tr.uv_at(v64(1.0, 0.5, 0.0)).unwrap();
        assert!((at.u - 0.5).abs() < 1e-12 && (at.v - 0.25).abs() < 1e-12);
        let (t, b) = tr.tangent_frame(v64(0.0, 0.0, 1.0)).unwrap();
        assert!((t - v64(1.0, 0.0, 0.0)).norm() < 1e-12);
        assert!((b - v64(0.0, 1.0, 0.0)).norm() < 1e-12);
        assert!(triangle().tangent_frame(v64(0.0, 0.0, 1.0)).is_none());
    }

    #[test]
    fn smooth_triangle_frame_is_orthogonal_to_the_normal() {
        let mut tr = triangle();
        let z = v64(0.0, 0.0, 1.0);
        tr.n = Some([z, v64(1.0, 0.0, 1.0).to_unit(), z]);
        tr.uv = Some([uv(0.0, 0.0), uv(1.0, 0.0), uv(0.0, 1.0)]);

        let n = tr.normal_at(v64(1.5, 0.2, 0.0));
        assert!(dot(n, v64(1.0, 0.0, 0.0)) > 0.1);
        let (t, b) = tr.tangent_frame(n).unwrap();
        for (x, y) in [(t, n), (b, n), (t, b)] {
            assert!(dot(x, y).abs() < 1e-12, "{x} . {y}");
        }
        assert!((t.norm() - 1.0).abs() < 1e-12 && (b.norm() - 1.0).abs() < 1e-12);
        // Still aligned with increasing u and v.
        assert!(t.x > 0.0);
        assert!(b.y > 0.0);
    }
}
