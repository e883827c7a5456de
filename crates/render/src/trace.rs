use geom::{dot, v64, Ray};
use scene::{Color, Material, Object, Scene};

use crate::{
    camera::ViewWindow,
    intersect::intersect,
    primitive::primitive,
    shade::{shade, shade_point},
    Settings,
};

/// Refractive index of the space between objects.
const ETA_AIR: f64 = 1.0;

/// Whitted-style recursive ray tracer over a read-only scene.
pub struct Tracer<'s> {
    scene: &'s Scene,
    window: ViewWindow,
    max_depth: u32,
}

impl<'s> Tracer<'s> {
    pub fn new(scene: &'s Scene, settings: &Settings) -> Tracer<'s> {
        let window = ViewWindow::new(&scene.camera);
        Tracer { scene, window, max_depth: settings.max_depth }
    }

    pub fn window(&self) -> &ViewWindow {
        &self.window
    }

    pub fn trace_pixel(&self, x: u32, y: u32) -> Color {
        self.trace(&self.window.cast(x, y))
    }

    /// Full color seen along a primary ray.
    pub fn trace(&self, ray: &Ray) -> Color {
        let Some(hit) = intersect(self.scene, ray, None) else {
            return self.scene.background;
        };
        let p = ray.at(hit.t);
        let v = -ray.dir();

        let mut res = shade(self.scene, &hit, ray);
        res += self.reflective(hit.object, p, v, 1);
        let alpha = self.material(hit.object).alpha;
        if alpha < 1.0 {
            res += self.transmissive(hit.object, p, v, 1, true, ETA_AIR) * (1.0 - alpha);
        }
        res.clamp()
    }

    /// Light mirrored towards `v` at point `p` of `from`.
    fn reflective(&self, from: Object, p: v64, v: v64, depth: u32) -> Color {
        if depth > self.max_depth {
            return Color::BLACK;
        }
        let n = facing(primitive(self.scene, from).normal_at(p), v);
        let cos = dot(n, v);
        let fr = schlick(ETA_AIR, self.material(from).eta, cos);

        let ray = Ray::new(p, n * (2.0 * cos) - v);
        let Some(hit) = intersect(self.scene, &ray, Some(from)) else {
            return Color::BLACK;
        };
        let local = shade(self.scene, &hit, &ray);
        local * fr.powi(depth as i32)
            + self.reflective(hit.object, ray.at(hit.t), -ray.dir(), depth + 1)
    }

    /// Light transmitted through `from` towards `v` at point `p`. `entering`
    /// tells whether the ray that arrived at `p` crosses into `from`, `eta_i`
    /// is the refractive index on the `v` side.
    fn transmissive(
        &self,
        from: Object,
        p: v64,
        v: v64,
        depth: u32,
        entering: bool,
        eta_i: f64,
    ) -> Color {
        if depth > self.max_depth {
            return Color::BLACK;
        }
        let mut n = primitive(self.scene, from).normal_at(p);
        let eta_t = if entering { self.material(from).eta } else { ETA_AIR };
        if !entering {
            n = -n;
        }
        let n = facing(n, v);
        let fr = schlick(eta_i, eta_t, dot(n, v));
        let weight = (1.0 - fr).powi(depth as i32);

        let Some(t) = refract(n, v, eta_i / eta_t) else {
            // Total internal reflection.
            return shade_point(self.scene, from, p, -v) * weight;
        };
        let ray = Ray::new(p, t);
        // Spheres are left through their own far side.
        let exclude = match from {
            Object::Triangle(_) => Some(from),
            Object::Sphere(_) => None,
        };
        let Some(hit) = intersect(self.scene, &ray, exclude) else {
            return Color::BLACK;
        };
        let local = shade(self.scene, &hit, &ray) * weight;
        if !(self.material(hit.object).alpha < 1.0) {
            return local;
        }
        let entering = if hit.object == from { !entering } else { true };
        local + self.transmissive(hit.object, ray.at(hit.t), -ray.dir(), depth + 1, entering, eta_t)
    }

    fn material(&self, object: Object) -> &'s Material {
        self.scene.material(self.scene.surface(object).material)
    }
}

/// `n` flipped, if needed, to the side of `v`.
fn facing(n: v64, v: v64) -> v64 {
    if dot(n, v) < 0.0 {
        -n
    } else {
        n
    }
}

/// Schlick's approximation of Fresnel reflectance, `cos` is the cosine of
/// the angle of incidence.
pub fn schlick(eta_i: f64, eta_t: f64, cos: f64) -> f64 {
    let f0 = ((eta_t - eta_i) / (eta_t + eta_i)).powi(2);
    let f0 = if f0.is_finite() { f0.min(1.0) } else { 0.0 };
    let cos = cos.clamp(0.0, 1.0);
    f0 + (1.0 - f0) * (1.0 - cos).powi(5)
}

/// Direction of the ray refracted at a surface with unit normal `n`, for an
/// incoming ray travelling along `-v`. `ratio` is `eta_i / eta_t`, `n`
/// faces `v`. `None` on total internal reflection.
pub fn refract(n: v64, v: v64, ratio: f64) -> Option<v64> {
    let cos = dot(n, v);
    let k = 1.0 - ratio * ratio * (1.0 - cos * cos);
    if !(k >= 0.0) {
        return None;
    }
    (-n * k.sqrt() + (n * cos - v) * ratio).checked_unit()
}
