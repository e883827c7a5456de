use geom::{cross, v64, Ray};
use scene::Camera;

/// Distance from the eye to the projection plane. Any positive value gives
/// the same rays.
const VIEW_DIST: f64 = 5.0;

/// The projection plane in world space.
#[derive(Debug, Clone)]
pub struct ViewWindow {
    pub eye: v64,
    pub u: v64,
    pub v: v64,
    pub width: f64,
    pub height: f64,
    pub ul: v64,
    pub ur: v64,
    pub ll: v64,
    pub lr: v64,
    /// Offset between horizontally adjacent pixels.
    pub dh: v64,
    /// Offset between vertically adjacent pixels.
    pub dv: v64,
}

impl ViewWindow {
    /// Expects a validated camera: `view_dir` and `up` not parallel.
    pub fn new(cam: &Camera) -> ViewWindow {
        let n = cam.view_dir.to_unit();
        let u = cross(cam.view_dir, cam.up).to_unit();
        let v = cross(u, cam.view_dir).to_unit();

        let height = 2.0 * VIEW_DIST * (cam.vfov.to_radians() / 2.0).tan();
        let width = height * cam.width as f64 / cam.height as f64;

        let center = cam.eye + n * VIEW_DIST;
        let half_u = u * (width / 2.0);
        let half_v = v * (height / 2.0);
        let ul = center - half_u + half_v;
        let ur = center + half_u + half_v;
        let ll = center - half_u - half_v;
        let lr = center + half_u - half_v;

        // A single pixel row or column sits on the window's edge.
        let steps = |n: u32| n.saturating_sub(1).max(1) as f64;
        let dh = (ur - ul) / steps(cam.width);
        let dv = (ll - ul) / steps(cam.height);

        ViewWindow { eye: cam.eye, u, v, width, height, ul, ur, ll, lr, dh, dv }
    }

    /// Primary ray through pixel `(x, y)`, `(0, 0)` is the upper left.
    pub fn cast(&self, x: u32, y: u32) -> Ray {
        let to = self.ul + self.dh * x as f64 + self.dv * y as f64;
        Ray::from_to(self.eye, to)
    }
}
