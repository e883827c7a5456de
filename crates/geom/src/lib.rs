use std::{fmt, ops};

#[derive(Clone, Copy, PartialEq, Debug, Default)]
#[allow(non_camel_case_types)]
pub struct v64 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// A point in texture space.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Uv {
    pub u: f64,
    pub v: f64,
}

/// Half-line `origin + t * dir`, `dir` is always unit length.
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    origin: v64,
    dir: v64,
}

pub const fn v64(x: f64, y: f64, z: f64) -> v64 {
    v64 { x, y, z }
}

pub const fn uv(u: f64, v: f64) -> Uv {
    Uv { u, v }
}

impl v64 {
    pub const ZERO: v64 = v64(0.0, 0.0, 0.0);

    pub fn xyz(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
    pub fn to_unit(self) -> v64 {
        self / self.norm()
    }
    /// Like `to_unit`, but `None` for vectors too short to have a direction.
    pub fn checked_unit(self) -> Option<v64> {
        let norm = self.norm();
        if !(norm > EPSILON) {
            return None;
        }
        Some(self / norm)
    }
    pub fn norm(self) -> f64 {
        self.norm_squared().sqrt()
    }
    pub fn norm_squared(self) -> f64 {
        dot(self, self)
    }
    pub fn is_finite(self) -> bool {
        self.xyz().iter().all(|it| it.is_finite())
    }
}

/// Lengths below this are treated as zero when normalizing.
pub const EPSILON: f64 = 1e-12;

impl fmt::Display for v64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x, y, z] = self.xyz();
        write!(f, "{x},{y},{z}")
    }
}

pub fn dot(lhs: v64, rhs: v64) -> f64 {
    lhs.x * rhs.x + lhs.y * rhs.y + lhs.z * rhs.z
}
pub fn cross(lhs: v64, rhs: v64) -> v64 {
    let [lx, ly, lz] = lhs.xyz();
    let [rx, ry, rz] = rhs.xyz();
    v64(ly * rz - lz * ry, -(lx * rz - lz * rx), lx * ry - ly * rx)
}

impl ops::Neg for v64 {
    type Output = v64;

    fn neg(self) -> v64 {
        v64(-self.x, -self.y, -self.z)
    }
}

impl ops::Add for v64 {
    type Output = v64;

    fn add(self, rhs: v64) -> v64 {
        v64(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl ops::Sub for v64 {
    type Output = v64;

    fn sub(self, rhs: v64) -> v64 {
        v64(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl ops::Div<f64> for v64 {
    type Output = v64;

    fn div(self, c: f64) -> v64 {
        let r = 1.0 / c;
        v64(self.x * r, self.y * r, self.z * r)
    }
}

impl ops::Mul<f64> for v64 {
    type Output = v64;

    fn mul(self, c: f64) -> v64 {
        v64(self.x * c, self.y * c, self.z * c)
    }
}

impl ops::Mul<v64> for f64 {
    type Output = v64;

    fn mul(self, v: v64) -> v64 {
        v * self
    }
}

impl Uv {
    pub fn dot(self, rhs: Uv) -> f64 {
        self.u * rhs.u + self.v * rhs.v
    }
}

impl fmt::Display for Uv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.u, self.v)
    }
}

impl ops::Add for Uv {
    type Output = Uv;

    fn add(self, rhs: Uv) -> Uv {
        uv(self.u + rhs.u, self.v + rhs.v)
    }
}

impl ops::Sub for Uv {
    type Output = Uv;

    fn sub(self, rhs: Uv) -> Uv {
        uv(self.u - rhs.u, self.v - rhs.v)
    }
}

impl ops::Mul<f64> for Uv {
    type Output = Uv;

    fn mul(self, c: f64) -> Uv {
        uv(self.u * c, self.v * c)
    }
}

impl Ray {
    /// Normalizes `dir`. A zero `dir` produces a ray that intersects nothing.
    pub fn new(origin: v64, dir: v64) -> Ray {
        let dir = dir.to_unit();
        Ray { origin, dir }
    }

    pub fn from_to(from: v64, to: v64) -> Ray {
        Ray::new(from, to - from)
    }

    pub fn origin(&self) -> v64 {
        self.origin
    }

    pub fn dir(&self) -> v64 {
        self.dir
    }

    pub fn at(&self, dt: f64) -> v64 {
        self.origin + self.dir * dt
    }
}

#[test]
fn test_cross_is_right_handed() {
    let x = v64(1.0, 0.0, 0.0);
    let y = v64(0.0, 1.0, 0.0);
    assert_eq!(cross(x, y), v64(0.0, 0.0, 1.0));
    assert_eq!(cross(y, x), v64(0.0, 0.0, -1.0));
    assert_eq!(dot(cross(x, y), x), 0.0);
}

#[test]
fn test_ray_is_parametrized_by_distance() {
    let ray = Ray::new(v64(1.0, 2.0, 3.0), v64(0.0, 0.0, 10.0));
    assert_eq!(ray.dir(), v64(0.0, 0.0, 1.0));
    assert_eq!(ray.at(2.0), v64(1.0, 2.0, 5.0));
}

#[test]
fn test_checked_unit() {
    assert_eq!(v64::ZERO.checked_unit(), None);
    assert_eq!(v64(0.0, 0.0, -2.0).checked_unit(), Some(v64(0.0, 0.0, -1.0)));
    assert!(Ray::new(v64::ZERO, v64::ZERO).dir().x.is_nan());
}
