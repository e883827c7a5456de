use geom::Ray;
use scene::{Object, Scene};

use crate::primitive::primitive;

/// The nearest surface along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub object: Object,
    pub t: f64,
}

/// Finds the nearest hit along `ray`, skipping `exclude`.
///
/// Spheres are tested before triangles; on an exact tie in `t` the first
/// tested object wins.
pub fn intersect(scene: &Scene, ray: &Ray, exclude: Option<Object>) -> Option<Hit> {
    let mut res: Option<Hit> = None;
    for object in scene.objects() {
        if Some(object) == exclude {
            continue;
        }
        let Some(t) = primitive(scene, object).intersect(ray) else {
            continue;
        };
        if res.map_or(true, |it| t < it.t) {
            res = Some(Hit { object, t })
        }
    }
    res
}
