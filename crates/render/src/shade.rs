//! Local Phong illumination with shadows, attenuation and depth cueing.
use geom::{dot, v64, Ray};
use scene::{Attenuation, Color, DepthCue, Emitter, Light, Material, Object, Scene};

use crate::{
    intersect::{intersect, Hit},
    primitive::primitive,
    texture::{bump_normal, sample, texture_coordinate},
};

/// Color of the surface seen along `ray` at `hit`.
pub fn shade(scene: &Scene, hit: &Hit, ray: &Ray) -> Color {
    shade_point(scene, hit.object, ray.at(hit.t), ray.dir())
}

/// Local illumination of point `p` on `object`, seen by a ray travelling
/// along `dir`. Each channel is at most 1.
pub(crate) fn shade_point(scene: &Scene, object: Object, p: v64, dir: v64) -> Color {
    let material = scene.material(scene.surface(object).material);
    let od = diffuse_color(scene, object, p);
    let v = -dir;
    let n = shading_normal(scene, object, p, v);

    let mut res = od * material.ka;
    // Lights share a unit budget, so adding lights does not blow out the image.
    let weight = 1.0 / scene.lights.len() as f64;
    for light in &scene.lights {
        if let Some(c) = illuminate(scene, object, material, od, p, n, v, light) {
            res += c * weight;
        }
    }
    let mut res = res.clamp();

    if let Some(cue) = &scene.depth_cue {
        let a = depth_cue_factor(cue, (p - scene.camera.eye).norm());
        res = res * a + cue.color * (1.0 - a);
    }
    res
}

/// Material diffuse color, or the texture's color at `p`.
fn diffuse_color(scene: &Scene, object: Object, p: v64) -> Color {
    let surface = scene.surface(object);
    let material = scene.material(surface.material);
    let sampled = surface.texture.and_then(|id| {
        let at = texture_coordinate(scene, object, p)?;
        Some(sample(scene.texture(id), at))
    });
    sampled.unwrap_or(material.diffuse)
}

/// Bump mapped normal, facing `v`.
fn shading_normal(scene: &Scene, object: Object, p: v64, v: v64) -> v64 {
    let n0 = primitive(scene, object).normal_at(p);
    let n = bump_normal(scene, object, p, n0);
    if dot(n0, v) < 0.0 {
        -n
    } else {
        n
    }
}

/// Diffuse and specular contribution of a single light, `None` if the
/// light is occluded.
#[allow(clippy::too_many_arguments)]
fn illuminate(
    scene: &Scene,
    object: Object,
    material: &Material,
    od: Color,
    p: v64,
    n: v64,
    v: v64,
    light: &Light,
) -> Option<Color> {
    let (l, dist) = match light.emitter {
        Emitter::Point(pos) => {
            let d = pos - p;
            (d.checked_unit()?, Some(d.norm()))
        }
        Emitter::Directional(dir) => ((-dir).checked_unit()?, None),
    };
    if in_shadow(scene, object, p, l, dist) {
        return None;
    }

    let diffuse = od * (material.kd * dot(n, l).max(0.0));
    let specular = match (v + l).checked_unit() {
        Some(h) => material.specular * (material.ks * dot(n, h).max(0.0).powf(material.n)),
        None => Color::BLACK,
    };
    let f_att = match (light.attenuation, dist) {
        (Some(att), Some(d)) => attenuation(att, d),
        _ => 1.0,
    };
    Some((diffuse + specular) * light.color * f_att)
}

/// Whether anything blocks the path from `p` along `l`, for `dist` units
/// or forever.
fn in_shadow(scene: &Scene, object: Object, p: v64, l: v64, dist: Option<f64>) -> bool {
    let ray = Ray::new(p, l);
    match (intersect(scene, &ray, Some(object)), dist) {
        (None, _) => false,
        (Some(hit), Some(dist)) => hit.t < dist,
        (Some(_), None) => true,
    }
}

fn attenuation(att: Attenuation, d: f64) -> f64 {
    let denom = att.c1 + att.c2 * d + att.c3 * d * d;
    if !(denom > 0.0) {
        return 1.0;
    }
    (1.0 / denom).min(1.0)
}

/// Weight of the shaded color versus the fog color at distance `d`.
fn depth_cue_factor(cue: &DepthCue, d: f64) -> f64 {
    if d < cue.dist_min {
        cue.alpha_max
    } else if d < cue.dist_max {
        let s = (cue.dist_max - d) / (cue.dist_max - cue.dist_min);
        cue.alpha_min + (cue.alpha_max - cue.alpha_min) * s
    } else {
        cue.alpha_min
    }
}
