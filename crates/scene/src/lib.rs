mod color;
mod parse;
pub mod ppm;
mod texture;
mod validate;

use std::{fmt, io};

use geom::{v64, Uv};

pub use crate::{
    color::Color,
    parse::ParseSceneError,
    texture::{BumpMap, Grid, Texture},
    validate::SceneError,
};

/// Everything needed to render an image. Built once, read-only afterwards.
///
/// Cross references (`MaterialId` and friends) are plain indices into the
/// tables below; [`Scene::validate`] checks that all of them resolve.
#[derive(Debug, Clone)]
pub struct Scene {
    pub background: Color,
    pub camera: Camera,
    pub materials: Vec<Material>,
    pub textures: Vec<Texture>,
    pub bumps: Vec<BumpMap>,
    pub spheres: Vec<Sphere>,
    pub triangles: Vec<Triangle>,
    pub lights: Vec<Light>,
    pub depth_cue: Option<DepthCue>,
}

#[derive(Debug, Clone)]
pub struct Camera {
    pub eye: v64,
    pub view_dir: v64,
    pub up: v64,
    /// Vertical field of view, in degrees.
    pub vfov: f64,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BumpId(pub u32);

#[derive(Debug, Clone)]
pub struct Material {
    pub diffuse: Color,
    pub specular: Color,
    pub ka: f64,
    pub kd: f64,
    pub ks: f64,
    /// Specular exponent.
    pub n: f64,
    /// Opacity, `1.0` is fully opaque.
    pub alpha: f64,
    /// Index of refraction.
    pub eta: f64,
}

/// Appearance shared by all primitives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub material: MaterialId,
    pub texture: Option<TextureId>,
    pub bump: Option<BumpId>,
}

#[derive(Debug, Clone)]
pub struct Sphere {
    pub center: v64,
    pub radius: f64,
    pub surface: Surface,
}

/// A triangle with its vertex attributes already looked up.
#[derive(Debug, Clone)]
pub struct Triangle {
    pub v: [v64; 3],
    /// Per-vertex unit normals, for smooth shading.
    pub n: Option<[v64; 3]>,
    /// Per-vertex texture coordinates.
    pub uv: Option<[Uv; 3]>,
    pub surface: Surface,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Emitter {
    Point(v64),
    /// Light travelling along the given direction.
    Directional(v64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    pub c1: f64,
    pub c2: f64,
    pub c3: f64,
}

#[derive(Debug, Clone)]
pub struct Light {
    pub emitter: Emitter,
    pub color: Color,
    /// Inverse-quadratic falloff, only meaningful for point lights.
    pub attenuation: Option<Attenuation>,
}

#[derive(Debug, Clone)]
pub struct DepthCue {
    pub color: Color,
    pub alpha_max: f64,
    pub alpha_min: f64,
    pub dist_min: f64,
    pub dist_max: f64,
}

/// Identifies a primitive. Ids are dense per kind: `Sphere(i)` is
/// `scene.spheres[i]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Object {
    Sphere(usize),
    Triangle(usize),
}

impl Scene {
    pub fn new(camera: Camera, background: Color) -> Scene {
        Scene {
            background,
            camera,
            materials: Vec::new(),
            textures: Vec::new(),
            bumps: Vec::new(),
            spheres: Vec::new(),
            triangles: Vec::new(),
            lights: Vec::new(),
            depth_cue: None,
        }
    }

    /// Parses the keyword based scene format. `load` fetches the contents of
    /// texture and bump map files by name.
    pub fn parse<'a>(
        input: &'a str,
        load: &mut dyn FnMut(&str) -> io::Result<String>,
    ) -> Result<Scene, ParseSceneError<'a>> {
        parse::parse(input, load)
    }

    pub fn objects(&self) -> impl Iterator<Item = Object> {
        let spheres = (0..self.spheres.len()).map(Object::Sphere);
        let triangles = (0..self.triangles.len()).map(Object::Triangle);
        spheres.chain(triangles)
    }

    pub fn surface(&self, object: Object) -> &Surface {
        match object {
            Object::Sphere(i) => &self.spheres[i].surface,
            Object::Triangle(i) => &self.triangles[i].surface,
        }
    }

    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id.0 as usize]
    }

    pub fn texture(&self, id: TextureId) -> &Texture {
        &self.textures[id.0 as usize]
    }

    pub fn bump(&self, id: BumpId) -> &BumpMap {
        &self.bumps[id.0 as usize]
    }
}

impl Default for Material {
    fn default() -> Material {
        Material {
            diffuse: Color::WHITE,
            specular: Color::WHITE,
            ka: 0.0,
            kd: 1.0,
            ks: 0.0,
            n: 1.0,
            alpha: 1.0,
            eta: 1.0,
        }
    }
}

impl Surface {
    pub fn new(material: MaterialId) -> Surface {
        Surface { material, texture: None, bump: None }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Sphere(i) => write!(f, "sphere #{i}"),
            Object::Triangle(i) => write!(f, "triangle #{i}"),
        }
    }
}
