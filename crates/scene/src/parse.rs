use std::{
    error::Error,
    fmt, io,
    num::{ParseFloatError, ParseIntError},
    str::SplitAsciiWhitespace,
};

use geom::{uv, v64, Uv};

use crate::{
    ppm::{self, ParsePpmError},
    Attenuation, BumpId, Camera, Color, DepthCue, Emitter, Light, Material, MaterialId, Scene,
    SceneError, Sphere, Surface, TextureId, Triangle,
};

#[derive(Debug)]
pub struct ParseSceneError<'a> {
    kind: ErrorKind,
    /// Line number and keyword of the offending statement.
    context: Option<(usize, &'a str)>,
}

#[derive(Debug, displaydoc::Display)]
enum ErrorKind {
    /// unexpected end of line
    UnexpectedEol,
    /// unexpected `{0}`
    Trailing(String),
    /// invalid scalar: {0}
    ParseFloatError(ParseFloatError),
    /// invalid integer: {0}
    ParseIntError(ParseIntError),
    /// invalid key
    InvalidKey,
    /// light type must be 1 (point) or 0 (directional), got {0}
    InvalidLightType(f64),
    /// no `mtlcolor` before this object
    NoMaterial,
    /// invalid face, expected `v`, `v//vn`, `v/vt` or `v/vt/vn` for every corner
    InvalidFace,
    /// invalid face index: {0}
    InvalidFaceIndex(ParseIntError),
    /// {0} index {1} out of bounds, {2} declared so far
    FaceIndexOutOfBounds(&'static str, u32, usize),
    /// cannot read `{0}`: {1}
    Load(String, io::Error),
    /// invalid image `{0}`: {1}
    Image(String, ParsePpmError),
    /// missing `{0}`
    Missing(&'static str),
    /// {0}
    Invalid(SceneError),
}

pub(crate) fn parse<'i>(
    input: &'i str,
    load: &mut dyn FnMut(&str) -> io::Result<String>,
) -> Result<Scene, ParseSceneError<'i>> {
    let mut res = Builder::default();
    for (line_idx, line) in input.lines().enumerate() {
        let mut words = line.split_ascii_whitespace();
        let keyword = match words.next() {
            None => continue,
            Some(it) if it.starts_with('#') => continue,
            Some(it) => it,
        };
        let mut p = Parser { words, load: &mut *load };
        statement(&mut p, &mut res, keyword)
            .and_then(|()| p.finish())
            .map_err(|kind| ParseSceneError { kind, context: Some((line_idx + 1, keyword)) })?;
    }
    let scene = res.finish().map_err(|kind| ParseSceneError { kind, context: None })?;
    scene.validate().map_err(|err| ParseSceneError { kind: ErrorKind::Invalid(err), context: None })?;
    Ok(scene)
}

impl<'a> fmt::Display for ParseSceneError<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some((line, keyword)) = self.context {
            write!(f, "line {line}, in `{keyword}`: ")?;
        }
        write!(f, "{}", self.kind)
    }
}

impl<'a> Error for ParseSceneError<'a> {}

struct Parser<'i, 'l> {
    words: SplitAsciiWhitespace<'i>,
    load: &'l mut dyn FnMut(&str) -> io::Result<String>,
}

impl<'i, 'l> Parser<'i, 'l> {
    fn next(&mut self) -> Result<&'i str, ErrorKind> {
        let res = self.words.next().ok_or(ErrorKind::UnexpectedEol)?;
        Ok(res)
    }
    fn at_end(&mut self) -> bool {
        self.words.clone().next().is_none()
    }
    fn finish(&mut self) -> Result<(), ErrorKind> {
        match self.words.next() {
            None => Ok(()),
            Some(word) => Err(ErrorKind::Trailing(word.to_string())),
        }
    }
    fn image(&mut self) -> Result<(String, ppm::Ppm), ErrorKind> {
        let name = self.next()?.to_string();
        let data = (self.load)(&name).map_err(|err| ErrorKind::Load(name.clone(), err))?;
        let image = ppm::parse(&data).map_err(|err| ErrorKind::Image(name.clone(), err))?;
        Ok((name, image))
    }
}

/// Scene under construction, plus the "current" state the format threads
/// through consecutive statements.
#[derive(Default)]
struct Builder {
    eye: Option<v64>,
    view_dir: Option<v64>,
    up: Option<v64>,
    vfov: Option<f64>,
    size: Option<(u32, u32)>,
    background: Option<Color>,
    materials: Vec<Material>,
    textures: Vec<crate::Texture>,
    bumps: Vec<crate::BumpMap>,
    spheres: Vec<Sphere>,
    triangles: Vec<Triangle>,
    lights: Vec<Light>,
    depth_cue: Option<DepthCue>,

    vertices: Vec<v64>,
    normals: Vec<v64>,
    texcoords: Vec<Uv>,

    material: Option<MaterialId>,
    texture: Option<TextureId>,
    bump: Option<BumpId>,
}

impl Builder {
    fn finish(self) -> Result<Scene, ErrorKind> {
        let camera = Camera {
            eye: self.eye.ok_or(ErrorKind::Missing("eye"))?,
            view_dir: self.view_dir.ok_or(ErrorKind::Missing("viewdir"))?,
            up: self.up.ok_or(ErrorKind::Missing("updir"))?,
            vfov: self.vfov.ok_or(ErrorKind::Missing("vfov"))?,
            width: self.size.ok_or(ErrorKind::Missing("imsize"))?.0,
            height: self.size.ok_or(ErrorKind::Missing("imsize"))?.1,
        };
        let background = self.background.ok_or(ErrorKind::Missing("bkgcolor"))?;
        log::debug!(
            "parsed {} spheres, {} triangles ({} vertices), {} lights, {} textures, {} bump maps",
            self.spheres.len(),
            self.triangles.len(),
            self.vertices.len(),
            self.lights.len(),
            self.textures.len(),
            self.bumps.len(),
        );
        Ok(Scene {
            background,
            camera,
            materials: self.materials,
            textures: self.textures,
            bumps: self.bumps,
            spheres: self.spheres,
            triangles: self.triangles,
            lights: self.lights,
            depth_cue: self.depth_cue,
        })
    }

    fn surface(&self) -> Result<Surface, ErrorKind> {
        let material = self.material.ok_or(ErrorKind::NoMaterial)?;
        Ok(Surface { material, texture: self.texture, bump: self.bump })
    }
}

fn statement(p: &mut Parser<'_, '_>, res: &mut Builder, keyword: &str) -> Result<(), ErrorKind> {
    match keyword {
        "eye" => res.eye = Some(vector(p)?),
        "viewdir" => res.view_dir = Some(vector(p)?),
        "updir" => res.up = Some(vector(p)?),
        "vfov" => res.vfov = Some(scalar(p)?),
        "imsize" => res.size = Some((integer(p)?, integer(p)?)),
        "bkgcolor" => res.background = Some(color(p)?),
        "light" => res.lights.push(light(p, false)?),
        "attlight" => res.lights.push(light(p, true)?),
        "depthcueing" => res.depth_cue = Some(depth_cue(p)?),
        "mtlcolor" => {
            res.material = Some(MaterialId(res.materials.len() as u32));
            res.materials.push(material(p)?);
        }
        "texture" => {
            let (name, image) = p.image()?;
            log::debug!("texture #{} from `{name}`, {}x{}", res.textures.len(), image.width, image.height);
            res.texture = Some(TextureId(res.textures.len() as u32));
            res.textures.push(image.to_texture());
        }
        "bump" => {
            let (name, image) = p.image()?;
            log::debug!("bump map #{} from `{name}`, {}x{}", res.bumps.len(), image.width, image.height);
            res.bump = Some(BumpId(res.bumps.len() as u32));
            res.bumps.push(image.to_bump_map());
        }
        "sphere" => {
            let center = vector(p)?;
            let radius = scalar(p)?;
            let surface = res.surface()?;
            res.spheres.push(Sphere { center, radius, surface });
        }
        "v" => res.vertices.push(vector(p)?),
        "vn" => {
            let n = vector(p)?;
            res.normals.push(n.checked_unit().unwrap_or(n));
        }
        "vt" => res.texcoords.push(uv(scalar(p)?, scalar(p)?)),
        "f" => {
            let triangle = face(p, res)?;
            res.triangles.push(triangle);
        }
        _ => Err(ErrorKind::InvalidKey)?,
    }
    Ok(())
}

fn light(p: &mut Parser<'_, '_>, attenuated: bool) -> Result<Light, ErrorKind> {
    let pos = vector(p)?;
    let w = scalar(p)?;
    let emitter = if (w - 1.0).abs() < 1e-6 {
        Emitter::Point(pos)
    } else if w.abs() < 1e-6 {
        Emitter::Directional(pos)
    } else {
        Err(ErrorKind::InvalidLightType(w))?
    };
    let color = color(p)?;
    let attenuation =
        if attenuated { Some(Attenuation { c1: scalar(p)?, c2: scalar(p)?, c3: scalar(p)? }) } else { None };
    Ok(Light { emitter, color, attenuation })
}

fn depth_cue(p: &mut Parser<'_, '_>) -> Result<DepthCue, ErrorKind> {
    let color = color(p)?;
    let [alpha_max, alpha_min, dist_max, dist_min] = [scalar(p)?, scalar(p)?, scalar(p)?, scalar(p)?];
    Ok(DepthCue { color, alpha_max, alpha_min, dist_min, dist_max })
}

fn material(p: &mut Parser<'_, '_>) -> Result<Material, ErrorKind> {
    let diffuse = color(p)?;
    let specular = color(p)?;
    let [ka, kd, ks, n] = [scalar(p)?, scalar(p)?, scalar(p)?, scalar(p)?];
    let mut res = Material { diffuse, specular, ka, kd, ks, n, ..Material::default() };
    if !p.at_end() {
        res.alpha = scalar(p)?;
        res.eta = scalar(p)?;
    }
    Ok(res)
}

/// One face corner: vertex, texture coordinate and normal, 1-based.
type Corner = (u32, Option<u32>, Option<u32>);

fn face(p: &mut Parser<'_, '_>, res: &Builder) -> Result<Triangle, ErrorKind> {
    let corners = [corner(p)?, corner(p)?, corner(p)?];
    let [(_, t0, n0), ..] = corners;
    if corners.iter().any(|&(_, t, n)| t.is_some() != t0.is_some() || n.is_some() != n0.is_some()) {
        Err(ErrorKind::InvalidFace)?
    }

    let [a, b, c] = corners.map(|(v, _, _)| lookup(&res.vertices, "vertex", v));
    let v = [a?, b?, c?];
    let n = match n0 {
        None => None,
        Some(_) => {
            let [a, b, c] = corners.map(|(_, _, n)| lookup(&res.normals, "normal", n.unwrap_or(0)));
            Some([a?, b?, c?])
        }
    };
    let uv = match t0 {
        None => None,
        Some(_) => {
            let [a, b, c] =
                corners.map(|(_, t, _)| lookup(&res.texcoords, "texture coordinate", t.unwrap_or(0)));
            Some([a?, b?, c?])
        }
    };
    let mut surface = res.surface()?;
    if uv.is_none() {
        surface.texture = None;
    }
    Ok(Triangle { v, n, uv, surface })
}

fn corner(p: &mut Parser<'_, '_>) -> Result<Corner, ErrorKind> {
    let word = p.next()?;
    let parts: Vec<&str> = word.split('/').collect();
    let res = match parts.as_slice() {
        [v] => (index(v)?, None, None),
        [v, t] => (index(v)?, Some(index(t)?), None),
        [v, "", n] => (index(v)?, None, Some(index(n)?)),
        [v, t, n] => (index(v)?, Some(index(t)?), Some(index(n)?)),
        _ => Err(ErrorKind::InvalidFace)?,
    };
    Ok(res)
}

fn index(s: &str) -> Result<u32, ErrorKind> {
    s.parse::<u32>().map_err(ErrorKind::InvalidFaceIndex)
}

fn lookup<T: Copy>(table: &[T], what: &'static str, idx: u32) -> Result<T, ErrorKind> {
    let res = table.get(idx.wrapping_sub(1) as usize).copied();
    res.ok_or(ErrorKind::FaceIndexOutOfBounds(what, idx, table.len()))
}

fn color(p: &mut Parser<'_, '_>) -> Result<Color, ErrorKind> {
    let [r, g, b] = [scalar(p)?, scalar(p)?, scalar(p)?];
    Ok(Color::new(r, g, b))
}

fn vector(p: &mut Parser<'_, '_>) -> Result<v64, ErrorKind> {
    let [x, y, z] = [scalar(p)?, scalar(p)?, scalar(p)?];
    Ok(v64(x, y, z))
}

fn scalar(p: &mut Parser<'_, '_>) -> Result<f64, ErrorKind> {
    let t = p.next()?;
    let f = t.parse::<f64>().map_err(ErrorKind::ParseFloatError)?;
    Ok(f)
}

fn integer(p: &mut Parser<'_, '_>) -> Result<u32, ErrorKind> {
    let t = p.next()?;
    let i = t.parse::<u32>().map_err(ErrorKind::ParseIntError)?;
    Ok(i)
}
