use std::error::Error;

use geom::{cross, v64};

use crate::{Object, Scene};

/// A scene which can not be rendered.
#[derive(Debug, displaydoc::Display)]
pub enum SceneError {
    /// {object} uses material #{index}, but there are only {count} materials
    MissingMaterial { object: Object, index: u32, count: usize },
    /// {object} uses texture #{index}, but there are only {count} textures
    MissingTexture { object: Object, index: u32, count: usize },
    /// {object} uses bump map #{index}, but there are only {count} bump maps
    MissingBumpMap { object: Object, index: u32, count: usize },
    /// {object} has invalid radius {radius}
    InvalidRadius { object: Object, radius: f64 },
    /// {object} has a non-finite vertex
    InvalidVertex { object: Object },
    /// image size {width}x{height} is empty
    InvalidImageSize { width: u32, height: u32 },
    /// vertical field of view must be within (0, 180) degrees, got {0}
    InvalidFov(f64),
    /// view direction {view_dir} and up direction {up} do not define a camera orientation
    DegenerateCamera { view_dir: v64, up: v64 },
    /// {kind} #{index} has no pixels
    EmptyImage { kind: &'static str, index: usize },
}

impl Error for SceneError {}

impl Scene {
    /// Checks that every reference resolves and that the camera is usable.
    ///
    /// Numerical degeneracies in the geometry (zero-area triangles and such)
    /// are not errors: such primitives are simply never hit.
    pub fn validate(&self) -> Result<(), SceneError> {
        let cam = &self.camera;
        if cam.width == 0 || cam.height == 0 {
            return Err(SceneError::InvalidImageSize { width: cam.width, height: cam.height });
        }
        if !(0.0 < cam.vfov && cam.vfov < 180.0) {
            return Err(SceneError::InvalidFov(cam.vfov));
        }
        if cross(cam.view_dir, cam.up).checked_unit().is_none() || !cam.eye.is_finite() {
            return Err(SceneError::DegenerateCamera { view_dir: cam.view_dir, up: cam.up });
        }

        for (index, t) in self.textures.iter().enumerate() {
            if t.is_empty() {
                return Err(SceneError::EmptyImage { kind: "texture", index });
            }
        }
        for (index, b) in self.bumps.iter().enumerate() {
            if b.is_empty() {
                return Err(SceneError::EmptyImage { kind: "bump map", index });
            }
        }

        for object in self.objects() {
            let surface = self.surface(object);
            let index = surface.material.0;
            if index as usize >= self.materials.len() {
                let count = self.materials.len();
                return Err(SceneError::MissingMaterial { object, index, count });
            }
            if let Some(id) = surface.texture {
                if id.0 as usize >= self.textures.len() {
                    let count = self.textures.len();
                    return Err(SceneError::MissingTexture { object, index: id.0, count });
                }
            }
            if let Some(id) = surface.bump {
                if id.0 as usize >= self.bumps.len() {
                    let count = self.bumps.len();
                    return Err(SceneError::MissingBumpMap { object, index: id.0, count });
                }
            }
            match object {
                Object::Sphere(i) => {
                    let radius = self.spheres[i].radius;
                    if !(radius > 0.0 && radius.is_finite()) {
                        return Err(SceneError::InvalidRadius { object, radius });
                    }
                }
                Object::Triangle(i) => {
                    if !self.triangles[i].v.iter().all(|it| it.is_finite()) {
                        return Err(SceneError::InvalidVertex { object });
                    }
                }
            }
        }
        log::debug!(
            "scene ok: {} spheres, {} triangles, {} lights, {} materials",
            self.spheres.len(),
            self.triangles.len(),
            self.lights.len(),
            self.materials.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use geom::v64;

    use crate::{Camera, Color, Material, MaterialId, Scene, SceneError, Sphere, Surface, TextureId};

    fn scene() -> Scene {
        let camera = Camera {
            eye: v64(0.0, 0.0, 5.0),
            view_dir: v64(0.0, 0.0, -1.0),
            up: v64(0.0, 1.0, 0.0),
            vfov: 60.0,
            width: 4,
            height: 3,
        };
        let mut scene = Scene::new(camera, Color::BLACK);
        scene.materials.push(Material::default());
        scene.spheres.push(Sphere {
            center: v64::ZERO,
            radius: 1.0,
            surface: Surface::new(MaterialId(0)),
        });
        scene
    }

    #[test]
    fn valid_scene() {
        scene().validate().unwrap();
    }

    #[test]
    fn missing_material_names_the_object() {
        let mut scene = scene();
        scene.spheres[0].surface.material = MaterialId(3);
        let err = scene.validate().unwrap_err();
        assert!(matches!(err, SceneError::MissingMaterial { index: 3, count: 1, .. }));
        assert_eq!(err.to_string(), "sphere #0 uses material #3, but there are only 1 materials");
    }

    #[test]
    fn missing_texture() {
        let mut scene = scene();
        scene.spheres[0].surface.texture = Some(TextureId(0));
        assert!(matches!(scene.validate(), Err(SceneError::MissingTexture { .. })));
    }

    #[test]
    fn degenerate_camera() {
        let mut scene = scene();
        scene.camera.up = v64(0.0, 0.0, 2.0);
        assert!(matches!(scene.validate(), Err(SceneError::DegenerateCamera { .. })));

        let mut scene = self::scene();
        scene.camera.height = 0;
        assert!(matches!(scene.validate(), Err(SceneError::InvalidImageSize { .. })));
    }

    #[test]
    fn zero_radius() {
        let mut scene = scene();
        scene.spheres[0].radius = 0.0;
        assert!(matches!(scene.validate(), Err(SceneError::InvalidRadius { .. })));
    }
}
