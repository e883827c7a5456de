mod camera;
mod image;
mod intersect;
mod primitive;
mod shade;
pub mod texture;
mod trace;

use scene::{Scene, SceneError};

pub use crate::{
    camera::ViewWindow,
    image::{Idx, Image},
    intersect::{intersect, Hit},
    primitive::barycentric,
    shade::shade,
    trace::{refract, schlick, Tracer},
};

/// Default cap on the number of reflection and refraction bounces.
pub const MAX_DEPTH: u32 = 5;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Bounces deeper than this contribute nothing.
    pub max_depth: u32,
}

impl Default for Settings {
    fn default() -> Settings {
        Settings { max_depth: MAX_DEPTH }
    }
}

/// {0}
#[derive(Debug, displaydoc::Display)]
pub struct Error(ErrorRepr);

#[derive(Debug, displaydoc::Display)]
enum ErrorRepr {
    /// invalid scene: {0}
    InvalidScene(SceneError),
}

impl std::error::Error for Error {}

impl From<ErrorRepr> for Error {
    fn from(repr: ErrorRepr) -> Error {
        Error(repr)
    }
}

/// Runs the given closure on every worker thread and waits for all of them.
pub type ThreadPool<'t> = dyn Fn(&(dyn Fn() + Sync)) + 't;

/// Renders `scene` into a `camera.width x camera.height` image.
///
/// Rows are claimed by whichever worker of `in_parallel` is free, the
/// result does not depend on the number of workers. `&|f| f()` renders on
/// the current thread.
pub fn render(
    scene: &Scene,
    settings: &Settings,
    in_parallel: &ThreadPool<'_>,
) -> Result<Image, Error> {
    scene.validate().map_err(ErrorRepr::InvalidScene)?;

    let cam = &scene.camera;
    log::info!(
        "rendering {}x{}: {} spheres, {} triangles, {} lights, max depth {}",
        cam.width,
        cam.height,
        scene.spheres.len(),
        scene.triangles.len(),
        scene.lights.len(),
        settings.max_depth,
    );

    let tracer = Tracer::new(scene, settings);
    let mut image = Image::new([cam.width, cam.height]);
    {
        let rows = image.partition();
        in_parallel(&|| {
            while let Some(row) = rows.next_row() {
                for (x, color) in row.buf.iter_mut().enumerate() {
                    *color = tracer.trace_pixel(x as u32, row.y);
                }
            }
        });
    }
    Ok(image)
}
