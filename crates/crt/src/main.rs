mod threads;

use std::{
    fs,
    io::{self, BufWriter, Write},
    num::NonZeroUsize,
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::Context;
use render::{Image, Settings};
use scene::Scene;
use threads::Threads;

/// Renders a scene description into an image in ppm format.
#[derive(argh::FromArgs)]
struct Args {
    /// scene description file
    #[argh(positional)]
    scene: PathBuf,

    /// output file, defaults to the scene path with a `ppm` extension
    #[argh(option, short = 'o')]
    output: Option<PathBuf>,

    /// amount of parallelism, defaults to the number of cores
    #[argh(option, short = 'j')]
    jobs: Option<NonZeroUsize>,

    /// maximum number of reflection and refraction bounces
    #[argh(option, default = "render::MAX_DEPTH")]
    max_depth: u32,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args: Args = argh::from_env();

    let input = fs::read_to_string(&args.scene)
        .with_context(|| format!("reading {}", args.scene.display()))?;
    // Texture names are relative to the scene file.
    let dir = args.scene.parent().map(Path::to_path_buf).unwrap_or_default();
    let mut load = |name: &str| {
        let path = dir.join(name);
        log::debug!("loading {}", path.display());
        fs::read_to_string(path)
    };
    let scene = Scene::parse(&input, &mut load)
        .map_err(|err| anyhow::format_err!("{}: {err}", args.scene.display()))?;

    let threads = match args.jobs {
        Some(it) => Threads::new(it),
        None => Threads::with_max_threads()?,
    };
    let settings = Settings { max_depth: args.max_depth };

    let start = Instant::now();
    let image = render::render(&scene, &settings, &|f| threads.in_parallel(f))?;
    log::info!("rendered in {:.2?} on {} threads", start.elapsed(), threads.len());

    let output = args.output.unwrap_or_else(|| args.scene.with_extension("ppm"));
    let file =
        fs::File::create(&output).with_context(|| format!("creating {}", output.display()))?;
    let mut w = BufWriter::new(file);
    write_ppm(&image, &mut w)
        .and_then(|()| w.flush())
        .with_context(|| format!("writing {}", output.display()))?;
    log::info!("wrote {}", output.display());
    Ok(())
}

/// Plain `P3`, four pixels per line.
fn write_ppm(image: &Image, w: &mut dyn io::Write) -> io::Result<()> {
    const PIXELS_PER_LINE: usize = 4;

    write!(w, "P3\n{} {}\n255\n", image.width(), image.height())?;
    let n_pixels = image.pixels().len();
    for (i, idx) in image.by_row().enumerate() {
        let [r, g, b] = image[idx].rgb().map(to_byte);
        let end_of_line = (i + 1) % PIXELS_PER_LINE == 0 || i + 1 == n_pixels;
        let sep = if end_of_line { "\n" } else { " " };
        write!(w, "{r} {g} {b}{sep}")?;
    }
    Ok(())
}

fn to_byte(value: f64) -> u8 {
    (value * 255.0).clamp(0.0, 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use render::Image;
    use scene::Color;

    use super::write_ppm;

    #[test]
    fn ppm_output() {
        let mut image = Image::new([3, 2]);
        image[[0, 0]] = Color::new(1.0, 0.5, 0.0);
        image[[2, 1]] = Color::new(2.0, -1.0, 0.2);

        let mut buf = Vec::new();
        write_ppm(&image, &mut buf).unwrap();
        let expected = "\
P3
3 2
255
255 128 0 0 0 0 0 0 0 0 0 0
0 0 0 255 0 51
";
        assert_eq!(String::from_utf8(buf).unwrap(), expected);
    }
}
