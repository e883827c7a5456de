//! Reader for ASCII (`P3`) images, used for textures and bump maps.
use std::{error::Error, num::ParseIntError};

use geom::v64;

use crate::{BumpMap, Color, Grid, Texture};

/// Raw `P3` raster, channel values in `0..=max`.
pub struct Ppm {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) max: u32,
    pub(crate) pixels: Vec<[u32; 3]>,
}

/// {0}
#[derive(Debug, displaydoc::Display)]
pub struct ParsePpmError(ParsePpmErrorRepr);

#[derive(Debug, displaydoc::Display)]
enum ParsePpmErrorRepr {
    /// expected `P3` header
    InvalidMagic,
    /// unexpected end of file
    UnexpectedEof,
    /// invalid number: {0}
    ParseIntError(ParseIntError),
    /// image has no pixels
    Empty,
    /// maximum color value must be positive
    ZeroMax,
    /// color value {0} exceeds the maximum {1}
    ValueOutOfRange(u32, u32),
}

impl Error for ParsePpmError {}

impl From<ParsePpmErrorRepr> for ParsePpmError {
    fn from(repr: ParsePpmErrorRepr) -> ParsePpmError {
        ParsePpmError(repr)
    }
}

pub fn parse(input: &str) -> Result<Ppm, ParsePpmError> {
    let mut words = input.lines().flat_map(|line| {
        let line = match line.find('#') {
            Some(idx) => &line[..idx],
            None => line,
        };
        line.split_ascii_whitespace()
    });
    if words.next() != Some("P3") {
        Err(ParsePpmErrorRepr::InvalidMagic)?
    }
    let mut number = || -> Result<u32, ParsePpmError> {
        let word = words.next().ok_or(ParsePpmErrorRepr::UnexpectedEof)?;
        let value = word.parse::<u32>().map_err(ParsePpmErrorRepr::ParseIntError)?;
        Ok(value)
    };
    let width = number()?;
    let height = number()?;
    let max = number()?;
    if width == 0 || height == 0 {
        Err(ParsePpmErrorRepr::Empty)?
    }
    if max == 0 {
        Err(ParsePpmErrorRepr::ZeroMax)?
    }
    let n_pixels = width as usize * height as usize;
    let mut pixels = Vec::new();
    for _ in 0..n_pixels {
        let [r, g, b] = [number()?, number()?, number()?];
        for c in [r, g, b] {
            if c > max {
                Err(ParsePpmErrorRepr::ValueOutOfRange(c, max))?
            }
        }
        pixels.push([r, g, b]);
    }
    Ok(Ppm { width, height, max, pixels })
}

impl Ppm {
    pub fn to_texture(&self) -> Texture {
        let max = self.max as f64;
        let cells = self.pixels.iter().map(|&[r, g, b]| {
            Color::new(r as f64 / max, g as f64 / max, b as f64 / max)
        });
        Grid::new(self.width, self.height, cells.collect())
    }

    /// Maps each channel from `0..=max` to `[-1, 1]`.
    pub fn to_bump_map(&self) -> BumpMap {
        let max = self.max as f64;
        let f = |c: u32| c as f64 / max * 2.0 - 1.0;
        let cells = self.pixels.iter().map(|&[r, g, b]| v64(f(r), f(g), f(b)));
        Grid::new(self.width, self.height, cells.collect())
    }
}
