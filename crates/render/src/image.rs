use std::{iter::Enumerate, ops, slice::ChunksMut, sync::Mutex};

use scene::Color;

/// Pixel coordinate, `[x, y]`.
pub type Idx = [u32; 2];

/// Rendered image, row-major from the upper left.
#[derive(Debug, Clone)]
pub struct Image {
    dim: Idx,
    buf: Vec<Color>,
}

impl Image {
    pub fn new(dim @ [dx, dy]: Idx) -> Image {
        let buf = vec![Color::BLACK; dx as usize * dy as usize];
        Image { dim, buf }
    }
    pub fn by_row(&self) -> impl Iterator<Item = Idx> {
        let [dx, dy] = self.dim;
        (0..dy).flat_map(move |y| (0..dx).map(move |x| [x, y]))
    }
    pub fn pixels(&self) -> &[Color] {
        &self.buf
    }
    pub fn dim(&self) -> Idx {
        self.dim
    }
    pub fn width(&self) -> u32 {
        self.dim[0]
    }
    pub fn height(&self) -> u32 {
        self.dim[1]
    }
    /// Hands out each row exactly once, to whichever worker asks first.
    pub(crate) fn partition(&mut self) -> Rows<'_> {
        let width = (self.dim[0] as usize).max(1);
        Rows { rows: Mutex::new(self.buf.chunks_mut(width).enumerate()) }
    }
    fn linear(&self, [x, y]: Idx) -> Option<usize> {
        if !(x < self.dim[0] && y < self.dim[1]) {
            return None;
        }
        Some(x as usize + y as usize * self.dim[0] as usize)
    }
}

impl ops::Index<Idx> for Image {
    type Output = Color;

    fn index(&self, index: Idx) -> &Color {
        match self.linear(index) {
            Some(l) => &self.buf[l],
            None => panic!("pixel {index:?} out of bounds for image of {:?}", self.dim),
        }
    }
}

impl ops::IndexMut<Idx> for Image {
    fn index_mut(&mut self, index: Idx) -> &mut Color {
        match self.linear(index) {
            Some(l) => &mut self.buf[l],
            None => panic!("pixel {index:?} out of bounds for image of {:?}", self.dim),
        }
    }
}

pub(crate) struct Rows<'a> {
    rows: Mutex<Enumerate<ChunksMut<'a, Color>>>,
}

pub(crate) struct Row<'a> {
    pub(crate) y: u32,
    pub(crate) buf: &'a mut [Color],
}

impl<'a> Rows<'a> {
    pub(crate) fn next_row(&self) -> Option<Row<'a>> {
        // A worker that panicked mid-row leaves the queue itself intact.
        let mut rows = self.rows.lock().unwrap_or_else(|it| it.into_inner());
        let (y, buf) = rows.next()?;
        Some(Row { y: y as u32, buf })
    }
}
