//! Per-pixel opacity masks
//!
//! A mask records which pixels of a sprite frame are opaque. Two entities
//! collide only when their boxes intersect AND at least one opaque pixel
//! lines up in both masks.

use glam::IVec2;

use crate::consts::ALPHA_THRESHOLD;

/// Mask construction failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MaskError {
    #[error("mask must be at least 1x1, got {width}x{height}")]
    Empty { width: u32, height: u32 },
    #[error("alpha buffer holds {actual} pixels, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
    #[error("row {row} is {actual} pixels wide, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// Bitmap of opaque pixels, one row of `u64` words per scanline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    words_per_row: usize,
    bits: Vec<u64>,
}

impl Mask {
    fn blank(width: u32, height: u32) -> Result<Self, MaskError> {
        if width == 0 || height == 0 {
            return Err(MaskError::Empty { width, height });
        }
        let words_per_row = (width as usize).div_ceil(64);
        Ok(Self {
            width,
            height,
            words_per_row,
            bits: vec![0; words_per_row * height as usize],
        })
    }

    /// Fully opaque rectangle (terrain tiles)
    pub fn filled(width: u32, height: u32) -> Result<Self, MaskError> {
        let mut mask = Self::blank(width, height)?;
        for y in 0..height {
            for x in 0..width {
                mask.set(x, y);
            }
        }
        Ok(mask)
    }

    /// Build from a row-major alpha channel; pixels with alpha above
    /// `threshold` are opaque
    pub fn from_alpha(width: u32, height: u32, alpha: &[u8], threshold: u8) -> Result<Self, MaskError> {
        let mut mask = Self::blank(width, height)?;
        let expected = width as usize * height as usize;
        if alpha.len() != expected {
            return Err(MaskError::BufferSize {
                expected,
                actual: alpha.len(),
            });
        }
        for (i, &a) in alpha.iter().enumerate() {
            if a > threshold {
                mask.set(i as u32 % width, i as u32 / width);
            }
        }
        Ok(mask)
    }

    /// Build from an alpha channel with the standard threshold
    pub fn from_alpha_default(width: u32, height: u32, alpha: &[u8]) -> Result<Self, MaskError> {
        Self::from_alpha(width, height, alpha, ALPHA_THRESHOLD)
    }

    /// Build from text rows where `#` marks an opaque pixel
    pub fn from_ascii(rows: &[&str]) -> Result<Self, MaskError> {
        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        let mut mask = Self::blank(width as u32, rows.len() as u32)?;
        for (y, row) in rows.iter().enumerate() {
            let row_width = row.chars().count();
            if row_width != width {
                return Err(MaskError::RaggedRow {
                    row: y,
                    expected: width,
                    actual: row_width,
                });
            }
            for (x, c) in row.chars().enumerate() {
                if c == '#' {
                    mask.set(x as u32, y as u32);
                }
            }
        }
        Ok(mask)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> (usize, u64) {
        let word = y as usize * self.words_per_row + (x / 64) as usize;
        (word, 1u64 << (x % 64))
    }

    fn set(&mut self, x: u32, y: u32) {
        let (word, bit) = self.index(x, y);
        self.bits[word] |= bit;
    }

    /// Whether the pixel at (x, y) is opaque; out of range reads as clear
    pub fn get(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return false;
        }
        let (word, bit) = self.index(x as u32, y as u32);
        self.bits[word] & bit != 0
    }

    /// Number of opaque pixels
    pub fn count(&self) -> u32 {
        self.bits.iter().map(|w| w.count_ones()).sum()
    }

    /// Mirror image for the opposite facing
    pub fn flipped_horizontal(&self) -> Self {
        let mut out = self.clone();
        out.bits.iter_mut().for_each(|w| *w = 0);
        for y in 0..self.height {
            for x in 0..self.width {
                if self.get(x as i32, y as i32) {
                    out.set(self.width - 1 - x, y);
                }
            }
        }
        out
    }

    /// First opaque pixel shared with `other` when `other`'s top-left sits at
    /// `offset` in this mask's coordinates. Scans row-major; the returned
    /// point is in this mask's coordinates.
    pub fn overlap(&self, other: &Mask, offset: IVec2) -> Option<IVec2> {
        let x0 = offset.x.max(0);
        let y0 = offset.y.max(0);
        let x1 = (offset.x + other.width as i32).min(self.width as i32);
        let y1 = (offset.y + other.height as i32).min(self.height as i32);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        for y in y0..y1 {
            for x in x0..x1 {
                if self.get(x, y) && other.get(x - offset.x, y - offset.y) {
                    return Some(IVec2::new(x, y));
                }
            }
        }
        None
    }
}
