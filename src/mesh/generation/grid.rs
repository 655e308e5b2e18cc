//! Elevation grid reconstruction from unordered points
//!
//! Points of a point layer are assumed to sit on a regular lattice. Rows
//! are recovered by bucketing on northing (scene z), then rows and columns
//! are put in order with insertion sorts; grids hold one tile's worth of
//! samples. A grid whose rows differ in length cannot be described by the
//! binary header and is refused before any byte is written.

use crate::error::SceneError;
use crate::mesh::geometry::{write_grid_binary, BoundingBox, GridHeader, Vec3};
use std::io::Write;

/// One grid sample in serialization order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    pub row_index: usize,
    /// 0 is the westmost column
    pub col_index: usize,
    pub elevation: f64,
}

/// Rows of points, north row first, each sorted east to west
#[derive(Debug, Default)]
pub struct PointGrid {
    rows: Vec<Vec<Vec3>>,
}

impl PointGrid {
    /// Bucket and sort scene-space points (y is elevation, z is northing)
    pub fn from_points(points: &[Vec3], tolerance: f64) -> Self {
        let mut rows = bucket_rows(points, tolerance);
        sort_grid(&mut rows);
        Self { rows }
    }

    /// Columns, taken from the first row
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<Vec3>] {
        &self.rows
    }

    /// Samples row by row, each row in reverse of its sorted column order
    pub fn cells(&self) -> Vec<GridCell> {
        let mut cells = Vec::new();
        for (row_index, row) in self.rows.iter().enumerate() {
            for (col_index, v) in row.iter().rev().enumerate() {
                cells.push(GridCell {
                    row_index,
                    col_index,
                    elevation: v.y,
                });
            }
        }
        cells
    }

    pub fn header(&self, bbox: &BoundingBox) -> GridHeader {
        let (width, height) = (self.width(), self.height());
        GridHeader {
            width: width as i32,
            height: height as i32,
            x_resolution: resolution(bbox.width(), width),
            z_resolution: resolution(bbox.height(), height),
        }
    }

    /// Fails when some row does not hold `width` samples
    pub fn check_rectangular(&self) -> Result<(), SceneError> {
        let width = self.width();
        match self.rows.iter().position(|row| row.len() != width) {
            Some(index) => Err(SceneError::invalid_geometry(format!(
                "point grid row {} has {} samples, expected {}",
                index,
                self.rows[index].len(),
                width
            ))),
            None => Ok(()),
        }
    }

    pub fn write_to<W: Write>(&self, writer: &mut W, bbox: &BoundingBox) -> Result<(), SceneError> {
        self.check_rectangular()?;
        let mut rows: Vec<Vec<f32>> = vec![Vec::new(); self.height()];
        for cell in self.cells() {
            rows[cell.row_index].push(cell.elevation as f32);
        }
        write_grid_binary(writer, &self.header(bbox), &rows)?;
        Ok(())
    }

    pub fn to_bytes(&self, bbox: &BoundingBox) -> Result<Vec<u8>, SceneError> {
        let mut buffer = Vec::with_capacity(16 + self.width() * self.height() * 4);
        self.write_to(&mut buffer, bbox)?;
        Ok(buffer)
    }
}

fn resolution(extent: f64, samples: usize) -> f32 {
    if samples == 0 {
        0.0
    } else {
        (extent / samples as f64) as f32
    }
}

/// Group points into rows: a point joins the first row whose first member's
/// northing is within `tolerance`, otherwise it starts a new row
pub fn bucket_rows(points: &[Vec3], tolerance: f64) -> Vec<Vec<Vec3>> {
    let mut rows: Vec<Vec<Vec3>> = Vec::new();
    for &p in points {
        match rows.iter_mut().find(|row| (row[0].z - p.z).abs() < tolerance) {
            Some(row) => row.push(p),
            None => rows.push(vec![p]),
        }
    }
    rows
}

/// Sort each row by descending x, then rows by descending first northing
pub fn sort_grid(rows: &mut [Vec<Vec3>]) {
    for row in rows.iter_mut() {
        insertion_sort_by(row, |a, b| a.x > b.x);
    }
    insertion_sort_by(rows, |a, b| a[0].z > b[0].z);
}

/// Stable insertion sort; `before(a, b)` is true when `a` must precede `b`
fn insertion_sort_by<T, F>(items: &mut [T], before: F)
where
    F: Fn(&T, &T) -> bool,
{
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && before(&items[j], &items[j - 1]) {
            items.swap(j, j - 1);
            j -= 1;
        }
    }
}
