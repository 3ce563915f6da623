//! Georeferencing a grid coverage the way raster tools expect it.
//!
//! The affine transform uses GDAL's ordering: a pixel at `(col, row)` maps to
//!
//! ```text
//! x = gt[0] + col * gt[1] + row * gt[2]
//! y = gt[3] + col * gt[4] + row * gt[5]
//! ```
//!
//! For rectified grids `gt[0]`/`gt[3]` is the grid origin and the first two
//! offset vectors are the column and row steps, used as declared.

use tracing::{debug, warn};

use crate::error::{GmlError, Result};
use crate::model::{BoundingBox, GmlCoverage, GridDomain, Position, RangeField};

pub type GeoTransform = [f64; 6];

#[derive(Debug, Clone, PartialEq)]
pub struct RasterMetadata {
    pub width: usize,
    pub height: usize,
    pub bbox: BoundingBox,
    pub crs: Option<String>,
    pub geo_transform: GeoTransform,
    /// Lengths of the column and row steps.
    pub resolution: (f64, f64),
    /// Angle of the column step from the x axis, in degrees.
    pub rotation: f64,
    pub bands: Vec<RangeField>,
}

impl RasterMetadata {
    /// Fails with [`GmlError::UnsupportedCoverage`] for multi-point
    /// coverages, which have no grid.
    pub fn from_coverage(coverage: &GmlCoverage) -> Result<RasterMetadata> {
        let grid = coverage.grid().ok_or_else(|| {
            GmlError::UnsupportedCoverage(format!("{} has no grid", coverage.kind.tag()))
        })?;

        let width = grid_size(grid.width(), "width")?;
        let height = grid_size(grid.height(), "height")?;

        let crs = grid.srs_name.clone().or_else(|| {
            coverage
                .bounded_by
                .as_ref()
                .and_then(|envelope| envelope.srs_name.clone())
        });

        let (geo_transform, bbox) = match (&grid.origin, rectified_steps(grid)) {
            (Some(origin), Some((column, row))) if origin.len() >= 2 => {
                let geo_transform = [origin[0], column[0], row[0], origin[1], column[1], row[1]];
                let bbox = match &coverage.bounded_by {
                    Some(envelope) => envelope.bbox,
                    None => grid_extent(&geo_transform, width, height),
                };
                (geo_transform, bbox)
            }
            _ => {
                let envelope = coverage.bounded_by.as_ref().ok_or_else(|| {
                    GmlError::MissingElement(format!(
                        "boundedBy of {} without origin and offset vectors",
                        coverage.kind.tag()
                    ))
                })?;
                let bbox = envelope.bbox;
                let geo_transform = [
                    bbox.min_x,
                    (bbox.max_x - bbox.min_x) / width as f64,
                    0.0,
                    bbox.max_y,
                    0.0,
                    -(bbox.max_y - bbox.min_y) / height as f64,
                ];
                (geo_transform, bbox)
            }
        };

        let resolution = (
            geo_transform[1].hypot(geo_transform[4]),
            geo_transform[2].hypot(geo_transform[5]),
        );
        let rotation = geo_transform[4].atan2(geo_transform[1]).to_degrees();
        if rotation != 0.0 {
            debug!("Grid is rotated by {} degrees", rotation);
        }

        Ok(RasterMetadata {
            width,
            height,
            bbox,
            crs,
            geo_transform,
            resolution,
            rotation,
            bands: coverage.range_type.clone(),
        })
    }

    /// World coordinates of a pixel corner.
    pub fn pixel_to_world(&self, col: f64, row: f64) -> (f64, f64) {
        let gt = &self.geo_transform;
        (
            gt[0] + col * gt[1] + row * gt[2],
            gt[3] + col * gt[4] + row * gt[5],
        )
    }
}

fn grid_size(size: i128, what: &str) -> Result<usize> {
    usize::try_from(size)
        .ok()
        .filter(|size| *size > 0)
        .ok_or_else(|| GmlError::MalformedCoordinates(format!("grid {} of {}", what, size)))
}

/// The first two offset vectors, when both have two or more components.
fn rectified_steps(grid: &GridDomain) -> Option<(&Position, &Position)> {
    match grid.offset_vectors.as_slice() {
        [column, row, ..] if column.len() >= 2 && row.len() >= 2 => Some((column, row)),
        [_, _, ..] => {
            warn!("Offset vectors need two components, falling back to the bounding box");
            None
        }
        _ => None,
    }
}

fn grid_extent(gt: &GeoTransform, width: usize, height: usize) -> BoundingBox {
    let (w, h) = (width as f64, height as f64);
    let corners = [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)]
        .map(|(col, row)| (gt[0] + col * gt[1] + row * gt[2], gt[3] + col * gt[4] + row * gt[5]));

    corners.iter().skip(1).fold(
        BoundingBox::new(corners[0].0, corners[0].1, corners[0].0, corners[0].1),
        |bbox, &(x, y)| {
            BoundingBox::new(
                bbox.min_x.min(x),
                bbox.min_y.min(y),
                bbox.max_x.max(x),
                bbox.max_y.max(y),
            )
        },
    )
}
