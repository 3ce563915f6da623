//! # Coverage assembly
//!
//! Builds [`GmlCoverage`] values from `RectifiedGridCoverage`, `GridCoverage`,
//! `ReferenceableGridCoverage` and `MultiPointCoverage` elements:
//!
//! * `domainSet` holds the grid: `limits/GridEnvelope` with integer `low` and
//!   `high` index tuples, `axisLabels`, and for rectified grids an `origin`
//!   point plus one `offsetVector` per axis.
//! * `rangeType` lists the bands as `DataRecord/field` entries.
//! * `rangeSet/DataBlock/tupleList` holds the values, when inline.
//!
//! Multi-point coverages have no grid; they are assembled all the same and
//! it is up to consumers that need a grid to refuse them.

use tracing::{debug, info};

use super::coordinates::{parse_numbers, parse_position};
use super::geometry::{parse_bounded_by, parse_geometry};
use crate::error::{GmlError, Result};
use crate::model::{
    CoverageDomain, CoverageKind, GeometryKind, GmlCoverage, GridDomain, Position, RangeField,
};
use crate::version::GmlVersion;
use crate::xml::XmlElement;

pub fn is_coverage(element: &XmlElement) -> bool {
    CoverageKind::from_tag(element.local_name()).is_some()
}

pub fn parse_coverage(element: &XmlElement, version: GmlVersion) -> Result<GmlCoverage> {
    let kind = CoverageKind::from_tag(element.local_name())
        .ok_or_else(|| GmlError::UnsupportedCoverage(element.local_name().to_string()))?;

    let domain_set = element
        .child("domainSet")
        .ok_or_else(|| GmlError::MissingElement(format!("domainSet of <{}>", element.name)))?;

    let domain = match kind {
        CoverageKind::MultiPoint => CoverageDomain::MultiPoint(multi_point_domain(domain_set, version)?),
        _ => CoverageDomain::Grid(grid_domain(domain_set, kind, version)?),
    };

    let range_type = element
        .child("rangeType")
        .map(parse_range_type)
        .unwrap_or_default();

    let range_values = match element.child("rangeSet") {
        Some(range_set) => parse_range_values(range_set)?,
        None => None,
    };

    let coverage = GmlCoverage {
        id: element.attr("id").map(str::to_string),
        kind,
        domain,
        range_type,
        range_values,
        bounded_by: parse_bounded_by(element, version)?,
        version,
    };

    info!(
        "Parsed {} with {} bands{}",
        kind.tag(),
        coverage.range_type.len(),
        coverage
            .grid()
            .map(|grid| format!(" ({}x{})", grid.width(), grid.height()))
            .unwrap_or_default()
    );
    Ok(coverage)
}

fn grid_element<'a>(domain_set: &'a XmlElement, kind: CoverageKind) -> Option<&'a XmlElement> {
    domain_set.elements().find(|child| {
        let local = child.local_name();
        match kind {
            CoverageKind::RectifiedGrid => local == "RectifiedGrid",
            CoverageKind::Grid => local == "Grid",
            CoverageKind::ReferenceableGrid => local.starts_with("ReferenceableGrid"),
            CoverageKind::MultiPoint => false,
        }
    })
}

fn grid_domain(domain_set: &XmlElement, kind: CoverageKind, version: GmlVersion) -> Result<GridDomain> {
    let grid = grid_element(domain_set, kind).ok_or_else(|| {
        GmlError::MissingElement(format!("grid of {} domainSet", kind.tag()))
    })?;

    let envelope = grid
        .child("limits")
        .and_then(|limits| limits.child("GridEnvelope"))
        .ok_or_else(|| GmlError::MissingElement(format!("limits/GridEnvelope of <{}>", grid.name)))?;

    let low = grid_indices(envelope, "low")?;
    let high = grid_indices(envelope, "high")?;
    if low.len() != high.len() || low.len() < 2 {
        return Err(GmlError::MalformedCoordinates(format!(
            "grid limits need two or more matching indices, found low {:?} high {:?}",
            low, high
        )));
    }

    if let Some((low, high)) = low
        .iter()
        .zip(&high)
        .find(|(low, high)| high.checked_sub(**low).and_then(|span| span.checked_add(1)).is_none())
    {
        return Err(GmlError::MalformedCoordinates(format!(
            "grid limits {}..{} of <{}> span more cells than an i64 holds",
            low, high, grid.name
        )));
    }

    let dimension = match grid.attr("dimension") {
        Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
            GmlError::MalformedCoordinates(format!("invalid grid dimension '{}'", raw))
        })?,
        None => low.len(),
    };

    let axis_labels: Vec<String> = match grid.child("axisLabels") {
        Some(labels) => labels.text().split_whitespace().map(str::to_string).collect(),
        None => grid
            .children_named("axisName")
            .iter()
            .map(|name| name.text().to_string())
            .collect(),
    };

    let mut domain = GridDomain {
        dimension,
        low,
        high,
        axis_labels,
        srs_name: grid.attr("srsName").map(str::to_string),
        origin: None,
        offset_vectors: Vec::new(),
    };

    if kind == CoverageKind::RectifiedGrid {
        let (origin, origin_srs) = grid_origin(grid, version)?;
        let offset_vectors = grid
            .children_named("offsetVector")
            .iter()
            .map(|vector| parse_position(vector.text(), None))
            .collect::<Result<Vec<_>>>()?;
        if offset_vectors.len() < 2 {
            return Err(GmlError::MissingElement(format!(
                "two offsetVector elements of <{}>, found {}",
                grid.name,
                offset_vectors.len()
            )));
        }
        domain.srs_name = domain.srs_name.or(origin_srs);
        domain.origin = Some(origin);
        domain.offset_vectors = offset_vectors;
    }

    debug!("Grid domain: {:?}", domain);
    Ok(domain)
}

fn grid_indices(envelope: &XmlElement, name: &str) -> Result<Vec<i64>> {
    let element = envelope
        .child(name)
        .ok_or_else(|| GmlError::MissingElement(format!("{} of GridEnvelope", name)))?;
    element
        .text()
        .split_whitespace()
        .map(|index| {
            index.parse::<i64>().map_err(|_| {
                GmlError::MalformedCoordinates(format!("'{}' is not a grid index", index))
            })
        })
        .collect()
}

/// `origin/Point/pos` (3.2) or `origin/pos` (3.0, 3.1).
fn grid_origin(grid: &XmlElement, version: GmlVersion) -> Result<(Position, Option<String>)> {
    let origin = grid
        .child("origin")
        .ok_or_else(|| GmlError::MissingElement(format!("origin of <{}>", grid.name)))?;

    if let Some(point) = origin.child("Point") {
        let geometry = parse_geometry(point, version)?;
        return match geometry.kind {
            GeometryKind::Point(position) => Ok((position, geometry.srs_name)),
            _ => Err(GmlError::MissingElement("origin point".to_string())),
        };
    }
    if let Some(pos) = origin.child("pos") {
        return Ok((parse_position(pos.text(), None)?, pos.attr("srsName").map(str::to_string)));
    }
    Err(GmlError::MissingElement(format!("origin point of <{}>", grid.name)))
}

fn multi_point_domain(domain_set: &XmlElement, version: GmlVersion) -> Result<Vec<Position>> {
    let multi_point = domain_set
        .child("MultiPoint")
        .ok_or_else(|| GmlError::MissingElement("MultiPoint of MultiPointCoverage domainSet".to_string()))?;

    match parse_geometry(multi_point, version)?.kind {
        GeometryKind::MultiPoint(points) => Ok(points),
        other => Err(GmlError::UnsupportedGeometryType(other.type_name().to_string())),
    }
}

/// Band descriptors from `rangeType`. Absent pieces stay `None`.
pub fn parse_range_type(range_type: &XmlElement) -> Vec<RangeField> {
    let record = range_type.child("DataRecord").unwrap_or(range_type);
    record
        .children_named("field")
        .into_iter()
        .map(|field| {
            let component = field.elements().next();
            RangeField {
                name: field.attr("name").unwrap_or_default().to_string(),
                data_type: component.map(|c| c.local_name().to_string()),
                uom: component
                    .and_then(|c| c.child("uom"))
                    .and_then(|uom| uom.attr("code"))
                    .map(str::to_string),
                description: component
                    .and_then(|c| c.child("description"))
                    .map(|d| d.text().to_string()),
                definition: component
                    .and_then(|c| c.attr("definition"))
                    .map(str::to_string),
            }
        })
        .collect()
}

/// Inline `tupleList` values; commas separate values like spaces do.
fn parse_range_values(range_set: &XmlElement) -> Result<Option<Vec<f64>>> {
    let tuple_list = range_set
        .child("DataBlock")
        .and_then(|block| block.child_in(&["tupleList", "doubleOrNilReasonTupleList"]));

    match tuple_list {
        Some(list) => {
            let values = parse_numbers(&list.text().replace(',', " "))?;
            debug!("Parsed {} range values", values.len());
            Ok(Some(values))
        }
        None => Ok(None),
    }
}
