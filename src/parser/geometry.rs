//! Geometry elements to [`Geometry`] values.
//!
//! The coordinate encoding is picked per element rather than per document:
//! `coordinates` and `coord` always hold comma tuples (GML 3 still allows
//! them), `pos`, `posList` and the envelope corners always hold flat lists.
//! Wrapper names from both dialects (`outerBoundaryIs`/`exterior`, ...) are
//! accepted whatever version was detected.

use tracing::{debug, warn};

use super::coordinates::{
    parse_flat, parse_position, parse_tuples, TupleSeparators, DEFAULT_SRS_DIMENSION,
};
use crate::error::{GmlError, Result};
use crate::model::{BoundingBox, Envelope, Geometry, GeometryKind, Polygon, Position};
use crate::version::GmlVersion;
use crate::xml::XmlElement;

/// Local names this module turns into geometries.
pub const GEOMETRY_TAGS: &[&str] = &[
    "Point",
    "LineString",
    "Curve",
    "LinearRing",
    "Polygon",
    "Surface",
    "Envelope",
    "Box",
    "MultiPoint",
    "MultiLineString",
    "MultiCurve",
    "MultiPolygon",
    "MultiSurface",
];

pub fn is_geometry_tag(local_name: &str) -> bool {
    GEOMETRY_TAGS.contains(&local_name)
}

#[derive(Debug, Clone, Copy)]
struct Context {
    version: GmlVersion,
    /// Nearest declared `srsDimension`.
    srs_dimension: Option<usize>,
}

impl Context {
    fn enter(self, element: &XmlElement) -> Result<Context> {
        let Some(raw) = element.attr("srsDimension") else {
            return Ok(self);
        };
        match raw.trim().parse::<usize>() {
            Ok(dimension) if dimension > 0 => Ok(Context {
                srs_dimension: Some(dimension),
                ..self
            }),
            _ => Err(GmlError::MalformedCoordinates(format!(
                "invalid srsDimension '{}' on <{}>",
                raw, element.name
            ))),
        }
    }

    fn dimension(&self) -> usize {
        self.srs_dimension.unwrap_or(DEFAULT_SRS_DIMENSION)
    }
}

/// Parses one geometry element of the given dialect.
pub fn parse_geometry(element: &XmlElement, version: GmlVersion) -> Result<Geometry> {
    parse_in(
        element,
        Context {
            version,
            srs_dimension: None,
        },
    )
}

/// Parses an `Envelope` or `Box` element into an [`Envelope`].
pub fn parse_envelope(element: &XmlElement, version: GmlVersion) -> Result<Envelope> {
    let geometry = parse_geometry(element, version)?;
    match geometry.kind {
        GeometryKind::Envelope(bbox) => Ok(Envelope {
            bbox,
            srs_name: geometry.srs_name,
        }),
        other => Err(GmlError::UnsupportedGeometryType(format!(
            "{} where an envelope was expected",
            other.type_name()
        ))),
    }
}

/// The `boundedBy` child of a feature, collection or coverage. A
/// `boundedBy` holding `Null` (or nothing) yields `None`.
pub fn parse_bounded_by(element: &XmlElement, version: GmlVersion) -> Result<Option<Envelope>> {
    let Some(bounded_by) = element.child("boundedBy") else {
        return Ok(None);
    };
    match bounded_by.child_in(&["Envelope", "Box"]) {
        Some(envelope) => parse_envelope(envelope, version).map(Some),
        None => {
            debug!("<{}> has an empty or null boundedBy", element.name);
            Ok(None)
        }
    }
}

fn parse_in(element: &XmlElement, context: Context) -> Result<Geometry> {
    let context = context.enter(element)?;
    debug!("Parsing <{}> as GML {}", element.name, context.version);

    let kind = match element.local_name() {
        "Point" => GeometryKind::Point(point(element, context)?),
        "LineString" => GeometryKind::LineString(line(element, context)?),
        "Curve" => GeometryKind::LineString(curve(element, context)?),
        "LinearRing" => GeometryKind::LinearRing(line(element, context)?),
        "Polygon" => GeometryKind::Polygon(polygon(element, context)?),
        "Surface" => GeometryKind::MultiPolygon(surface(element, context)?),
        "Envelope" => GeometryKind::Envelope(envelope(element, context)?),
        "Box" => GeometryKind::Envelope(gml2_box(element)?),
        "MultiPoint" => GeometryKind::MultiPoint(
            members(element, &["pointMember", "pointMembers"], context)?
                .into_iter()
                .map(|member| match member.kind {
                    GeometryKind::Point(position) => Ok(position),
                    other => Err(wrong_member(other, element)),
                })
                .collect::<Result<_>>()?,
        ),
        "MultiLineString" | "MultiCurve" => GeometryKind::MultiLineString(
            members(
                element,
                &["lineStringMember", "curveMember", "curveMembers"],
                context,
            )?
            .into_iter()
            .map(|member| match member.kind {
                GeometryKind::LineString(line) | GeometryKind::LinearRing(line) => Ok(line),
                other => Err(wrong_member(other, element)),
            })
            .collect::<Result<_>>()?,
        ),
        "MultiPolygon" | "MultiSurface" => {
            let mut polygons = Vec::new();
            for member in members(
                element,
                &["polygonMember", "surfaceMember", "surfaceMembers"],
                context,
            )? {
                match member.kind {
                    GeometryKind::Polygon(polygon) => polygons.push(polygon),
                    GeometryKind::MultiPolygon(patches) => polygons.extend(patches),
                    other => return Err(wrong_member(other, element)),
                }
            }
            GeometryKind::MultiPolygon(polygons)
        }
        other => return Err(GmlError::UnsupportedGeometryType(other.to_string())),
    };
    uniform_arity(&kind, element)?;

    Ok(Geometry {
        kind,
        id: element
            .attr("id")
            .or_else(|| element.attr("gid"))
            .map(str::to_string),
        srs_name: element.attr("srsName").map(str::to_string),
        srs_dimension: context.srs_dimension,
        version: context.version,
    })
}

/// Rings of a polygon and members of a multi-geometry share one tuple arity.
fn uniform_arity(kind: &GeometryKind, element: &XmlElement) -> Result<()> {
    let positions = kind.positions();
    let Some(first) = positions.first() else {
        return Ok(());
    };
    match positions.iter().find(|position| position.len() != first.len()) {
        Some(position) => Err(GmlError::MalformedCoordinates(format!(
            "<{}> mixes {}-tuples with {}-tuples",
            element.name,
            first.len(),
            position.len()
        ))),
        None => Ok(()),
    }
}

fn wrong_member(kind: GeometryKind, parent: &XmlElement) -> GmlError {
    GmlError::UnsupportedGeometryType(format!(
        "{} inside {}",
        kind.type_name(),
        parent.local_name()
    ))
}

fn missing(what: &str, element: &XmlElement) -> GmlError {
    GmlError::MissingElement(format!("{} of <{}>", what, element.name))
}

/// Geometries held by member properties; each property may hold one
/// geometry (`pointMember`) or several (`pointMembers`).
fn members(element: &XmlElement, wrappers: &[&str], context: Context) -> Result<Vec<Geometry>> {
    let mut geometries = Vec::new();
    for wrapper in element
        .elements()
        .filter(|child| wrappers.contains(&child.local_name()))
    {
        if wrapper.children.is_empty() {
            debug!("Skipping empty or by-reference <{}>", wrapper.name);
        }
        for child in wrapper.elements() {
            geometries.push(parse_in(child, context)?);
        }
    }
    Ok(geometries)
}

fn comma_tuples(coordinates: &XmlElement) -> Result<Vec<Position>> {
    parse_tuples(coordinates.text(), &TupleSeparators::from_element(coordinates))
}

/// GML 2 `<coord><X/><Y/><Z/></coord>`.
fn coord_tuple(coord: &XmlElement) -> Result<Position> {
    ["X", "Y", "Z"]
        .iter()
        .filter_map(|axis| coord.child(axis))
        .map(|axis| {
            axis.text().parse::<f64>().map_err(|_| {
                GmlError::MalformedCoordinates(format!("'{}' is not a number", axis.text()))
            })
        })
        .collect()
}

fn point(element: &XmlElement, context: Context) -> Result<Position> {
    if let Some(pos) = element.child("pos") {
        let context = context.enter(pos)?;
        return parse_position(pos.text(), context.srs_dimension);
    }
    if let Some(coordinates) = element.child("coordinates") {
        let mut tuples = comma_tuples(coordinates)?;
        if tuples.len() != 1 {
            return Err(GmlError::MalformedCoordinates(format!(
                "Point holds {} tuples",
                tuples.len()
            )));
        }
        return Ok(tuples.remove(0));
    }
    if let Some(coord) = element.child("coord") {
        return coord_tuple(coord);
    }
    Err(missing("position", element))
}

/// Tuple sequence of a `LineString`, `LinearRing` or `LineStringSegment`.
fn line(element: &XmlElement, context: Context) -> Result<Vec<Position>> {
    let positions = if let Some(pos_list) = element.child("posList") {
        let context = context.enter(pos_list)?;
        parse_flat(pos_list.text(), context.dimension())?
    } else if let Some(coordinates) = element.child("coordinates") {
        comma_tuples(coordinates)?
    } else {
        let mut positions = Vec::new();
        for child in element.elements() {
            match child.local_name() {
                "pos" => {
                    let context = context.enter(child)?;
                    positions.push(parse_position(child.text(), context.srs_dimension)?);
                }
                "coord" => positions.push(coord_tuple(child)?),
                "pointProperty" | "pointRep" => {
                    if let Some(inner) = child.child("Point") {
                        positions.push(point(inner, context.enter(inner)?)?);
                    }
                }
                _ => (),
            }
        }
        positions
    };

    if positions.is_empty() {
        return Err(missing("coordinates", element));
    }
    if let Some(first) = positions.first() {
        if positions.iter().any(|p| p.len() != first.len()) {
            return Err(GmlError::MalformedCoordinates(format!(
                "mixed tuple arity in <{}>",
                element.name
            )));
        }
    }
    Ok(positions)
}

/// `Curve/segments/LineStringSegment*`, joined end to end. A segment that
/// starts where the previous one ended does not repeat the shared vertex.
fn curve(element: &XmlElement, context: Context) -> Result<Vec<Position>> {
    let segments = element
        .child("segments")
        .ok_or_else(|| missing("segments", element))?;

    let mut positions: Vec<Position> = Vec::new();
    for segment in segments.elements() {
        if segment.local_name() != "LineStringSegment" {
            return Err(GmlError::UnsupportedGeometryType(format!(
                "curve segment {}",
                segment.local_name()
            )));
        }
        let mut part = line(segment, context.enter(segment)?)?;
        if positions.last() == part.first() {
            part.remove(0);
        }
        positions.extend(part);
    }

    if positions.is_empty() {
        return Err(missing("segments", element));
    }
    Ok(positions)
}

fn ring(wrapper: &XmlElement, context: Context) -> Result<Vec<Position>> {
    if let Some(linear_ring) = wrapper.child("LinearRing") {
        return line(linear_ring, context.enter(linear_ring)?);
    }
    // GML 3 composite ring: curveMember/(LineString|Curve)*
    if let Some(composite) = wrapper.child("Ring") {
        let mut positions: Vec<Position> = Vec::new();
        for member in composite.children_named("curveMember") {
            for child in member.elements() {
                let mut part = match parse_in(child, context)?.kind {
                    GeometryKind::LineString(line) | GeometryKind::LinearRing(line) => line,
                    other => return Err(wrong_member(other, composite)),
                };
                if !part.is_empty() && positions.last() == part.first() {
                    part.remove(0);
                }
                positions.extend(part);
            }
        }
        if positions.is_empty() {
            return Err(missing("curveMember", composite));
        }
        return Ok(positions);
    }
    Err(missing("ring", wrapper))
}

fn polygon(element: &XmlElement, context: Context) -> Result<Polygon> {
    let exterior = element
        .child_in(&["exterior", "outerBoundaryIs"])
        .ok_or_else(|| missing("exterior ring", element))?;

    let interiors = element
        .elements()
        .filter(|child| matches!(child.local_name(), "interior" | "innerBoundaryIs"))
        .map(|wrapper| ring(wrapper, context))
        .collect::<Result<Vec<_>>>()?;

    Ok(Polygon {
        exterior: ring(exterior, context)?,
        interiors,
    })
}

/// Each `PolygonPatch` becomes one polygon of the approximating
/// multi-polygon.
fn surface(element: &XmlElement, context: Context) -> Result<Vec<Polygon>> {
    let patches = element
        .child_in(&["patches", "polygonPatches"])
        .ok_or_else(|| missing("patches", element))?;

    let polygons = patches
        .elements()
        .map(|patch| match patch.local_name() {
            "PolygonPatch" | "Polygon" => polygon(patch, context.enter(patch)?),
            other => Err(GmlError::UnsupportedGeometryType(format!(
                "surface patch {}",
                other
            ))),
        })
        .collect::<Result<Vec<_>>>()?;

    if polygons.is_empty() {
        return Err(missing("polygon patch", element));
    }
    Ok(polygons)
}

fn corners_to_bbox(lower: &Position, upper: &Position, element: &XmlElement) -> Result<BoundingBox> {
    if lower.len() < 2 || upper.len() < 2 {
        return Err(GmlError::MalformedCoordinates(format!(
            "<{}> corners need at least two ordinates",
            element.name
        )));
    }
    let bbox = BoundingBox::new(lower[0], lower[1], upper[0], upper[1]);
    if bbox.is_inverted() {
        warn!("<{}> has an inverted extent {:?}", element.name, bbox.to_array());
    }
    Ok(bbox)
}

fn envelope(element: &XmlElement, context: Context) -> Result<BoundingBox> {
    if let (Some(lower), Some(upper)) = (element.child("lowerCorner"), element.child("upperCorner")) {
        let lower = parse_position(lower.text(), context.enter(lower)?.srs_dimension)?;
        let upper = parse_position(upper.text(), context.enter(upper)?.srs_dimension)?;
        return corners_to_bbox(&lower, &upper, element);
    }

    // GML 3.0 also allowed two <pos> or a <coordinates> pair.
    let pos = element.children_named("pos");
    if pos.len() == 2 {
        let lower = parse_position(pos[0].text(), context.srs_dimension)?;
        let upper = parse_position(pos[1].text(), context.srs_dimension)?;
        return corners_to_bbox(&lower, &upper, element);
    }
    if element.child("coordinates").is_some() {
        return gml2_box(element);
    }
    Err(missing("lowerCorner/upperCorner", element))
}

fn gml2_box(element: &XmlElement) -> Result<BoundingBox> {
    let corners = if let Some(coordinates) = element.child("coordinates") {
        comma_tuples(coordinates)?
    } else {
        element
            .children_named("coord")
            .into_iter()
            .map(coord_tuple)
            .collect::<Result<Vec<_>>>()?
    };

    match corners.as_slice() {
        [lower, upper] => corners_to_bbox(lower, upper, element),
        _ => Err(GmlError::MalformedCoordinates(format!(
            "<{}> needs exactly two corners, found {}",
            element.name,
            corners.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GML2: &str = r#"xmlns:gml="http://www.opengis.net/gml""#;
    const GML32: &str = r#"xmlns:gml="http://www.opengis.net/gml/3.2""#;

    fn parse(xml: &str, version: GmlVersion) -> Result<Geometry> {
        parse_geometry(&XmlElement::parse(xml).unwrap(), version)
    }

    #[test]
    fn test_gml2_point() {
        let xml = format!(
            r#"<gml:Point {GML2} srsName="EPSG:4326" gid="p1"><gml:coordinates>10,20</gml:coordinates></gml:Point>"#
        );
        let geometry = parse(&xml, GmlVersion::V2_1_2).unwrap();
        assert_eq!(geometry.kind, GeometryKind::Point(vec![10.0, 20.0]));
        assert_eq!(geometry.srs_name.as_deref(), Some("EPSG:4326"));
        assert_eq!(geometry.id.as_deref(), Some("p1"));
        assert_eq!(geometry.version, GmlVersion::V2_1_2);
    }

    #[test]
    fn test_gml2_coord_point() {
        let xml = format!(
            r#"<gml:Point {GML2}><gml:coord><gml:X>1.5</gml:X><gml:Y>-2</gml:Y></gml:coord></gml:Point>"#
        );
        let geometry = parse(&xml, GmlVersion::V2_1_2).unwrap();
        assert_eq!(geometry.kind, GeometryKind::Point(vec![1.5, -2.0]));
    }

    #[test]
    fn test_gml3_point_with_three_ordinates() {
        let xml = format!(
            r#"<gml:Point {GML32} gml:id="p" srsDimension="3"><gml:pos>1 2 3</gml:pos></gml:Point>"#
        );
        let geometry = parse(&xml, GmlVersion::V3_2).unwrap();
        assert_eq!(geometry.kind, GeometryKind::Point(vec![1.0, 2.0, 3.0]));
        assert_eq!(geometry.srs_dimension, Some(3));
        assert_eq!(geometry.dimension(), 3);
    }

    #[test]
    fn test_point_without_position_fails() {
        let xml = format!(r#"<gml:Point {GML32}/>"#);
        assert!(matches!(
            parse(&xml, GmlVersion::V3_2),
            Err(GmlError::MissingElement(_))
        ));
    }

    #[test]
    fn test_pos_list_inherits_dimension_from_geometry() {
        let xml = format!(
            r#"<gml:LineString {GML32} srsDimension="3"><gml:posList>0 0 0 1 1 1</gml:posList></gml:LineString>"#
        );
        let geometry = parse(&xml, GmlVersion::V3_2).unwrap();
        assert_eq!(
            geometry.kind,
            GeometryKind::LineString(vec![vec![0.0, 0.0, 0.0], vec![1.0, 1.0, 1.0]])
        );
    }

    #[test]
    fn test_line_from_pos_sequence() {
        let xml = format!(
            r#"<gml:LineString {GML32}><gml:pos>0 0</gml:pos><gml:pos>5 5</gml:pos></gml:LineString>"#
        );
        let geometry = parse(&xml, GmlVersion::V3_1).unwrap();
        assert_eq!(
            geometry.kind,
            GeometryKind::LineString(vec![vec![0.0, 0.0], vec![5.0, 5.0]])
        );
    }

    #[test]
    fn test_line_with_mixed_pos_arity_fails() {
        let xml = format!(
            r#"<gml:LineString {GML32}><gml:pos>0 0</gml:pos><gml:pos>5 5 5</gml:pos></gml:LineString>"#
        );
        assert!(matches!(
            parse(&xml, GmlVersion::V3_2),
            Err(GmlError::MalformedCoordinates(_))
        ));
    }

    #[test]
    fn test_curve_segments_share_vertices() {
        let xml = format!(
            r#"<gml:Curve {GML32}><gml:segments>
                 <gml:LineStringSegment><gml:posList>0 0 1 1</gml:posList></gml:LineStringSegment>
                 <gml:LineStringSegment><gml:posList>1 1 2 0</gml:posList></gml:LineStringSegment>
               </gml:segments></gml:Curve>"#
        );
        let geometry = parse(&xml, GmlVersion::V3_2).unwrap();
        assert_eq!(
            geometry.kind,
            GeometryKind::LineString(vec![vec![0.0, 0.0], vec![1.0, 1.0], vec![2.0, 0.0]])
        );
    }

    #[test]
    fn test_gml2_polygon_with_hole() {
        let xml = format!(
            r#"<gml:Polygon {GML2}>
                 <gml:outerBoundaryIs><gml:LinearRing><gml:coordinates>0,0 10,0 10,10 0,0</gml:coordinates></gml:LinearRing></gml:outerBoundaryIs>
                 <gml:innerBoundaryIs><gml:LinearRing><gml:coordinates>2,2 3,2 3,3 2,2</gml:coordinates></gml:LinearRing></gml:innerBoundaryIs>
               </gml:Polygon>"#
        );
        let GeometryKind::Polygon(polygon) = parse(&xml, GmlVersion::V2_1_2).unwrap().kind else {
            panic!("expected a polygon");
        };
        assert_eq!(polygon.exterior.len(), 4);
        assert_eq!(polygon.interiors.len(), 1);
        assert_eq!(polygon.interiors[0][1], vec![3.0, 2.0]);
    }

    #[test]
    fn test_unclosed_ring_is_kept_as_is() {
        let xml = format!(
            r#"<gml:Polygon {GML32}><gml:exterior><gml:LinearRing><gml:posList>0 0 1 0 1 1</gml:posList></gml:LinearRing></gml:exterior></gml:Polygon>"#
        );
        let GeometryKind::Polygon(polygon) = parse(&xml, GmlVersion::V3_2).unwrap().kind else {
            panic!("expected a polygon");
        };
        assert_eq!(polygon.exterior.len(), 3);
        assert_ne!(polygon.exterior.first(), polygon.exterior.last());
    }

    #[test]
    fn test_polygon_without_exterior_fails() {
        let xml = format!(r#"<gml:Polygon {GML32}></gml:Polygon>"#);
        assert!(matches!(
            parse(&xml, GmlVersion::V3_2),
            Err(GmlError::MissingElement(_))
        ));
    }

    #[test]
    fn test_surface_single_patch_becomes_multi_polygon() {
        let xml = format!(
            r#"<gml:Surface {GML32}><gml:patches><gml:PolygonPatch>
                 <gml:exterior><gml:LinearRing><gml:posList>0 0</gml:posList></gml:LinearRing></gml:exterior>
               </gml:PolygonPatch></gml:patches></gml:Surface>"#
        );
        let geometry = parse(&xml, GmlVersion::V3_2).unwrap();
        assert_eq!(
            geometry.kind,
            GeometryKind::MultiPolygon(vec![Polygon {
                exterior: vec![vec![0.0, 0.0]],
                interiors: vec![],
            }])
        );
    }

    #[test]
    fn test_surface_patches_keep_order() {
        let xml = format!(
            r#"<gml:Surface {GML32}><gml:patches>
                 <gml:PolygonPatch><gml:exterior><gml:LinearRing><gml:posList>0 0 1 0 0 0</gml:posList></gml:LinearRing></gml:exterior></gml:PolygonPatch>
                 <gml:PolygonPatch><gml:exterior><gml:LinearRing><gml:posList>5 5 6 5 5 5</gml:posList></gml:LinearRing></gml:exterior></gml:PolygonPatch>
               </gml:patches></gml:Surface>"#
        );
        let GeometryKind::MultiPolygon(polygons) = parse(&xml, GmlVersion::V3_2).unwrap().kind else {
            panic!("expected a multi-polygon");
        };
        assert_eq!(polygons.len(), 2);
        assert_eq!(polygons[1].exterior[0], vec![5.0, 5.0]);
    }

    #[test]
    fn test_envelope_corners() {
        let xml = format!(
            r#"<gml:Envelope {GML32} srsName="EPSG:3857"><gml:lowerCorner>10 20</gml:lowerCorner><gml:upperCorner>30 40</gml:upperCorner></gml:Envelope>"#
        );
        let envelope = parse_envelope(&XmlElement::parse(&xml).unwrap(), GmlVersion::V3_2).unwrap();
        assert_eq!(envelope.bbox.to_array(), [10.0, 20.0, 30.0, 40.0]);
        assert_eq!(envelope.srs_name.as_deref(), Some("EPSG:3857"));
    }

    #[test]
    fn test_envelope_uses_first_two_ordinates_of_3d_corners() {
        let xml = format!(
            r#"<gml:Envelope {GML32} srsDimension="3"><gml:lowerCorner>1 2 3</gml:lowerCorner><gml:upperCorner>4 5 6</gml:upperCorner></gml:Envelope>"#
        );
        let geometry = parse(&xml, GmlVersion::V3_2).unwrap();
        assert_eq!(
            geometry.kind,
            GeometryKind::Envelope(BoundingBox::new(1.0, 2.0, 4.0, 5.0))
        );
    }

    #[test]
    fn test_inverted_envelope_is_preserved() {
        let xml = format!(
            r#"<gml:Envelope {GML32}><gml:lowerCorner>30 40</gml:lowerCorner><gml:upperCorner>10 20</gml:upperCorner></gml:Envelope>"#
        );
        let geometry = parse(&xml, GmlVersion::V3_2).unwrap();
        assert_eq!(
            geometry.kind,
            GeometryKind::Envelope(BoundingBox::new(30.0, 40.0, 10.0, 20.0))
        );
    }

    #[test]
    fn test_gml2_box() {
        let xml = format!(
            r#"<gml:Box {GML2} srsName="EPSG:4326"><gml:coordinates>10,20 30,40</gml:coordinates></gml:Box>"#
        );
        let geometry = parse(&xml, GmlVersion::V2_1_2).unwrap();
        assert_eq!(
            geometry.kind,
            GeometryKind::Envelope(BoundingBox::new(10.0, 20.0, 30.0, 40.0))
        );
    }

    #[test]
    fn test_box_with_one_corner_fails() {
        let xml = format!(r#"<gml:Box {GML2}><gml:coordinates>10,20</gml:coordinates></gml:Box>"#);
        assert!(matches!(
            parse(&xml, GmlVersion::V2_1_2),
            Err(GmlError::MalformedCoordinates(_))
        ));
    }

    #[test]
    fn test_multi_point_members() {
        let xml = format!(
            r#"<gml:MultiPoint {GML2}>
                 <gml:pointMember><gml:Point><gml:coordinates>1,1</gml:coordinates></gml:Point></gml:pointMember>
                 <gml:pointMember><gml:Point><gml:coordinates>2,2</gml:coordinates></gml:Point></gml:pointMember>
               </gml:MultiPoint>"#
        );
        let geometry = parse(&xml, GmlVersion::V2_1_2).unwrap();
        assert_eq!(
            geometry.kind,
            GeometryKind::MultiPoint(vec![vec![1.0, 1.0], vec![2.0, 2.0]])
        );
    }

    #[test]
    fn test_multi_point_members_array() {
        let xml = format!(
            r#"<gml:MultiPoint {GML32}><gml:pointMembers>
                 <gml:Point><gml:pos>1 1</gml:pos></gml:Point>
                 <gml:Point><gml:pos>2 2</gml:pos></gml:Point>
               </gml:pointMembers></gml:MultiPoint>"#
        );
        let geometry = parse(&xml, GmlVersion::V3_2).unwrap();
        assert_eq!(
            geometry.kind,
            GeometryKind::MultiPoint(vec![vec![1.0, 1.0], vec![2.0, 2.0]])
        );
    }

    #[test]
    fn test_multi_curve_as_multi_line_string() {
        let xml = format!(
            r#"<gml:MultiCurve {GML32}>
                 <gml:curveMember><gml:LineString><gml:posList>0 0 1 1</gml:posList></gml:LineString></gml:curveMember>
                 <gml:curveMember><gml:LineString><gml:posList>2 2 3 3</gml:posList></gml:LineString></gml:curveMember>
               </gml:MultiCurve>"#
        );
        let GeometryKind::MultiLineString(lines) = parse(&xml, GmlVersion::V3_2).unwrap().kind else {
            panic!("expected a multi-line");
        };
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], vec![vec![2.0, 2.0], vec![3.0, 3.0]]);
    }

    #[test]
    fn test_multi_surface_flattens_surface_members() {
        let xml = format!(
            r#"<gml:MultiSurface {GML32}>
                 <gml:surfaceMember><gml:Polygon><gml:exterior><gml:LinearRing><gml:posList>0 0 1 0 0 0</gml:posList></gml:LinearRing></gml:exterior></gml:Polygon></gml:surfaceMember>
                 <gml:surfaceMember><gml:Surface><gml:patches><gml:PolygonPatch><gml:exterior><gml:LinearRing><gml:posList>9 9 8 9 9 9</gml:posList></gml:LinearRing></gml:exterior></gml:PolygonPatch></gml:patches></gml:Surface></gml:surfaceMember>
               </gml:MultiSurface>"#
        );
        let GeometryKind::MultiPolygon(polygons) = parse(&xml, GmlVersion::V3_2).unwrap().kind else {
            panic!("expected a multi-polygon");
        };
        assert_eq!(polygons.len(), 2);
        assert_eq!(polygons[1].exterior[0], vec![9.0, 9.0]);
    }

    #[test]
    fn test_wrong_member_kind_fails() {
        let xml = format!(
            r#"<gml:MultiPoint {GML32}><gml:pointMember><gml:LineString><gml:posList>0 0 1 1</gml:posList></gml:LineString></gml:pointMember></gml:MultiPoint>"#
        );
        assert!(matches!(
            parse(&xml, GmlVersion::V3_2),
            Err(GmlError::UnsupportedGeometryType(_))
        ));
    }

    #[test]
    fn test_polygon_rings_with_mixed_arity_fail() {
        let xml = format!(
            r#"<gml:Polygon {GML2}>
                 <gml:outerBoundaryIs><gml:LinearRing><gml:coordinates>0,0 10,0 10,10 0,0</gml:coordinates></gml:LinearRing></gml:outerBoundaryIs>
                 <gml:innerBoundaryIs><gml:LinearRing><gml:coordinates>1,1,5 2,1,5 2,2,5 1,1,5</gml:coordinates></gml:LinearRing></gml:innerBoundaryIs>
               </gml:Polygon>"#
        );
        assert!(matches!(
            parse(&xml, GmlVersion::V2_1_2),
            Err(GmlError::MalformedCoordinates(_))
        ));
    }

    #[test]
    fn test_multi_point_members_with_mixed_arity_fail() {
        let xml = format!(
            r#"<gml:MultiPoint {GML32}>
                 <gml:pointMember><gml:Point><gml:pos>1 2</gml:pos></gml:Point></gml:pointMember>
                 <gml:pointMember><gml:Point><gml:pos>1 2 3</gml:pos></gml:Point></gml:pointMember>
               </gml:MultiPoint>"#
        );
        assert!(matches!(
            parse(&xml, GmlVersion::V3_2),
            Err(GmlError::MalformedCoordinates(_))
        ));
    }

    #[test]
    fn test_three_dimensional_polygon_keeps_its_rings() {
        let xml = format!(
            r#"<gml:Polygon {GML2}>
                 <gml:outerBoundaryIs><gml:LinearRing><gml:coordinates>0,0,1 10,0,1 10,10,1 0,0,1</gml:coordinates></gml:LinearRing></gml:outerBoundaryIs>
                 <gml:innerBoundaryIs><gml:LinearRing><gml:coordinates>1,1,5 2,1,5 2,2,5 1,1,5</gml:coordinates></gml:LinearRing></gml:innerBoundaryIs>
               </gml:Polygon>"#
        );
        let geometry = parse(&xml, GmlVersion::V2_1_2).unwrap();
        assert_eq!(geometry.kind.positions().len(), 8);
        assert!(geometry.kind.positions().iter().all(|position| position.len() == 3));
    }

    #[test]
    fn test_unknown_tag_fails() {
        let xml = format!(r#"<gml:Solid {GML32}/>"#);
        assert!(matches!(
            parse(&xml, GmlVersion::V3_2),
            Err(GmlError::UnsupportedGeometryType(tag)) if tag == "Solid"
        ));
    }

    #[test]
    fn test_invalid_srs_dimension_fails() {
        let xml = format!(
            r#"<gml:LineString {GML32} srsDimension="two"><gml:posList>0 0</gml:posList></gml:LineString>"#
        );
        assert!(matches!(
            parse(&xml, GmlVersion::V3_2),
            Err(GmlError::MalformedCoordinates(_))
        ));
    }

    #[test]
    fn test_deprecated_coordinates_in_gml3() {
        let xml = format!(
            r#"<gml:LineString {GML32}><gml:coordinates>0,0 1,1</gml:coordinates></gml:LineString>"#
        );
        let geometry = parse(&xml, GmlVersion::V3_2).unwrap();
        assert_eq!(
            geometry.kind,
            GeometryKind::LineString(vec![vec![0.0, 0.0], vec![1.0, 1.0]])
        );
    }
}
