use crate::version::GmlVersion;
use crate::xml::XmlElement;

/// One coordinate tuple. Its length is the geometry's dimension.
pub type Position = Vec<f64>;

/// `[minX, minY, maxX, maxY]`. Inverted boxes are kept as found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.min_x, self.min_y, self.max_x, self.max_y]
    }

    pub fn is_inverted(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }
}

/// A `boundedBy` envelope with its reference system.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub bbox: BoundingBox,
    pub srs_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    pub exterior: Vec<Position>,
    pub interiors: Vec<Vec<Position>>,
}

impl Polygon {
    /// Exterior ring first, then the interior rings in source order.
    pub fn rings(&self) -> impl Iterator<Item = &Vec<Position>> {
        std::iter::once(&self.exterior).chain(self.interiors.iter())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GeometryKind {
    Point(Position),
    /// Also holds `Curve` geometries.
    LineString(Vec<Position>),
    LinearRing(Vec<Position>),
    Polygon(Polygon),
    MultiPoint(Vec<Position>),
    MultiLineString(Vec<Vec<Position>>),
    /// Also holds `Surface` geometries, one polygon per patch.
    MultiPolygon(Vec<Polygon>),
    /// `Envelope` (3.x) or `Box` (2.x).
    Envelope(BoundingBox),
}

impl GeometryKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            GeometryKind::Point(_) => "Point",
            GeometryKind::LineString(_) => "LineString",
            GeometryKind::LinearRing(_) => "LinearRing",
            GeometryKind::Polygon(_) => "Polygon",
            GeometryKind::MultiPoint(_) => "MultiPoint",
            GeometryKind::MultiLineString(_) => "MultiLineString",
            GeometryKind::MultiPolygon(_) => "MultiPolygon",
            GeometryKind::Envelope(_) => "Envelope",
        }
    }

    /// Every coordinate tuple held, in document order.
    pub fn positions(&self) -> Vec<&Position> {
        match self {
            GeometryKind::Point(position) => vec![position],
            GeometryKind::LineString(line)
            | GeometryKind::LinearRing(line)
            | GeometryKind::MultiPoint(line) => line.iter().collect(),
            GeometryKind::Polygon(polygon) => polygon.rings().flatten().collect(),
            GeometryKind::MultiLineString(lines) => lines.iter().flatten().collect(),
            GeometryKind::MultiPolygon(polygons) => polygons
                .iter()
                .flat_map(|polygon| polygon.rings().flatten())
                .collect(),
            GeometryKind::Envelope(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub kind: GeometryKind,
    pub id: Option<String>,
    /// Carried verbatim, never interpreted.
    pub srs_name: Option<String>,
    /// `srsDimension` as declared in the source, if it was.
    pub srs_dimension: Option<usize>,
    pub version: GmlVersion,
}

impl Geometry {
    pub fn new(kind: GeometryKind, version: GmlVersion) -> Self {
        Self {
            kind,
            id: None,
            srs_name: None,
            srs_dimension: None,
            version,
        }
    }

    pub fn with_srs_name(mut self, srs_name: impl Into<String>) -> Self {
        self.srs_name = Some(srs_name.into());
        self
    }

    /// Number of ordinates per tuple: the declared dimension, else the
    /// length of the first tuple, else 2.
    pub fn dimension(&self) -> usize {
        self.srs_dimension
            .or_else(|| self.kind.positions().first().map(|p| p.len()))
            .unwrap_or(2)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Text of a property with no child elements and no attributes.
    Text(String),
    /// The whole property element, kept untouched: nested children, or
    /// attributes such as `uom="m"` on a text value. Geometries nested here
    /// stay in the dialect they were read in; only the feature geometry is
    /// re-encoded.
    Complex(XmlElement),
    Nil,
}

impl PropertyValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Property name to value, in first-insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Properties(Vec<(String, PropertyValue)>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces; a replaced key keeps its original position. A
    /// property repeated in the source (`maxOccurs > 1`) therefore keeps only
    /// its last occurrence.
    pub fn insert(&mut self, name: impl Into<String>, value: PropertyValue) {
        let name = name.into();
        match self.0.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A `(prefix, uri)` namespace binding.
pub type Namespace = (String, String);

#[derive(Debug, Clone, PartialEq)]
pub struct GmlFeature {
    pub id: Option<String>,
    /// Qualified tag of the feature element, e.g. `app:Road`.
    pub feature_type: String,
    pub geometry: Geometry,
    /// Local name of the property wrapping the geometry, when there is one.
    pub geometry_property: Option<String>,
    pub properties: Properties,
    pub bounded_by: Option<Envelope>,
    pub version: GmlVersion,
    /// Non-GML namespace bindings in scope on the feature.
    pub namespaces: Vec<Namespace>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GmlFeatureCollection {
    /// Qualified tag of the collection element.
    pub name: String,
    pub features: Vec<GmlFeature>,
    pub bounded_by: Option<Envelope>,
    pub version: GmlVersion,
    pub namespaces: Vec<Namespace>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverageKind {
    RectifiedGrid,
    Grid,
    ReferenceableGrid,
    MultiPoint,
}

impl CoverageKind {
    pub fn from_tag(local_name: &str) -> Option<CoverageKind> {
        match local_name {
            "RectifiedGridCoverage" => Some(CoverageKind::RectifiedGrid),
            "GridCoverage" => Some(CoverageKind::Grid),
            "ReferenceableGridCoverage" => Some(CoverageKind::ReferenceableGrid),
            "MultiPointCoverage" => Some(CoverageKind::MultiPoint),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            CoverageKind::RectifiedGrid => "RectifiedGridCoverage",
            CoverageKind::Grid => "GridCoverage",
            CoverageKind::ReferenceableGrid => "ReferenceableGridCoverage",
            CoverageKind::MultiPoint => "MultiPointCoverage",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridDomain {
    pub dimension: usize,
    /// Grid index bounds; both hold at least two entries.
    pub low: Vec<i64>,
    pub high: Vec<i64>,
    pub axis_labels: Vec<String>,
    pub srs_name: Option<String>,
    /// Rectified grids only.
    pub origin: Option<Position>,
    pub offset_vectors: Vec<Position>,
}

impl GridDomain {
    /// Cells along the first axis. Widened to `i128` so any pair of `i64`
    /// limits yields an exact count; empty or inverted limits give zero or less.
    pub fn width(&self) -> i128 {
        axis_cells(self.low[0], self.high[0])
    }

    pub fn height(&self) -> i128 {
        axis_cells(self.low[1], self.high[1])
    }
}

fn axis_cells(low: i64, high: i64) -> i128 {
    i128::from(high) - i128::from(low) + 1
}

#[derive(Debug, Clone, PartialEq)]
pub enum CoverageDomain {
    Grid(GridDomain),
    MultiPoint(Vec<Position>),
}

/// One band/field of a coverage `rangeType`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RangeField {
    pub name: String,
    pub data_type: Option<String>,
    pub uom: Option<String>,
    pub description: Option<String>,
    pub definition: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GmlCoverage {
    pub id: Option<String>,
    pub kind: CoverageKind,
    pub domain: CoverageDomain,
    pub range_type: Vec<RangeField>,
    pub range_values: Option<Vec<f64>>,
    pub bounded_by: Option<Envelope>,
    pub version: GmlVersion,
}

impl GmlCoverage {
    pub fn grid(&self) -> Option<&GridDomain> {
        match &self.domain {
            CoverageDomain::Grid(grid) => Some(grid),
            CoverageDomain::MultiPoint(_) => None,
        }
    }
}

/// Everything a GML document can parse into.
#[derive(Debug, Clone, PartialEq)]
pub enum GmlDocument {
    Geometry(Geometry),
    Feature(GmlFeature),
    FeatureCollection(GmlFeatureCollection),
    Coverage(GmlCoverage),
}

impl GmlDocument {
    pub fn version(&self) -> GmlVersion {
        match self {
            GmlDocument::Geometry(geometry) => geometry.version,
            GmlDocument::Feature(feature) => feature.version,
            GmlDocument::FeatureCollection(collection) => collection.version,
            GmlDocument::Coverage(coverage) => coverage.version,
        }
    }
}
