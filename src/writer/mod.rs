use tracing::{debug, info};

use crate::builder::ModelBuilder;
use crate::error::{GmlError, Result};
use crate::model::{
    BoundingBox, Envelope, Geometry, GmlCoverage, GmlDocument, GmlFeature, GmlFeatureCollection,
    Namespace, Polygon, Position, PropertyValue,
};
use crate::parser::{parse_document, ParseOptions};
use crate::version::GmlVersion;
use crate::xml::XmlElement;

const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Options of [`convert_gml`].
#[derive(Debug, Clone, Copy)]
pub struct ConvertOptions {
    /// Source dialect; detected from the document when `None`.
    pub input_version: Option<GmlVersion>,
    /// 2.1.2 or 3.2.
    pub output_version: GmlVersion,
    pub pretty_print: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            input_version: None,
            output_version: GmlVersion::V3_2,
            pretty_print: false,
        }
    }
}

/// Parses `xml` and writes it back out in `options.output_version`.
pub fn convert_gml(xml: &str, options: &ConvertOptions) -> Result<String> {
    let writer = GmlWriter::new(options.output_version, options.pretty_print)?;
    let root = XmlElement::parse(xml)?;
    let document = parse_document(
        &root,
        &ParseOptions {
            version_override: options.input_version,
        },
    )?;
    info!(
        "Converting GML {} to {}",
        document.version(),
        options.output_version
    );
    writer.write(&document)
}

/// Writes model entities as GML 2.1.2 or 3.2.
///
/// Element names and coordinate encoding follow the target version; the
/// `gml` prefix is always bound to the target's canonical namespace on the
/// output root.
#[derive(Debug, Clone, Copy)]
pub struct GmlWriter {
    version: GmlVersion,
    pretty: bool,
}

impl GmlWriter {
    pub fn new(version: GmlVersion, pretty: bool) -> Result<Self> {
        match version {
            GmlVersion::V2_1_2 | GmlVersion::V3_2 => Ok(Self { version, pretty }),
            other => Err(GmlError::UnsupportedTargetVersion(other.to_string())),
        }
    }

    pub fn version(&self) -> GmlVersion {
        self.version
    }

    /// The complete document text, XML declaration included.
    pub fn write(&self, document: &GmlDocument) -> Result<String> {
        let mut root = self.build_document(document)?;
        let namespaces: &[Namespace] = match document {
            GmlDocument::Feature(feature) => feature.namespaces.as_slice(),
            GmlDocument::FeatureCollection(collection) => collection.namespaces.as_slice(),
            GmlDocument::Geometry(_) | GmlDocument::Coverage(_) => &[],
        };
        self.declare_namespaces(&mut root, namespaces);
        root.to_xml(self.pretty)
    }

    fn gml2(&self) -> bool {
        self.version.is_gml2()
    }

    fn declare_namespaces(&self, root: &mut XmlElement, namespaces: &[Namespace]) {
        let mut declarations = Vec::with_capacity(root.attributes.len() + namespaces.len() + 1);
        if let Some(uri) = self.version.namespace_uri() {
            declarations.push(("xmlns:gml".to_string(), uri.to_string()));
        }
        for (prefix, uri) in namespaces {
            declarations.push((format!("xmlns:{}", prefix), uri.clone()));
        }
        declarations.append(&mut root.attributes);
        root.attributes = declarations;
    }

    fn format_tuple(position: &Position, separator: &str) -> String {
        position
            .iter()
            .map(|value| value.to_string())
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// `coordinates` (2.1.2) or `posList` (3.2).
    fn coordinate_list(&self, positions: &[Position]) -> XmlElement {
        if self.gml2() {
            let text = positions
                .iter()
                .map(|position| Self::format_tuple(position, ","))
                .collect::<Vec<_>>()
                .join(" ");
            XmlElement::new("gml:coordinates").with_text(text)
        } else {
            let text = positions
                .iter()
                .map(|position| Self::format_tuple(position, " "))
                .collect::<Vec<_>>()
                .join(" ");
            XmlElement::new("gml:posList").with_text(text)
        }
    }

    fn point_element(&self, position: &Position) -> XmlElement {
        let coordinates = if self.gml2() {
            XmlElement::new("gml:coordinates").with_text(Self::format_tuple(position, ","))
        } else {
            XmlElement::new("gml:pos").with_text(Self::format_tuple(position, " "))
        };
        XmlElement::new("gml:Point").with_child(coordinates)
    }

    fn line_element(&self, positions: &[Position]) -> XmlElement {
        XmlElement::new("gml:LineString").with_child(self.coordinate_list(positions))
    }

    fn ring_element(&self, positions: &[Position]) -> XmlElement {
        XmlElement::new("gml:LinearRing").with_child(self.coordinate_list(positions))
    }

    fn polygon_element(&self, polygon: &Polygon) -> XmlElement {
        let (outer, inner) = if self.gml2() {
            ("gml:outerBoundaryIs", "gml:innerBoundaryIs")
        } else {
            ("gml:exterior", "gml:interior")
        };
        let mut element = XmlElement::new("gml:Polygon")
            .with_child(XmlElement::new(outer).with_child(self.ring_element(&polygon.exterior)));
        for interior in &polygon.interiors {
            element = element.with_child(XmlElement::new(inner).with_child(self.ring_element(interior)));
        }
        element
    }

    fn envelope_element(&self, bbox: &BoundingBox) -> XmlElement {
        let lower = vec![bbox.min_x, bbox.min_y];
        let upper = vec![bbox.max_x, bbox.max_y];
        if self.gml2() {
            XmlElement::new("gml:Box").with_child(self.coordinate_list(&[lower, upper]))
        } else {
            XmlElement::new("gml:Envelope")
                .with_child(XmlElement::new("gml:lowerCorner").with_text(Self::format_tuple(&lower, " ")))
                .with_child(XmlElement::new("gml:upperCorner").with_text(Self::format_tuple(&upper, " ")))
        }
    }

    fn bounded_by(&self, envelope: &Envelope) -> XmlElement {
        let mut element = self.envelope_element(&envelope.bbox);
        if let Some(srs_name) = &envelope.srs_name {
            element = element.with_attr("srsName", srs_name.as_str());
        }
        XmlElement::new("gml:boundedBy").with_child(element)
    }

    /// Wraps member geometries in `wrapper` properties, one per member.
    fn multi_element(&self, name: &str, wrapper: &str, members: Vec<XmlElement>) -> XmlElement {
        members.into_iter().fold(XmlElement::new(name), |multi, member| {
            multi.with_child(XmlElement::new(wrapper).with_child(member))
        })
    }

    /// Adds the identity and reference system of `geometry` to its element.
    fn with_geometry_attributes(&self, mut element: XmlElement, geometry: &Geometry) -> XmlElement {
        let mut attributes = Vec::new();
        if let Some(id) = &geometry.id {
            let key = if self.gml2() { "gid" } else { "gml:id" };
            attributes.push((key.to_string(), id.clone()));
        }
        if let Some(srs_name) = &geometry.srs_name {
            attributes.push(("srsName".to_string(), srs_name.clone()));
        }
        if !self.gml2() {
            let dimension = geometry.kind.positions().first().map_or(0, |p| p.len());
            if dimension > 2 {
                attributes.push(("srsDimension".to_string(), dimension.to_string()));
            }
        }
        attributes.append(&mut element.attributes);
        element.attributes = attributes;
        element
    }

    fn qualified(prefix: Option<&str>, local: &str) -> String {
        match prefix {
            Some(prefix) => format!("{}:{}", prefix, local),
            None => local.to_string(),
        }
    }

    /// Complex values are copied as read, so geometries nested in them keep
    /// their source encoding.
    fn property_element(&self, name: String, value: &PropertyValue) -> XmlElement {
        match value {
            PropertyValue::Text(text) => XmlElement::new(name).with_text(text.as_str()),
            PropertyValue::Complex(element) => element.clone(),
            PropertyValue::Nil => XmlElement::new(name)
                .with_attr("xmlns:xsi", XSI_NAMESPACE)
                .with_attr("xsi:nil", "true"),
        }
    }

    /// Collections keep their own root tag unless it is GML's or its prefix
    /// would be left undeclared.
    fn collection_name(&self, collection: &GmlFeatureCollection) -> String {
        match collection.name.split_once(':').map(|(prefix, _)| prefix) {
            Some(prefix)
                if prefix != "gml"
                    && collection.namespaces.iter().any(|(known, _)| known == prefix) =>
            {
                collection.name.clone()
            }
            _ => "gml:FeatureCollection".to_string(),
        }
    }
}

impl ModelBuilder for GmlWriter {
    type Output = XmlElement;

    fn build_point(&self, geometry: &Geometry, position: &Position) -> Result<XmlElement> {
        Ok(self.with_geometry_attributes(self.point_element(position), geometry))
    }

    fn build_line_string(&self, geometry: &Geometry, positions: &[Position]) -> Result<XmlElement> {
        Ok(self.with_geometry_attributes(self.line_element(positions), geometry))
    }

    fn build_linear_ring(&self, geometry: &Geometry, positions: &[Position]) -> Result<XmlElement> {
        Ok(self.with_geometry_attributes(self.ring_element(positions), geometry))
    }

    fn build_polygon(&self, geometry: &Geometry, polygon: &Polygon) -> Result<XmlElement> {
        Ok(self.with_geometry_attributes(self.polygon_element(polygon), geometry))
    }

    fn build_multi_point(&self, geometry: &Geometry, points: &[Position]) -> Result<XmlElement> {
        let members = points.iter().map(|point| self.point_element(point)).collect();
        let element = self.multi_element("gml:MultiPoint", "gml:pointMember", members);
        Ok(self.with_geometry_attributes(element, geometry))
    }

    fn build_multi_line_string(
        &self,
        geometry: &Geometry,
        lines: &[Vec<Position>],
    ) -> Result<XmlElement> {
        let members = lines.iter().map(|line| self.line_element(line)).collect();
        let element = if self.gml2() {
            self.multi_element("gml:MultiLineString", "gml:lineStringMember", members)
        } else {
            self.multi_element("gml:MultiCurve", "gml:curveMember", members)
        };
        Ok(self.with_geometry_attributes(element, geometry))
    }

    fn build_multi_polygon(&self, geometry: &Geometry, polygons: &[Polygon]) -> Result<XmlElement> {
        let members = polygons
            .iter()
            .map(|polygon| self.polygon_element(polygon))
            .collect();
        let element = if self.gml2() {
            self.multi_element("gml:MultiPolygon", "gml:polygonMember", members)
        } else {
            self.multi_element("gml:MultiSurface", "gml:surfaceMember", members)
        };
        Ok(self.with_geometry_attributes(element, geometry))
    }

    fn build_envelope(&self, geometry: &Geometry, bbox: &BoundingBox) -> Result<XmlElement> {
        Ok(self.with_geometry_attributes(self.envelope_element(bbox), geometry))
    }

    fn build_feature(&self, feature: &GmlFeature) -> Result<XmlElement> {
        let mut element = XmlElement::new(feature.feature_type.as_str());
        if let Some(id) = &feature.id {
            let key = if self.gml2() { "fid" } else { "gml:id" };
            element = element.with_attr(key, id.as_str());
        }
        if let Some(envelope) = &feature.bounded_by {
            element = element.with_child(self.bounded_by(envelope));
        }

        let prefix = element.prefix().map(str::to_string);
        let geometry = self.build_geometry(&feature.geometry)?;
        element = match &feature.geometry_property {
            Some(property) => element.with_child(
                XmlElement::new(Self::qualified(prefix.as_deref(), property)).with_child(geometry),
            ),
            None => element.with_child(geometry),
        };

        for (name, value) in feature.properties.iter() {
            let name = Self::qualified(prefix.as_deref(), name);
            element = element.with_child(self.property_element(name, value));
        }
        debug!(
            "Wrote feature <{}> with {} properties",
            feature.feature_type,
            feature.properties.len()
        );
        Ok(element)
    }

    fn build_feature_collection(&self, collection: &GmlFeatureCollection) -> Result<XmlElement> {
        let mut element = XmlElement::new(self.collection_name(collection));
        if let Some(envelope) = &collection.bounded_by {
            element = element.with_child(self.bounded_by(envelope));
        }

        let members = self.build_members(collection)?;
        for (mut member, feature) in members.into_iter().zip(&collection.features) {
            // Bindings the collection root does not already provide.
            let local: Vec<Namespace> = feature
                .namespaces
                .iter()
                .filter(|binding| !collection.namespaces.contains(binding))
                .cloned()
                .collect();
            for (prefix, uri) in local {
                member = member.with_attr(format!("xmlns:{}", prefix), uri);
            }
            element = element.with_child(XmlElement::new("gml:featureMember").with_child(member));
        }
        Ok(element)
    }

    fn build_coverage(&self, coverage: &GmlCoverage) -> Result<XmlElement> {
        Err(GmlError::NotConvertible(coverage.kind.tag().to_string()))
    }
}
