//! The interface downstream format builders implement.
//!
//! A builder turns each model entity into its own representation. The
//! geometry methods receive the whole [`Geometry`] (for `id`, `srs_name` and
//! dimension) together with the payload of the variant being built.

use crate::error::Result;
use crate::model::{
    BoundingBox, Geometry, GeometryKind, GmlCoverage, GmlDocument, GmlFeature,
    GmlFeatureCollection, Polygon, Position,
};

pub trait ModelBuilder {
    type Output;

    fn build_point(&self, geometry: &Geometry, position: &Position) -> Result<Self::Output>;

    fn build_line_string(&self, geometry: &Geometry, positions: &[Position]) -> Result<Self::Output>;

    fn build_linear_ring(&self, geometry: &Geometry, positions: &[Position]) -> Result<Self::Output>;

    fn build_polygon(&self, geometry: &Geometry, polygon: &Polygon) -> Result<Self::Output>;

    fn build_multi_point(&self, geometry: &Geometry, points: &[Position]) -> Result<Self::Output>;

    fn build_multi_line_string(
        &self,
        geometry: &Geometry,
        lines: &[Vec<Position>],
    ) -> Result<Self::Output>;

    fn build_multi_polygon(&self, geometry: &Geometry, polygons: &[Polygon]) -> Result<Self::Output>;

    fn build_envelope(&self, geometry: &Geometry, bbox: &BoundingBox) -> Result<Self::Output>;

    fn build_feature(&self, feature: &GmlFeature) -> Result<Self::Output>;

    /// Implementations should go through [`ModelBuilder::build_members`] so
    /// that no member is skipped.
    fn build_feature_collection(&self, collection: &GmlFeatureCollection) -> Result<Self::Output>;

    fn build_coverage(&self, coverage: &GmlCoverage) -> Result<Self::Output>;

    fn build_geometry(&self, geometry: &Geometry) -> Result<Self::Output> {
        match &geometry.kind {
            GeometryKind::Point(position) => self.build_point(geometry, position),
            GeometryKind::LineString(positions) => self.build_line_string(geometry, positions),
            GeometryKind::LinearRing(positions) => self.build_linear_ring(geometry, positions),
            GeometryKind::Polygon(polygon) => self.build_polygon(geometry, polygon),
            GeometryKind::MultiPoint(points) => self.build_multi_point(geometry, points),
            GeometryKind::MultiLineString(lines) => self.build_multi_line_string(geometry, lines),
            GeometryKind::MultiPolygon(polygons) => self.build_multi_polygon(geometry, polygons),
            GeometryKind::Envelope(bbox) => self.build_envelope(geometry, bbox),
        }
    }

    fn build_document(&self, document: &GmlDocument) -> Result<Self::Output> {
        match document {
            GmlDocument::Geometry(geometry) => self.build_geometry(geometry),
            GmlDocument::Feature(feature) => self.build_feature(feature),
            GmlDocument::FeatureCollection(collection) => self.build_feature_collection(collection),
            GmlDocument::Coverage(coverage) => self.build_coverage(coverage),
        }
    }

    /// Every member feature, in order. The first failure fails the whole
    /// collection.
    fn build_members(&self, collection: &GmlFeatureCollection) -> Result<Vec<Self::Output>> {
        collection
            .features
            .iter()
            .map(|feature| self.build_feature(feature))
            .collect()
    }
}
