pub mod coordinates;
pub mod coverage;
pub mod feature;
pub mod geometry;

use tracing::info;

use crate::classify::{classify, DocumentKind};
use crate::error::{GmlError, Result};
use crate::model::GmlDocument;
use crate::ows::OwsExceptionReport;
use crate::version::{detect_gml_version, GmlVersion};
use crate::xml::XmlElement;

pub use coordinates::parse_coordinates;
pub use coverage::parse_coverage;
pub use feature::{parse_feature, parse_feature_collection};
pub use geometry::{parse_envelope, parse_geometry};

#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Skips dialect detection when set.
    pub version_override: Option<GmlVersion>,
}

/// Classifies `root`, then builds the model for whatever it holds.
///
/// Exception reports come back as [`GmlError::OwsException`] carrying the
/// whole report. Otherwise the root decides the entity: a geometry tag gives
/// a geometry, a coverage tag a coverage, an element with feature members a
/// collection, anything else is read as a single feature.
pub fn parse_document(root: &XmlElement, options: &ParseOptions) -> Result<GmlDocument> {
    match classify(root) {
        DocumentKind::ExceptionReport => {
            return Err(GmlError::OwsException(OwsExceptionReport::from_element(root)?));
        }
        DocumentKind::Unknown if options.version_override.is_none() => {
            return Err(GmlError::NoNamespaceFound);
        }
        _ => (),
    }

    let version = match options.version_override {
        Some(version) => version,
        None => detect_gml_version(root)?,
    };

    let local = root.local_name();
    let document = if geometry::is_geometry_tag(local) {
        GmlDocument::Geometry(parse_geometry(root, version)?)
    } else if coverage::is_coverage(root) {
        GmlDocument::Coverage(parse_coverage(root, version)?)
    } else if feature::is_feature_collection(root) {
        GmlDocument::FeatureCollection(parse_feature_collection(root, version, &[])?)
    } else {
        GmlDocument::Feature(parse_feature(root, version, &[])?)
    };

    info!("Parsed <{}> as GML {}", root.name, version);
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GeometryKind;

    fn parse(xml: &str, options: &ParseOptions) -> Result<GmlDocument> {
        parse_document(&XmlElement::parse(xml).unwrap(), options)
    }

    #[test]
    fn test_dispatch_by_root() {
        let options = ParseOptions::default();
        let point = parse(
            r#"<gml:Point xmlns:gml="http://www.opengis.net/gml/3.2"><gml:pos>1 2</gml:pos></gml:Point>"#,
            &options,
        )
        .unwrap();
        assert!(matches!(point, GmlDocument::Geometry(_)));
        assert_eq!(point.version(), GmlVersion::V3_2);

        let feature = parse(
            r#"<app:Site xmlns:app="urn:app" xmlns:gml="http://www.opengis.net/gml"><app:loc><gml:Point><gml:coordinates>1,2</gml:coordinates></gml:Point></app:loc></app:Site>"#,
            &options,
        )
        .unwrap();
        assert!(matches!(feature, GmlDocument::Feature(_)));
        assert_eq!(feature.version(), GmlVersion::V2_1_2);
    }

    #[test]
    fn test_exception_report_is_not_a_parse_failure() {
        let err = parse(
            r#"<ows:ExceptionReport xmlns:ows="http://www.opengis.net/ows/1.1"><ows:Exception exceptionCode="NoApplicableCode"/></ows:ExceptionReport>"#,
            &ParseOptions::default(),
        )
        .unwrap_err();
        let report = err.exception_report().unwrap();
        assert_eq!(report.codes(), vec!["NoApplicableCode"]);
    }

    #[test]
    fn test_no_gml_without_override() {
        let xml = "<Point><pos>1 2</pos></Point>";
        assert!(matches!(
            parse(xml, &ParseOptions::default()),
            Err(GmlError::NoNamespaceFound)
        ));

        let options = ParseOptions {
            version_override: Some(GmlVersion::V3_1),
        };
        match parse(xml, &options).unwrap() {
            GmlDocument::Geometry(geometry) => {
                assert_eq!(geometry.kind, GeometryKind::Point(vec![1.0, 2.0]));
                assert_eq!(geometry.version, GmlVersion::V3_1);
            }
            other => panic!("expected a geometry, got {other:?}"),
        }
    }
}
