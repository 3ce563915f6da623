//! Reading and re-encoding GML 2.1.2 through 3.3.
//!
//! A document is classified first. OWS exception reports come back as
//! [`GmlError::OwsException`] with the full report, anything else is parsed
//! into the [`GmlDocument`] model using the dialect declared by its GML
//! namespace. The model can be written back out as GML 2.1.2 or 3.2 with
//! [`GmlWriter`], or handed to any other [`ModelBuilder`].

pub mod builder;
pub mod classify;
pub mod error;
pub mod model;
pub mod ows;
pub mod parser;
pub mod raster;
pub mod version;
pub mod writer;
pub mod xml;

use std::io::Read;

pub use builder::ModelBuilder;
pub use classify::{classify, DocumentKind};
pub use error::{GmlError, Result};
pub use model::{
    BoundingBox, CoverageDomain, CoverageKind, Envelope, Geometry, GeometryKind, GmlCoverage,
    GmlDocument, GmlFeature, GmlFeatureCollection, GridDomain, Polygon, Position, Properties,
    PropertyValue, RangeField,
};
pub use ows::{OwsException, OwsExceptionReport};
pub use parser::{parse_coordinates, ParseOptions};
pub use raster::RasterMetadata;
pub use version::{detect_gml_version, GmlVersion};
pub use writer::{convert_gml, ConvertOptions, GmlWriter};
pub use xml::XmlElement;

/// Parses a GML document, detecting its version.
pub fn parse_gml(xml: &str) -> Result<GmlDocument> {
    parse_gml_with(xml, &ParseOptions::default())
}

pub fn parse_gml_with(xml: &str, options: &ParseOptions) -> Result<GmlDocument> {
    let root = XmlElement::parse(xml)?;
    parser::parse_document(&root, options)
}

/// Reads the whole of `reader` and parses it.
pub fn parse_gml_reader<R: Read>(mut reader: R, options: &ParseOptions) -> Result<GmlDocument> {
    let mut xml = String::new();
    reader.read_to_string(&mut xml)?;
    parse_gml_with(&xml, options)
}

/// Parses a document that is expected to be an exception report.
///
/// Fails with [`GmlError::UnknownDocument`] when it is not one.
pub fn parse_exception_report(xml: &str) -> Result<OwsExceptionReport> {
    let root = XmlElement::parse(xml)?;
    match classify(&root) {
        DocumentKind::ExceptionReport => OwsExceptionReport::from_element(&root),
        _ => Err(GmlError::UnknownDocument),
    }
}
