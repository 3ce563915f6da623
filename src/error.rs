use thiserror::Error;

use crate::ows::OwsExceptionReport;

pub type Result<T> = std::result::Result<T, GmlError>;

#[derive(Debug, Error)]
pub enum GmlError {
    #[error("no GML namespaced element found in document")]
    NoNamespaceFound,

    #[error("unsupported source GML version: {0}")]
    UnsupportedSourceVersion(String),

    #[error("unsupported target GML version: {0} (expected 2.1.2 or 3.2)")]
    UnsupportedTargetVersion(String),

    #[error("malformed coordinates: {0}")]
    MalformedCoordinates(String),

    #[error("unsupported geometry type: {0}")]
    UnsupportedGeometryType(String),

    #[error("missing required element: {0}")]
    MissingElement(String),

    #[error("unsupported coverage: {0}")]
    UnsupportedCoverage(String),

    #[error("cannot re-encode {0} as GML")]
    NotConvertible(String),

    #[error("document is neither GML nor an OWS exception report")]
    UnknownDocument,

    #[error("service returned an exception report: {0}")]
    OwsException(OwsExceptionReport),

    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl GmlError {
    /// Returns the service exception report when the document was one.
    pub fn exception_report(&self) -> Option<&OwsExceptionReport> {
        match self {
            GmlError::OwsException(report) => Some(report),
            _ => None,
        }
    }
}
