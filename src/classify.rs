//! Decides what a document is before any geometry is looked for.

use tracing::debug;

use crate::version::detect_gml_version;
use crate::xml::XmlElement;

const REPORT_TAGS: &[&str] = &["ExceptionReport", "ServiceExceptionReport"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Holds at least one GML element.
    Geometry,
    /// An OWS `ExceptionReport` or a WMS/WFS 1.0 `ServiceExceptionReport`.
    ExceptionReport,
    Unknown,
}

/// Exception reports are recognized on the root or one level below it,
/// whatever their prefix, and win over any GML content.
pub fn classify(root: &XmlElement) -> DocumentKind {
    if report_element(root).is_some() {
        debug!("<{}> classified as exception report", root.name);
        return DocumentKind::ExceptionReport;
    }
    match detect_gml_version(root) {
        Ok(_) => DocumentKind::Geometry,
        Err(_) => DocumentKind::Unknown,
    }
}

/// The report element itself, when `root` is or directly wraps one.
pub(crate) fn report_element(root: &XmlElement) -> Option<&XmlElement> {
    if REPORT_TAGS.contains(&root.local_name()) {
        return Some(root);
    }
    root.child_in(REPORT_TAGS)
}
