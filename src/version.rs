use std::fmt;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::error::{GmlError, Result};
use crate::xml::{resolve_namespace, XmlElement};

pub const GML2_NAMESPACE: &str = "http://www.opengis.net/gml";
pub const GML32_NAMESPACE: &str = "http://www.opengis.net/gml/3.2";

const GML_PREFIX: &str = "gml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GmlVersion {
    V2_1_2,
    V3_0,
    V3_1,
    V3_2,
    V3_3,
}

/// How coordinate text is laid out inside an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateEncoding {
    /// `x,y x,y`: tuples separated by whitespace, ordinates by commas.
    Tuples,
    /// `x y x y`: one flat list grouped by `srsDimension`.
    Flat,
}

impl GmlVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            GmlVersion::V2_1_2 => "2.1.2",
            GmlVersion::V3_0 => "3.0",
            GmlVersion::V3_1 => "3.1",
            GmlVersion::V3_2 => "3.2",
            GmlVersion::V3_3 => "3.3",
        }
    }

    pub fn is_gml2(&self) -> bool {
        matches!(self, GmlVersion::V2_1_2)
    }

    pub fn coordinate_encoding(&self) -> CoordinateEncoding {
        if self.is_gml2() {
            CoordinateEncoding::Tuples
        } else {
            CoordinateEncoding::Flat
        }
    }

    /// Namespace URI written by the re-encoder for this version.
    pub fn namespace_uri(&self) -> Option<&'static str> {
        match self {
            GmlVersion::V2_1_2 => Some(GML2_NAMESPACE),
            GmlVersion::V3_2 => Some(GML32_NAMESPACE),
            _ => None,
        }
    }

    /// Maps a declared GML namespace URI to a version. Unknown URIs are
    /// assumed to be the newest dialect.
    pub fn from_namespace(uri: &str) -> GmlVersion {
        let uri = uri.trim();
        if uri.contains("/gml/3.3") {
            GmlVersion::V3_3
        } else if uri.contains("/gml/3.2") {
            GmlVersion::V3_2
        } else if uri.contains("/gml/3.1") {
            GmlVersion::V3_1
        } else if uri.contains("/gml/3.0") {
            GmlVersion::V3_0
        } else if uri == GML2_NAMESPACE {
            GmlVersion::V2_1_2
        } else {
            debug!("Unrecognized GML namespace '{}', assuming 3.2", uri);
            GmlVersion::V3_2
        }
    }
}

impl fmt::Display for GmlVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GmlVersion {
    type Err = GmlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "2.1.2" | "2" => Ok(GmlVersion::V2_1_2),
            "3.0" | "3.0.0" => Ok(GmlVersion::V3_0),
            "3.1" | "3.1.1" => Ok(GmlVersion::V3_1),
            "3.2" | "3.2.1" => Ok(GmlVersion::V3_2),
            "3.3" => Ok(GmlVersion::V3_3),
            other => Err(GmlError::UnsupportedSourceVersion(other.to_string())),
        }
    }
}

pub(crate) fn is_gml_uri(uri: &str) -> bool {
    let uri = uri.trim();
    uri == GML2_NAMESPACE
        || uri
            .strip_prefix(GML2_NAMESPACE)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Returns the GML version of the first GML element in document order.
///
/// An element counts as GML when it uses the `gml` prefix, or when its
/// resolved namespace is a GML URI (covers default-namespace documents and
/// other prefixes bound to GML). WFS responses usually wrap the GML in a
/// `wfs:` root, so descendants are searched too.
pub fn detect_gml_version(root: &XmlElement) -> Result<GmlVersion> {
    let mut scope = Vec::new();
    match find_gml_namespace(root, &mut scope) {
        Some(Some(uri)) => Ok(GmlVersion::from_namespace(uri)),
        Some(None) => {
            warn!("GML prefix used without a namespace declaration, assuming 3.2");
            Ok(GmlVersion::V3_2)
        }
        None => Err(GmlError::NoNamespaceFound),
    }
}

/// `Some(uri)` for the first GML element found; the inner option is `None`
/// when the `gml` prefix is used but never declared.
fn find_gml_namespace<'a>(
    element: &'a XmlElement,
    scope: &mut Vec<&'a XmlElement>,
) -> Option<Option<&'a str>> {
    scope.push(element);

    let uri = resolve_namespace(element.prefix(), scope.as_slice());
    let found = match uri {
        Some(uri) if is_gml_uri(uri) => Some(Some(uri)),
        _ if element.prefix() == Some(GML_PREFIX) => Some(uri),
        _ => element
            .elements()
            .find_map(|child| find_gml_namespace(child, scope)),
    };

    scope.pop();
    found
}
