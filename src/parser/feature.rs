use tracing::debug;

use super::geometry::{is_geometry_tag, parse_bounded_by, parse_geometry};
use crate::error::{GmlError, Result};
use crate::model::{GmlFeature, GmlFeatureCollection, Namespace, Properties, PropertyValue};
use crate::version::{is_gml_uri, GmlVersion};
use crate::xml::XmlElement;

const MEMBER_TAGS: &[&str] = &["featureMember", "featureMembers", "member"];

/// True for `gml:FeatureCollection`, `wfs:FeatureCollection` and any other
/// element that carries feature members.
pub fn is_feature_collection(element: &XmlElement) -> bool {
    element.local_name().ends_with("FeatureCollection")
        || element
            .elements()
            .any(|child| MEMBER_TAGS.contains(&child.local_name()))
}

/// Prefixed, non-GML namespace bindings declared on `element`.
pub fn application_namespaces(element: &XmlElement) -> Vec<Namespace> {
    element
        .namespace_declarations()
        .filter_map(|(prefix, uri)| match prefix {
            Some(prefix) if !is_gml_uri(uri) => Some((prefix.to_string(), uri.to_string())),
            _ => None,
        })
        .collect()
}

pub fn parse_feature_collection(
    element: &XmlElement,
    version: GmlVersion,
    inherited: &[Namespace],
) -> Result<GmlFeatureCollection> {
    let namespaces = merge_namespaces(inherited, element);

    let mut features = Vec::new();
    for member in element
        .elements()
        .filter(|child| MEMBER_TAGS.contains(&child.local_name()))
    {
        let member_namespaces = merge_namespaces(&namespaces, member);
        for feature in member.elements() {
            features.push(parse_feature(feature, version, &member_namespaces)?);
        }
    }
    debug!(
        "Assembled <{}> with {} features",
        element.name,
        features.len()
    );

    Ok(GmlFeatureCollection {
        name: element.name.clone(),
        features,
        bounded_by: parse_bounded_by(element, version)?,
        version,
        namespaces,
    })
}

/// Builds a feature from its element: the first geometry (direct, or the only
/// child of a property) is the feature geometry, `boundedBy` is its
/// envelope, everything else is a property keyed by local name.
pub fn parse_feature(
    element: &XmlElement,
    version: GmlVersion,
    inherited: &[Namespace],
) -> Result<GmlFeature> {
    let mut geometry = None;
    let mut geometry_property = None;
    let mut properties = Properties::new();

    for child in element.elements() {
        let local = child.local_name();
        if local == "boundedBy" {
            continue;
        }
        if geometry.is_none() {
            if is_geometry_tag(local) {
                geometry = Some(parse_geometry(child, version)?);
                continue;
            }
            if let Some(inner) = sole_geometry(child) {
                geometry = Some(parse_geometry(inner, version)?);
                geometry_property = Some(local.to_string());
                continue;
            }
        }
        if properties.get(local).is_some() {
            debug!(
                "Repeated property <{}> of <{}>, keeping the last value",
                child.name, element.name
            );
        }
        properties.insert(local, property_value(child));
    }

    let geometry = geometry.ok_or_else(|| {
        GmlError::MissingElement(format!("geometry of feature <{}>", element.name))
    })?;

    Ok(GmlFeature {
        id: element
            .attr("id")
            .or_else(|| element.attr("fid"))
            .map(str::to_string),
        feature_type: element.name.clone(),
        geometry,
        geometry_property,
        properties,
        bounded_by: parse_bounded_by(element, version)?,
        version,
        namespaces: merge_namespaces(inherited, element),
    })
}

fn sole_geometry(property: &XmlElement) -> Option<&XmlElement> {
    match property.children.as_slice() {
        [only] if is_geometry_tag(only.local_name()) => Some(only),
        _ => None,
    }
}

fn property_value(property: &XmlElement) -> PropertyValue {
    if property.attr("nil") == Some("true") {
        PropertyValue::Nil
    } else if property.children.is_empty() && !property.has_attributes() {
        PropertyValue::Text(property.text().to_string())
    } else {
        PropertyValue::Complex(property.clone())
    }
}

fn merge_namespaces(inherited: &[Namespace], element: &XmlElement) -> Vec<Namespace> {
    let mut namespaces = inherited.to_vec();
    for (prefix, uri) in application_namespaces(element) {
        match namespaces.iter_mut().find(|(known, _)| *known == prefix) {
            Some(binding) => binding.1 = uri,
            None => namespaces.push((prefix, uri)),
        }
    }
    namespaces
}
