//! # OWS exception reports
//!
//! Services answer a bad request with an exception report in place of the
//! requested GML. Two shapes are understood:
//!
//! ```xml
//! <ows:ExceptionReport xmlns:ows="http://www.opengis.net/ows/1.1" version="1.0.0">
//!   <ows:Exception exceptionCode="InvalidParameterValue" locator="typeName">
//!     <ows:ExceptionText>Unknown feature type</ows:ExceptionText>
//!   </ows:Exception>
//! </ows:ExceptionReport>
//! ```
//!
//! and the WMS/WFS 1.0 `ServiceExceptionReport`, whose `ServiceException`
//! elements carry `code` and `locator` attributes and a single text body.

use std::fmt;

use tracing::debug;

use crate::classify::report_element;
use crate::error::{GmlError, Result};
use crate::xml::XmlElement;

pub const OWS_NAMESPACE: &str = "http://www.opengis.net/ows/1.1";

const DEFAULT_REPORT_VERSION: &str = "1.0.0";
const UNKNOWN_CODE: &str = "Unknown";

#[derive(Debug, Clone, PartialEq)]
pub struct OwsException {
    pub exception_code: String,
    pub locator: Option<String>,
    /// Never absent; empty when the source had no text.
    pub exception_text: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OwsExceptionReport {
    pub version: String,
    pub exceptions: Vec<OwsException>,
}

impl OwsExceptionReport {
    /// Reads a report from its `ExceptionReport`/`ServiceExceptionReport`
    /// element, or from an element directly wrapping one.
    pub fn from_element(element: &XmlElement) -> Result<OwsExceptionReport> {
        let report = report_element(element).ok_or(GmlError::UnknownDocument)?;
        let legacy = report.local_name() == "ServiceExceptionReport";

        let exceptions: Vec<OwsException> = if legacy {
            report
                .children_named("ServiceException")
                .into_iter()
                .map(|exception| OwsException {
                    exception_code: code(exception, "code"),
                    locator: exception.attr("locator").map(str::to_string),
                    exception_text: match exception.text() {
                        "" => Vec::new(),
                        text => vec![text.to_string()],
                    },
                })
                .collect()
        } else {
            report
                .children_named("Exception")
                .into_iter()
                .map(|exception| OwsException {
                    exception_code: code(exception, "exceptionCode"),
                    locator: exception.attr("locator").map(str::to_string),
                    exception_text: exception
                        .children_named("ExceptionText")
                        .into_iter()
                        .map(|text| text.text().to_string())
                        .collect(),
                })
                .collect()
        };

        let report = OwsExceptionReport {
            version: report
                .attr("version")
                .unwrap_or(DEFAULT_REPORT_VERSION)
                .to_string(),
            exceptions,
        };
        debug!(
            "Exception report version {} with {} exceptions",
            report.version,
            report.exceptions.len()
        );
        Ok(report)
    }

    /// Codes of every exception, in report order.
    pub fn codes(&self) -> Vec<&str> {
        self.exceptions
            .iter()
            .map(|exception| exception.exception_code.as_str())
            .collect()
    }

    /// The report as an OWS 1.1 `ExceptionReport` document.
    pub fn to_xml(&self, pretty: bool) -> Result<String> {
        let mut root = XmlElement::new("ows:ExceptionReport")
            .with_attr("xmlns:ows", OWS_NAMESPACE)
            .with_attr("version", self.version.as_str());

        for exception in &self.exceptions {
            let mut element = XmlElement::new("ows:Exception")
                .with_attr("exceptionCode", exception.exception_code.as_str());
            if let Some(locator) = &exception.locator {
                element = element.with_attr("locator", locator.as_str());
            }
            for text in &exception.exception_text {
                element = element.with_child(XmlElement::new("ows:ExceptionText").with_text(text.as_str()));
            }
            root = root.with_child(element);
        }

        root.to_xml(pretty)
    }
}

fn code(exception: &XmlElement, attribute: &str) -> String {
    exception
        .attr(attribute)
        .filter(|code| !code.trim().is_empty())
        .unwrap_or(UNKNOWN_CODE)
        .to_string()
}

impl fmt::Display for OwsException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.exception_code)?;
        if let Some(locator) = &self.locator {
            write!(f, " at '{}'", locator)?;
        }
        if !self.exception_text.is_empty() {
            write!(f, ": {}", self.exception_text.join("; "))?;
        }
        Ok(())
    }
}

impl fmt::Display for OwsExceptionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.exceptions.as_slice() {
            [] => write!(f, "empty exception report (version {})", self.version),
            [only] => write!(f, "{}", only),
            [first, rest @ ..] => write!(f, "{} (and {} more)", first, rest.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(xml: &str) -> OwsExceptionReport {
        OwsExceptionReport::from_element(&XmlElement::parse(xml).unwrap()).unwrap()
    }

    #[test]
    fn test_two_exceptions_with_two_texts_each() {
        let report = report(
            r#"<ows:ExceptionReport xmlns:ows="http://www.opengis.net/ows/1.1" version="2.0.0">
                 <ows:Exception exceptionCode="InvalidParameterValue" locator="typeName">
                   <ows:ExceptionText>first a</ows:ExceptionText>
                   <ows:ExceptionText>first b</ows:ExceptionText>
                 </ows:Exception>
                 <ows:Exception exceptionCode="OperationProcessingFailed">
                   <ows:ExceptionText>second a</ows:ExceptionText>
                   <ows:ExceptionText>second b</ows:ExceptionText>
                 </ows:Exception>
               </ows:ExceptionReport>"#,
        );

        assert_eq!(report.version, "2.0.0");
        assert_eq!(report.exceptions.len(), 2);
        assert_eq!(report.exceptions[0].exception_text, vec!["first a", "first b"]);
        assert_eq!(report.exceptions[1].exception_text, vec!["second a", "second b"]);
        assert_eq!(report.exceptions[0].locator.as_deref(), Some("typeName"));
        assert_eq!(report.exceptions[1].locator, None);
        assert_eq!(
            report.codes(),
            vec!["InvalidParameterValue", "OperationProcessingFailed"]
        );
    }

    #[test]
    fn test_defaults() {
        let report = report(r#"<ExceptionReport><Exception/></ExceptionReport>"#);
        assert_eq!(report.version, "1.0.0");
        assert_eq!(report.exceptions[0].exception_code, "Unknown");
        assert!(report.exceptions[0].exception_text.is_empty());
    }

    #[test]
    fn test_single_exception_is_a_list() {
        let report = report(
            r#"<ExceptionReport version="1.1.0"><Exception exceptionCode="NoApplicableCode"><ExceptionText>boom</ExceptionText></Exception></ExceptionReport>"#,
        );
        assert_eq!(report.exceptions.len(), 1);
        assert_eq!(report.to_string(), "NoApplicableCode: boom");
    }

    #[test]
    fn test_service_exception_report() {
        let report = report(
            r#"<ServiceExceptionReport version="1.2.0">
                 <ServiceException code="LayerNotDefined" locator="layers">No such layer</ServiceException>
                 <ServiceException>Something else</ServiceException>
               </ServiceExceptionReport>"#,
        );
        assert_eq!(report.version, "1.2.0");
        assert_eq!(report.codes(), vec!["LayerNotDefined", "Unknown"]);
        assert_eq!(report.exceptions[0].exception_text, vec!["No such layer"]);
        assert_eq!(
            report.to_string(),
            "LayerNotDefined at 'layers': No such layer (and 1 more)"
        );
    }

    #[test]
    fn test_not_a_report() {
        let element = XmlElement::parse("<gml:Point xmlns:gml=\"http://www.opengis.net/gml\"/>").unwrap();
        assert!(matches!(
            OwsExceptionReport::from_element(&element),
            Err(GmlError::UnknownDocument)
        ));
    }

    #[test]
    fn test_written_report_reads_back() {
        let original = OwsExceptionReport {
            version: "1.0.0".to_string(),
            exceptions: vec![OwsException {
                exception_code: "MissingParameterValue".to_string(),
                locator: Some("request".to_string()),
                exception_text: vec!["request is required".to_string(), "<none>".to_string()],
            }],
        };
        let xml = original.to_xml(true).unwrap();
        assert!(xml.contains(r#"xmlns:ows="http://www.opengis.net/ows/1.1""#));
        assert!(xml.contains("&lt;none&gt;"));
        assert_eq!(report(&xml), original);
    }
}
