//! Location search results parser
//!
//! A TWCi search response is a flat list of `<loc id="..">Name</loc>`
//! elements under the root.

use crate::document::Element;
use crate::error::Result;
use crate::types::LocationCandidate;

use super::envelope::ensure_no_error;
use super::text;

/// Parse every `loc` element of a search response, in document order.
///
/// Zero matches is a valid, empty result.
///
/// # Returns
/// * `Ok(Vec<LocationCandidate>)` with one entry per `loc` element
/// * `Err(XoapError::Api)` if the response is an error envelope
pub fn parse_locations(root: &Element) -> Result<Vec<LocationCandidate>> {
    ensure_no_error(root)?;

    let candidates = root
        .children_named("loc")
        .map(|loc| LocationCandidate {
            id: loc.attr("id").unwrap_or_default().to_string(),
            name: text(loc),
        })
        .collect();

    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse_document;
    use crate::error::{ApiError, XoapError};

    fn parse(xml: &str) -> Result<Vec<LocationCandidate>> {
        parse_locations(&parse_document(xml.as_bytes())?)
    }

    #[test]
    fn test_parse_search_results() {
        let results = parse(include_str!("../../tests/fixtures/search.xml")).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(
            results[0],
            LocationCandidate {
                id: "USNY1232".to_string(),
                name: "Rochester, NY".to_string(),
            }
        );
        assert_eq!(results[1].id, "USMN0637");
        assert_eq!(results[2].name, "Rochester, MI");
    }

    #[test]
    fn test_parse_empty_search() {
        let results = parse(include_str!("../../tests/fixtures/search_empty.xml")).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_other_elements_are_ignored() {
        let results = parse(r#"<search><note>x</note><loc id="A">One</loc></search>"#).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "A");
    }

    #[test]
    fn test_loc_without_id_keeps_name() {
        let results = parse("<search><loc>Somewhere</loc></search>").unwrap();
        assert_eq!(results[0].id, "");
        assert_eq!(results[0].name, "Somewhere");
    }

    #[test]
    fn test_search_error_envelope() {
        assert!(matches!(
            parse(r#"<error><err type="1">No location provided</err></error>"#),
            Err(XoapError::Api(ApiError::NoLocation))
        ));
    }
}
