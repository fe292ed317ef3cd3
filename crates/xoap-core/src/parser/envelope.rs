//! Provider error envelope classification
//!
//! Both feeds report request-level failures as a document whose root is
//! `<error>` with one or more `<err type="N">` children.

use tracing::warn;

use crate::document::Element;
use crate::error::{ApiError, Result};
use crate::types::leading_int;

/// Inspect a document root for a provider error envelope.
///
/// Returns `None` unless the root tag is exactly `error`. An envelope whose
/// `err` children carry no `type` reads as `ApiError::UnknownError`.
///
/// # Examples
/// ```
/// use xoap_core::document::parse_document;
/// use xoap_core::parser::classify;
/// use xoap_core::ApiError;
///
/// let root = parse_document(b"<error><err type=\"102\"/></error>").unwrap();
/// assert_eq!(classify(&root), Some(ApiError::InvalidLicenseKey));
/// ```
pub fn classify(root: &Element) -> Option<ApiError> {
    if !root.is("error") {
        return None;
    }

    let error = root
        .children_named("err")
        .find_map(|err| err.attr("type"))
        .map(|code| ApiError::from_code(leading_int(code)))
        .unwrap_or(ApiError::UnknownError);

    let detail = root
        .child("err")
        .map(|err| err.content().trim().to_string())
        .unwrap_or_default();
    warn!(code = error.code(), %error, detail = %detail, "provider returned an error envelope");

    Some(error)
}

/// `classify` as a `Result`, for use with `?` ahead of extraction.
pub fn ensure_no_error(root: &Element) -> Result<()> {
    match classify(root) {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}
