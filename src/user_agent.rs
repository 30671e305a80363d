//! Identity header sent with every request.
//!
//! The listing site serves plain browser traffic; a bare browser token is
//! enough and matches what the site has always seen from this tool.

/// Default User-Agent for list pages, detail pages and image downloads.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

/// Returns the User-Agent to use, falling back to [`DEFAULT_USER_AGENT`]
/// when the configured value is blank.
#[must_use]
pub fn resolve_user_agent(configured: Option<&str>) -> String {
    configured
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_USER_AGENT)
        .to_string()
}
