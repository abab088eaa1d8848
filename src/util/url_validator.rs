use thiserror::Error;
use url::Url;

/// Reasons an item URL is refused before handing it to the system opener.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),

    #[error("URL contains control characters")]
    ControlCharacters,
}

/// Validate an item URL before passing it to `open::that`.
///
/// SEC: item URLs come from arbitrary feeds. Only http(s) is allowed so a
/// feed cannot make the opener launch `file:`, `javascript:` or custom
/// protocol handlers, and raw control characters are refused before parsing
/// (the parser would silently strip some of them).
///
/// Private and loopback hosts are allowed: the URL is opened in the user's
/// browser, not fetched by this process.
pub fn validate_url_for_open(url_str: &str) -> Result<Url, UrlValidationError> {
    let trimmed = url_str.trim();
    if trimmed.chars().any(char::is_control) {
        return Err(UrlValidationError::ControlCharacters);
    }

    let url = Url::parse(trimmed)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }
}
