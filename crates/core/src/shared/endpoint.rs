use std::fmt;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EndpointError {
    #[error("backend URL is not set")]
    Unset,
    #[error("invalid backend URL '{url}': {reason}")]
    Invalid { url: String, reason: String },
    #[error("backend URL must use http or https, got '{0}'")]
    UnsupportedScheme(String),
}

/// Root URL of the detection service. Every request path and every relative
/// image URL returned by the service is resolved against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseEndpoint(String);

impl BaseEndpoint {
    /// Validates an absolute http(s) URL. Trailing slashes are dropped so that
    /// service paths can be appended verbatim.
    pub fn parse(raw: &str) -> Result<Self, EndpointError> {
        let trimmed = raw.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(EndpointError::Unset);
        }
        let url = reqwest::Url::parse(trimmed).map_err(|e| EndpointError::Invalid {
            url: trimmed.to_string(),
            reason: e.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(Self(trimmed.to_string())),
            other => Err(EndpointError::UnsupportedScheme(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// URL of a service route such as `upload` or `results/4`.
    pub fn join(&self, path: &str) -> String {
        format!("{}/{}", self.0, path.trim_start_matches('/'))
    }

    /// Resolves a relative image URL from the service by prefixing the base.
    pub fn resolve_image(&self, image_url: &str) -> String {
        if image_url.starts_with('/') {
            format!("{}{}", self.0, image_url)
        } else {
            format!("{}/{}", self.0, image_url)
        }
    }
}

impl fmt::Display for BaseEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
