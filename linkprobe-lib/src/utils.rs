//! Utility functions for building and validating probe URLs.

use crate::error::LinkProbeError;
use url::Url;

/// Placeholder replaced by the generated subdomain.
pub const SUBDOMAIN_PLACEHOLDER: &str = "{subdomain}";

/// Apple app-site-association file on a Firebase Dynamic Links host.
pub const DEFAULT_TARGET: &str =
    "https://{subdomain}.page.link/.well-known/apple-app-site-association";

/// Substitute a subdomain into a target template.
///
/// ```
/// use linkprobe_lib::{build_probe_url, DEFAULT_TARGET};
///
/// assert_eq!(
///     build_probe_url(DEFAULT_TARGET, "abcde"),
///     "https://abcde.page.link/.well-known/apple-app-site-association"
/// );
/// ```
pub fn build_probe_url(template: &str, subdomain: &str) -> String {
    template.replace(SUBDOMAIN_PLACEHOLDER, subdomain)
}

/// Check that a target template yields usable HTTP(S) URLs.
///
/// The template must contain `{subdomain}` and, once a sample subdomain is
/// substituted, parse as an `http` or `https` URL with a host.
pub fn validate_target(template: &str) -> Result<(), LinkProbeError> {
    let template = template.trim();

    if template.is_empty() {
        return Err(LinkProbeError::invalid_target(
            template,
            "target cannot be empty",
        ));
    }

    if !template.contains(SUBDOMAIN_PLACEHOLDER) {
        return Err(LinkProbeError::invalid_target(
            template,
            format!("target must contain {}", SUBDOMAIN_PLACEHOLDER),
        ));
    }

    let sample = build_probe_url(template, "sample");
    let url = Url::parse(&sample)
        .map_err(|e| LinkProbeError::invalid_target(template, e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(LinkProbeError::invalid_target(
                template,
                format!("unsupported scheme '{}'", other),
            ));
        }
    }

    if url.host_str().is_none() {
        return Err(LinkProbeError::invalid_target(template, "target has no host"));
    }

    Ok(())
}
