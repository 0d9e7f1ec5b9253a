//! Naming conventions used when a remote does not describe itself.
//!
//! A remote that publishes no manifest (or a partial one) still gets a complete
//! descriptor: every missing field is derived from its technical name and base URL.

use url::Url;

use crate::error::{CoreError, Result};

/// Exposed module loaded when a manifest does not name one.
pub const DEFAULT_EXPOSED_MODULE: &str = "./Routes";

/// File name of a remote's federation entry point, relative to its base URL.
pub const REMOTE_ENTRY_FILE: &str = "remoteEntry.js";

/// Path of a remote's manifest, relative to its base URL.
pub const MANIFEST_PATH: &str = "assets/manifest.json";

/// Technical names whose route path is not the name itself.
pub const ROUTE_PATH_OVERRIDES: &[(&str, &str)] = &[
    ("patient-records", "patients"),
    ("appointment-scheduling", "appointments"),
];

/// Title-cases a kebab-case (or snake_case) technical name.
///
/// `appointment-scheduling` becomes `Appointment Scheduling`.
pub fn title_case(name: &str) -> String {
    name.split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Route path for a remote: the override if one exists, otherwise the name itself.
pub fn default_route_path(name: &str) -> String {
    ROUTE_PATH_OVERRIDES
        .iter()
        .find(|(technical, _)| *technical == name)
        .map(|(_, route)| (*route).to_string())
        .unwrap_or_else(|| name.to_string())
}

/// Route path without surrounding whitespace or slashes.
///
/// `"/records/patients/"` becomes `"records/patients"`; `"/"` becomes `""`.
pub fn normalize_route_path(path: &str) -> &str {
    path.trim().trim_matches('/')
}

/// Strips trailing slashes so that paths can be appended with a single `/`.
pub fn normalize_base_url(base_url: &str) -> &str {
    base_url.trim_end_matches('/')
}

/// Federation entry URL of a remote: `{baseUrl}/remoteEntry.js`.
pub fn entry_url_for(base_url: &str) -> String {
    format!("{}/{}", normalize_base_url(base_url), REMOTE_ENTRY_FILE)
}

/// Manifest URL of a remote: `{baseUrl}/assets/manifest.json`.
pub fn manifest_url_for(base_url: &str) -> String {
    format!("{}/{}", normalize_base_url(base_url), MANIFEST_PATH)
}

/// Checks that a base URL is an absolute http(s) URL.
pub fn validate_base_url(base_url: &str) -> Result<Url> {
    let parsed = Url::parse(base_url)
        .map_err(|e| CoreError::invalid_base_url(base_url, e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(CoreError::invalid_base_url(
            base_url,
            format!("unsupported scheme '{other}'"),
        )),
    }
}

/// Checks that a technical remote name is usable as a registry key and path segment.
pub fn is_valid_remote_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
