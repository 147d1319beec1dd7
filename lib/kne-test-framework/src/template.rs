//! Placeholder substitution for templated testbed files.
//!
//! REST topology configurations and the traffic-client options file ship as
//! templates with well-known placeholders that get substituted per run.

/// Placeholder for the ixia-c release in REST topology templates.
pub const RELEASE_PLACEHOLDER: &str = "IXIA_C_RELEASE";

/// Placeholder for the target namespace in the client options template.
pub const NAMESPACE_PLACEHOLDER: &str = "IXIA_C_NAMESPACE";

/// Render a REST topology configuration for a concrete release.
pub fn render_release(template: &str, release: &str) -> String {
    template.replace(RELEASE_PLACEHOLDER, release)
}

/// Render the client options for a concrete namespace.
pub fn render_namespace(template: &str, namespace: &str) -> String {
    template.replace(NAMESPACE_PLACEHOLDER, namespace)
}
