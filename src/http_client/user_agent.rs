//! User agent handling for HTTP requests.

pub const USER_AGENT: &str = concat!(
    "lodcensus/",
    env!("CARGO_PKG_VERSION"),
    " (LOD endpoint census; academic research)"
);

/// Resolve the user agent from the configured value. Blank values fall
/// back to the default.
pub fn resolve_user_agent(config: Option<&str>) -> String {
    match config.map(str::trim) {
        None | Some("") => USER_AGENT.to_string(),
        Some(custom) => custom.to_string(),
    }
}
