use std::env;
use std::sync::OnceLock;

static RELAX_RS_FAIL_FAST: OnceLock<Option<bool>> = OnceLock::new();

fn parse_bool(value: &str) -> bool {
    let normalized = value.trim().to_ascii_lowercase();
    matches!(normalized.as_str(), "1" | "true" | "yes" | "on")
}

/// `RELAX_RS_FAIL_FAST`, read once. `None` when unset or empty.
pub(crate) fn fail_fast_override() -> Option<bool> {
    *RELAX_RS_FAIL_FAST.get_or_init(|| match env::var("RELAX_RS_FAIL_FAST") {
        Ok(value) if !value.trim().is_empty() => Some(parse_bool(&value)),
        _ => None,
    })
}
