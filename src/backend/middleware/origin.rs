//! Origin checks for the WebSocket upgrade

/// Whether a browser `Origin` may open a chat connection
///
/// An empty allow list refuses every upgrade. Otherwise clients that send
/// no origin (native apps, CLI tools) are allowed, `*` admits everything,
/// and other entries match case-insensitively.
pub fn origin_allowed(origin: &str, allowed: &[String]) -> bool {
    if allowed.is_empty() {
        return false;
    }
    if origin.is_empty() {
        return true;
    }
    allowed
        .iter()
        .filter(|entry| !entry.is_empty())
        .any(|entry| entry == "*" || entry.eq_ignore_ascii_case(origin))
}
