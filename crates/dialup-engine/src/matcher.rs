//! Allowlist matching.

/// Find the allowlist entry a hostname belongs to.
///
/// `hostname` matches entry `d` when it equals `d` or ends with `".d"`.
/// The first matching entry in list order wins; overlapping entries
/// (e.g. both `example.com` and `sub.example.com`) therefore resolve to
/// whichever appears first.
pub fn match_domain<'a>(hostname: &str, allowlist: &'a [String]) -> Option<&'a str> {
    allowlist
        .iter()
        .map(String::as_str)
        .find(|domain| is_same_or_subdomain(hostname, domain))
}

fn is_same_or_subdomain(hostname: &str, domain: &str) -> bool {
    if domain.is_empty() {
        return false;
    }
    match hostname.strip_suffix(domain) {
        Some("") => true,
        Some(rest) => rest.ends_with('.'),
        None => false,
    }
}
