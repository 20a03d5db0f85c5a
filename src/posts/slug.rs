const MAX_SLUG_LEN: usize = 128;

/// Slugs double as file names, so only lowercase ASCII letters, digits and
/// hyphens are accepted. Anything else (`/`, `.`, `%`) is rejected outright.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= MAX_SLUG_LEN
        && slug
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

// "Hello, World!  Again" -> "hello-world-again"
pub fn generate_slug(title: &str) -> String {
    let cleaned: String = title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '-')
        .collect();

    let slug = cleaned.split_whitespace().collect::<Vec<_>>().join("-");
    let slug = slug.trim_matches('-');
    slug.chars().take(MAX_SLUG_LEN).collect::<String>().trim_end_matches('-').to_string()
}
