// core/src/slug.rs

/// URL-friendly slug: lowercase, letters and digits kept, whitespace turned
/// into `-`, everything else dropped, dashes collapsed and trimmed.
pub fn slugify(text: &str) -> String {
  let mut slug = String::with_capacity(text.len());
  for c in text.chars().flat_map(char::to_lowercase) {
    let next = if c.is_alphanumeric() {
      c
    } else if c.is_whitespace() || c == '-' {
      '-'
    } else {
      continue;
    };
    if next == '-' && slug.ends_with('-') {
      continue;
    }
    slug.push(next);
  }
  slug.trim_matches('-').to_string()
}
