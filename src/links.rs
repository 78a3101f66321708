//! Outbound links for products.

use crate::models::ProductWithStore;

const REAL_REAL_BASE: &str = "https://www.therealreal.com/products";

/// Keyword groups checked in order; the first hit picks the category.
const REAL_REAL_CATEGORIES: &[(&[&str], &str)] = &[
    (&["sneaker", "shoe", "yeezy"], "men/shoes/sneakers"),
    (&["jacket", "coat"], "men/clothing/jackets"),
    (&["shirt", "tee", "t-shirt"], "men/clothing/shirts"),
    (&["pant", "jean", "trouser"], "men/clothing/pants"),
    (&["sweater", "hoodie", "pullover"], "men/clothing/sweaters"),
    (&["watch"], "men/watches"),
    (&["bag", "backpack", "briefcase"], "men/accessories/bags"),
];

/// The stored product URL, or one derived from the store when it has a
/// predictable URL scheme.
pub fn product_link(row: &ProductWithStore) -> Option<String> {
    if let Some(url) = row.product.product_url.as_deref().filter(|u| !u.is_empty()) {
        return Some(url.to_string());
    }

    let store = row.store.as_ref()?;
    if store.name.to_lowercase().contains("real real") {
        return Some(real_real_link(&row.product.name));
    }
    None
}

fn real_real_link(name: &str) -> String {
    let lowered = name.to_lowercase();
    let category = REAL_REAL_CATEGORIES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(_, category)| *category)
        .unwrap_or("men");
    format!("{REAL_REAL_BASE}/{category}/{}", slugify(&lowered))
}

fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.to_lowercase().chars() {
        let c = match c {
            'a'..='z' | '0'..='9' | '-' => c,
            c if c.is_whitespace() => '-',
            _ => continue,
        };
        if c == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(c);
    }
    slug.trim_matches('-').to_string()
}
