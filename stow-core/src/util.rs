use std::{
    borrow::Cow,
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

/// Calls `f` for every value, writing `separator` between the outputs that are not empty.
pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut len = out.len();
    for v in values {
        if out.len() > len {
            out.push_str(separator);
        }
        len = out.len();
        f(out, v);
    }
}

pub fn hash_of<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Shortens long statements before they reach the logs.
pub fn truncate_long(text: &str) -> Cow<'_, str> {
    const LIMIT: usize = 497;
    if text.len() <= LIMIT {
        return Cow::Borrowed(text.trim_end());
    }
    let end = text
        .char_indices()
        .map(|(i, _)| i)
        .take_while(|i| *i <= LIMIT)
        .last()
        .unwrap_or_default();
    Cow::Owned(format!("{}...", text[..end].trim_end()))
}
