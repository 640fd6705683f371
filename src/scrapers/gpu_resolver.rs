// src/scrapers/gpu_resolver.rs

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Marketing prefixes that carry no model information
    static ref VENDOR_WORDS: Regex = Regex::new(r"(?i)\b(nvidia|geforce|tesla|quadro)\b").unwrap();

    static ref NON_ALNUM: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
}

/// Collapse a provider's native GPU name into a lowercase, space-separated
/// token form: "NVIDIA H100 80GB HBM3" -> "h100 80gb hbm3".
pub fn normalize_gpu_name(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let without_vendor = VENDOR_WORDS.replace_all(&lowered, " ");
    let tokens = NON_ALNUM.replace_all(&without_vendor, " ");
    tokens.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Look up a canonical slug for a raw provider name. Tries an exact match
/// on the normalized form first, then falls back to whole-token matching
/// (every token of the pattern present in the name). First match wins, so
/// tables list specific patterns before general ones.
pub fn resolve_slug<'a>(table: &[(&str, &'a str)], raw: &str) -> Option<&'a str> {
    let normalized = normalize_gpu_name(raw);
    if normalized.is_empty() {
        return None;
    }

    if let Some((_, slug)) = table.iter().find(|(pattern, _)| *pattern == normalized) {
        return Some(slug);
    }

    let tokens: Vec<&str> = normalized.split(' ').collect();
    table
        .iter()
        .find(|(pattern, _)| pattern.split(' ').all(|p| tokens.contains(&p)))
        .map(|(_, slug)| *slug)
}
