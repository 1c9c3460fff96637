//! Display-name derivation for raw column names.

/// Turns a raw column name into something a person would read.
pub trait NameHumanizer: Send + Sync {
    fn to_display_name(&self, raw_name: &str) -> String;
}

/// Word-splitting humanizer.
///
/// Splits on `_`, `-`, whitespace and lower→upper camelCase boundaries,
/// capitalizes each word and spells `id` as `ID`. A trailing `id` word is
/// dropped when other words precede it (`user_id` → `User`).
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHumanizer;

impl NameHumanizer for DefaultHumanizer {
    fn to_display_name(&self, raw_name: &str) -> String {
        let mut words = split_words(raw_name);
        if words.len() > 1 && words.last().is_some_and(|w| w.eq_ignore_ascii_case("id")) {
            words.pop();
        }
        if words.is_empty() {
            return raw_name.trim().to_owned();
        }
        words
            .iter()
            .map(|w| capitalize(w))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn split_words(raw: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for ch in raw.chars() {
        if ch == '_' || ch == '-' || ch.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        current.push(ch);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    if word.eq_ignore_ascii_case("id") {
        return "ID".to_owned();
    }
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
