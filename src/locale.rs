//! Locale resolution.

use crate::types::DEFAULT_LOCALE;

const LOCALE_VARS: [&str; 3] = ["LC_ALL", "LC_MESSAGES", "LANG"];

/// Resolves the locale to search with, falling back to [`DEFAULT_LOCALE`].
pub fn resolve_locale(preference: Option<&str>) -> String {
  resolve_locale_or(preference, DEFAULT_LOCALE)
}

/// Resolves the locale to search with: the caller's preference when set,
/// else the ambient locale of the process, else `fallback`.
pub fn resolve_locale_or(preference: Option<&str>, fallback: &str) -> String {
  preference
    .map(str::trim)
    .filter(|locale| !locale.is_empty())
    .map(str::to_string)
    .or_else(ambient_locale)
    .unwrap_or_else(|| fallback.to_string())
}

/// The language of the process locale, read from `LC_ALL`, `LC_MESSAGES` and
/// `LANG` in that order.
pub fn ambient_locale() -> Option<String> {
  LOCALE_VARS
    .iter()
    .filter_map(|var| std::env::var(var).ok())
    .find_map(|value| language_subtag(&value))
}

/// Extracts the language from a POSIX locale string, e.g. `fr_FR.UTF-8` ->
/// `fr`. `C` and `POSIX` carry no language.
pub fn language_subtag(raw: &str) -> Option<String> {
  let language = raw.split(['_', '-', '.', '@']).next()?.trim();
  if language.len() < 2
    || language.eq_ignore_ascii_case("posix")
    || !language.chars().all(|c| c.is_ascii_alphabetic())
  {
    return None;
  }
  Some(language.to_ascii_lowercase())
}
