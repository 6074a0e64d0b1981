//! URL-safe slug generation shared by categories, items and keywords.
//!
//! The pipeline is transliterate → slugify → uniqueness suffix. Cyrillic
//! input (Russian plus the extra Uzbek-Cyrillic letters) is romanized first
//! so " Телефоны " becomes "telefony" rather than an empty slug; everything
//! else is reduced to lowercase ASCII words joined by single dashes.
//! Uniqueness is the caller's knowledge: [`generate_unique_slug`] takes an
//! `exists` predicate and appends `-1`, `-2`, … until it clears.

/// Romanizes Cyrillic characters, passing everything else through unchanged.
///
/// Both cases map to lowercase Latin; the slug pipeline lowercases the rest
/// anyway. Covers the Russian alphabet and the Uzbek-Cyrillic additions
/// (ў қ ғ ҳ).
pub fn transliterate(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match romanize(c) {
            Some(later) => out.push_str(later),
            None => out.push(c),
        }
    }
    out
}

fn romanize(c: char) -> Option<&'static str> {
    let lower = c.to_lowercase().next().unwrap_or(c);
    let mapped = match lower {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "y",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "kh",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "shch",
        'ъ' => "",
        'ы' => "y",
        'ь' => "",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        // Uzbek-Cyrillic additions
        'ў' => "o",
        'қ' => "q",
        'ғ' => "g",
        'ҳ' => "h",
        _ => return None,
    };
    Some(mapped)
}

/// Reduces text to a lowercase ASCII slug: alphanumerics and underscores
/// survive, whitespace and dash runs collapse to a single dash, everything
/// else is dropped. Non-ASCII that was not transliterated is dropped too,
/// so the result may be empty.
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() || c == '_' {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        } else if c.is_whitespace() || c == '-' {
            pending_dash = true;
        }
    }
    out.trim_matches(|c| c == '-' || c == '_').to_string()
}

/// Transliterates and slugifies in one step; the base form every unique
/// slug starts from.
pub fn slug_source(text: &str) -> String {
    slugify(&transliterate(text))
}

/// Builds a slug from `source` and suffixes `-1`, `-2`, … while `exists`
/// reports a collision. The predicate decides the scope (one entity type,
/// usually excluding the record being re-saved). Returns an empty string
/// for blank input, matching the behavior of records saved without a title.
pub fn generate_unique_slug(source: &str, exists: impl Fn(&str) -> bool) -> String {
    if source.trim().is_empty() {
        return String::new();
    }

    let base = slug_source(source);
    let mut candidate = base.clone();
    let mut counter: u32 = 1;
    while exists(&candidate) {
        candidate = format!("{base}-{counter}");
        counter += 1;
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("  Mobile   Phones & Cases "), "mobile-phones-cases");
        assert_eq!(slugify("already-a-slug"), "already-a-slug");
        assert_eq!(slugify("under_score kept"), "under_score-kept");
    }

    #[test]
    fn slugify_drops_unknown_unicode() {
        assert_eq!(slugify("oʻzbekcha"), "ozbekcha");
        assert_eq!(slugify("☂☂☂"), "");
    }

    #[test]
    fn transliterates_russian_titles() {
        assert_eq!(slug_source("Телефоны"), "telefony");
        assert_eq!(slug_source("Бытовая техника"), "bytovaya-tekhnika");
        assert_eq!(slug_source("Ещё раз"), "eshche-raz");
    }

    #[test]
    fn transliterates_uzbek_cyrillic() {
        assert_eq!(slug_source("Қишлоқ хўжалиги"), "qishloq-khojaligi");
    }

    #[test]
    fn unique_slug_suffixes_on_collision() {
        let taken: HashSet<&str> = ["phones", "phones-1"].into_iter().collect();
        let slug = generate_unique_slug("Phones", |s| taken.contains(s));
        assert_eq!(slug, "phones-2");
    }

    #[test]
    fn unique_slug_keeps_base_when_free() {
        let slug = generate_unique_slug("Phones", |_| false);
        assert_eq!(slug, "phones");
    }

    #[test]
    fn blank_source_yields_empty_slug() {
        assert_eq!(generate_unique_slug("   ", |_| false), "");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn slugs_are_url_safe(input in ".*") {
                let slug = slug_source(&input);
                prop_assert!(slug
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_'));
                prop_assert!(!slug.starts_with('-') && !slug.ends_with('-'));
            }

            #[test]
            fn slugify_is_idempotent(input in ".*") {
                let once = slug_source(&input);
                prop_assert_eq!(slugify(&once), once.clone());
            }
        }
    }
}
