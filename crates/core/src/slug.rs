//! URL-safe identifiers derived from display names.

/// Derive a slug from free text: accents folded to ASCII, lowercased, runs of anything else
/// collapsed to a single `-`, no leading or trailing `-`.
///
/// `"Respiratório"` becomes `"respiratorio"`; `"Infecção urinária"` becomes
/// `"infeccao-urinaria"`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for ch in text.chars().flat_map(char::to_lowercase) {
        match fold_accent(ch) {
            Some(c) if c.is_ascii_alphanumeric() => {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push(c);
            }
            _ => pending_dash = true,
        }
    }

    slug
}

/// Case- and accent-insensitive key for ordering display names.
///
/// Unlike [`slugify`] it keeps spaces and punctuation, so `"Úlcera"` orders with `"u"` names
/// instead of after `"z"`.
pub fn sort_key(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(|ch| fold_accent(ch).unwrap_or(ch))
        .collect()
}

/// Map a lowercase Latin letter with a diacritic to its base letter.
fn fold_accent(ch: char) -> Option<char> {
    let folded = match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        c if c.is_ascii() => c,
        _ => return None,
    };
    Some(folded)
}
