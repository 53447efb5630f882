/// Derive a URL-safe identifier from a display name.
///
/// Accented Latin letters fold to their base letter, any other non-ASCII
/// character is dropped, and runs of whitespace or hyphens collapse into a
/// single hyphen. The result never starts or ends with `-` or `_`, and may be
/// empty when the input has no letters or digits.
pub fn slugify(value: &str) -> String {
    let mut ascii = String::with_capacity(value.len());
    for ch in value.chars() {
        if ch.is_ascii() {
            ascii.push(ch.to_ascii_lowercase());
        } else if let Some(folded) = fold_latin(ch) {
            ascii.push_str(folded);
        }
    }

    let mut slug = String::with_capacity(ascii.len());
    let mut pending_dash = false;
    for ch in ascii.chars() {
        match ch {
            'a'..='z' | '0'..='9' | '_' => {
                if pending_dash {
                    slug.push('-');
                    pending_dash = false;
                }
                slug.push(ch);
            },
            '-' => pending_dash = true,
            ch if ch.is_ascii_whitespace() => pending_dash = true,
            _ => {},
        }
    }

    slug.trim_matches(|c| c == '-' || c == '_').to_string()
}

fn fold_latin(ch: char) -> Option<&'static str> {
    let folded = match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' | 'Ā' | 'Ă' | 'Ą' => "a",
        'ç' | 'ć' | 'č' | 'Ç' | 'Ć' | 'Č' => "c",
        'ď' | 'Ď' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ę' | 'ě' => "e",
        'È' | 'É' | 'Ê' | 'Ë' | 'Ē' | 'Ę' | 'Ě' => "e",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'Ì' | 'Í' | 'Î' | 'Ï' | 'Ī' => "i",
        'ñ' | 'ń' | 'ň' | 'Ñ' | 'Ń' | 'Ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ō' | 'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ō' => "o",
        'ř' | 'Ř' => "r",
        'ś' | 'š' | 'Ś' | 'Š' => "s",
        'ť' | 'Ť' => "t",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'Ù' | 'Ú' | 'Û' | 'Ü' | 'Ū' | 'Ů' => "u",
        'ý' | 'ÿ' | 'Ý' => "y",
        'ź' | 'ż' | 'ž' | 'Ź' | 'Ż' | 'Ž' => "z",
        _ => return None,
    };
    Some(folded)
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn lowercases_and_joins_words() {
        assert_eq!(slugify("David Fincher"), "david-fincher");
        assert_eq!(slugify("Fight Club"), "fight-club");
    }

    #[test]
    fn strips_punctuation_and_edges() {
        assert_eq!(slugify("  Amélie!  "), "amelie");
        assert_eq!(slugify("Hello -- World_"), "hello-world");
        assert_eq!(slugify("Spider-Man: No Way Home"), "spider-man-no-way-home");
    }

    #[test]
    fn keeps_inner_underscores() {
        assert_eq!(slugify("snake_case name"), "snake_case-name");
    }

    #[test]
    fn drops_letters_without_ascii_base() {
        assert_eq!(slugify("Łódź"), "odz");
        assert_eq!(slugify("!!!"), "");
    }
}
