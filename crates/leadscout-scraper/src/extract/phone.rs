//! Phone number normalization and text scanning.

use once_cell::sync::Lazy;
use regex::Regex;

static SPANISH_PHONE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+34|0034)?[\s.-]?[6-9]\d{2}[\s.-]?\d{3}[\s.-]?\d{3}")
        .expect("valid phone regex")
});

/// Spanish subscriber numbers have nine digits.
pub const MIN_PHONE_DIGITS: usize = 9;

/// Strip everything except digits and `+`. Returns `None` when fewer than
/// [`MIN_PHONE_DIGITS`] digits are left, so masked or partial numbers never
/// pass as a phone.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let normalized: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    let digits = normalized.chars().filter(char::is_ascii_digit).count();
    (digits >= MIN_PHONE_DIGITS).then_some(normalized)
}

/// First Spanish mobile or landline number in free text, normalized.
pub fn find_phone_in_text(text: &str) -> Option<String> {
    SPANISH_PHONE_REGEX
        .find(text)
        .and_then(|m| normalize_phone(m.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("+34 666-111.222").as_deref(), Some("+34666111222"));
        assert_eq!(normalize_phone(" 93 123 45 67 ").as_deref(), Some("931234567"));
        assert_eq!(normalize_phone("Ver teléfono"), None);
        assert_eq!(normalize_phone("+"), None);
        assert_eq!(normalize_phone("93 XXX XX XX"), None);
        assert_eq!(normalize_phone("666 11"), None);
    }

    #[test]
    fn test_find_phone_in_description() {
        assert_eq!(
            find_phone_in_text("Llámame al 666 111 222 o al fijo").as_deref(),
            Some("666111222")
        );
        assert_eq!(
            find_phone_in_text("Contacto: +34 932.123.456 (tardes)").as_deref(),
            Some("+34932123456")
        );
        assert_eq!(
            find_phone_in_text("Tel 0034-711-222-333").as_deref(),
            Some("0034711222333")
        );
    }

    #[test]
    fn test_no_phone_in_description() {
        assert_eq!(find_phone_in_text("Piso de 80 m2, 3 habitaciones"), None);
        // Numbers starting below 6 are not Spanish phone prefixes
        assert_eq!(find_phone_in_text("Referencia 512 345 678"), None);
    }
}
