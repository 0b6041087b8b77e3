//! TLD name canonicalization.
//!
//! The canonical form of a name is its IDNA ASCII form (UTS #46 with
//! transitional mapping, so `ß` becomes `ss`) without a trailing dot. Names
//! whose labels cannot be encoded, or do not fit DNS length limits, have no
//! canonical form.

use thiserror::Error;

/// A name with no canonical form.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("'{name}' is not a valid hostname: {reason}")]
pub struct IdentityError {
    pub name: String,
    pub reason: String,
}

/// Canonical form of a hostname or TLD string.
///
/// ```rust
/// use tld_timetable::identity::canonicalize_hostname;
///
/// assert_eq!(canonicalize_hostname("Example.").unwrap(), "example");
/// assert_eq!(canonicalize_hostname("みんな").unwrap(), "xn--q9jyb4c");
/// assert_eq!(canonicalize_hostname("co.uk").unwrap(), "co.uk");
/// assert!(canonicalize_hostname(&"a".repeat(64)).is_err());
/// ```
pub fn canonicalize_hostname(name: &str) -> Result<String, IdentityError> {
    let trimmed = name.strip_suffix('.').unwrap_or(name);
    idna::Config::default()
        .transitional_processing(true)
        .verify_dns_length(true)
        .to_ascii(trimmed)
        .map_err(|errors| IdentityError {
            name: name.to_string(),
            reason: format!("{errors:?}"),
        })
}

/// Whether `name` is already in canonical form.
pub fn is_canonical(name: &str) -> bool {
    canonicalize_hostname(name).map_or(false, |canonical| canonical == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_names_are_lowercased() {
        assert_eq!(canonicalize_hostname("FOO").unwrap(), "foo");
        assert!(is_canonical("foo"));
        assert!(!is_canonical("Foo"));
    }

    #[test]
    fn trailing_dot_is_removed() {
        assert_eq!(canonicalize_hostname("foo.").unwrap(), "foo");
    }

    #[test]
    fn unicode_labels_become_punycode() {
        assert_eq!(canonicalize_hostname("みんな").unwrap(), "xn--q9jyb4c");
        assert_eq!(canonicalize_hostname("bücher").unwrap(), "xn--bcher-kva");
        assert_eq!(
            canonicalize_hostname("例え.テスト").unwrap(),
            "xn--r8jz45g.xn--zckzah"
        );
    }

    #[test]
    fn sharp_s_maps_to_ss() {
        assert_eq!(canonicalize_hostname("ß").unwrap(), "ss");
        assert!(!is_canonical("ß"));
    }

    #[test]
    fn punycode_names_are_already_canonical() {
        assert!(is_canonical("xn--q9jyb4c"));
        assert!(!is_canonical("みんな"));
    }

    #[test]
    fn multipart_names_keep_their_labels() {
        assert_eq!(canonicalize_hostname("Co.UK").unwrap(), "co.uk");
    }

    #[test]
    fn labels_over_63_octets_have_no_canonical_form() {
        assert!(canonicalize_hostname(&"a".repeat(63)).is_ok());
        assert!(canonicalize_hostname(&"a".repeat(64)).is_err());
        assert!(!is_canonical(&"a".repeat(64)));
    }

    #[test]
    fn oversized_unicode_label_is_never_kept_raw() {
        let name = format!("{}\u{1F600}", "a".repeat(40_000));

        let error = canonicalize_hostname(&name).unwrap_err();
        assert_eq!(error.name, name);
        assert!(!is_canonical(&name));
    }
}
