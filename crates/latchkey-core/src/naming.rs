//! Photo file naming for enrollment.
//!
//! Filenames follow `<safe-first-token-of-name>_<yyyyMMdd_HHmmss>.<ext>`.
//! Two enrollments of the same first name within the same second produce the
//! same filename; that collision is left to the store's `photo_path`
//! uniqueness constraint (or the file write) to report.

use crate::constants::{FILENAME_FILLER, PHOTO_TIMESTAMP_FORMAT};
use crate::types::PersonName;
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

/// Replace every non-alphanumeric character with the filler character.
///
/// # Examples
///
/// ```
/// use latchkey_core::naming::safe_token;
///
/// assert_eq!(safe_token("O'Brien"), "O_Brien");
/// assert_eq!(safe_token("Ana"), "Ana");
/// ```
pub fn safe_token(token: &str) -> String {
    token
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { FILENAME_FILLER })
        .collect()
}

/// Derive the photo filename for a person enrolled at `taken_at`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use latchkey_core::PersonName;
/// use latchkey_core::naming::photo_filename;
///
/// let name = PersonName::new("Ana Maria").unwrap();
/// let at = NaiveDate::from_ymd_opt(2025, 3, 9)
///     .unwrap()
///     .and_hms_opt(7, 5, 1)
///     .unwrap();
///
/// assert_eq!(photo_filename(&name, at, "jpg"), "Ana_20250309_070501.jpg");
/// ```
pub fn photo_filename(name: &PersonName, taken_at: NaiveDateTime, extension: &str) -> String {
    format!(
        "{}_{}.{}",
        safe_token(name.first_token()),
        taken_at.format(PHOTO_TIMESTAMP_FORMAT),
        extension.trim_start_matches('.')
    )
}

/// Path stored in the identity record: the photos directory joined with the
/// filename, relative to the base directory.
pub fn relative_photo_path(photos_dir: &Path, filename: &str) -> PathBuf {
    photos_dir.join(filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use rstest::rstest;

    fn at(second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, 18)
            .unwrap()
            .and_hms_opt(14, 30, second)
            .unwrap()
    }

    #[rstest]
    #[case("Bob", "Bob_20251018_143000.jpg")]
    #[case("Bob Marley", "Bob_20251018_143000.jpg")]
    #[case("jean-luc picard", "jean_luc_20251018_143000.jpg")]
    #[case("  Zoë  ", "Zoë_20251018_143000.jpg")]
    #[case("a.b/c", "a_b_c_20251018_143000.jpg")]
    fn test_photo_filename(#[case] raw: &str, #[case] expected: &str) {
        let name = PersonName::new(raw).unwrap();
        assert_eq!(photo_filename(&name, at(0), "jpg"), expected);
    }

    #[test]
    fn test_extension_leading_dot_is_ignored() {
        let name = PersonName::new("Ana").unwrap();
        assert_eq!(photo_filename(&name, at(0), ".png"), "Ana_20251018_143000.png");
    }

    #[test]
    fn test_same_name_same_second_collides() {
        let first = PersonName::new("Ana Souza").unwrap();
        let second = PersonName::new("Ana Lima").unwrap();
        assert_eq!(
            photo_filename(&first, at(5), "jpg"),
            photo_filename(&second, at(5), "jpg")
        );
    }

    #[test]
    fn test_relative_photo_path() {
        let path = relative_photo_path(Path::new("photos"), "Ana_20251018_143000.jpg");
        assert_eq!(path, PathBuf::from("photos/Ana_20251018_143000.jpg"));
    }

    proptest! {
        #[test]
        fn prop_distinct_tokens_same_second_do_not_collide(
            a in "[A-Za-z0-9]{1,12}",
            b in "[A-Za-z0-9]{1,12}",
        ) {
            prop_assume!(a != b);
            let first = PersonName::new(&a).unwrap();
            let second = PersonName::new(&b).unwrap();
            prop_assert_ne!(
                photo_filename(&first, at(1), "jpg"),
                photo_filename(&second, at(1), "jpg")
            );
        }

        #[test]
        fn prop_filename_has_no_separators(raw in "[^\\s]{1,8}( [^\\s]{1,8})?") {
            let name = PersonName::new(&raw).unwrap();
            let file = photo_filename(&name, at(2), "jpg");
            prop_assert!(!file.contains('/'));
            prop_assert!(!file.contains('\\'));
            prop_assert!(!file.contains(' '));
        }
    }
}
