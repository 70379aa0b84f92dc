//! Storage key generation.
//!
//! Keys have the shape `<sanitized-base>-<unix-millis>-<random><ext>`, so two
//! uploads of the same file never share a key.

use chrono::Utc;
use rand::Rng;

/// Upper bound (exclusive) of the random component of a storage key.
const RANDOM_SUFFIX_BOUND: u32 = 1_000_000_000;

/// Replace every character outside `[A-Za-z0-9.]` with `_`.
#[must_use]
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Split a filename into base name and extension (including the leading dot).
///
/// A dot that is only preceded by other dots (`.env`, `..`) does not start an
/// extension.
#[must_use]
pub fn split_extension(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(idx) if filename[..idx].chars().any(|c| c != '.') => filename.split_at(idx),
        _ => (filename, ""),
    }
}

/// Generate a fresh storage key for an uploaded file.
#[must_use]
pub fn generate_storage_key(original_filename: &str) -> String {
    let random = rand::rng().random_range(0..RANDOM_SUFFIX_BOUND);
    format_storage_key(original_filename, Utc::now().timestamp_millis(), random)
}

fn format_storage_key(original_filename: &str, timestamp_millis: i64, random: u32) -> String {
    let sanitized = sanitize_filename(original_filename);
    let (base, ext) = split_extension(&sanitized);
    format!("{base}-{timestamp_millis}-{random}{ext}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("report.pdf"), "report.pdf");
        assert_eq!(sanitize_filename("my file (1).pdf"), "my_file__1_.pdf");
        assert_eq!(sanitize_filename("exam-2024_final.docx"), "exam_2024_final.docx");
        assert_eq!(sanitize_filename("日本語.pdf"), "___.pdf");
        assert_eq!(sanitize_filename("../../etc/passwd"), ".._.._etc_passwd");
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("report.pdf"), ("report", ".pdf"));
        assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_extension("README"), ("README", ""));
        assert_eq!(split_extension(".env"), (".env", ""));
        assert_eq!(split_extension(".."), ("..", ""));
        assert_eq!(split_extension("notes."), ("notes", "."));
    }

    #[test]
    fn test_format_storage_key() {
        assert_eq!(
            format_storage_key("Fee Schedule.PDF", 1_700_000_000_000, 42),
            "Fee_Schedule-1700000000000-42.PDF"
        );
        assert_eq!(
            format_storage_key("timetable", 1, 2),
            "timetable-1-2"
        );
    }

    #[test]
    fn test_generated_keys_differ() {
        let first = generate_storage_key("report.pdf");
        let second = generate_storage_key("report.pdf");
        assert_ne!(first, second);
        assert!(first.starts_with("report-"));
        assert!(first.ends_with(".pdf"));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    // Sanitized names only contain characters that are safe in a flat upload directory.
    proptest! {
        #[test]
        fn prop_sanitized_filename_safe_chars(filename in ".*") {
            let sanitized = sanitize_filename(&filename);

            prop_assert_eq!(sanitized.chars().count(), filename.chars().count());
            for (original, c) in filename.chars().zip(sanitized.chars()) {
                let is_safe = c.is_ascii_alphanumeric() || c == '.' || c == '_';
                prop_assert!(is_safe, "Unexpected character in sanitized filename: {}", c);
                if original.is_ascii_alphanumeric() || original == '.' {
                    prop_assert_eq!(c, original);
                } else {
                    prop_assert_eq!(c, '_');
                }
            }
            prop_assert!(!sanitized.contains('/'));
        }
    }

    // Keys keep the sanitized extension and embed the timestamp and random part.
    proptest! {
        #[test]
        fn prop_storage_key_preserves_extension(
            base in "[a-zA-Z0-9 _()-]{1,40}",
            ext in "(pdf|docx|PNG|jpeg)",
            millis in 0i64..4_000_000_000_000,
            random in 0u32..RANDOM_SUFFIX_BOUND,
        ) {
            let filename = format!("{base}.{ext}");
            let key = format_storage_key(&filename, millis, random);

            let expected_suffix = format!("-{millis}-{random}.{ext}");
            prop_assert!(key.ends_with(&expected_suffix));
            prop_assert!(key.starts_with(&sanitize_filename(&base)));
        }
    }
}
