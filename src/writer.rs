//! Chapter file output.

use crate::error::WriteError;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Characters that are reserved on common filesystems, plus control characters.
static RESERVED_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/:*?"<>|\x00-\x1f\x7f]"#).unwrap());

/// Maximum length of the title part of a filename, in characters.
const MAX_TITLE_CHARS: usize = 80;

/// Makes a chapter title safe to use as part of a filename.
///
/// Whitespace runs collapse to one space, reserved characters become `_`,
/// and leading/trailing spaces and dots are removed. The result is capped
/// at 80 characters and is never empty.
pub fn sanitize_filename(title: &str) -> String {
    let collapsed = title.split_whitespace().collect::<Vec<_>>().join(" ");
    let replaced = RESERVED_CHARS.replace_all(&collapsed, "_");
    let capped: String = replaced.chars().take(MAX_TITLE_CHARS).collect();
    let trimmed = capped.trim_matches(|c: char| c == '.' || c.is_whitespace());

    if trimmed.is_empty() {
        "chapter".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Builds `{ordinal:04}_{title}[_{suffix}].txt`.
pub fn chapter_filename(ordinal: u32, title: &str, lang_suffix: Option<&str>) -> String {
    let title = sanitize_filename(title);
    match lang_suffix {
        Some(suffix) => format!("{:04}_{}_{}.txt", ordinal, title, sanitize_filename(suffix)),
        None => format!("{:04}_{}.txt", ordinal, title),
    }
}

/// Creates `dir` and any missing parents.
pub async fn ensure_dir(dir: &Path) -> Result<(), WriteError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| WriteError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })
}

/// Writes one chapter as UTF-8 text, replacing any earlier file of the
/// same name, and returns the path written.
pub async fn write_chapter(
    output_dir: &Path,
    ordinal: u32,
    title: &str,
    lang_suffix: Option<&str>,
    text: &str,
) -> Result<PathBuf, WriteError> {
    ensure_dir(output_dir).await?;

    let path = output_dir.join(chapter_filename(ordinal, title, lang_suffix));
    tokio::fs::write(&path, text)
        .await
        .map_err(|source| WriteError::Write {
            path: path.clone(),
            source,
        })?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_reserved_characters() {
        let name = sanitize_filename(r#"a/b\c:d*e?f"g<h>i|j"#);
        assert_eq!(name, "a_b_c_d_e_f_g_h_i_j");
    }

    #[test]
    fn test_sanitize_whitespace_and_dots() {
        assert_eq!(sanitize_filename("  第一章 \t 出發\n "), "第一章 出發");
        assert_eq!(sanitize_filename("..hidden.."), "hidden");
        assert_eq!(sanitize_filename("   "), "chapter");
        assert_eq!(sanitize_filename(""), "chapter");
        assert_eq!(sanitize_filename("tab\u{7}bell"), "tab_bell");
    }

    #[test]
    fn test_sanitize_caps_length() {
        let long = "章".repeat(200);
        assert_eq!(sanitize_filename(&long).chars().count(), MAX_TITLE_CHARS);
    }

    #[test]
    fn test_sanitized_names_have_no_separators() {
        for title in ["../../etc/passwd", "C:\\Windows", "a/b", "?*"] {
            let name = chapter_filename(1, title, Some("en"));
            assert!(!name.contains('/'), "{}", name);
            assert!(!name.contains('\\'), "{}", name);
            assert!(!name.contains(':'), "{}", name);
        }
    }

    #[test]
    fn test_chapter_filename() {
        assert_eq!(chapter_filename(1, "第一章", Some("en")), "0001_第一章_en.txt");
        assert_eq!(chapter_filename(123, "Intro", None), "0123_Intro.txt");
        assert_eq!(chapter_filename(12345, "Late", None), "12345_Late.txt");
    }

    #[tokio::test]
    async fn test_write_creates_directory() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("novel").join("output");

        let path = write_chapter(&out, 2, "Chapter Two", Some("en"), "Hello\nWorld")
            .await
            .unwrap();

        assert_eq!(path, out.join("0002_Chapter Two_en.txt"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Hello\nWorld");
    }

    #[tokio::test]
    async fn test_rewrite_overwrites() {
        let dir = TempDir::new().unwrap();

        let first = write_chapter(dir.path(), 1, "Same", None, "old text")
            .await
            .unwrap();
        let second = write_chapter(dir.path(), 1, "Same", None, "new text")
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(std::fs::read_to_string(&second).unwrap(), "new text");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_uncreatable_directory() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "not a directory").unwrap();

        let err = write_chapter(&blocker.join("sub"), 1, "x", None, "text")
            .await
            .unwrap_err();
        assert!(matches!(err, WriteError::CreateDir { .. }));
    }
}
