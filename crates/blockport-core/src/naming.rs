//! Tag input cleaning, export file names and document headers

use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

/// Longest root-derived file stem, before the extension
const ROOT_STEM_MAX: usize = 50;
/// Longest page-derived part of a bundle name
const BUNDLE_PAGE_MAX: usize = 30;

static PAGE_REF: OnceLock<Option<Regex>> = OnceLock::new();
static SEPARATOR_RUN: OnceLock<Option<Regex>> = OnceLock::new();

fn page_ref() -> Option<&'static Regex> {
    PAGE_REF
        .get_or_init(|| Regex::new(r"\[\[([^\]]+)\]\]").ok())
        .as_ref()
}

fn separator_run() -> Option<&'static Regex> {
    SEPARATOR_RUN
        .get_or_init(|| Regex::new(r"[\s_]+").ok())
        .as_ref()
}

fn is_reserved_path_char(c: char) -> bool {
    matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|')
}

/// Reduce user tag input to a bare page name.
///
/// Accepts `#tag`, `[[tag]]`, `#[[tag]]` or `tag`. Blank input yields
/// `None`.
pub fn clean_tag_input(input: &str) -> Option<String> {
    let mut cleaned = input.trim();
    if let Some(rest) = cleaned.strip_prefix('#') {
        cleaned = rest;
    }
    if let Some(inner) = cleaned
        .strip_prefix("[[")
        .and_then(|rest| rest.strip_suffix("]]"))
    {
        cleaned = inner;
    }

    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// `export_<tag>_<YYYY-MM-DD>.md`, non-alphanumerics in the tag become `_`
pub fn export_filename(tag: &str, date: NaiveDate) -> String {
    let safe: String = tag
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("export_{}_{}.md", safe, date.format("%Y-%m-%d"))
}

/// File name derived from a block's content
pub fn root_filename(content: &str) -> String {
    let mut safe = match page_ref() {
        Some(re) => re.replace_all(content, "$1").into_owned(),
        None => content.to_string(),
    };
    safe.retain(|c| c != '#');
    let safe: String = safe
        .chars()
        .map(|c| if is_reserved_path_char(c) { '_' } else { c })
        .collect();
    let safe = match separator_run() {
        Some(re) => re.replace_all(&safe, "_").into_owned(),
        None => safe,
    };

    let stem: String = safe.trim().chars().take(ROOT_STEM_MAX).collect();
    let stem = stem.trim_end_matches('_');
    if stem.is_empty() {
        "untitled.md".to_string()
    } else {
        format!("{}.md", stem)
    }
}

/// Two-digit position prefix used inside bundles: `01_name.md`
pub fn numbered_filename(position: usize, name: &str) -> String {
    format!("{:02}_{}", position, name)
}

/// `export_<page>_<YYYY-MM-DD>.zip`
pub fn bundle_filename(page: &str, date: NaiveDate) -> String {
    let safe: String = page
        .chars()
        .map(|c| if is_reserved_path_char(c) { '_' } else { c })
        .take(BUNDLE_PAGE_MAX)
        .collect();
    format!("export_{}_{}.zip", safe, date.format("%Y-%m-%d"))
}

fn timestamp(generated: NaiveDateTime) -> String {
    generated.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Header prepended to a filter export
pub fn export_header(tag: &str, generated: NaiveDateTime, blocks_found: usize) -> String {
    format!(
        "# Export: #{}\n> Generated: {}\n> Blocks found: {}\n\n---\n\n",
        tag,
        timestamp(generated),
        blocks_found
    )
}

/// Header prepended to a single-branch export
pub fn branch_header(title: &str, generated: NaiveDateTime, filter: Option<&str>) -> String {
    let filter = filter
        .map(|tag| format!("\n> Filter: #{}", tag))
        .unwrap_or_default();
    format!(
        "# {}\n> Generated: {}{}\n\n---\n\n",
        title,
        timestamp(generated),
        filter
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    fn generated() -> NaiveDateTime {
        date().and_hms_opt(14, 5, 0).unwrap()
    }

    #[test]
    fn test_clean_tag_input() {
        assert_eq!(clean_tag_input("#reading").as_deref(), Some("reading"));
        assert_eq!(clean_tag_input("[[Reading List]]").as_deref(), Some("Reading List"));
        assert_eq!(clean_tag_input(" #[[to read]] ").as_deref(), Some("to read"));
        assert_eq!(clean_tag_input("plain").as_deref(), Some("plain"));
        assert_eq!(clean_tag_input("[[half").as_deref(), Some("[[half"));
        assert_eq!(clean_tag_input("   "), None);
        assert_eq!(clean_tag_input("#"), None);
        assert_eq!(clean_tag_input("[[ ]]"), None);
    }

    #[test]
    fn test_export_filename() {
        assert_eq!(
            export_filename("Claude/Opus 4.5", date()),
            "export_Claude_Opus_4_5_2024-03-09.md"
        );
    }

    #[test]
    fn test_root_filename() {
        assert_eq!(root_filename("Chapter [[One]] #draft"), "Chapter_One_draft.md");
        assert_eq!(root_filename("a/b:c*d?"), "a_b_c_d.md");
        assert_eq!(root_filename("  spaced   out  "), "_spaced_out.md");
        assert_eq!(root_filename(""), "untitled.md");
        assert_eq!(root_filename("###"), "untitled.md");

        let long = "x".repeat(80);
        assert_eq!(root_filename(&long), format!("{}.md", "x".repeat(50)));
    }

    #[test]
    fn test_numbered_and_bundle_names() {
        assert_eq!(numbered_filename(3, "Intro.md"), "03_Intro.md");
        assert_eq!(numbered_filename(112, "Intro.md"), "112_Intro.md");
        assert_eq!(
            bundle_filename("Books: 2024/Q1", date()),
            "export_Books_ 2024_Q1_2024-03-09.zip"
        );
        let long = "p".repeat(40);
        assert_eq!(
            bundle_filename(&long, date()),
            format!("export_{}_2024-03-09.zip", "p".repeat(30))
        );
    }

    #[test]
    fn test_export_header() {
        assert_eq!(
            export_header("reading", generated(), 4),
            "# Export: #reading\n> Generated: 2024-03-09 14:05:00\n> Blocks found: 4\n\n---\n\n"
        );
    }

    #[test]
    fn test_branch_header() {
        assert_eq!(
            branch_header("Books", generated(), None),
            "# Books\n> Generated: 2024-03-09 14:05:00\n\n---\n\n"
        );
        assert!(branch_header("Books", generated(), Some("scifi"))
            .contains("14:05:00\n> Filter: #scifi\n\n---"));
    }
}
