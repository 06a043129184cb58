//! Chapter index parsing.

use super::{ChapterReference, SiteRules};
use crate::error::IndexError;
use scraper::{ElementRef, Html};
use std::collections::HashSet;
use url::Url;

/// Extracts chapter links from the index page, in document order.
///
/// Links are resolved against `base_url`, filtered by the configured URL
/// pattern and deduplicated by URL (first occurrence wins).
pub fn parse_index(
    html: &str,
    base_url: &Url,
    rules: &SiteRules,
) -> Result<Vec<ChapterReference>, IndexError> {
    let doc = Html::parse_document(html);

    let mut links = collect_links(doc.select(&rules.link_selector), base_url, rules);

    // Fall back to scanning every link when the list container is missing.
    if links.is_empty() && rules.url_pattern.is_some() {
        links = collect_links(doc.select(&rules.any_link), base_url, rules);
    }

    if links.is_empty() {
        return Err(IndexError::NoChapters {
            selector: rules.link_selector_src.clone(),
        });
    }

    Ok(links
        .into_iter()
        .enumerate()
        .map(|(idx, (title, url))| ChapterReference {
            ordinal: (idx + 1) as u32,
            title,
            url,
        })
        .collect())
}

fn collect_links<'a>(
    anchors: impl Iterator<Item = ElementRef<'a>>,
    base_url: &Url,
    rules: &SiteRules,
) -> Vec<(String, String)> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for elem in anchors {
        let Some(href) = elem.value().attr("href") else {
            continue;
        };
        let title = normalize_whitespace(&elem.text().collect::<String>());
        if href.trim().is_empty() || title.is_empty() {
            continue;
        }

        let Ok(mut resolved) = base_url.join(href.trim()) else {
            continue;
        };
        // `1.html#top` is the same page as `1.html`
        resolved.set_fragment(None);
        if !matches!(resolved.scheme(), "http" | "https") {
            continue;
        }

        let url = resolved.to_string();
        if let Some(pattern) = &rules.url_pattern
            && !pattern.is_match(&url)
        {
            continue;
        }

        if seen.insert(url.clone()) {
            links.push((title, url));
        }
    }

    links
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    fn base() -> Url {
        Url::parse("https://novel.example.com/book/42/").unwrap()
    }

    #[test]
    fn test_links_in_document_order() {
        let html = r#"
            <html><body>
            <div id="tbchapterlist"><table>
                <tr><td><a href="/book/42/1.html">第一章 出發</a></td></tr>
                <tr><td><a href="2.html">第二章
                    相遇</a></td></tr>
                <tr><td><a href="https://novel.example.com/book/42/3.html">第三章</a></td></tr>
            </table></div>
            <a href="/about.html">About</a>
            </body></html>
        "#;

        let chapters = parse_index(html, &base(), &SiteRules::default()).unwrap();
        assert_eq!(chapters.len(), 3);
        assert_eq!(chapters[0].ordinal, 1);
        assert_eq!(chapters[0].title, "第一章 出發");
        assert_eq!(chapters[0].url, "https://novel.example.com/book/42/1.html");
        assert_eq!(chapters[1].ordinal, 2);
        assert_eq!(chapters[1].title, "第二章 相遇");
        assert_eq!(chapters[1].url, "https://novel.example.com/book/42/2.html");
        assert_eq!(chapters[2].ordinal, 3);
    }

    #[test]
    fn test_duplicates_and_empty_links_skipped() {
        let html = r#"
            <div id="tbchapterlist">
                <a href="1.html">Chapter 1</a>
                <a href="1.html">Chapter 1 (again)</a>
                <a href="">Empty href</a>
                <a href="2.html">   </a>
                <a>No href</a>
                <a href="javascript:void(0)">Script</a>
                <a href="3.html">Chapter 3</a>
            </div>
        "#;

        let chapters = parse_index(html, &base(), &SiteRules::default()).unwrap();
        let titles: Vec<_> = chapters.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Chapter 1", "Chapter 3"]);
        let ordinals: Vec<_> = chapters.iter().map(|c| c.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2]);
    }

    #[test]
    fn test_fragment_links_are_same_chapter() {
        let html = r##"
            <div id="tbchapterlist">
                <a href="1.html">Chapter 1</a>
                <a href="1.html#top">Chapter 1 top</a>
                <a href="2.html#comments">Chapter 2</a>
            </div>
        "##;

        let chapters = parse_index(html, &base(), &SiteRules::default()).unwrap();
        let urls: Vec<_> = chapters.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://novel.example.com/book/42/1.html",
                "https://novel.example.com/book/42/2.html",
            ]
        );
    }

    #[test]
    fn test_url_pattern_filters_and_falls_back() {
        let config = SiteConfig {
            chapter_link_selector: "ul.chapters a".to_string(),
            chapter_url_pattern: Some(r"/book/42/\d+\.html$".to_string()),
            ..SiteConfig::default()
        };
        let rules = SiteRules::compile(&config).unwrap();

        let html = r#"
            <nav><a href="/">Home</a><a href="/book/42/">Index</a></nav>
            <div class="list">
                <a href="/book/42/10.html">Ten</a>
                <a href="/book/42/11.html">Eleven</a>
                <a href="/book/42/11.html#top">Eleven again</a>
            </div>
        "#;

        let chapters = parse_index(html, &base(), &rules).unwrap();
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0].title, "Ten");
        assert_eq!(chapters[1].url, "https://novel.example.com/book/42/11.html");
    }

    #[test]
    fn test_no_chapters_is_error() {
        let html = "<html><body><p>Loading...</p><script>render()</script></body></html>";
        let err = parse_index(html, &base(), &SiteRules::default()).unwrap_err();
        assert!(matches!(err, IndexError::NoChapters { .. }));
    }
}
