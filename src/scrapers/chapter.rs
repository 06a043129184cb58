//! Chapter page text extraction.

use super::{ChapterContent, SiteRules};
use crate::error::ExtractionError;
use scraper::node::Node;
use scraper::{ElementRef, Html};

/// Elements whose text never belongs to the story.
const HIDDEN_ELEMENTS: &[&str] = &["rt", "rp", "script", "style", "noscript"];

/// Extracts the chapter title and story lines from a chapter page.
///
/// The content container is located with the configured selectors, falling
/// back to the block with the most direct text. Empty and boilerplate lines
/// are removed.
pub fn extract(html: &str, rules: &SiteRules) -> Result<ChapterContent, ExtractionError> {
    let doc = Html::parse_document(html);

    let container = find_container(&doc, rules).ok_or(ExtractionError::ContainerNotFound)?;

    let paragraphs: Vec<String> = raw_lines(container, rules)
        .into_iter()
        .filter(|line| !line.is_empty() && !rules.is_boilerplate(line))
        .collect();

    if paragraphs.is_empty() {
        return Err(ExtractionError::Empty);
    }

    Ok(ChapterContent {
        title: extract_title(&doc, rules),
        paragraphs,
    })
}

fn find_container<'a>(doc: &'a Html, rules: &SiteRules) -> Option<ElementRef<'a>> {
    for selector in &rules.content_selectors {
        if let Some(elem) = doc.select(selector).next() {
            return Some(elem);
        }
    }

    // Largest text block
    doc.select(&rules.fallback_blocks)
        .map(|elem| (direct_text_len(elem), elem))
        .filter(|(len, _)| *len >= rules.fallback_min_chars && *len > 0)
        .max_by_key(|(len, _)| *len)
        .map(|(_, elem)| elem)
}

/// Counts characters in the element's own text nodes and direct `<p>`
/// children, so wrappers do not win over the block that holds the text.
fn direct_text_len(elem: ElementRef) -> usize {
    elem.children()
        .map(|child| match child.value() {
            Node::Text(t) => t.trim().chars().count(),
            Node::Element(e) if e.name() == "p" => ElementRef::wrap(child)
                .map(|p| visible_text(p).trim().chars().count())
                .unwrap_or(0),
            _ => 0,
        })
        .sum()
}

/// Paragraph texts, or one line per text node when there are no paragraphs.
fn raw_lines(container: ElementRef, rules: &SiteRules) -> Vec<String> {
    let paragraphs: Vec<String> = container
        .select(&rules.paragraph)
        .map(|p| collapse_whitespace(&visible_text(p)))
        .filter(|text| !text.is_empty())
        .collect();

    if !paragraphs.is_empty() {
        return paragraphs;
    }

    visible_text_nodes(container)
        .into_iter()
        .flat_map(|t| t.lines().map(|l| l.trim().to_string()).collect::<Vec<_>>())
        .collect()
}

fn extract_title(doc: &Html, rules: &SiteRules) -> String {
    rules
        .title_selectors
        .iter()
        .filter_map(|selector| doc.select(selector).next())
        .map(|elem| collapse_whitespace(&visible_text(elem)))
        .find(|title| !title.is_empty())
        .unwrap_or_default()
}

/// Concatenated text of an element, excluding hidden elements such as ruby
/// annotations and scripts.
fn visible_text(elem: ElementRef) -> String {
    visible_text_nodes(elem).concat()
}

fn visible_text_nodes(elem: ElementRef) -> Vec<&str> {
    let mut nodes = Vec::new();

    for node in elem.descendants() {
        if let Node::Text(t) = node.value() {
            let hidden = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|e| HIDDEN_ELEMENTS.contains(&e.name()))
            });

            if !hidden {
                nodes.push(&**t);
            }
        }
    }

    nodes
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    #[test]
    fn test_styled_container_paragraphs() {
        let html = r#"
            <html><head><title>第一章 - 小說網</title></head><body>
            <h1>第一章 出發</h1>
            <div class="nav"><a href="/">上一章</a></div>
            <div style="font-size: 20px; line-height: 30px; color: #333">
                <p>　　天色漸暗。</p>
                <p></p>
                <p>他走向山門。</p>
                <p>請記住本站域名：example.com</p>
                <p>下一章</p>
            </div>
            </body></html>
        "#;

        let content = extract(html, &SiteRules::default()).unwrap();
        assert_eq!(content.title, "第一章 出發");
        assert_eq!(content.paragraphs, vec!["天色漸暗。", "他走向山門。"]);
        assert_eq!(content.text(), "天色漸暗。\n他走向山門。");
    }

    #[test]
    fn test_br_separated_text() {
        let html = r#"
            <div id="content">
                第一行<br/>
                <br/>
                第二行<br>第三行
                <script>var ad = 1;</script>
            </div>
        "#;

        let content = extract(html, &SiteRules::default()).unwrap();
        assert_eq!(content.paragraphs, vec!["第一行", "第二行", "第三行"]);
        assert_eq!(content.title, "");
    }

    #[test]
    fn test_ruby_text_removed() {
        let html = r#"
            <div id="content"><p><ruby>漢字<rp>(</rp><rt>かんじ</rt><rp>)</rp></ruby>を読む。</p></div>
        "#;

        let content = extract(html, &SiteRules::default()).unwrap();
        assert_eq!(content.paragraphs, vec!["漢字を読む。"]);
    }

    #[test]
    fn test_selector_priority() {
        let html = r#"
            <div id="chaptercontent"><p>second choice</p></div>
            <div id="content"><p>first choice</p></div>
        "#;

        let content = extract(html, &SiteRules::default()).unwrap();
        assert_eq!(content.paragraphs, vec!["first choice"]);
    }

    #[test]
    fn test_largest_block_fallback() {
        let story = "The rain kept falling over the quiet harbor town. ".repeat(5);
        let html = format!(
            r#"
            <div class="page">
                <div class="menu">Home | Library | Login</div>
                <div class="story-body">
                    <p>{story}</p>
                    <p>She closed the door behind her.</p>
                </div>
                <div class="footer">Copyright</div>
            </div>
            "#
        );

        let content = extract(&html, &SiteRules::default()).unwrap();
        assert_eq!(content.paragraphs.len(), 2);
        assert_eq!(content.paragraphs[1], "She closed the door behind her.");
    }

    #[test]
    fn test_missing_container_is_error() {
        let html = r#"
            <html><body>
            <div class="menu">Home | Library | Login</div>
            <p>Page not found.</p>
            </body></html>
        "#;

        let err = extract(html, &SiteRules::default()).unwrap_err();
        assert!(matches!(err, ExtractionError::ContainerNotFound));
    }

    #[test]
    fn test_boilerplate_only_container_is_error() {
        let html = r#"<div id="content"><p>上一章</p><p>目錄</p><p>下一章</p></div>"#;

        let err = extract(html, &SiteRules::default()).unwrap_err();
        assert!(matches!(err, ExtractionError::Empty));
    }

    #[test]
    fn test_custom_selectors() {
        let config = SiteConfig {
            content_selectors: vec!["article.chapter-body".to_string()],
            title_selectors: vec![".chapter-title".to_string()],
            boilerplate_patterns: vec![r"(?i)^support us".to_string()],
            ..SiteConfig::default()
        };
        let rules = SiteRules::compile(&config).unwrap();

        let html = r#"
            <span class="chapter-title"> Chapter 7:  The Gate </span>
            <article class="chapter-body">
                <p>Line one.</p>
                <p>Support us on our site!</p>
                <p>Line two.</p>
            </article>
        "#;

        let content = extract(html, &rules).unwrap();
        assert_eq!(content.title, "Chapter 7: The Gate");
        assert_eq!(content.paragraphs, vec!["Line one.", "Line two."]);
    }
}
