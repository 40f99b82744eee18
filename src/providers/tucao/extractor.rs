// File: providers/tucao/extractor.rs
// Uploader page scraping: header background, signature and avatar.

use super::models::{RawDocument, UploaderProfile};
use crate::core::{CoreError, Result};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

static HEADER: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.header").expect("static selector div.header"));
static USERINFO: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.userinfo").expect("static selector div.userinfo"));
static AVATAR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.avatar").expect("static selector div.avatar"));

pub const HEADER_NODE: &str = "div.header";
pub const AVATAR_NODE: &str = "div.avatar";

/// Width of the label in front of the signature (`个性签名:`).
const SIGNATURE_LABEL_CHARS: usize = 5;

/// Extracts the uploader profile from a logged-in uploader page.
///
/// `div.header` and `div.avatar` are mandatory; without either the whole
/// extraction fails with `MalformedDocument`. `div.userinfo` is optional and
/// only feeds the signature.
pub fn extract_profile(document: &RawDocument) -> Result<UploaderProfile> {
    let html = Html::parse_document(document.as_str());

    let header = html
        .select(&HEADER)
        .next()
        .ok_or(CoreError::MalformedDocument { node: HEADER_NODE })?;
    let header_background = first_child(header)
        .and_then(|child| child.value().attr("style"))
        .map(style_background_url)
        .unwrap_or_default();
    if header_background.is_empty() {
        log::warn!("Uploader page header carries no background URL");
    }

    let signature = html
        .select(&USERINFO)
        .next()
        .map(signature_from_userinfo)
        .unwrap_or_default();

    let avatar_url = html
        .select(&AVATAR)
        .next()
        .and_then(first_child)
        .and_then(first_child)
        .and_then(|img| img.value().attr("src"))
        .ok_or(CoreError::MalformedDocument { node: AVATAR_NODE })?
        .to_string();

    Ok(UploaderProfile {
        avatar_url,
        header_background,
        signature,
    })
}

/// Slice from the first `http://` up to, not including, the next `)`.
/// Anything without both markers yields an empty string.
pub fn style_background_url(style: &str) -> String {
    let Some(start) = style.find("http://") else {
        return String::new();
    };
    match style[start..].find(')') {
        Some(len) => style[start..start + len].to_string(),
        None => String::new(),
    }
}

fn signature_from_userinfo(userinfo: ElementRef<'_>) -> String {
    let Some(last_item) = first_child(userinfo).and_then(|list| element_children(list).last()) else {
        return String::new();
    };
    normalized_text(last_item)
        .chars()
        .skip(SIGNATURE_LABEL_CHARS)
        .collect()
}

fn element_children(node: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    node.children().filter_map(ElementRef::wrap)
}

fn first_child(node: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element_children(node).next()
}

// Trimmed, with inner whitespace runs collapsed to one space.
fn normalized_text(node: ElementRef<'_>) -> String {
    node.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER_HTML: &str = r#"<div class="header"><div style="height:200px;background:url(http://www.tucao.one/bg/77.jpg) no-repeat"></div></div>"#;
    const AVATAR_HTML: &str =
        r#"<div class="avatar"><a href="/play/u77/"><img src="http://www.tucao.one/avatar/77.jpg"></a></div>"#;
    const USERINFO_HTML: &str = r#"<div class="userinfo"><ul>
        <li>用户名: uploader</li>
        <li>注册时间: 2016-01-01</li>
        <li>个性签名:hello   world</li>
    </ul></div>"#;

    fn page(parts: &[&str]) -> RawDocument {
        RawDocument::new(format!("<html><body>{}</body></html>", parts.join("")))
    }

    #[test]
    fn test_full_page() {
        let profile = extract_profile(&page(&[HEADER_HTML, USERINFO_HTML, AVATAR_HTML])).unwrap();
        assert_eq!(profile.header_background, "http://www.tucao.one/bg/77.jpg");
        assert_eq!(profile.signature, "hello world");
        assert_eq!(profile.avatar_url, "http://www.tucao.one/avatar/77.jpg");
    }

    #[test]
    fn test_missing_userinfo_keeps_empty_signature() {
        let profile = extract_profile(&page(&[HEADER_HTML, AVATAR_HTML])).unwrap();
        assert_eq!(profile.signature, "");
        assert!(!profile.header_background.is_empty());
    }

    #[test]
    fn test_missing_header_fails() {
        let err = extract_profile(&page(&[USERINFO_HTML, AVATAR_HTML])).unwrap_err();
        assert!(matches!(err, CoreError::MalformedDocument { node } if node == HEADER_NODE));
    }

    #[test]
    fn test_missing_avatar_fails() {
        let err = extract_profile(&page(&[HEADER_HTML, USERINFO_HTML])).unwrap_err();
        assert!(matches!(err, CoreError::MalformedDocument { node } if node == AVATAR_NODE));
    }

    #[test]
    fn test_avatar_without_src_fails() {
        let avatar = r#"<div class="avatar"><a><img alt="x"></a></div>"#;
        let err = extract_profile(&page(&[HEADER_HTML, avatar])).unwrap_err();
        assert!(matches!(err, CoreError::MalformedDocument { .. }));
    }

    #[test]
    fn test_first_matching_nodes_win() {
        let second_header =
            r#"<div class="header"><div style="background:url(http://other/b.png)"></div></div>"#;
        let second_avatar = r#"<div class="avatar"><a><img src="http://other/a.png"></a></div>"#;
        let profile =
            extract_profile(&page(&[HEADER_HTML, AVATAR_HTML, second_header, second_avatar])).unwrap();
        assert_eq!(profile.header_background, "http://www.tucao.one/bg/77.jpg");
        assert_eq!(profile.avatar_url, "http://www.tucao.one/avatar/77.jpg");
    }

    #[test]
    fn test_style_slice_is_exact() {
        assert_eq!(
            style_background_url("height:1px;background:url(http://x.com/a.png)"),
            "http://x.com/a.png"
        );
        assert_eq!(
            style_background_url("background:url(http://x.com/a.png), url(http://y.com/b.png)"),
            "http://x.com/a.png"
        );
        // https is not matched, the following http:// literal is
        assert_eq!(
            style_background_url("url(https://s.com/a.png) url(http://x.com/b.png)"),
            "http://x.com/b.png"
        );
        assert_eq!(style_background_url("background:none"), "");
        assert_eq!(style_background_url("url(http://x.com/a.png"), "");
    }

    #[test]
    fn test_short_signature_is_empty() {
        let userinfo = r#"<div class="userinfo"><ul><li>abc</li></ul></div>"#;
        let profile = extract_profile(&page(&[HEADER_HTML, userinfo, AVATAR_HTML])).unwrap();
        assert_eq!(profile.signature, "");

        let exact = r#"<div class="userinfo"><ul><li>签名:xy</li><li>12345</li></ul></div>"#;
        let profile = extract_profile(&page(&[HEADER_HTML, exact, AVATAR_HTML])).unwrap();
        assert_eq!(profile.signature, "");
    }

    #[test]
    fn test_signature_strips_five_chars() {
        let userinfo = r#"<div class="userinfo"><ul><li>Sign:my motto</li></ul></div>"#;
        let profile = extract_profile(&page(&[HEADER_HTML, userinfo, AVATAR_HTML])).unwrap();
        assert_eq!(profile.signature, "my motto");
    }

    #[test]
    fn test_empty_userinfo_is_tolerated() {
        let userinfo = r#"<div class="userinfo"></div>"#;
        let profile = extract_profile(&page(&[HEADER_HTML, userinfo, AVATAR_HTML])).unwrap();
        assert_eq!(profile.signature, "");
    }

    #[test]
    fn test_header_without_style_degrades() {
        let header = r#"<div class="header"><div></div></div>"#;
        let profile = extract_profile(&page(&[header, AVATAR_HTML])).unwrap();
        assert_eq!(profile.header_background, "");
        assert_eq!(profile.avatar_url, "http://www.tucao.one/avatar/77.jpg");
    }
}
