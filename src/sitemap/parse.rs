// src/sitemap/parse.rs
// =============================================================================
// Parses sitemap XML into the list of <loc> values it contains.
//
// A sitemap comes in two shapes:
//
//   <urlset>                          <sitemapindex>
//     <url><loc>page</loc></url>        <sitemap><loc>child.xml</loc></sitemap>
//   </urlset>                         </sitemapindex>
//
// We read the document with quick-xml's streaming event reader and keep
// <url><loc> and <sitemap><loc> values apart, so the resolver can decide
// which shape it is looking at. Element names are matched by local name,
// so a namespace prefix (<sm:loc>) doesn't matter.
// =============================================================================

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

/// What the root element of a document says it is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentKind {
    UrlSet,
    Index,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SitemapDocument {
    pub kind: DocumentKind,
    /// <url><loc> values, in document order
    pub urls: Vec<String>,
    /// <sitemap><loc> values, in document order
    pub sitemaps: Vec<String>,
}

/// Malformed XML, along with every entry read before the error
#[derive(Debug, Error)]
#[error("malformed sitemap XML: {source}")]
pub struct SitemapParseError {
    pub partial: SitemapDocument,
    #[source]
    pub source: quick_xml::Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    Url,
    Sitemap,
}

// Parses a sitemap or sitemap index
//
// Returns an error only for malformed XML; the error still carries the
// entries that came before the bad spot. A well-formed document that
// isn't a sitemap at all comes back with kind Unknown and no entries.
pub fn parse_sitemap(xml: &str) -> Result<SitemapDocument, SitemapParseError> {
    let mut document = SitemapDocument::default();
    match read_entries(xml, &mut document) {
        Ok(()) => Ok(document),
        Err(source) => Err(SitemapParseError {
            partial: document,
            source,
        }),
    }
}

fn read_entries(xml: &str, document: &mut SitemapDocument) -> Result<(), quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut seen_root = false;
    // The entry we're inside of, and the element depth it was opened at
    let mut entry: Option<(Entry, usize)> = None;
    let mut loc: Option<String> = None;
    let mut depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                depth += 1;
                let name = e.local_name();
                let name = name.as_ref();
                if !seen_root {
                    seen_root = true;
                    document.kind = root_kind(name);
                }
                match (name, entry) {
                    (b"url", None) => entry = Some((Entry::Url, depth)),
                    (b"sitemap", None) => entry = Some((Entry::Sitemap, depth)),
                    // Only a direct child counts: <image:loc> nested deeper is skipped
                    (b"loc", Some((_, at))) if depth == at + 1 => loc = Some(String::new()),
                    _ => {}
                }
            }
            Event::Empty(e) => {
                if !seen_root {
                    seen_root = true;
                    document.kind = root_kind(e.local_name().as_ref());
                }
            }
            Event::Text(t) => {
                if let Some(buf) = loc.as_mut() {
                    buf.push_str(&t.unescape()?);
                }
            }
            Event::CData(c) => {
                if let Some(buf) = loc.as_mut() {
                    buf.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::End(e) => {
                match (e.local_name().as_ref(), entry) {
                    (b"loc", Some((kind, at))) if depth == at + 1 => {
                        if let Some(value) = loc.take() {
                            let value = value.trim();
                            if !value.is_empty() {
                                match kind {
                                    Entry::Url => document.urls.push(value.to_string()),
                                    Entry::Sitemap => document.sitemaps.push(value.to_string()),
                                }
                            }
                        }
                    }
                    (_, Some((_, at))) if depth == at => entry = None,
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(())
}

fn root_kind(name: &[u8]) -> DocumentKind {
    match name {
        b"urlset" => DocumentKind::UrlSet,
        b"sitemapindex" => DocumentKind::Index,
        _ => DocumentKind::Unknown,
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is a streaming (event) XML reader?
//    - Instead of building a tree, it hands us events one at a time:
//      Start(<url>), Text("https://..."), End(</url>), ...
//    - We keep a little state (am I inside <url>? inside <loc>?) and
//      collect what we need as the events go by
//
// 2. Why b"url" instead of "url"?
//    - quick-xml gives us raw bytes (&[u8]) for element names
//    - b"..." is a byte string literal, so the comparison needs no conversion
//
// 3. What does unescape() do?
//    - Turns XML entities back into characters: &amp; -> &
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_urlset_in_order() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://example.com/</loc><lastmod>2025-01-01</lastmod></url>
  <url>
    <loc>
      https://example.com/about
    </loc>
  </url>
  <url><loc>https://example.com/search?q=a&amp;b=c</loc></url>
</urlset>"#;
        let doc = parse_sitemap(xml).unwrap();
        assert_eq!(doc.kind, DocumentKind::UrlSet);
        assert_eq!(
            doc.urls,
            vec![
                "https://example.com/",
                "https://example.com/about",
                "https://example.com/search?q=a&b=c",
            ]
        );
        assert!(doc.sitemaps.is_empty());
    }

    #[test]
    fn test_parse_index() {
        let xml = r#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap><loc>https://example.com/a.xml</loc></sitemap>
  <sitemap><loc><![CDATA[https://example.com/b.xml]]></loc></sitemap>
</sitemapindex>"#;
        let doc = parse_sitemap(xml).unwrap();
        assert_eq!(doc.kind, DocumentKind::Index);
        assert!(doc.urls.is_empty());
        assert_eq!(
            doc.sitemaps,
            vec!["https://example.com/a.xml", "https://example.com/b.xml"]
        );
    }

    #[test]
    fn test_namespace_prefixes_are_ignored() {
        let xml = r#"<sm:urlset xmlns:sm="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sm:url><sm:loc>https://example.com/x</sm:loc></sm:url>
</sm:urlset>"#;
        let doc = parse_sitemap(xml).unwrap();
        assert_eq!(doc.kind, DocumentKind::UrlSet);
        assert_eq!(doc.urls, vec!["https://example.com/x"]);
    }

    #[test]
    fn test_image_loc_is_not_a_page() {
        let xml = r#"<urlset xmlns:image="http://www.google.com/schemas/sitemap-image/1.1">
  <url>
    <loc>https://example.com/gallery</loc>
    <image:image><image:loc>https://example.com/cat.png</image:loc></image:image>
  </url>
</urlset>"#;
        let doc = parse_sitemap(xml).unwrap();
        assert_eq!(doc.urls, vec!["https://example.com/gallery"]);
    }

    #[test]
    fn test_loc_outside_entry_is_ignored() {
        let xml = "<urlset><loc>https://example.com/stray</loc></urlset>";
        let doc = parse_sitemap(xml).unwrap();
        assert!(doc.urls.is_empty());
    }

    #[test]
    fn test_empty_urlset() {
        let doc = parse_sitemap("<urlset/>").unwrap();
        assert_eq!(doc.kind, DocumentKind::UrlSet);
        assert!(doc.urls.is_empty());
    }

    #[test]
    fn test_html_is_unknown() {
        let doc = parse_sitemap("<html><body><p>Not here</p></body></html>").unwrap();
        assert_eq!(doc.kind, DocumentKind::Unknown);
        assert!(doc.urls.is_empty() && doc.sitemaps.is_empty());
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        assert!(parse_sitemap("<urlset><url><loc>x</url></urlset>").is_err());
    }

    #[test]
    fn test_error_keeps_entries_read_so_far() {
        let xml = "<urlset><url><loc>https://e.com/a</loc></url><url><loc>https://e.com/b&nbsp;</loc></url></urlset>";
        let err = parse_sitemap(xml).unwrap_err();
        assert_eq!(err.partial.kind, DocumentKind::UrlSet);
        assert_eq!(err.partial.urls, vec!["https://e.com/a"]);
    }
}
