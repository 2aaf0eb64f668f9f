use std::error::Error;
use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::post::post_model::Post;
use crate::utils::error::CustomError;

pub struct FeedOptions {
    pub title: String,
    pub description: String,
    pub site_url: String,
    pub self_url: String,
    pub page: u64,
    pub num_pages: u64,
}

/// Drops characters the XML 1.0 charset does not allow.
pub fn strip_invalid_xml(text: &str) -> String {
    text.chars()
        .filter(|&c| {
            matches!(c,
                '\u{9}' | '\u{A}' | '\u{D}'
                | '\u{20}'..='\u{D7FF}'
                | '\u{E000}'..='\u{FFFD}'
                | '\u{10000}'..='\u{10FFFF}')
        })
        .collect()
}

fn text_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: &str,
) -> Result<(), Box<dyn Error>> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(value)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Titles and descriptions go out CDATA-wrapped so embedded markup
/// survives feed readers untouched.
fn cdata_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: &str,
) -> Result<(), Box<dyn Error>> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::CData(BytesCData::new(strip_invalid_xml(value))))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn page_link<W: Write>(
    writer: &mut Writer<W>,
    rel: &str,
    href: &str,
) -> Result<(), Box<dyn Error>> {
    let mut element = BytesStart::new("atom:link");
    element.push_attribute(("rel", rel));
    element.push_attribute(("href", href));
    writer.write_event(Event::Empty(element))?;
    Ok(())
}

fn write_feed<W: Write>(
    writer: &mut Writer<W>,
    posts: &[Post],
    options: &FeedOptions,
) -> Result<(), Box<dyn Error>> {
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let mut rss = BytesStart::new("rss");
    rss.push_attribute(("version", "2.0"));
    rss.push_attribute(("xmlns:atom", "http://www.w3.org/2005/Atom"));
    writer.write_event(Event::Start(rss))?;
    writer.write_event(Event::Start(BytesStart::new("channel")))?;

    text_element(writer, "title", &strip_invalid_xml(&options.title))?;
    text_element(writer, "description", &strip_invalid_xml(&options.description))?;
    text_element(writer, "link", &options.site_url)?;
    text_element(writer, "language", "en")?;

    page_link(writer, "self", &options.self_url)?;
    page_link(writer, "first", &format!("{}/rss", options.site_url))?;
    if options.page < options.num_pages {
        page_link(writer, "next", &format!("{}/rss?page={}", options.site_url, options.page + 1))?;
    }
    if options.page > 1 {
        page_link(writer, "previous", &format!("{}/rss?page={}", options.site_url, options.page - 1))?;
    }
    page_link(writer, "last", &format!("{}/rss?page={}", options.site_url, options.num_pages))?;

    for post in posts {
        let Some(published) = &post.published else {
            continue;
        };
        let url = format!("{}/post/{}", options.site_url, post.id.to_hex());

        writer.write_event(Event::Start(BytesStart::new("item")))?;
        cdata_element(writer, "title", published.title.as_deref().unwrap_or_default())?;
        cdata_element(writer, "description", published.summary.as_deref().unwrap_or_default())?;
        text_element(writer, "link", &url)?;
        text_element(writer, "guid", &url)?;
        if let Some(published_at) = published.published_at {
            text_element(writer, "pubDate", &published_at.to_chrono().to_rfc2822())?;
        }
        writer.write_event(Event::End(BytesEnd::new("item")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("channel")))?;
    writer.write_event(Event::End(BytesEnd::new("rss")))?;
    Ok(())
}

pub fn render_feed(posts: &[Post], options: &FeedOptions) -> Result<String, CustomError> {
    let mut writer = Writer::new(Vec::new());
    write_feed(&mut writer, posts, options)
        .map_err(|e| CustomError::InternalServerError(format!("Failed to render feed: {}", e)))?;

    String::from_utf8(writer.into_inner())
        .map_err(|e| CustomError::InternalServerError(format!("Feed is not valid utf-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::post::lifecycle;
    use crate::post::post_model::{Post, PostContent};
    use mongodb::bson::DateTime;

    fn options() -> FeedOptions {
        FeedOptions {
            title: "Posts | Page 1".to_string(),
            description: "A mere stream of thoughts".to_string(),
            site_url: "https://example.org".to_string(),
            self_url: "https://example.org/rss".to_string(),
            page: 1,
            num_pages: 3,
        }
    }

    fn published_post() -> Post {
        let mut post = Post::new();
        post.draft = Some(PostContent {
            title: Some("Hello <world>".to_string()),
            text: Some("First. Second. Third. Fourth.".to_string()),
            html: Some("<p>hi</p>".to_string()),
            ..Default::default()
        });
        post.published = Some(lifecycle::publish(&post, DateTime::now()).unwrap());
        post.draft = None;
        post
    }

    #[test]
    fn titles_and_descriptions_are_cdata_wrapped() {
        let xml = render_feed(&[published_post()], &options()).unwrap();
        assert!(xml.contains("<![CDATA[Hello <world>]]>"));
        assert!(xml.contains("<![CDATA[First. Second. Third.]]>"));
    }

    #[test]
    fn feed_has_channel_and_page_links() {
        let xml = render_feed(&[published_post()], &options()).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(xml.contains("<rss version=\"2.0\""));
        assert!(xml.contains("rel=\"next\" href=\"https://example.org/rss?page=2\""));
        assert!(xml.contains("rel=\"last\" href=\"https://example.org/rss?page=3\""));
        // page 1 has no previous link
        assert!(!xml.contains("rel=\"previous\""));
    }

    #[test]
    fn item_links_point_at_the_post() {
        let post = published_post();
        let xml = render_feed(&[post.clone()], &options()).unwrap();
        assert!(xml.contains(&format!("https://example.org/post/{}", post.id.to_hex())));
    }

    #[test]
    fn invalid_xml_chars_are_stripped() {
        assert_eq!(strip_invalid_xml("ok\u{0}ay\u{B}"), "okay");
        assert_eq!(strip_invalid_xml("tab\tand\nnewline"), "tab\tand\nnewline");
    }
}
