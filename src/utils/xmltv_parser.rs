//! Quick-XML based XMLTV parser
//!
//! Streams a `<tv>` document and extracts every `<channel>` and `<programme>`
//! element. Nested `<icon src>` values are hoisted onto the element, the first
//! `<title>`/`<desc>` text is extracted, and all other attributes are copied
//! verbatim. Timestamps are not interpreted here.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::errors::{ParseError, ParseResult};
use crate::models::{EpgChannel, EpgProgramme, ParsedFeed};

const ROOT_ELEMENT: &[u8] = b"tv";

const CDATA_OPEN: &str = "<![CDATA[";
const CDATA_CLOSE: &str = "]]>";
const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &str = "-->";

/// Longest entity body we look at when deciding whether `&` is already escaped
const MAX_ENTITY_LEN: usize = 12;

/// Escape every `&` that does not start a predefined XML entity or a numeric
/// character reference.
///
/// Feeds regularly contain raw ampersands in titles ("Tom & Jerry"), which
/// makes them invalid XML. Unknown named entities such as `&nbsp;` are escaped
/// as well, so they end up rendered literally instead of failing the parse.
/// CDATA sections and comments are copied unchanged.
pub fn escape_bare_ampersands(content: &str) -> Cow<'_, str> {
    if !content.contains('&') {
        return Cow::Borrowed(content);
    }

    let mut escaped = String::with_capacity(content.len() + 64);
    let mut rest = content;

    while let Some(pos) = rest.find(['&', '<']) {
        escaped.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with('<') {
            let verbatim = [(CDATA_OPEN, CDATA_CLOSE), (COMMENT_OPEN, COMMENT_CLOSE)]
                .into_iter()
                .find(|(open, _)| tail.starts_with(open))
                .map(|(open, close)| {
                    tail[open.len()..]
                        .find(close)
                        .map_or(tail.len(), |end| open.len() + end + close.len())
                });
            let len = verbatim.unwrap_or(1);
            escaped.push_str(&tail[..len]);
            rest = &tail[len..];
            continue;
        }

        if starts_with_entity_reference(tail) {
            escaped.push('&');
        } else {
            escaped.push_str("&amp;");
        }
        rest = &tail[1..];
    }
    escaped.push_str(rest);

    Cow::Owned(escaped)
}

fn starts_with_entity_reference(tail: &str) -> bool {
    let body = &tail[1..];
    let Some(end) = body
        .bytes()
        .take(MAX_ENTITY_LEN + 1)
        .position(|b| b == b';')
    else {
        return false;
    };

    let name = &body[..end];
    match name {
        "amp" | "lt" | "gt" | "quot" | "apos" => true,
        _ => {
            if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit())
            } else if let Some(dec) = name.strip_prefix('#') {
                !dec.is_empty() && dec.bytes().all(|b| b.is_ascii_digit())
            } else {
                false
            }
        }
    }
}

enum OpenElement {
    Channel(EpgChannel),
    Programme(EpgProgramme),
}

impl OpenElement {
    fn from_start(element: &BytesStart) -> Option<Self> {
        match element.name().as_ref() {
            b"channel" => {
                let mut attributes = parse_attributes(element);
                Some(Self::Channel(EpgChannel {
                    id: attributes.remove("id").unwrap_or_default(),
                    icon: None,
                    attributes,
                }))
            }
            b"programme" => {
                let mut attributes = parse_attributes(element);
                Some(Self::Programme(EpgProgramme {
                    start: attributes.remove("start").unwrap_or_default(),
                    stop: attributes.remove("stop").unwrap_or_default(),
                    channel: attributes.remove("channel").unwrap_or_default(),
                    title: String::new(),
                    desc: None,
                    icon: None,
                    attributes,
                }))
            }
            _ => None,
        }
    }

    fn hoist_icon(&mut self, icon_element: &BytesStart) {
        let slot = match self {
            Self::Channel(channel) => &mut channel.icon,
            Self::Programme(programme) => &mut programme.icon,
        };
        if slot.is_none() {
            *slot = parse_attributes(icon_element).remove("src");
        }
    }

    fn wants_text(&self, field: TextField) -> bool {
        match (self, field) {
            (Self::Programme(p), TextField::Title) => p.title.is_empty(),
            (Self::Programme(p), TextField::Desc) => p.desc.is_none(),
            (Self::Channel(_), _) => false,
        }
    }

    fn set_text(&mut self, field: TextField, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        if let Self::Programme(programme) = self {
            match field {
                TextField::Title => programme.title = text.to_string(),
                TextField::Desc => programme.desc = Some(text.to_string()),
            }
        }
    }

    fn push_into(self, feed: &mut ParsedFeed) {
        match self {
            Self::Channel(channel) => feed.channels.push(channel),
            Self::Programme(programme) => feed.programmes.push(programme),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextField {
    Title,
    Desc,
}

impl TextField {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"title" => Some(Self::Title),
            b"desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Parse an XMLTV document into its channels and programmes.
///
/// Fails when the document has no `<tv>` root or is not well-formed XML.
/// Channel and programme order follows document order.
pub fn parse_xmltv(content: &str) -> ParseResult<ParsedFeed> {
    let mut reader = Reader::from_str(content);

    let mut feed = ParsedFeed::default();
    let mut root_seen = false;
    let mut depth = 0usize;
    let mut current: Option<OpenElement> = None;
    let mut capture: Option<TextField> = None;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                match depth {
                    0 => check_root(e, &mut root_seen)?,
                    1 => current = OpenElement::from_start(e),
                    2 => {
                        if let Some(element) = current.as_mut() {
                            if e.name().as_ref() == b"icon" {
                                element.hoist_icon(e);
                            } else if let Some(field) = TextField::from_name(e.name().as_ref())
                                && element.wants_text(field)
                            {
                                capture = Some(field);
                                text.clear();
                            }
                        }
                    }
                    _ => {}
                }
                depth += 1;
            }

            Ok(Event::Empty(ref e)) => match depth {
                0 => check_root(e, &mut root_seen)?,
                1 => {
                    if let Some(element) = OpenElement::from_start(e) {
                        element.push_into(&mut feed);
                    }
                }
                2 => {
                    if let Some(element) = current.as_mut()
                        && e.name().as_ref() == b"icon"
                    {
                        element.hoist_icon(e);
                    }
                }
                _ => {}
            },

            Ok(Event::End(_)) => {
                depth = depth.saturating_sub(1);
                match depth {
                    1 => {
                        if let Some(element) = current.take() {
                            element.push_into(&mut feed);
                        }
                    }
                    2 => {
                        if let (Some(field), Some(element)) = (capture.take(), current.as_mut()) {
                            element.set_text(field, &text);
                        }
                    }
                    _ => {}
                }
            }

            Ok(Event::Text(e)) => {
                if capture.is_some() {
                    text.push_str(decode_utf8(&e, "text")?);
                }
            }

            Ok(Event::CData(e)) => {
                if capture.is_some() {
                    text.push_str(decode_utf8(&e, "CDATA")?);
                }
            }

            Ok(Event::GeneralRef(e)) => {
                if capture.is_some() {
                    let entity = format!("&{};", decode_utf8(&e, "entity reference")?);
                    match quick_xml::escape::unescape(&entity) {
                        Ok(resolved) => text.push_str(&resolved),
                        Err(_) => text.push_str(&entity),
                    }
                }
            }

            Ok(Event::Eof) => break,

            Err(e) => {
                return Err(ParseError::Malformed {
                    position: reader.buffer_position() as u64,
                    message: e.to_string(),
                });
            }

            _ => {} // Declarations, comments, doctype and processing instructions
        }
    }

    if !root_seen {
        return Err(ParseError::MissingRoot);
    }

    Ok(feed)
}

fn check_root(element: &BytesStart, root_seen: &mut bool) -> ParseResult<()> {
    let name = element.name();
    if name.as_ref() != ROOT_ELEMENT {
        return Err(ParseError::UnexpectedRoot {
            found: String::from_utf8_lossy(name.as_ref()).into_owned(),
        });
    }
    *root_seen = true;
    Ok(())
}

fn decode_utf8<'a>(bytes: &'a [u8], what: &str) -> ParseResult<&'a str> {
    std::str::from_utf8(bytes).map_err(|e| ParseError::InvalidUtf8 {
        message: format!("in {what}: {e}"),
    })
}

/// Parse XML attributes into an ordered map, unescaping values
fn parse_attributes(element: &BytesStart) -> BTreeMap<String, String> {
    let mut attrs = BTreeMap::new();

    for attr in element.attributes().flatten() {
        if let (Ok(key), Ok(value)) = (
            std::str::from_utf8(attr.key.as_ref()),
            std::str::from_utf8(&attr.value),
        ) {
            let value = quick_xml::escape::unescape(value)
                .map(Cow::into_owned)
                .unwrap_or_else(|_| value.to_string());
            attrs.insert(key.to_string(), value);
        }
    }
    attrs
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE tv SYSTEM "xmltv.dtd">
<tv generator-info-name="test">
  <channel id="abc.us" site="tvtv.us">
    <display-name>ABC</display-name>
    <icon src="https://example.com/abc.png"/>
    <url>https://abc.com</url>
  </channel>
  <channel id="nbc.us"/>
  <programme start="20210423071700 +0000" stop="20210423081700 +0000" channel="abc.us" clumpidx="0/1">
    <title lang="en">Morning News</title>
    <desc lang="en">The day's headlines &amp; weather.</desc>
    <icon src="https://example.com/news.jpg"></icon>
    <category lang="en">News</category>
  </programme>
  <programme start="20210423081700 +0000" stop="20210423091700 +0000" channel="nbc.us">
    <title>Tom &amp; Jerry</title>
  </programme>
</tv>"#;

    #[test]
    fn test_parse_channels() {
        let feed = parse_xmltv(SAMPLE_FEED).unwrap();
        assert_eq!(feed.channels.len(), 2);

        let abc = &feed.channels[0];
        assert_eq!(abc.id, "abc.us");
        assert_eq!(abc.icon.as_deref(), Some("https://example.com/abc.png"));
        assert_eq!(abc.attributes.get("site").map(String::as_str), Some("tvtv.us"));
        assert!(!abc.attributes.contains_key("id"));

        let nbc = &feed.channels[1];
        assert_eq!(nbc.id, "nbc.us");
        assert!(nbc.icon.is_none());
    }

    #[test]
    fn test_parse_programmes() {
        let feed = parse_xmltv(SAMPLE_FEED).unwrap();
        assert_eq!(feed.programmes.len(), 2);

        let news = &feed.programmes[0];
        assert_eq!(news.start, "20210423071700 +0000");
        assert_eq!(news.stop, "20210423081700 +0000");
        assert_eq!(news.channel, "abc.us");
        assert_eq!(news.title, "Morning News");
        assert_eq!(news.desc.as_deref(), Some("The day's headlines & weather."));
        assert_eq!(news.icon.as_deref(), Some("https://example.com/news.jpg"));
        assert_eq!(news.attributes.get("clumpidx").map(String::as_str), Some("0/1"));

        let cartoon = &feed.programmes[1];
        assert_eq!(cartoon.title, "Tom & Jerry");
        assert!(cartoon.desc.is_none());
        assert!(cartoon.icon.is_none());
    }

    #[test]
    fn test_first_title_wins() {
        let doc = r#"<tv><programme channel="a" start="1" stop="2">
            <title lang="de">Nachrichten</title><title lang="en">News</title>
        </programme></tv>"#;
        let feed = parse_xmltv(doc).unwrap();
        assert_eq!(feed.programmes[0].title, "Nachrichten");
    }

    #[test]
    fn test_programme_without_title() {
        let doc = r#"<tv><programme channel="a" start="1" stop="2"/></tv>"#;
        let feed = parse_xmltv(doc).unwrap();
        assert_eq!(feed.programmes.len(), 1);
        assert_eq!(feed.programmes[0].title, "");
    }

    #[test]
    fn test_empty_tv() {
        let feed = parse_xmltv("<tv/>").unwrap();
        assert!(feed.channels.is_empty());
        assert!(feed.programmes.is_empty());
    }

    #[test]
    fn test_missing_root() {
        assert_eq!(parse_xmltv(""), Err(ParseError::MissingRoot));
        assert_eq!(
            parse_xmltv("<?xml version=\"1.0\"?>"),
            Err(ParseError::MissingRoot)
        );
    }

    #[test]
    fn test_unexpected_root() {
        let result = parse_xmltv("<html><body/></html>");
        assert_eq!(
            result,
            Err(ParseError::UnexpectedRoot {
                found: "html".to_string()
            })
        );
    }

    #[test]
    fn test_malformed_document() {
        let result = parse_xmltv("<tv><channel id=\"a\"></programme></tv>");
        assert!(matches!(result, Err(ParseError::Malformed { .. })));
    }

    #[test]
    fn test_raw_ampersand_after_escaping() {
        let doc = concat!(
            r#"<tv><programme channel="a" start="1" stop="2">"#,
            "<title>Rock & Roll</title></programme></tv>"
        );
        let feed = parse_xmltv(&escape_bare_ampersands(doc)).unwrap();
        assert_eq!(feed.programmes[0].title, "Rock & Roll");
    }

    #[test]
    fn test_escape_bare_ampersands() {
        assert!(matches!(escape_bare_ampersands("no entities here"), Cow::Borrowed(_)));
        assert_eq!(escape_bare_ampersands("A & B"), "A &amp; B");
        assert_eq!(escape_bare_ampersands("A &amp; B"), "A &amp; B");
        assert_eq!(escape_bare_ampersands("&lt;&gt;&quot;&apos;"), "&lt;&gt;&quot;&apos;");
        assert_eq!(escape_bare_ampersands("&#233;&#xE9;"), "&#233;&#xE9;");
        assert_eq!(escape_bare_ampersands("&nbsp;"), "&amp;nbsp;");
        assert_eq!(escape_bare_ampersands("AT&T"), "AT&amp;T");
        assert_eq!(escape_bare_ampersands("trailing &"), "trailing &amp;");
        assert_eq!(escape_bare_ampersands("&#;"), "&amp;#;");
    }

    #[test]
    fn test_numeric_references_in_text() {
        let doc = concat!(
            r#"<tv><programme channel="a" start="1" stop="2">"#,
            "<title>Caf&#233; &#x26; Bar</title></programme></tv>"
        );
        let feed = parse_xmltv(doc).unwrap();
        assert_eq!(feed.programmes[0].title, "Café & Bar");
    }

    #[test]
    fn test_cdata_and_comments_left_verbatim() {
        let doc = concat!(
            r#"<tv><!-- listings by A&E --><programme channel="a" start="1" stop="2">"#,
            "<title><![CDATA[Tom & Jerry]]></title>",
            "<desc>Cat & mouse</desc></programme></tv>"
        );
        let escaped = escape_bare_ampersands(doc);
        assert!(escaped.contains("<!-- listings by A&E -->"));
        assert!(escaped.contains("<![CDATA[Tom & Jerry]]>"));
        assert!(escaped.contains("Cat &amp; mouse"));

        let feed = parse_xmltv(&escaped).unwrap();
        assert_eq!(feed.programmes[0].title, "Tom & Jerry");
        assert_eq!(feed.programmes[0].desc.as_deref(), Some("Cat & mouse"));
    }

    #[test]
    fn test_unterminated_cdata_is_copied_through() {
        assert_eq!(
            escape_bare_ampersands("A & <![CDATA[B & C"),
            "A &amp; <![CDATA[B & C"
        );
        assert_eq!(escape_bare_ampersands("1 < 2 & 3"), "1 < 2 &amp; 3");
    }
}
