//! Key=value text and XML property-list parsing.

use encoding_rs::Encoding;
use std::collections::HashMap;
use std::path::Path;

/// Whitespace allowed around keys and separators.
const BLANKS: [char; 3] = [' ', '\t', '\x0c'];

/// On-disk format of a property file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// `key=value` lines.
    Properties,
    /// `<properties><entry key="...">...</entry></properties>`.
    Xml,
}

impl SourceFormat {
    /// Pick the format by extension: `.xml` is XML, anything else is text.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("xml") => Self::Xml,
            _ => Self::Properties,
        }
    }

    /// Parse decoded text in this format.
    pub fn parse(self, text: &str) -> Result<HashMap<String, String>, String> {
        match self {
            Self::Properties => parse_properties(text),
            #[cfg(feature = "xml")]
            Self::Xml => parse_xml(text),
            #[cfg(not(feature = "xml"))]
            Self::Xml => Err("XML property files require the `xml` feature".to_string()),
        }
    }
}

/// Decode raw bytes, rejecting malformed input.
pub(crate) fn decode(bytes: &[u8], encoding: &'static Encoding) -> Result<String, String> {
    let (text, actual, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(format!("content is not valid {}", actual.name()));
    }
    Ok(text.into_owned())
}

/// Parse `key=value` text.
///
/// Follows the classic properties grammar: `#` and `!` start comment lines,
/// the key ends at the first unescaped `=`, `:` or blank, a trailing odd
/// backslash continues the line, and `\t \n \r \f \uXXXX` are unescaped.
pub fn parse_properties(text: &str) -> Result<HashMap<String, String>, String> {
    let mut entries = HashMap::new();
    for line in logical_lines(text) {
        let (key, value) = split_entry(&line);
        entries.insert(unescape(key)?, unescape(value)?);
    }
    Ok(entries)
}

fn logical_lines(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n");
    let mut lines = Vec::new();
    let mut pending: Option<String> = None;

    for natural in normalized.split(['\n', '\r']) {
        let trimmed = natural.trim_start_matches(BLANKS);
        let (body, continues) = strip_continuation(trimmed);

        let line = match pending.take() {
            Some(mut acc) => {
                acc.push_str(body);
                acc
            }
            None if trimmed.is_empty() || trimmed.starts_with(['#', '!']) => continue,
            None => body.to_string(),
        };

        if continues {
            pending = Some(line);
        } else {
            lines.push(line);
        }
    }

    lines.extend(pending);
    lines
}

fn strip_continuation(line: &str) -> (&str, bool) {
    let backslashes = line.len() - line.trim_end_matches('\\').len();
    if backslashes % 2 == 1 {
        (&line[..line.len() - 1], true)
    } else {
        (line, false)
    }
}

fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();
    let mut value_start = line.len();

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = i;
                value_start = i + 1;
                break;
            }
            ' ' | '\t' | '\x0c' => {
                key_end = i;
                let rest = line[i..].trim_start_matches(BLANKS);
                value_start = line.len() - rest.len();
                if rest.starts_with(['=', ':']) {
                    value_start += 1;
                }
                break;
            }
            _ => {}
        }
    }

    (&line[..key_end], line[value_start..].trim_start_matches(BLANKS))
}

fn unescape(raw: &str) -> Result<String, String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let unit = hex4(&mut chars)?;
                let decoded = match char::from_u32(unit) {
                    Some(ch) => ch,
                    None => {
                        // High surrogate: the low half must follow as another \u escape.
                        let mut lookahead = chars.clone();
                        let low = match (lookahead.next(), lookahead.next()) {
                            (Some('\\'), Some('u')) => hex4(&mut lookahead)?,
                            _ => return Err(format!("unpaired surrogate \\u{:04X}", unit)),
                        };
                        chars = lookahead;
                        char::decode_utf16([unit as u16, low as u16])
                            .next()
                            .and_then(|r| r.ok())
                            .ok_or_else(|| format!("invalid surrogate pair \\u{:04X}\\u{:04X}", unit, low))?
                    }
                };
                out.push(decoded);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    Ok(out)
}

fn hex4(chars: &mut std::str::Chars<'_>) -> Result<u32, String> {
    let digits: String = chars.by_ref().take(4).collect();
    // from_str_radix would also accept a leading sign
    if digits.chars().count() != 4 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("malformed \\uxxxx escape: \\u{}", digits));
    }
    u32::from_str_radix(&digits, 16).map_err(|_| format!("malformed \\uxxxx escape: \\u{}", digits))
}

/// Parse an XML property list.
#[cfg(feature = "xml")]
pub fn parse_xml(text: &str) -> Result<HashMap<String, String>, String> {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    let mut reader = Reader::from_str(text);
    let mut entries = HashMap::new();
    let mut open: Option<(String, String)> = None;

    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(e) if e.name().as_ref() == b"entry" => {
                open = Some((entry_key(&e)?, String::new()));
            }
            Event::Empty(e) if e.name().as_ref() == b"entry" => {
                entries.insert(entry_key(&e)?, String::new());
            }
            Event::Text(t) => {
                if let Some((_, value)) = open.as_mut() {
                    value.push_str(&t.unescape().map_err(|e| e.to_string())?);
                }
            }
            Event::CData(c) => {
                if let Some((_, value)) = open.as_mut() {
                    value.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::End(e) if e.name().as_ref() == b"entry" => {
                if let Some((key, value)) = open.take() {
                    entries.insert(key, value);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    match open {
        Some((key, _)) => Err(format!("unterminated <entry key=\"{}\">", key)),
        None => Ok(entries),
    }
}

#[cfg(feature = "xml")]
fn entry_key(element: &quick_xml::events::BytesStart<'_>) -> Result<String, String> {
    let attr = element
        .try_get_attribute("key")
        .map_err(|e| e.to_string())?
        .ok_or_else(|| "<entry> without a key attribute".to_string())?;
    Ok(attr.unescape_value().map_err(|e| e.to_string())?.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get<'a>(entries: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
        entries.get(key).map(String::as_str)
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(SourceFormat::from_path(Path::new("a.xml")), SourceFormat::Xml);
        assert_eq!(SourceFormat::from_path(Path::new("a.XML")), SourceFormat::Xml);
        assert_eq!(SourceFormat::from_path(Path::new("a.properties")), SourceFormat::Properties);
        assert_eq!(SourceFormat::from_path(Path::new("noext")), SourceFormat::Properties);
    }

    #[test]
    fn test_separators_and_comments() {
        let entries = parse_properties(
            "# comment\n! also comment\nfoo=fooval\nbar: barval\nbaz qux\n  spaced  =  value \n\n",
        )
        .unwrap();

        assert_eq!(entries.len(), 4);
        assert_eq!(get(&entries, "foo"), Some("fooval"));
        assert_eq!(get(&entries, "bar"), Some("barval"));
        assert_eq!(get(&entries, "baz"), Some("qux"));
        assert_eq!(get(&entries, "spaced"), Some("value "));
    }

    #[test]
    fn test_value_keeps_later_separators() {
        let entries = parse_properties("url=jdbc:mysql://host/db?a=b").unwrap();
        assert_eq!(get(&entries, "url"), Some("jdbc:mysql://host/db?a=b"));
    }

    #[test]
    fn test_key_only_line() {
        let entries = parse_properties("flag\n").unwrap();
        assert_eq!(get(&entries, "flag"), Some(""));
    }

    #[test]
    fn test_line_continuation() {
        let entries = parse_properties("list = a,\\\n        b,\\\r\n   c\nnext=1").unwrap();
        assert_eq!(get(&entries, "list"), Some("a,b,c"));
        assert_eq!(get(&entries, "next"), Some("1"));
    }

    #[test]
    fn test_even_backslashes_do_not_continue() {
        let entries = parse_properties("path=c:\\\\\nother=x").unwrap();
        assert_eq!(get(&entries, "path"), Some("c:\\"));
        assert_eq!(get(&entries, "other"), Some("x"));
    }

    #[test]
    fn test_escapes() {
        let entries =
            parse_properties("key\\ with\\=sep=tab\\there\\nnewline \\u00e9t\\u00E9 \\q\nemoji=\\uD83D\\uDE00")
                .unwrap();
        assert_eq!(get(&entries, "key with=sep"), Some("tab\there\nnewline été q"));
        assert_eq!(get(&entries, "emoji"), Some("😀"));
    }

    #[test]
    fn test_malformed_unicode_escape() {
        assert!(parse_properties("bad=\\u12").is_err());
        assert!(parse_properties("bad=\\uZZZZ").is_err());
        assert!(parse_properties("bad=\\u+041").is_err());
        assert!(parse_properties("bad=\\u-041").is_err());
        assert!(parse_properties("bad=\\uD83D").is_err());
    }

    #[test]
    fn test_comment_marker_inside_continuation_is_data() {
        let entries = parse_properties("a=1\\\n#2").unwrap();
        assert_eq!(get(&entries, "a"), Some("1#2"));
    }

    #[test]
    fn test_decode_latin1_override() {
        let encoding = Encoding::for_label(b"ISO-8859-1").unwrap();
        let text = decode(b"name=caf\xe9", encoding).unwrap();
        assert_eq!(text, "name=café");
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        assert!(decode(b"name=caf\xe9", encoding_rs::UTF_8).is_err());
    }

    #[cfg(feature = "xml")]
    #[test]
    fn test_parse_xml() {
        let entries = parse_xml(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE properties SYSTEM "http://java.sun.com/dtd/properties.dtd">
<properties>
  <comment>sample</comment>
  <entry key="foo">fooval</entry>
  <entry key="amp">a &amp; b</entry>
  <entry key="cdata"><![CDATA[<raw>]]></entry>
  <entry key="empty"/>
</properties>"#,
        )
        .unwrap();

        assert_eq!(entries.len(), 4);
        assert_eq!(get(&entries, "foo"), Some("fooval"));
        assert_eq!(get(&entries, "amp"), Some("a & b"));
        assert_eq!(get(&entries, "cdata"), Some("<raw>"));
        assert_eq!(get(&entries, "empty"), Some(""));
    }

    #[cfg(feature = "xml")]
    #[test]
    fn test_parse_xml_missing_key() {
        assert!(parse_xml("<properties><entry>v</entry></properties>").is_err());
    }
}
