//! `.properties` syntax
//!
//! Reading follows the usual rules:
//! - lines starting with `#` or `!` are comments
//! - key and value are separated by `=`, `:` or whitespace
//! - a line ending in an odd number of `\` continues on the next line, leading whitespace of the next line is dropped
//! - escapes: `\t`, `\n`, `\r`, `\f`, `\uXXXX`, any other escaped character stands for itself
use std::io::Write;

const WHITESPACE: &[char] = &[' ', '\t', '\x0c'];

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ParseError {
    #[error("Malformed \\uXXXX escape in line {line}")]
    MalformedUnicodeEscape { line: usize },
}

/// Parses `.properties` text into key/value pairs in document order
pub fn parse(text: &str) -> Result<Vec<(String, String)>, ParseError> {
    logical_lines(text)
        .into_iter()
        .map(|(line, raw)| {
            let (key, value) = split_entry(&raw);
            Ok((unescape(key, line)?, unescape(value, line)?))
        })
        .collect()
}

/// Decodes the bytes of a `.properties` file
///
/// UTF-8 is tried first. Anything else is read as ISO-8859-1, where every byte is the code point of the same value.
pub fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(error) => {
            tracing::debug!("not valid utf-8, reading as ISO-8859-1");
            error.into_bytes().into_iter().map(char::from).collect()
        }
    }
}

/// Joins continued lines
///
/// Returns the 1-based number of the first natural line together with the still escaped logical line.
fn logical_lines(text: &str) -> Vec<(usize, String)> {
    let mut lines = vec![];
    let mut pending: Option<(usize, String)> = None;

    for (index, natural) in text.lines().enumerate() {
        let natural = natural.trim_start_matches(WHITESPACE);

        let (number, mut logical) = match pending.take() {
            Some((number, mut logical)) => {
                logical.push_str(natural);
                (number, logical)
            }
            None => {
                if natural.is_empty() || natural.starts_with(&['#', '!'][..]) {
                    continue;
                }
                (index + 1, natural.to_string())
            }
        };

        if is_continued(&logical) {
            logical.pop();
            pending = Some((number, logical));
        } else {
            lines.push((number, logical));
        }
    }

    if let Some(last) = pending {
        lines.push(last);
    }

    lines
}

fn is_continued(line: &str) -> bool {
    let backslashes = line.chars().rev().take_while(|c| *c == '\\').count();
    backslashes % 2 == 1
}

/// Splits a logical line at the first unescaped separator
fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;

    for (index, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }

        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                return (&line[..index], line[index + 1..].trim_start_matches(WHITESPACE));
            }
            ' ' | '\t' | '\x0c' => {
                // whitespace may be followed by one real separator
                let rest = line[index..].trim_start_matches(WHITESPACE);
                let rest = rest.strip_prefix(&['=', ':'][..]).unwrap_or(rest);
                return (&line[..index], rest.trim_start_matches(WHITESPACE));
            }
            _ => {}
        }
    }

    (line, "")
}

fn unescape(raw: &str, line: usize) -> Result<String, ParseError> {
    let mut unescaped = String::with_capacity(raw.len());
    // \u escapes are UTF-16 code units, surrogate pairs span two escapes
    let mut units: Vec<u16> = vec![];
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('u') => {
                    let hex: String = chars.by_ref().take(4).collect();
                    if hex.len() != 4 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                        return Err(ParseError::MalformedUnicodeEscape { line });
                    }
                    let unit = u16::from_str_radix(&hex, 16)
                        .map_err(|_| ParseError::MalformedUnicodeEscape { line })?;
                    units.push(unit);
                    continue;
                }
                Some(escaped) => {
                    flush_units(&mut units, &mut unescaped);
                    unescaped.push(match escaped {
                        't' => '\t',
                        'n' => '\n',
                        'r' => '\r',
                        'f' => '\x0c',
                        other => other,
                    });
                }
                None => flush_units(&mut units, &mut unescaped),
            }
            continue;
        }

        flush_units(&mut units, &mut unescaped);
        unescaped.push(c);
    }

    flush_units(&mut units, &mut unescaped);
    Ok(unescaped)
}

fn flush_units(units: &mut Vec<u16>, target: &mut String) {
    target.extend(
        char::decode_utf16(units.drain(..)).map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER)),
    );
}

/// Writes `key=value` lines, escaped so that [parse] returns the same pairs
pub fn write<'a>(
    writer: &mut impl Write,
    entries: impl Iterator<Item = (&'a str, &'a str)>,
    comment: Option<&str>,
) -> std::io::Result<()> {
    if let Some(comment) = comment {
        for line in comment.lines() {
            writeln!(writer, "#{line}")?;
        }
    }

    for (key, value) in entries {
        writeln!(writer, "{}={}", escape(key, true), escape(value, false))?;
    }

    Ok(())
}

fn escape(text: &str, is_key: bool) -> String {
    let mut escaped = String::with_capacity(text.len());

    for (index, c) in text.chars().enumerate() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\t' => escaped.push_str("\\t"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\x0c' => escaped.push_str("\\f"),
            ' ' if is_key || index == 0 => escaped.push_str("\\ "),
            '=' | ':' | '#' | '!' if is_key => {
                escaped.push('\\');
                escaped.push(c);
            }
            c if c.is_control() => escaped.push_str(&format!("\\u{:04X}", c as u32)),
            c => escaped.push(c),
        }
    }

    escaped
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pairs(text: &str) -> Vec<(String, String)> {
        parse(text).expect("valid properties")
    }

    fn pair(key: &str, value: &str) -> (String, String) {
        (key.to_string(), value.to_string())
    }

    #[test]
    fn separators() {
        assert_eq!(
            pairs("a=1\nb: 2\nc 3\nd = 4\ne  :  5\nf\n"),
            vec![
                pair("a", "1"),
                pair("b", "2"),
                pair("c", "3"),
                pair("d", "4"),
                pair("e", "5"),
                pair("f", ""),
            ]
        );
    }

    #[test]
    fn comments_and_blank_lines() {
        assert_eq!(
            pairs("# comment\n! also a comment\n\n   \n  key=value # not a comment\n"),
            vec![pair("key", "value # not a comment")]
        );
    }

    #[test]
    fn value_keeps_later_separators() {
        assert_eq!(
            pairs("base.url=http://${hostname}:${port}/"),
            vec![pair("base.url", "http://${hostname}:${port}/")]
        );
    }

    #[test]
    fn continuation() {
        assert_eq!(
            pairs("fruits = apple, \\\n         banana\nnext=1\n"),
            vec![pair("fruits", "apple, banana"), pair("next", "1")]
        );
        // an even number of backslashes is an escaped backslash
        assert_eq!(
            pairs("path=c:\\\\\nnext=1"),
            vec![pair("path", "c:\\"), pair("next", "1")]
        );
    }

    #[test]
    fn escapes() {
        assert_eq!(
            pairs("key\\ with\\=sep=tab\\there\\nnewline \\u00e9\\uD83D\\uDE00"),
            vec![pair("key with=sep", "tab\there\nnewline é😀")]
        );
    }

    #[test]
    fn malformed_unicode_escape() {
        assert_eq!(
            parse("ok=1\nbad=\\u12"),
            Err(ParseError::MalformedUnicodeEscape { line: 2 })
        );
        assert_eq!(
            parse("bad=\\uZZZZ"),
            Err(ParseError::MalformedUnicodeEscape { line: 1 })
        );
        assert_eq!(
            parse("bad=\\u+123"),
            Err(ParseError::MalformedUnicodeEscape { line: 1 })
        );
    }

    #[test]
    fn decodes_latin1() {
        assert_eq!(decode(b"name=caf\xe9".to_vec()), "name=café");
        assert_eq!(decode("name=café".as_bytes().to_vec()), "name=café");
    }

    #[test]
    fn write_reloads() {
        let entries = vec![
            ("simple", "value"),
            ("key with=colon:", " leading space and \\ backslash"),
            ("multi", "line\nvalue\ttab"),
            ("url", "http://localhost:8080/"),
        ];

        let mut out = vec![];
        write(&mut out, entries.iter().copied(), Some("generated")).expect("write");
        let text = String::from_utf8(out).expect("utf8");

        assert!(text.starts_with("#generated\n"));
        assert!(text.contains("url=http://localhost:8080/\n"));

        let reloaded = pairs(&text);
        assert_eq!(
            reloaded,
            entries
                .iter()
                .map(|(k, v)| pair(k, v))
                .collect::<Vec<_>>()
        );
    }
}
