//! placeholder geometry
//!
//! The [Scanner] only knows about `${`, `}` and `:`. It does not know which placeholders were already tried, the
//! expansion engine filters the spans it yields.
use std::ops::Range;

/// Opening delimiter of a placeholder
pub const START: &str = "${";
/// Closing delimiter of a placeholder
pub const END: char = '}';
/// Separates key and default value inside a placeholder body
pub const DEFAULT_DELIMITER: char = ':';

/// Byte range of a closed placeholder, delimiters included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    range: Range<usize>,
}

impl Span {
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    pub fn start(&self) -> usize {
        self.range.start
    }

    pub fn end(&self) -> usize {
        self.range.end
    }

    /// Full placeholder text, `${` and `}` included
    pub fn text<'t>(&self, source: &'t str) -> &'t str {
        &source[self.range.clone()]
    }

    /// Text between the delimiters
    pub fn body<'t>(&self, source: &'t str) -> &'t str {
        &source[self.range.start + START.len()..self.range.end - 1]
    }
}

#[derive(Debug, Clone, Copy, derive_new::new)]
pub struct Scanner {
    /// When disabled, text following a `:` in a placeholder body is part of the key and placeholders opened there
    /// are never yielded on their own.
    defaults_enabled: bool,
}

impl Scanner {
    /// Innermost placeholder that closes first, if any
    pub fn find_innermost(&self, text: &str) -> Option<Span> {
        self.spans(text).next()
    }

    /// All closed placeholders in the order their `}` appears
    ///
    /// Since inner placeholders close before the placeholders enclosing them, every span is yielded after all the
    /// spans nested inside of it.
    pub fn spans<'t>(&self, text: &'t str) -> Spans<'t> {
        Spans {
            text,
            position: 0,
            open: Vec::new(),
            defaults_enabled: self.defaults_enabled,
        }
    }
}

#[derive(Debug)]
struct Frame {
    start: usize,
    after_delimiter: bool,
    inert: bool,
}

/// Iterator over closed placeholders, see [Scanner::spans]
#[derive(Debug)]
pub struct Spans<'t> {
    text: &'t str,
    position: usize,
    open: Vec<Frame>,
    defaults_enabled: bool,
}

impl<'t> Iterator for Spans<'t> {
    type Item = Span;

    fn next(&mut self) -> Option<Span> {
        let bytes = self.text.as_bytes();

        while self.position < bytes.len() {
            let index = self.position;

            if bytes[index..].starts_with(START.as_bytes()) {
                let inert = self.open.last().is_some_and(|frame| {
                    frame.inert || (!self.defaults_enabled && frame.after_delimiter)
                });
                self.open.push(Frame {
                    start: index,
                    after_delimiter: false,
                    inert,
                });
                self.position += START.len();
                continue;
            }

            self.position += 1;

            match bytes[index] {
                b':' => {
                    if let Some(frame) = self.open.last_mut() {
                        frame.after_delimiter = true;
                    }
                }
                b'}' => {
                    // a stray `}` is just text
                    let Some(frame) = self.open.pop() else {
                        continue;
                    };

                    if !frame.inert {
                        return Some(Span {
                            range: frame.start..index + 1,
                        });
                    }
                }
                _ => {}
            }
        }

        None
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn texts(defaults_enabled: bool, text: &str) -> Vec<&str> {
        Scanner::new(defaults_enabled)
            .spans(text)
            .map(|span| span.text(text))
            .collect()
    }

    #[test]
    fn innermost_first() {
        assert_eq!(
            texts(true, "${${Z}${x}}"),
            vec!["${Z}", "${x}", "${${Z}${x}}"]
        );
    }

    #[test]
    fn left_to_right() {
        assert_eq!(
            texts(true, "http://${hostname}:${port}/"),
            vec!["${hostname}", "${port}"]
        );
    }

    #[test]
    fn malformed() {
        assert_eq!(Scanner::new(true).find_innermost("${malformed"), None);
        assert_eq!(Scanner::new(true).find_innermost("no placeholders"), None);
        assert_eq!(texts(true, "${${p1}${}${"), vec!["${p1}", "${}"]);
    }

    #[test]
    fn stray_closing_brace() {
        assert_eq!(texts(true, "}${a}}"), vec!["${a}"]);
    }

    #[test]
    fn empty_body() {
        let text = "x${}";
        let span = Scanner::new(true).find_innermost(text).expect("span");
        assert_eq!(span.range(), 1..4);
        assert_eq!(span.body(text), "");
    }

    #[test]
    fn body() {
        let text = "a${key:default}b";
        let span = Scanner::new(true).find_innermost(text).expect("span");
        assert_eq!(span.text(text), "${key:default}");
        assert_eq!(span.body(text), "key:default");
    }

    #[test]
    fn text_after_delimiter_is_inert_without_defaults() {
        assert_eq!(
            texts(false, "${unknown:${fallback}}"),
            vec!["${unknown:${fallback}}"]
        );
        assert_eq!(
            texts(true, "${unknown:${fallback}}"),
            vec!["${fallback}", "${unknown:${fallback}}"]
        );
        // key expressions before the delimiter still nest
        assert_eq!(texts(false, "${p${three}:x}"), vec!["${three}", "${p${three}:x}"]);
    }

    #[test]
    fn multibyte_text() {
        assert_eq!(texts(true, "ü${ä}ö"), vec!["${ä}"]);
    }
}
