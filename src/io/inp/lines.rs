use crate::io::error::SyntaxError;

/// One physical line with its 1-based number, without the line terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    pub number: usize,
    pub text: &'a str,
}

/// Splits on `\r\n`, `\r` and `\n` alike. A missing final terminator is fine.
pub fn split_lines(text: &str) -> Vec<Line<'_>> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(Line {
                    number: lines.len() + 1,
                    text: &text[start..i],
                });
                i += 1;
                start = i;
            }
            b'\r' => {
                lines.push(Line {
                    number: lines.len() + 1,
                    text: &text[start..i],
                });
                i += if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                start = i;
            }
            _ => i += 1,
        }
    }

    if start < bytes.len() {
        lines.push(Line {
            number: lines.len() + 1,
            text: &text[start..],
        });
    }

    lines
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn is_comment_start(c: char) -> bool {
    c == '#' || c == '!'
}

/// Character cursor over a single line, reporting errors with line and
/// column.
#[derive(Debug)]
pub struct Cursor<'a> {
    line: Line<'a>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(line: Line<'a>) -> Self {
        Self { line, pos: 0 }
    }

    pub fn line_number(&self) -> usize {
        self.line.number
    }

    pub fn column(&self) -> usize {
        self.line.text[..self.pos].chars().count() + 1
    }

    fn rest(&self) -> &'a str {
        &self.line.text[self.pos..]
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn error(&self, details: impl Into<String>) -> SyntaxError {
        SyntaxError::unexpected(self.line.number, self.column(), details)
    }

    pub fn skip_blanks(&mut self) -> bool {
        let rest = self.rest();
        let skipped = rest.len() - rest.trim_start_matches(is_blank).len();
        self.pos += skipped;
        skipped > 0
    }

    /// True when only a comment or nothing is left.
    pub fn at_line_end(&self) -> bool {
        self.peek().is_none_or(is_comment_start)
    }

    pub fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    pub fn take_name(&mut self) -> Option<&'a str> {
        let rest = self.rest();
        let len = rest.len() - rest.trim_start_matches(is_name_char).len();
        if len == 0 {
            return None;
        }
        self.pos += len;
        Some(&rest[..len])
    }

    /// `[ name ]`, returned lower-cased with its brackets.
    pub fn take_unit(&mut self) -> Result<String, SyntaxError> {
        if !self.eat('[') {
            return Err(self.error("expected '[' to open a unit"));
        }
        self.skip_blanks();
        let name = self
            .take_name()
            .ok_or_else(|| self.error("expected a unit name inside '[...]'"))?;
        self.skip_blanks();
        if !self.eat(']') {
            return Err(self.error("expected ']' to close the unit"));
        }
        Ok(format!("[{}]", name.to_lowercase()))
    }

    /// A quoted string (kept with its quotes) or a bare token.
    pub fn take_value(&mut self) -> Result<&'a str, SyntaxError> {
        let rest = self.rest();
        let len = match rest.chars().next() {
            Some(q @ ('"' | '\'')) => match rest[1..].find(q) {
                Some(end) => end + 2,
                None => return Err(self.error("unterminated quoted string")),
            },
            _ => {
                rest.len()
                    - rest
                        .trim_start_matches(|c: char| {
                            !(is_blank(c) || is_comment_start(c) || c == '[' || c == ']')
                        })
                        .len()
            }
        };
        if len == 0 {
            return Err(self.error(match self.peek() {
                Some(c) => format!("unexpected character '{c}'"),
                None => "expected a value".to_string(),
            }));
        }
        self.pos += len;
        Ok(&rest[..len])
    }

    /// Requires a blank, a comment or the end of the line at the cursor.
    pub fn expect_separator(&self, what: &str) -> Result<(), SyntaxError> {
        match self.peek() {
            None => Ok(()),
            Some(c) if is_blank(c) || is_comment_start(c) => Ok(()),
            Some(c) => Err(self.error(format!("unexpected character '{c}' after {what}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(input: &str) -> Vec<&str> {
        split_lines(input).into_iter().map(|l| l.text).collect()
    }

    #[test]
    fn splits_all_newline_conventions() {
        assert_eq!(texts("a\nb\n"), vec!["a", "b"]);
        assert_eq!(texts("a\r\nb\r\n"), vec!["a", "b"]);
        assert_eq!(texts("a\rb\r"), vec!["a", "b"]);
        assert_eq!(texts("a\r\nb\nc"), vec!["a", "b", "c"]);
        assert_eq!(texts("a\n\nb"), vec!["a", "", "b"]);
    }

    #[test]
    fn numbers_lines_from_one() {
        let lines = split_lines("x\r\ny\rz");
        assert_eq!(
            lines.iter().map(|l| l.number).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn cursor_reads_names_units_and_values() {
        let line = Line {
            number: 4,
            text: "CUTOFF [ Ry ] 400 \"a b\" # comment",
        };
        let mut cursor = Cursor::new(line);
        assert_eq!(cursor.take_name(), Some("CUTOFF"));
        cursor.skip_blanks();
        assert_eq!(cursor.take_unit().expect("unit"), "[ry]");
        cursor.skip_blanks();
        assert_eq!(cursor.take_value().expect("value"), "400");
        cursor.skip_blanks();
        assert_eq!(cursor.take_value().expect("quoted"), "\"a b\"");
        cursor.skip_blanks();
        assert!(cursor.at_line_end());
    }

    #[test]
    fn unterminated_quote_reports_column() {
        let mut cursor = Cursor::new(Line {
            number: 2,
            text: "'abc",
        });
        let err = cursor.take_value().unwrap_err();
        assert_eq!(
            err,
            SyntaxError::unexpected(2, 1, "unterminated quoted string")
        );
    }
}
