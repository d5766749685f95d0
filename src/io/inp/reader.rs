use super::dialect::{Dialect, EndMismatch};
use super::lines::{Cursor, Line, split_lines};
use crate::io::error::{Error, SyntaxError};
use crate::model::tree::{ConfigTree, Node, POSITIONAL_KEY, Section};
use crate::model::value::Value;
use std::io::BufRead;
use tracing::{debug, warn};

pub fn read<R: BufRead>(mut reader: R, dialect: &Dialect) -> Result<ConfigTree, Error> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    Ok(parse(&text, dialect)?)
}

/// Parses complete input text. Either the whole text reduces to the grammar
/// or an error is returned; no partial trees are produced.
pub fn parse(text: &str, dialect: &Dialect) -> Result<ConfigTree, SyntaxError> {
    let lines = split_lines(text);
    let mut parser = Parser {
        lines: &lines,
        next: 0,
        dialect,
    };
    let tree = parser.content()?;
    debug!(
        lines = lines.len(),
        sections = tree.len(),
        "parsed CP2K input"
    );
    Ok(tree)
}

#[derive(Debug, PartialEq)]
enum Statement<'a> {
    Blank,
    Start {
        name: &'a str,
        param: Option<Value>,
    },
    End {
        name: Option<&'a str>,
    },
    Keyword {
        name: &'a str,
        values: Vec<Value>,
    },
}

fn classify(line: Line<'_>) -> Result<Statement<'_>, SyntaxError> {
    let mut cursor = Cursor::new(line);
    cursor.skip_blanks();
    if cursor.at_line_end() {
        return Ok(Statement::Blank);
    }
    if cursor.eat('&') {
        section_marker(&mut cursor)
    } else {
        keyword_line(&mut cursor)
    }
}

fn section_marker<'a>(cursor: &mut Cursor<'a>) -> Result<Statement<'a>, SyntaxError> {
    let name = cursor
        .take_name()
        .ok_or_else(|| cursor.error("expected a section name after '&'"))?;
    cursor.expect_separator("section name")?;

    if name.eq_ignore_ascii_case("end") {
        cursor.skip_blanks();
        let closing = if cursor.at_line_end() {
            None
        } else {
            Some(cursor.take_value()?)
        };
        cursor.skip_blanks();
        if !cursor.at_line_end() {
            return Err(cursor.error("unexpected token after section end"));
        }
        return Ok(Statement::End { name: closing });
    }

    if name.len() > 3 && name[..3].eq_ignore_ascii_case("end") {
        return Err(SyntaxError::unexpected(
            cursor.line_number(),
            2,
            format!("malformed section marker '&{name}'; use '&END {}'", &name[3..]),
        ));
    }

    cursor.skip_blanks();
    let param = if cursor.at_line_end() {
        None
    } else {
        let token = cursor.take_value()?;
        cursor.expect_separator("section parameter")?;
        Some(Value::coerce(token))
    };
    cursor.skip_blanks();
    if !cursor.at_line_end() {
        return Err(cursor.error(format!(
            "section '&{name}' takes at most one parameter"
        )));
    }
    Ok(Statement::Start { name, param })
}

fn keyword_line<'a>(cursor: &mut Cursor<'a>) -> Result<Statement<'a>, SyntaxError> {
    let name = cursor.take_name().ok_or_else(|| {
        cursor.error(match cursor.peek() {
            Some(c) => format!("expected a keyword name, found '{c}'"),
            None => "expected a keyword name".to_string(),
        })
    })?;
    if cursor.peek() != Some('[') {
        cursor.expect_separator("keyword name")?;
    }

    let mut values = Vec::new();
    cursor.skip_blanks();
    if cursor.peek() == Some('[') {
        values.push(Value::Str(cursor.take_unit()?));
        cursor.expect_separator("unit")?;
    }

    loop {
        cursor.skip_blanks();
        if cursor.at_line_end() {
            break;
        }
        let token = cursor.take_value()?;
        cursor.expect_separator("value")?;
        values.push(Value::coerce(token));
    }

    Ok(Statement::Keyword { name, values })
}

struct Parser<'t, 'a> {
    lines: &'t [Line<'a>],
    next: usize,
    dialect: &'t Dialect,
}

impl<'a> Parser<'_, 'a> {
    fn advance(&mut self) -> Option<Line<'a>> {
        let line = self.lines.get(self.next).copied();
        self.next += 1;
        line
    }

    fn content(&mut self) -> Result<ConfigTree, SyntaxError> {
        let mut tree = ConfigTree::new();
        while let Some(line) = self.advance() {
            match classify(line)? {
                Statement::Blank => {}
                Statement::Start { name, param } => {
                    let section = self.section(name, param, line.number)?;
                    tree.insert(name, section);
                }
                Statement::End { .. } => {
                    return Err(SyntaxError::StrayEnd { line: line.number });
                }
                Statement::Keyword { name, .. } => {
                    return Err(SyntaxError::unexpected(
                        line.number,
                        1,
                        format!("keyword '{name}' outside of any section"),
                    ));
                }
            }
        }
        Ok(tree)
    }

    fn section(
        &mut self,
        name: &str,
        param: Option<Value>,
        opened_at: usize,
    ) -> Result<Section, SyntaxError> {
        let dialect = self.dialect;
        let mut body = Body::new(dialect.positional_keywords(&name.to_lowercase()));
        body.section.param = param;

        loop {
            let Some(line) = self.advance() else {
                return Err(SyntaxError::Unclosed {
                    line: opened_at,
                    name: name.to_string(),
                });
            };
            match classify(line)? {
                Statement::Blank => {}
                Statement::Keyword { name: key, values } => body.keyword(key, values),
                Statement::Start {
                    name: child,
                    param,
                } => {
                    let nested = self.section(child, param, line.number)?;
                    body.section.insert(child, Node::Section(nested));
                }
                Statement::End { name: closing } => {
                    if let Some(found) = closing
                        && !found.eq_ignore_ascii_case(name)
                    {
                        self.end_mismatch(line.number, name, found)?;
                    }
                    return Ok(body.section);
                }
            }
        }
    }

    fn end_mismatch(&self, line: usize, expected: &str, found: &str) -> Result<(), SyntaxError> {
        match self.dialect.end_mismatch {
            EndMismatch::Strict => Err(SyntaxError::MismatchedEnd {
                line,
                expected: expected.to_string(),
                found: found.to_string(),
            }),
            EndMismatch::Warn => {
                warn!(
                    line,
                    expected, found, "section end names a different section, closing anyway"
                );
                Ok(())
            }
        }
    }
}

/// Section under assembly. Keyword lines in a positional section become
/// rows unless their key is one of the section's recognized keywords.
struct Body<'d> {
    section: Section,
    positional: Option<&'d [String]>,
}

impl<'d> Body<'d> {
    fn new(positional: Option<&'d [String]>) -> Self {
        Self {
            section: Section::new(),
            positional,
        }
    }

    fn keyword(&mut self, key: &str, values: Vec<Value>) {
        let key = key.to_lowercase();
        match self.positional {
            Some(keywords) if !keywords.contains(&key) => {
                let mut row = Vec::with_capacity(values.len() + 1);
                row.push(Value::Str(title_case(&key)));
                row.extend(values);
                self.section.insert(POSITIONAL_KEY, Node::Tuple(row));
            }
            _ => self.section.insert(&key, Node::from_values(values)),
        }
    }
}

/// Upper-cases every letter that does not follow another letter, lower-cases
/// the rest: `si` → `Si`, `h2o` → `H2O`.
pub(crate) fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut after_letter = false;
    for c in text.chars() {
        if after_letter {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        after_letter = c.is_alphabetic();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_default(text: &str) -> Result<ConfigTree, SyntaxError> {
        parse(text, &Dialect::default())
    }

    fn row(values: &[Value]) -> Node {
        Node::Tuple(values.to_vec())
    }

    #[test]
    fn minimal_section_with_any_line_ending() {
        let expected = ConfigTree::new().with("global", Section::new());
        for text in [
            "&GLOBAL\n&END\n",
            "&GLOBAL\r\n&END\r\n",
            "&GLOBAL\r&END\r",
            "&GLOBAL\n&END",
        ] {
            assert_eq!(parse_default(text).expect(text), expected, "input {text:?}");
        }
    }

    #[test]
    fn end_marker_glued_to_name_is_rejected() {
        let err = parse_default("&GLOBAL\n&ENDFOO\n").unwrap_err();
        assert!(matches!(err, SyntaxError::Unexpected { line: 2, .. }), "{err}");
    }

    #[test]
    fn repeated_keyword_collects_in_order() {
        let tree = parse_default("&A\nX 1\nX 2\n&END\n").expect("parse");
        let a = tree.section(&["a"]).expect("section a");
        assert_eq!(
            a.get("x"),
            Some(&Node::Sequence(vec![
                Node::Scalar(Value::Int(1)),
                Node::Scalar(Value::Int(2)),
            ]))
        );
    }

    #[test]
    fn keyword_values_are_coerced_and_collapsed() {
        let text = "\
&FORCE_EVAL
  METHOD Quickstep   # trailing comment
  &DFT
    BASIS_SET_FILE_NAME  BASIS_MOLOPT
    CUTOFF[Ry] 400
    EPS_DEFAULT 1.0E-10
    CELL 10.0 10.0 10.0
    UKS
    ! a comment line
  &END DFT
&END FORCE_EVAL
";
        let tree = parse_default(text).expect("parse");
        let force_eval = tree.section(&["force_eval"]).expect("force_eval");
        assert_eq!(
            force_eval.get("method"),
            Some(&Node::Scalar(Value::from("Quickstep")))
        );

        let dft = tree.section(&["force_eval", "dft"]).expect("dft");
        let keys: Vec<_> = dft.entries.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["basis_set_file_name", "cutoff", "eps_default", "cell", "uks"]
        );
        assert_eq!(
            dft.get("cutoff"),
            Some(&row(&[Value::from("[ry]"), Value::Int(400)]))
        );
        assert_eq!(
            dft.get("eps_default"),
            Some(&Node::Scalar(Value::Float(1.0e-10)))
        );
        assert_eq!(
            dft.get("cell"),
            Some(&row(&[Value::Float(10.0), Value::Float(10.0), Value::Float(10.0)]))
        );
        assert_eq!(dft.get("uks"), Some(&Node::Flag));
    }

    #[test]
    fn unit_without_values_is_a_scalar() {
        let tree = parse_default("&X\n  TEMP [K]\n&END\n").expect("parse");
        assert_eq!(
            tree.section(&["x"]).and_then(|s| s.get("temp")),
            Some(&Node::Scalar(Value::from("[k]")))
        );
    }

    #[test]
    fn coord_lines_become_positional_rows() {
        let text = "\
&SUBSYS
  &COORD
    UNIT angstrom
    O   0.000 0.000 0.119
    H   0.000 0.757 -0.477
    h2o 1 2 3
  &END COORD
&END SUBSYS
";
        let tree = parse_default(text).expect("parse");
        let coord = tree.section(&["subsys", "coord"]).expect("coord");
        assert_eq!(coord.get("unit"), Some(&Node::Scalar(Value::from("angstrom"))));
        assert_eq!(
            coord.get(POSITIONAL_KEY),
            Some(&Node::Sequence(vec![
                row(&[
                    Value::from("O"),
                    Value::Float(0.0),
                    Value::Float(0.0),
                    Value::Float(0.119),
                ]),
                row(&[
                    Value::from("H"),
                    Value::Float(0.0),
                    Value::Float(0.757),
                    Value::Float(-0.477),
                ]),
                row(&[
                    Value::from("H2O"),
                    Value::Int(1),
                    Value::Int(2),
                    Value::Int(3),
                ]),
            ]))
        );
    }

    #[test]
    fn section_parameter_is_kept() {
        let tree = parse_default("&SUBSYS\n&KIND H\n ELEMENT H\n&END KIND\n&END\n")
            .expect("parse");
        let kind = tree.section(&["subsys", "kind"]).expect("kind");
        assert_eq!(kind.param, Some(Value::from("H")));
        assert_eq!(kind.get("element"), Some(&Node::Scalar(Value::from("H"))));
    }

    #[test]
    fn quoted_values_keep_quotes_and_spaces() {
        let tree = parse_default("&GLOBAL\nPROJECT \"my run\" 'x'\n&END\n").expect("parse");
        assert_eq!(
            tree.section(&["global"]).and_then(|s| s.get("project")),
            Some(&row(&[Value::from("\"my run\""), Value::from("'x'")]))
        );
    }

    #[test]
    fn repeated_top_level_sections_form_a_sequence() {
        let tree = parse_default("&FORCE_EVAL 1\n&END\n&FORCE_EVAL 2\n&END\n").expect("parse");
        let Some(Node::Sequence(evals)) = tree.get("force_eval") else {
            panic!("expected a sequence of force_eval sections");
        };
        assert_eq!(evals.len(), 2);
    }

    #[test]
    fn comments_blank_lines_and_final_comment_are_ignored() {
        let tree = parse_default("# header\n\n&GLOBAL\n\n&END\n# trailer").expect("parse");
        assert_eq!(tree, ConfigTree::new().with("global", Section::new()));
    }

    #[test]
    fn mismatched_end_name_is_fatal_by_default() {
        let err = parse_default("&GLOBAL\n&END MOTION\n").unwrap_err();
        assert_eq!(
            err,
            SyntaxError::MismatchedEnd {
                line: 2,
                expected: "GLOBAL".into(),
                found: "MOTION".into(),
            }
        );
    }

    #[test]
    fn mismatched_end_name_is_tolerated_in_warn_mode() {
        let dialect = Dialect::default().with_end_mismatch(EndMismatch::Warn);
        let tree = parse("&GLOBAL\n&END MOTION\n", &dialect).expect("lenient parse");
        assert_eq!(tree, ConfigTree::new().with("global", Section::new()));
    }

    #[test]
    fn structural_errors() {
        assert!(matches!(
            parse_default("&GLOBAL\n  RUN_TYPE MD\n"),
            Err(SyntaxError::Unclosed { line: 1, .. })
        ));
        assert!(matches!(
            parse_default("&END\n"),
            Err(SyntaxError::StrayEnd { line: 1 })
        ));
        assert!(matches!(
            parse_default("RUN_TYPE MD\n"),
            Err(SyntaxError::Unexpected { line: 1, .. })
        ));
        assert!(matches!(
            parse_default("&KIND H O\n&END\n"),
            Err(SyntaxError::Unexpected { line: 1, .. })
        ));
        assert!(matches!(
            parse_default("&A\n  X ]\n&END\n"),
            Err(SyntaxError::Unexpected { line: 2, .. })
        ));
    }

    #[test]
    fn title_case_matches_element_spelling() {
        assert_eq!(title_case("si"), "Si");
        assert_eq!(title_case("h2o"), "H2O");
        assert_eq!(title_case("CL"), "Cl");
        assert_eq!(title_case("c_1"), "C_1");
    }
}
