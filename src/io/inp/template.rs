use crate::io::error::FormatError;
use std::collections::BTreeMap;

/// Named values for `{name}` placeholders in generated input text.
pub type Parameters = BTreeMap<String, String>;

/// Replaces every `{name}` in `template` with its parameter value.
///
/// `{{` and `}}` produce literal braces. Unknown names and malformed
/// placeholders are errors; nothing is left unsubstituted.
pub fn substitute(template: &str, params: &Parameters) -> Result<String, FormatError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        match c {
            '{' => {
                if chars.next_if(|&(_, c)| c == '{').is_some() {
                    out.push('{');
                    continue;
                }
                let close = chars
                    .by_ref()
                    .find(|&(_, c)| c == '}' || c == '{')
                    .filter(|&(_, c)| c == '}')
                    .map(|(i, _)| i)
                    .ok_or_else(|| FormatError::Template {
                        offset,
                        details: "unterminated '{'".to_string(),
                    })?;
                let name = &template[offset + 1..close];
                if !is_field_name(name) {
                    return Err(FormatError::Template {
                        offset,
                        details: format!("'{{{name}}}' is not a named placeholder"),
                    });
                }
                let value = params
                    .get(name)
                    .ok_or_else(|| FormatError::MissingParameter(name.to_string()))?;
                out.push_str(value);
            }
            '}' => {
                if chars.next_if(|&(_, c)| c == '}').is_none() {
                    return Err(FormatError::Template {
                        offset,
                        details: "single '}' must be written as '}}'".to_string(),
                    });
                }
                out.push('}');
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

/// Any non-empty name that does not start with a digit and has no
/// attribute, index, format or conversion syntax in it.
fn is_field_name(name: &str) -> bool {
    name.chars().next().is_some_and(|c| !c.is_ascii_digit())
        && !name.contains(['.', '[', ']', ':', '!'])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Parameters {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn replaces_named_placeholders() {
        let p = params(&[("project", "water"), ("steps", "100")]);
        assert_eq!(
            substitute("PROJECT {project}\nSTEPS {steps}", &p).expect("substitute"),
            "PROJECT water\nSTEPS 100"
        );
    }

    #[test]
    fn doubled_braces_are_literal() {
        assert_eq!(
            substitute("{{not_a_param}}", &Parameters::new()).expect("substitute"),
            "{not_a_param}"
        );
    }

    #[test]
    fn text_without_placeholders_is_unchanged() {
        let text = "&GLOBAL\n   RUN_TYPE MD\n&END GLOBAL";
        assert_eq!(substitute(text, &Parameters::new()).expect("substitute"), text);
    }

    #[test]
    fn names_may_use_keyword_characters() {
        let p = params(&[("cut-off", "400"), ("basis set", "DZVP")]);
        assert_eq!(
            substitute("CUTOFF {cut-off}\nBASIS_SET {basis set}", &p).expect("substitute"),
            "CUTOFF 400\nBASIS_SET DZVP"
        );
    }

    #[test]
    fn unknown_name_is_missing_parameter() {
        let err = substitute("A {cutoff}", &Parameters::new()).unwrap_err();
        assert_eq!(err, FormatError::MissingParameter("cutoff".into()));
    }

    #[test]
    fn malformed_placeholders_report_offset() {
        for (text, offset) in [("ab {x", 3), ("a }", 2), ("{1}", 0), ("{}", 0), ("{a{b}", 0), ("{x.real}", 0), ("{x:>4}", 0)] {
            match substitute(text, &params(&[("x", "1")])) {
                Err(FormatError::Template { offset: got, .. }) => {
                    assert_eq!(got, offset, "template {text:?}")
                }
                other => panic!("template {text:?} gave {other:?}"),
            }
        }
    }
}
