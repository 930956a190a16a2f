use std::mem;

use super::{
    FloatParser, IntParser, Params, Parser, SetBase, SetBitSize, SetComma, SetLayout,
    StringParser, UintParser,
};
use crate::error::ParseError;

pub type IntSliceParser = SliceParser<IntParser>;
pub type UintSliceParser = SliceParser<UintParser>;
pub type FloatSliceParser = SliceParser<FloatParser>;
pub type StringSliceParser = SliceParser<StringParser>;

/// A single delimited record whose elements are parsed by `E`.
///
/// Elements may be double-quoted to contain the delimiter; `""` inside quotes
/// is a literal quote. Input spanning more than one line is rejected and an
/// empty value is an empty list. Element parameters such as `base` are
/// forwarded to `E`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SliceParser<E> {
    element: E,
    comma: Option<char>,
}

impl<E: Parser> Parser for SliceParser<E> {
    type Output = Vec<E::Output>;

    fn type_name(&self) -> String {
        format!("[]{}", self.element.type_name())
    }

    fn parse(&self, raw: &str) -> Result<Self::Output, ParseError> {
        split_record(raw, self.comma.unwrap_or(','))?
            .iter()
            .enumerate()
            .map(|(index, element)| {
                self.element
                    .parse(element)
                    .map_err(|source| ParseError::Element {
                        index,
                        source: Box::new(source),
                    })
            })
            .collect()
    }

    fn params(&self) -> Params {
        let mut params = self.element.params();
        if let Some(comma) = self.comma {
            params.insert("comma".to_string(), comma.to_string().into());
        }
        params
    }

    fn render(&self, value: &Self::Output) -> serde_json::Value {
        value.iter().map(|v| self.element.render(v)).collect()
    }

    fn base_mut(&mut self) -> Option<&mut dyn SetBase> {
        self.element.base_mut()
    }

    fn bit_size_mut(&mut self) -> Option<&mut dyn SetBitSize> {
        self.element.bit_size_mut()
    }

    fn comma_mut(&mut self) -> Option<&mut dyn SetComma> {
        Some(self)
    }

    fn layout_mut(&mut self) -> Option<&mut dyn SetLayout> {
        self.element.layout_mut()
    }
}

impl<E> SetComma for SliceParser<E> {
    fn set_comma(&mut self, comma: char) {
        self.comma = Some(comma);
    }
}

impl<E: SetBase> SetBase for SliceParser<E> {
    fn set_base(&mut self, base: u32) {
        self.element.set_base(base);
    }
}

impl<E: SetBitSize> SetBitSize for SliceParser<E> {
    fn set_bit_size(&mut self, bit_size: u32) {
        self.element.set_bit_size(bit_size);
    }
}

impl<E: SetLayout> SetLayout for SliceParser<E> {
    fn set_layout(&mut self, layout: String) {
        self.element.set_layout(layout);
    }
}

/// Split one record on `delimiter`. Blank lines around the record are
/// ignored; a line break anywhere else outside quotes is an error.
pub(crate) fn split_record(raw: &str, delimiter: char) -> Result<Vec<String>, ParseError> {
    let record = raw.trim_matches(|c: char| c == '\n' || c == '\r');
    if record.is_empty() {
        return Ok(Vec::new());
    }

    let mut fields = Vec::new();
    let mut field = String::new();
    let mut at_field_start = true;
    let mut chars = record.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if at_field_start => {
                loop {
                    match chars.next() {
                        None => return Err(ParseError::UnterminatedQuote),
                        Some('"') if chars.peek() == Some(&'"') => {
                            chars.next();
                            field.push('"');
                        }
                        Some('"') => break,
                        Some(inner) => field.push(inner),
                    }
                }
                match chars.peek() {
                    None | Some(&('\n' | '\r')) => {}
                    Some(&next) if next == delimiter => {}
                    Some(_) => return Err(ParseError::TextAfterQuote),
                }
                at_field_start = false;
            }
            c if c == delimiter => {
                fields.push(mem::take(&mut field));
                at_field_start = true;
            }
            '\n' | '\r' => return Err(ParseError::MultiLine),
            c => {
                field.push(c);
                at_field_start = false;
            }
        }
    }
    fields.push(field);

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(raw: &str) -> Vec<String> {
        split_record(raw, ',').unwrap()
    }

    #[test]
    fn test_split_plain() {
        assert_eq!(split("1,2,3,4"), ["1", "2", "3", "4"]);
        assert_eq!(split("a,"), ["a", ""]);
        assert_eq!(split("a,b\n"), ["a", "b"]);
        assert!(split("").is_empty());
    }

    #[test]
    fn test_split_quoted() {
        assert_eq!(split(r#""a,b",c"#), ["a,b", "c"]);
        assert_eq!(split(r#""say ""hi""",x"#), [r#"say "hi""#, "x"]);
        assert_eq!(split("\"two\nlines\",x"), ["two\nlines", "x"]);
        assert_eq!(
            split_record(r#""open,x"#, ','),
            Err(ParseError::UnterminatedQuote)
        );
    }

    #[test]
    fn test_split_rejects_text_after_closing_quote() {
        assert_eq!(
            split_record(r#""a"b,c"#, ','),
            Err(ParseError::TextAfterQuote)
        );
        assert_eq!(
            split_record(r#"x,"a" ,c"#, ','),
            Err(ParseError::TextAfterQuote)
        );
        assert_eq!(split(r#"x,"a""#), ["x", "a"]);
        assert_eq!(split("\"a\"\n"), ["a"]);
    }

    #[test]
    fn test_split_rejects_multiple_lines() {
        assert_eq!(split_record("a,b\nc,d", ','), Err(ParseError::MultiLine));
    }

    #[test]
    fn test_custom_delimiter() {
        assert_eq!(split_record("1 2 3 a", ' ').unwrap(), ["1", "2", "3", "a"]);
    }

    #[test]
    fn test_int_slice() {
        let parser = IntSliceParser::default();
        assert_eq!(parser.parse("1,2,3,4").unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(parser.parse("").unwrap(), Vec::<i64>::new());
        assert_eq!(parser.type_name(), "[]int64");
    }

    #[test]
    fn test_element_error_names_index() {
        let err = IntSliceParser::default().parse("1,2,x").unwrap_err();
        assert!(matches!(err, ParseError::Element { index: 2, .. }));
        assert!(err.to_string().starts_with("index 2: "));
    }

    #[test]
    fn test_element_parameters_forwarded() {
        let mut parser = IntSliceParser::default();
        parser.set_comma(' ');
        parser.set_base(16);
        assert_eq!(parser.parse("1 2 3 a").unwrap(), vec![1, 2, 3, 10]);

        let params = parser.params();
        assert_eq!(params.get("comma"), Some(&serde_json::json!(" ")));
        assert_eq!(params.get("base"), Some(&serde_json::json!(16)));
    }

    #[test]
    fn test_string_slice_has_no_base() {
        let mut parser = StringSliceParser::default();
        assert!(parser.base_mut().is_none());
        assert!(parser.comma_mut().is_some());
        assert_eq!(parser.type_name(), "[]string");
    }
}
