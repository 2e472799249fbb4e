use ladder_math::Matrix;

use crate::convert;
use crate::error::{Error, Result};
use crate::token::{
    ArrayToken, ComplexMatrixToken, DoubleMatrixToken, IntMatrixToken, LongMatrixToken, Token,
};
use crate::ty::{self, TokenType};

/// Parse the printed form of a token. The grammar is exactly what the
/// display implementations emit, with whitespace freedom: suffixed
/// scalars (`5ub`, `9L`, `2.5`, `1.0 + 2.0i`), quoted strings, `fix` and
/// `smoothToken` calls, brace arrays and bracket matrices.
///
/// Brace elements are promoted to their least common kind, so `{1, 2.5}`
/// reads as a double array and `{1, "x"}` as a string array. Bracket
/// elements promote the same way across the numeric kinds only.
pub fn parse_token(text: &str) -> Result<Token> {
    trace!("parsing token literal {text:?}");
    let mut parser = Parser::new(text);
    parser.skip_ws();
    let token = parser.parse_value()?;
    parser.skip_ws();
    if !parser.at_end() {
        bail!(
            "unexpected trailing input '{}' in token literal '{text}'",
            parser.rest()
        );
    }
    Ok(token)
}

struct Parser<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Parser<'a> {
        Parser { text, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        if self.eat(expected) {
            Ok(())
        } else {
            bail!(
                "expected '{expected}' at position {} in token literal '{}'",
                self.pos,
                self.text
            )
        }
    }

    fn parse_value(&mut self) -> Result<Token> {
        self.skip_ws();
        match self.peek() {
            Some('{') => self.parse_array(),
            Some('[') => self.parse_matrix(),
            Some('"') => self.parse_string(),
            Some(c) if c.is_ascii_digit() || c == '+' || c == '-' || c == '.' => {
                self.parse_numeric()
            }
            Some(c) if c.is_ascii_alphabetic() || c == '_' => self.parse_word(),
            Some(c) => bail!("unexpected character '{c}' in token literal '{}'", self.text),
            None => bail!("empty token literal"),
        }
    }

    fn parse_word(&mut self) -> Result<Token> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.bump();
        }
        match &self.text[start..self.pos] {
            "nil" => Ok(Token::Nil),
            "true" => Ok(Token::boolean(true)),
            "false" => Ok(Token::boolean(false)),
            "NaN" => Ok(Token::double(f64::NAN)),
            "inf" => Ok(Token::double(f64::INFINITY)),
            "fix" => self.parse_fix(),
            "smoothToken" => self.parse_smooth(),
            other => bail!("unrecognized literal '{other}'"),
        }
    }

    /// A number, continued into `a + bi` form when a signed imaginary
    /// part follows. Anything else after the number is left in place.
    fn parse_numeric(&mut self) -> Result<Token> {
        let first = self.parse_scalar()?;
        if !matches!(first, Token::Int(_) | Token::Double(_)) {
            return Ok(first);
        }
        let save = self.pos;
        self.skip_ws();
        let sign = match self.peek() {
            Some('+') => 1.0,
            Some('-') => -1.0,
            _ => {
                self.pos = save;
                return Ok(first);
            }
        };
        self.bump();
        self.skip_ws();
        match self.parse_scalar() {
            Ok(Token::Complex(c)) => {
                let re = first.double_value()?;
                Ok(Token::complex(re, sign * c.value.im))
            }
            _ => {
                self.pos = save;
                Ok(first)
            }
        }
    }

    /// One signed numeric literal with its kind suffix. A trailing `i`
    /// marks a pure imaginary and yields a complex token.
    fn parse_scalar(&mut self) -> Result<Token> {
        let start = self.pos;
        let negative = match self.peek() {
            Some('+') => {
                self.bump();
                false
            }
            Some('-') => {
                self.bump();
                true
            }
            _ => false,
        };
        if self.rest().starts_with("inf") {
            self.pos += 3;
            return Ok(Token::double(if negative {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            }));
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.bump();
        }
        let mut float = false;
        if self.peek() == Some('.') {
            float = true;
            self.bump();
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.bump();
            }
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let save = self.pos;
            self.bump();
            if matches!(self.peek(), Some('+' | '-')) {
                self.bump();
            }
            if matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                float = true;
                while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                    self.bump();
                }
            } else {
                self.pos = save;
            }
        }
        let number = &self.text[start..self.pos];
        if self.eat('i') {
            let value: f64 = number
                .parse()
                .map_err(|_| Error::Generic(format!("cannot parse '{number}i' as an imaginary literal")))?;
            return Ok(Token::complex(0.0, value));
        }
        if float {
            let value: f64 = number
                .parse()
                .map_err(|_| Error::Generic(format!("cannot parse '{number}' as a double literal")))?;
            return Ok(Token::double(value));
        }
        if self.eat('L') {
            let value: i64 = number
                .parse()
                .map_err(|_| Error::Generic(format!("cannot parse '{number}L' as a long literal")))?;
            return Ok(Token::long(value));
        }
        if self.rest().starts_with("ub") {
            self.pos += 2;
            let value: u8 = number
                .parse()
                .map_err(|_| Error::Generic(format!("cannot parse '{number}ub' as a byte literal")))?;
            return Ok(Token::byte(value));
        }
        let value: i32 = number
            .parse()
            .map_err(|_| Error::Generic(format!("cannot parse '{number}' as an int literal")))?;
        Ok(Token::int(value))
    }

    fn parse_string(&mut self) -> Result<Token> {
        self.expect('"')?;
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(Token::string(value)),
                Some('\\') => match self.bump() {
                    Some('"') => value.push('"'),
                    Some('\\') => value.push('\\'),
                    Some(other) => bail!("unknown escape '\\{other}' in a string literal"),
                    None => bail!("unterminated string literal"),
                },
                Some(c) => value.push(c),
                None => bail!("unterminated string literal"),
            }
        }
    }

    fn parse_array(&mut self) -> Result<Token> {
        self.expect('{')?;
        let mut values = Vec::new();
        self.skip_ws();
        if !self.eat('}') {
            loop {
                values.push(self.parse_value()?);
                self.skip_ws();
                if self.eat(',') {
                    continue;
                }
                self.expect('}')?;
                break;
            }
        }
        let values = unify(values)?;
        Ok(Token::Array(ArrayToken::new(values)?))
    }

    fn parse_matrix(&mut self) -> Result<Token> {
        self.expect('[')?;
        self.skip_ws();
        if self.peek() == Some(']') {
            bail!("a matrix literal needs at least one element");
        }
        let mut rows: Vec<Vec<Token>> = Vec::new();
        let mut row: Vec<Token> = Vec::new();
        loop {
            row.push(self.parse_value()?);
            self.skip_ws();
            match self.bump() {
                Some(',') => continue,
                Some(';') => {
                    rows.push(std::mem::take(&mut row));
                    continue;
                }
                Some(']') => {
                    rows.push(row);
                    break;
                }
                _ => bail!(
                    "expected ',', ';' or ']' in matrix literal '{}'",
                    self.text
                ),
            }
        }
        build_matrix(rows)
    }

    fn parse_fix(&mut self) -> Result<Token> {
        self.expect('(')?;
        self.skip_ws();
        let value = self.parse_scalar()?.double_value()?;
        self.skip_ws();
        self.expect(',')?;
        self.skip_ws();
        let total = self.parse_precision_field()?;
        self.skip_ws();
        self.expect(',')?;
        self.skip_ws();
        let integer = self.parse_precision_field()?;
        self.skip_ws();
        self.expect(')')?;
        Token::fix(value, total, integer)
    }

    fn parse_precision_field(&mut self) -> Result<u32> {
        match self.parse_scalar()? {
            Token::Int(i) if i.value >= 0 => Ok(i.value as u32),
            other => bail!("a precision field must be a nonnegative integer, found '{other}'"),
        }
    }

    fn parse_smooth(&mut self) -> Result<Token> {
        self.expect('(')?;
        self.skip_ws();
        let value = self.parse_scalar()?.double_value()?;
        let mut derivatives = Vec::new();
        self.skip_ws();
        if self.eat(',') {
            self.skip_ws();
            self.expect('{')?;
            self.skip_ws();
            if !self.eat('}') {
                loop {
                    derivatives.push(self.parse_scalar()?.double_value()?);
                    self.skip_ws();
                    if self.eat(',') {
                        self.skip_ws();
                        continue;
                    }
                    self.expect('}')?;
                    break;
                }
            }
        }
        self.skip_ws();
        self.expect(')')?;
        Ok(Token::smooth(value, derivatives))
    }
}

/// Promote brace elements to their least common kind; nil elements stay
/// nil and do not take part in the choice.
fn unify(values: Vec<Token>) -> Result<Vec<Token>> {
    let mut common: Option<TokenType> = None;
    for value in &values {
        if value.is_nil() {
            continue;
        }
        let tag = value.token_type();
        common = Some(match common {
            None => tag,
            Some(current) => {
                if ty::le(&tag, &current) {
                    current
                } else if ty::le(&current, &tag) {
                    tag
                } else {
                    bail!("array elements of kind {current} and {tag} are incomparable")
                }
            }
        });
    }
    match common {
        Some(tag) => values
            .iter()
            .map(|value| convert::convert(value, &tag))
            .collect(),
        None => Ok(values),
    }
}

/// Assemble a bracket literal at the widest numeric kind present.
fn build_matrix(rows: Vec<Vec<Token>>) -> Result<Token> {
    let mut common = TokenType::Int;
    for value in rows.iter().flatten() {
        let tag = match value.token_type() {
            TokenType::Byte => TokenType::Int,
            tag => tag,
        };
        if !matches!(
            tag,
            TokenType::Int | TokenType::Long | TokenType::Double | TokenType::Complex
        ) {
            bail!(
                "matrix elements must be numeric scalars, found {} '{value}'",
                value.token_type()
            );
        }
        if ty::le(&common, &tag) {
            common = tag;
        } else if !ty::le(&tag, &common) {
            bail!("matrix elements of kind {common} and {tag} are incomparable");
        }
    }
    match common {
        TokenType::Int => {
            let data = rows_to(&rows, |v| v.int_value())?;
            Ok(Token::IntMatrix(IntMatrixToken::new(Matrix::from_rows(
                data,
            )?)))
        }
        TokenType::Long => {
            let data = rows_to(&rows, |v| v.long_value())?;
            Ok(Token::LongMatrix(LongMatrixToken::new(Matrix::from_rows(
                data,
            )?)))
        }
        TokenType::Double => {
            let data = rows_to(&rows, |v| v.double_value())?;
            Ok(Token::DoubleMatrix(DoubleMatrixToken::new(
                Matrix::from_rows(data)?,
            )))
        }
        _ => {
            let data = rows_to(&rows, |v| v.complex_value())?;
            Ok(Token::ComplexMatrix(ComplexMatrixToken::new(
                Matrix::from_rows(data)?,
            )))
        }
    }
}

fn rows_to<T>(
    rows: &[Vec<Token>],
    mut get: impl FnMut(&Token) -> Result<T>,
) -> Result<Vec<Vec<T>>> {
    rows.iter()
        .map(|row| row.iter().map(&mut get).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn round_trip(text: &str) {
        let token = parse_token(text).unwrap();
        assert_eq!(token.to_string(), text);
    }

    #[test]
    fn printed_scalars_reparse_verbatim() {
        for text in [
            "nil",
            "true",
            "200ub",
            "-7",
            "9L",
            "2.5",
            "-0.125",
            "1.0 + 2.0i",
            "0.0 - 1.0i",
            "\"a\\\"b\"",
            "fix(5.34375,10,4)",
            "smoothToken(2.0, {1.0,2.0})",
        ] {
            round_trip(text);
        }
    }

    #[test]
    fn brace_literals_promote_to_the_common_kind() {
        assert_eq!(parse_token("{1, 2.5}").unwrap().to_string(), "{1.0, 2.5}");
        assert_eq!(
            parse_token("{1, \"x\"}").unwrap().to_string(),
            "{\"1\", \"x\"}"
        );
        round_trip("{nil, 2}");
        let err = parse_token("{1L, 2.5}").unwrap_err();
        assert!(err.to_string().contains("incomparable"));
    }

    #[test]
    fn bracket_literals_choose_the_matrix_kind_by_content() {
        round_trip("[1, 2; 3, 4]");
        round_trip("[1L, 2L]");
        assert_eq!(parse_token("[1, 2.5]").unwrap().to_string(), "[1.0, 2.5]");
        assert!(parse_token("[1; 2, 3]").is_err());
        assert!(parse_token("[true, false]").is_err());
    }

    #[test]
    fn malformed_input_is_reported_not_panicked() {
        assert!(parse_token("").is_err());
        assert!(parse_token("1 2").is_err());
        assert!(parse_token("{1, 2").is_err());
        assert!(parse_token("\"open").is_err());
        assert!(parse_token("99999999999").is_err());
        assert!(parse_token("frob(1)").is_err());
    }

    #[test]
    fn a_lone_sign_does_not_swallow_the_next_number() {
        // `1 - 2` is not a literal; the continuation only binds to an
        // imaginary part.
        assert!(parse_token("1 - 2").is_err());
        assert_eq!(
            parse_token("1 - 2i").unwrap(),
            Token::complex(1.0, -2.0)
        );
    }
}
