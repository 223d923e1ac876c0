use crate::error::Error;
use crate::token::{Op, Token};
use std::iter::Peekable;
use std::str::Chars;

#[must_use]
/// Check if `c` may appear in a formula handed to the evaluator.
///
/// Only ASCII digits, `.`, the four arithmetic operators and parentheses are
/// allowed. Whitespace is not part of the set: the normalizer removes it, and
/// the lexer merely skips it.
///
/// # Examples
///
/// ```
/// # use roi_cruncher::is_arithmetic;
///
/// assert_eq!(is_arithmetic('7'), true);
/// assert_eq!(is_arithmetic('('), true);
/// assert_eq!(is_arithmetic('^'), false);
/// assert_eq!(is_arithmetic('x'), false);
/// ```
pub fn is_arithmetic(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '.' | '+' | '-' | '*' | '/' | '(' | ')')
}

/// An helper struct for lexing the input
pub struct Lexer<'a> {
    input: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(string: &str) -> Lexer {
        Lexer {
            input: string.chars().peekable(),
        }
    }

    /// Tokenize the input and reorder it in reverse polish notation with the
    /// shunting-yard algorithm.
    ///
    /// The token sequence is checked while it is read: an operand must follow
    /// every operator and opening parenthesis, and an operator must separate
    /// two operands. A `+` or `-` found where an operand is expected is a sign,
    /// so `10--3` is `13` rather than a rejected double operator.
    pub fn parse(&mut self) -> Result<Vec<Token>, Error> {
        let mut output = Vec::new();
        let mut operators = Vec::new();
        let mut expect_operand = true;
        let mut seen_token = false;

        'tokens: while let Some(token) = self.next_token()? {
            seen_token = true;
            match token {
                Token::Value(value) => {
                    if !expect_operand {
                        return Err(Error::ParseError(format!(
                            "missing operator before {}",
                            value
                        )));
                    }
                    output.push(Token::Value(value));
                    expect_operand = false;
                }
                Token::Op(op) if expect_operand => {
                    let unary = match op {
                        Op::Plus => Op::Pos,
                        Op::Minus => Op::Neg,
                        _ => {
                            return Err(Error::ParseError(format!(
                                "missing operand before {}",
                                symbol(op)
                            )))
                        }
                    };
                    // prefix operators have no left operand to pop for
                    operators.push(Token::Op(unary));
                }
                Token::Op(o1) => {
                    'operators: while let Some(token) = operators.last().cloned() {
                        match token {
                            Token::Op(o2) => {
                                let pop_me =
                                    o1.is_left_associative() && o1.precedence() <= o2.precedence();
                                let pop_me = pop_me
                                    || o1.is_right_associative()
                                        && o1.precedence() < o2.precedence();
                                if pop_me {
                                    operators.pop();
                                    output.push(Token::Op(o2));
                                } else {
                                    break 'operators;
                                }
                            }
                            _ => break 'operators,
                        }
                    }
                    operators.push(token);
                    expect_operand = true;
                }
                Token::LParen => {
                    if !expect_operand {
                        return Err(Error::ParseError("missing operator before (".into()));
                    }
                    operators.push(token);
                }
                Token::RParen => {
                    if expect_operand {
                        return Err(Error::ParseError("missing operand before )".into()));
                    }
                    while let Some(token) = operators.pop() {
                        match token {
                            Token::LParen => continue 'tokens,
                            Token::Op(_) => output.push(token),
                            Token::Value(_) | Token::RParen => {
                                return Err(Error::ParseError(format!(
                                    "unexpected {:?} in operators stack",
                                    token
                                )))
                            }
                        }
                    }
                    return Err(Error::ParseError("mismatched parenthesis".into()));
                }
            }
        }

        if !seen_token {
            return Err(Error::EmptyExpression);
        }
        if expect_operand {
            return Err(Error::ParseError("unexpected end of expression".into()));
        }

        while let Some(token) = operators.pop() {
            match token {
                Token::LParen => return Err(Error::ParseError("mismatched parenthesis".into())),
                Token::Op(_) => output.push(token),
                Token::Value(_) | Token::RParen => {
                    return Err(Error::ParseError(format!(
                        "unexpected {:?} in operators stack",
                        token
                    )))
                }
            }
        }
        Ok(output)
    }

    fn next_token(&mut self) -> Result<Option<Token>, Error> {
        while let Some(&c) = self.input.peek() {
            if c.is_whitespace() {
                self.input.next();
            } else {
                break;
            }
        }

        let c = match self.input.next() {
            Some(c) => c,
            None => return Ok(None),
        };
        let token = match c {
            c if is_number_part(c) => {
                let mut literal = String::new();
                literal.push(c);
                while let Some(&c) = self.input.peek() {
                    if is_number_part(c) {
                        self.input.next();
                        literal.push(c);
                    } else {
                        break;
                    }
                }
                check_number(&literal)?;
                Token::Value(literal)
            }
            '+' => Token::Op(Op::Plus),
            '-' => Token::Op(Op::Minus),
            '*' => Token::Op(Op::Mul),
            '/' => Token::Op(Op::Div),
            '(' => Token::LParen,
            ')' => Token::RParen,
            other => return Err(Error::ForbiddenCharacter(other)),
        };
        Ok(Some(token))
    }
}

fn symbol(op: Op) -> char {
    match op {
        Op::Plus | Op::Pos => '+',
        Op::Minus | Op::Neg => '-',
        Op::Mul => '*',
        Op::Div => '/',
    }
}

/// Check if `c` can appear inside a number literal
fn is_number_part(c: char) -> bool {
    c == '.' || c.is_ascii_digit()
}

/// A literal needs at least one digit and at most one decimal point
fn check_number(literal: &str) -> Result<(), Error> {
    let points = literal.chars().filter(|&c| c == '.').count();
    if points > 1 || literal == "." {
        return Err(Error::ParseError(format!("invalid number {}", literal)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Op, Token};
    use test_case::test_case;

    fn value(v: &str) -> Token {
        Token::Value(v.to_string())
    }

    #[test_case("2 + 2" => Ok(vec![value("2"), value("2"), Token::Op(Op::Plus)]) ; "addition is parsed properly")]
    #[test_case("2+2" => Ok(vec![value("2"), value("2"), Token::Op(Op::Plus)]) ; "spaces are optional")]
    #[test_case("2+3*4" => Ok(vec![value("2"), value("3"), value("4"), Token::Op(Op::Mul), Token::Op(Op::Plus)]) ; "multiplication binds tighter")]
    #[test_case("(2+3)*4" => Ok(vec![value("2"), value("3"), Token::Op(Op::Plus), value("4"), Token::Op(Op::Mul)]) ; "parenthesis group")]
    #[test_case("8-2-1" => Ok(vec![value("8"), value("2"), Token::Op(Op::Minus), value("1"), Token::Op(Op::Minus)]) ; "subtraction is left associative")]
    #[test_case("3*-2" => Ok(vec![value("3"), value("2"), Token::Op(Op::Neg), Token::Op(Op::Mul)]) ; "sign after operator")]
    #[test_case("-2*3" => Ok(vec![value("2"), Token::Op(Op::Neg), value("3"), Token::Op(Op::Mul)]) ; "leading sign binds to the literal")]
    #[test_case("10--3" => Ok(vec![value("10"), value("3"), Token::Op(Op::Neg), Token::Op(Op::Minus)]) ; "subtracting a negative value")]
    fn parse(equation: &str) -> Result<Vec<Token>, Error> {
        Lexer::new(equation).parse()
    }

    #[test_case("" => Error::EmptyExpression ; "empty input")]
    #[test_case("   " => Error::EmptyExpression ; "blank input")]
    #[test_case("(" => Error::ParseError("unexpected end of expression".into()) ; "lone parenthesis")]
    #[test_case("()" => Error::ParseError("missing operand before )".into()) ; "empty group")]
    #[test_case("(1+2" => Error::ParseError("mismatched parenthesis".into()) ; "unclosed group")]
    #[test_case("1+2)" => Error::ParseError("mismatched parenthesis".into()) ; "unopened group")]
    #[test_case("2+" => Error::ParseError("unexpected end of expression".into()) ; "trailing operator")]
    #[test_case("*2" => Error::ParseError("missing operand before *".into()) ; "leading binary operator")]
    #[test_case("2(3)" => Error::ParseError("missing operator before (".into()) ; "juxtaposed group")]
    #[test_case("1.2.3" => Error::ParseError("invalid number 1.2.3".into()) ; "two decimal points")]
    #[test_case("2^3" => Error::ForbiddenCharacter('^') ; "exponent is not arithmetic here")]
    #[test_case("alert(1)" => Error::ForbiddenCharacter('a') ; "identifiers are rejected")]
    fn parse_errors(equation: &str) -> Error {
        Lexer::new(equation).parse().unwrap_err()
    }

    #[test]
    fn whitelist() {
        for c in "0123456789.+-*/()".chars() {
            assert!(is_arithmetic(c));
        }
        for c in ['a', 'Z', '_', ' ', '^', '%', ',', '$', 'e', '=', ';', '[', '`'].iter() {
            assert!(!is_arithmetic(*c));
        }
    }

    #[test]
    fn numbers() {
        assert!(check_number(".5").is_ok());
        assert!(check_number("5.").is_ok());
        assert!(check_number("10000").is_ok());
        assert!(check_number(".").is_err());
        assert!(check_number("1..").is_err());
    }
}
