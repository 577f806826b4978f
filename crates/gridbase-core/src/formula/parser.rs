use crate::formula::FormulaError;
use rust_decimal::Decimal;
use std::{iter::Peekable, str::CharIndices, str::FromStr};

///
/// Expr
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Expr {
    Number(Decimal),
    Text(String),
    Neg(Box<Self>),
    Binary {
        op: BinaryOp,
        left: Box<Self>,
        right: Box<Self>,
    },
    Call {
        function: Function,
        args: Vec<Self>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub(crate) const fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
        }
    }
}

///
/// Function
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Function {
    RowId,
    Field,
    Concat,
    Upper,
    Lower,
    ToText,
}

impl Function {
    fn lookup(name: &str) -> Option<Self> {
        let function = match name.to_ascii_lowercase().as_str() {
            "row_id" => Self::RowId,
            "field" => Self::Field,
            "concat" => Self::Concat,
            "upper" => Self::Upper,
            "lower" => Self::Lower,
            "totext" => Self::ToText,
            _ => return None,
        };

        Some(function)
    }

    pub(crate) const fn name(self) -> &'static str {
        match self {
            Self::RowId => "row_id",
            Self::Field => "field",
            Self::Concat => "concat",
            Self::Upper => "upper",
            Self::Lower => "lower",
            Self::ToText => "totext",
        }
    }

    // (min, max) argument count; `None` is unbounded.
    const fn arity(self) -> (usize, Option<usize>) {
        match self {
            Self::RowId => (0, Some(0)),
            Self::Field | Self::Upper | Self::Lower | Self::ToText => (1, Some(1)),
            Self::Concat => (1, None),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Number(Decimal),
    Text(String),
    Ident(String),
    LParen,
    RParen,
    Comma,
    Op(BinaryOp),
}

fn tokenize(source: &str) -> Result<Vec<(usize, Token)>, FormulaError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        let token = match c {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            '(' => single(&mut chars, Token::LParen),
            ')' => single(&mut chars, Token::RParen),
            ',' => single(&mut chars, Token::Comma),
            '+' => single(&mut chars, Token::Op(BinaryOp::Add)),
            '-' => single(&mut chars, Token::Op(BinaryOp::Sub)),
            '*' => single(&mut chars, Token::Op(BinaryOp::Mul)),
            '/' => single(&mut chars, Token::Op(BinaryOp::Div)),
            '\'' | '"' => lex_text(&mut chars, pos, c)?,
            c if c.is_ascii_digit() || c == '.' => lex_number(&mut chars)?,
            c if c.is_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if !(c.is_alphanumeric() || c == '_') {
                        break;
                    }
                    ident.push(c);
                    chars.next();
                }
                Token::Ident(ident)
            }
            other => return Err(FormulaError::UnexpectedChar { pos, found: other }),
        };
        tokens.push((pos, token));
    }

    Ok(tokens)
}

fn single(chars: &mut Peekable<CharIndices<'_>>, token: Token) -> Token {
    chars.next();
    token
}

fn lex_text(
    chars: &mut Peekable<CharIndices<'_>>,
    pos: usize,
    quote: char,
) -> Result<Token, FormulaError> {
    chars.next();
    let mut text = String::new();

    loop {
        match chars.next() {
            Some((_, '\\')) => match chars.next() {
                Some((_, escaped)) => text.push(escaped),
                None => return Err(FormulaError::UnterminatedText { pos }),
            },
            Some((_, c)) if c == quote => return Ok(Token::Text(text)),
            Some((_, c)) => text.push(c),
            None => return Err(FormulaError::UnterminatedText { pos }),
        }
    }
}

fn lex_number(chars: &mut Peekable<CharIndices<'_>>) -> Result<Token, FormulaError> {
    let mut digits = String::new();
    while let Some(&(_, c)) = chars.peek() {
        if !(c.is_ascii_digit() || c == '.') {
            break;
        }
        digits.push(c);
        chars.next();
    }

    Decimal::from_str(&digits)
        .map(Token::Number)
        .map_err(|_| FormulaError::InvalidNumber(digits))
}

///
/// Parser
/// Recursive descent over the token stream; precedence climbs from
/// additive to multiplicative to unary.
///

struct Parser {
    tokens: Vec<(usize, Token)>,
    cursor: usize,
    end: usize,
}

pub(crate) fn parse(source: &str) -> Result<Expr, FormulaError> {
    let mut parser = Parser {
        tokens: tokenize(source)?,
        cursor: 0,
        end: source.len(),
    };
    let expr = parser.expr()?;

    match parser.tokens.get(parser.cursor) {
        None => Ok(expr),
        Some((pos, token)) => Err(FormulaError::UnexpectedToken {
            pos: *pos,
            found: describe(token),
        }),
    }
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor).map(|(_, token)| token)
    }

    fn advance(&mut self) -> Option<(usize, Token)> {
        let next = self.tokens.get(self.cursor).cloned();
        if next.is_some() {
            self.cursor += 1;
        }

        next
    }

    fn expect(&mut self, expected: &Token) -> Result<(), FormulaError> {
        match self.advance() {
            Some((_, token)) if &token == expected => Ok(()),
            Some((pos, token)) => Err(FormulaError::UnexpectedToken {
                pos,
                found: describe(&token),
            }),
            None => Err(FormulaError::UnexpectedEnd { pos: self.end }),
        }
    }

    fn expr(&mut self) -> Result<Expr, FormulaError> {
        let mut left = self.term()?;
        while let Some(Token::Op(op @ (BinaryOp::Add | BinaryOp::Sub))) = self.peek() {
            let op = *op;
            self.cursor += 1;
            let right = self.term()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn term(&mut self) -> Result<Expr, FormulaError> {
        let mut left = self.unary()?;
        while let Some(Token::Op(op @ (BinaryOp::Mul | BinaryOp::Div))) = self.peek() {
            let op = *op;
            self.cursor += 1;
            let right = self.unary()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr, FormulaError> {
        if matches!(self.peek(), Some(Token::Op(BinaryOp::Sub))) {
            self.cursor += 1;
            return Ok(Expr::Neg(Box::new(self.unary()?)));
        }

        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, FormulaError> {
        let Some((pos, token)) = self.advance() else {
            return Err(FormulaError::UnexpectedEnd { pos: self.end });
        };

        match token {
            Token::Number(number) => Ok(Expr::Number(number)),
            Token::Text(text) => Ok(Expr::Text(text)),
            Token::LParen => {
                let inner = self.expr()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Token::Ident(name) => self.call(pos, &name),
            other => Err(FormulaError::UnexpectedToken {
                pos,
                found: describe(&other),
            }),
        }
    }

    fn call(&mut self, pos: usize, name: &str) -> Result<Expr, FormulaError> {
        let function = Function::lookup(name).ok_or_else(|| FormulaError::UnknownFunction {
            pos,
            name: name.to_string(),
        })?;
        self.expect(&Token::LParen)?;

        let mut args = Vec::new();
        if matches!(self.peek(), Some(Token::RParen)) {
            self.cursor += 1;
        } else {
            loop {
                args.push(self.expr()?);
                match self.advance() {
                    Some((_, Token::Comma)) => {}
                    Some((_, Token::RParen)) => break,
                    Some((pos, token)) => {
                        return Err(FormulaError::UnexpectedToken {
                            pos,
                            found: describe(&token),
                        });
                    }
                    None => return Err(FormulaError::UnexpectedEnd { pos: self.end }),
                }
            }
        }

        let (min, max) = function.arity();
        if args.len() < min || max.is_some_and(|max| args.len() > max) {
            return Err(FormulaError::Arity {
                function: function.name(),
                found: args.len(),
            });
        }
        if function == Function::Field && !matches!(args.first(), Some(Expr::Text(_))) {
            return Err(FormulaError::FieldNameNotLiteral);
        }

        Ok(Expr::Call { function, args })
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Number(number) => number.to_string(),
        Token::Text(text) => format!("'{text}'"),
        Token::Ident(name) => name.clone(),
        Token::LParen => "(".to_string(),
        Token::RParen => ")".to_string(),
        Token::Comma => ",".to_string(),
        Token::Op(op) => op.symbol().to_string(),
    }
}
