//! The reader: a `nom`-based tokenizer feeding a hand-written recursive
//! descent parser that allocates heap atoms as it goes. Unlike a pure-text
//! parser this one must respect the guard-stack discipline, so it can't be
//! expressed as a single combinator chain — each call that allocates needs
//! a chance to root its result before allocating again.

use nom::branch::alt;
use nom::bytes::complete::{tag, take_while, take_while1};
use nom::character::complete::{char as nom_char, digit1, one_of};
use nom::combinator::{map, opt, recognize};
use nom::multi::many0;
use nom::sequence::pair;
use nom::IResult;

use crate::error::LispError;
use crate::value::{Atom, Interp};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    LParen,
    RParen,
    Quote,
    Quasiquote,
    Unquote,
    UnquoteSplicing,
    Dot,
    Num(f64),
    Sym(String),
    Str(Vec<u8>),
}

fn is_symbol_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '(' | ')' | '\'' | '`' | ',' | ';' | '"')
}

fn skip_ws_and_comments(input: &str) -> IResult<&str, ()> {
    let (input, _) = many0(alt((
        map(take_while1(|c: char| c.is_whitespace()), |_| ()),
        map(pair(nom_char(';'), take_while(|c| c != '\n')), |_| ()),
    )))(input)?;
    Ok((input, ()))
}

fn lex_number(input: &str) -> IResult<&str, Token> {
    let (input, text) = recognize(pair(
        opt(one_of("+-")),
        alt((
            recognize(pair(digit1, opt(pair(nom_char('.'), digit1)))),
            recognize(pair(nom_char('.'), digit1)),
        )),
    ))(input)?;
    match text.parse::<f64>() {
        Ok(n) => Ok((input, Token::Num(n))),
        Err(_) => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Digit,
        ))),
    }
}

fn lex_symbol(input: &str) -> IResult<&str, Token> {
    let (input, text) = take_while1(is_symbol_char)(input)?;
    Ok((input, Token::Sym(text.to_string())))
}

fn lex_token(input: &str) -> IResult<&str, Token> {
    alt((
        map(tag("("), |_| Token::LParen),
        map(tag(")"), |_| Token::RParen),
        map(tag("'"), |_| Token::Quote),
        map(tag("`"), |_| Token::Quasiquote),
        map(tag(",@"), |_| Token::UnquoteSplicing),
        map(tag(","), |_| Token::Unquote),
        // A lone `.` is the dotted-pair marker; `.5` and `-.5` are numbers,
        // so number must be tried before we fall back to treating `.` as
        // the dot token or a symbol.
        lex_number,
        map(tag("."), |_| Token::Dot),
        lex_symbol,
    ))(input)
}

/// Tokenize the entire input into a flat token list. Whitespace and `;`
/// comments are dropped between tokens.
pub fn lex(input: &str) -> Result<Vec<Token>, LispError> {
    let mut rest = input;
    let mut tokens = Vec::new();
    loop {
        let (r, _) = skip_ws_and_comments(rest).map_err(|_| LispError::UnexpectedEof)?;
        rest = r;
        if rest.is_empty() {
            break;
        }
        // Strings are handled outside the nom combinator chain so a
        // missing closing quote is reported distinctly (UnterminatedString)
        // rather than as an opaque unrecognized-character error.
        if let Some(after_quote) = rest.strip_prefix('"') {
            match after_quote.find('"') {
                Some(end) => {
                    tokens.push(Token::Str(after_quote[..end].as_bytes().to_vec()));
                    rest = &after_quote[end + 1..];
                }
                None => return Err(LispError::UnterminatedString),
            }
            continue;
        }
        match lex_token(rest) {
            Ok((r, tok)) => {
                rest = r;
                tokens.push(tok);
            }
            Err(_) => {
                let c = rest.chars().next().unwrap();
                return Err(LispError::UnexpectedChar(c));
            }
        }
    }
    Ok(tokens)
}

/// A cursor over a token stream, driving the heap-allocating recursive
/// descent reader.
pub struct Reader<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Reader { tokens, pos: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&Token> {
        let t = self.tokens.get(self.pos);
        self.pos += 1;
        t
    }

    /// Read one complete expression. Returns `Ok(None)` at end of input.
    pub fn read_expr(&mut self, interp: &mut Interp) -> Result<Option<Atom>, LispError> {
        if self.is_empty() {
            return Ok(None);
        }
        Ok(Some(self.read_one(interp)?))
    }

    fn read_one(&mut self, interp: &mut Interp) -> Result<Atom, LispError> {
        let tok = self.next().ok_or(LispError::UnexpectedEof)?.clone();
        match tok {
            Token::LParen => self.read_list(interp),
            Token::RParen => Err(LispError::UnexpectedChar(')')),
            Token::Dot => Err(LispError::MalformedDottedPair),
            Token::Quote => self.read_wrapped(interp, "quote"),
            Token::Quasiquote => self.read_wrapped(interp, "quasiquote"),
            Token::Unquote => self.read_wrapped(interp, "unquote"),
            Token::UnquoteSplicing => self.read_wrapped(interp, "unquote-splicing"),
            Token::Num(n) => Ok(Atom::Num(n)),
            Token::Sym(s) => {
                if s == "nil" {
                    Ok(Atom::Nil)
                } else {
                    let id = interp.heap.intern(&s);
                    Ok(Atom::Sym(id))
                }
            }
            Token::Str(bytes) => Ok(interp.heap.make_string(bytes)),
        }
    }

    fn read_wrapped(&mut self, interp: &mut Interp, sym_name: &str) -> Result<Atom, LispError> {
        let inner = self.read_one(interp)?;
        let guard_depth = interp.heap.guard_depth();
        let sym_id = interp.heap.intern(sym_name);
        let sym = Atom::Sym(sym_id);
        let tail = interp.heap.cons(inner, Atom::Nil);
        let result = interp.heap.cons(sym, tail);
        // Drop the intermediate guards pushed above, then re-root only the
        // final result — the caller's own read_one/read_list already
        // guards `result` again once it receives it, but this keeps the
        // stack from growing by two entries per nested reader-macro form.
        interp.heap.unguard(interp.heap.guard_depth() - guard_depth);
        interp.heap.guard(result);
        Ok(result)
    }

    fn read_list(&mut self, interp: &mut Interp) -> Result<Atom, LispError> {
        let guard_depth = interp.heap.guard_depth();
        let mut items: Vec<Atom> = Vec::new();
        let mut tail = Atom::Nil;
        let mut seen_dot = false;
        loop {
            match self.peek() {
                None => return Err(LispError::UnexpectedEof),
                Some(Token::RParen) => {
                    self.next();
                    break;
                }
                Some(Token::Dot) => {
                    if seen_dot || items.is_empty() {
                        return Err(LispError::MalformedDottedPair);
                    }
                    self.next();
                    tail = self.read_one(interp)?;
                    seen_dot = true;
                }
                _ => {
                    if seen_dot {
                        return Err(LispError::MalformedDottedPair);
                    }
                    items.push(self.read_one(interp)?);
                }
            }
        }
        let mut result = tail;
        for item in items.into_iter().rev() {
            result = interp.heap.cons(item, result);
        }
        interp.heap.unguard(interp.heap.guard_depth() - guard_depth);
        interp.heap.guard(result);
        Ok(result)
    }
}

/// Convenience: lex and read a single expression from a complete source
/// string. Returns `Ok(None)` if the input is empty or only whitespace.
pub fn read_one(interp: &mut Interp, source: &str) -> Result<Option<Atom>, LispError> {
    let tokens = lex(source)?;
    let mut reader = Reader::new(&tokens);
    reader.read_expr(interp)
}

/// Lex and read every top-level expression in a complete source string.
pub fn read_all(interp: &mut Interp, source: &str) -> Result<Vec<Atom>, LispError> {
    let tokens = lex(source)?;
    let mut reader = Reader::new(&tokens);
    let mut exprs = Vec::new();
    while let Some(expr) = reader.read_expr(interp)? {
        exprs.push(expr);
    }
    Ok(exprs)
}
