//! Tokenizer walking the command line one piece at a time.
//!
//! A piece is a whole argument, or a single letter of a bundle of short
//! options like `-xvf`. The first argument is the program name and is never
//! looked at.
use crate::{Mode, Result};

/// How far into the command line a cursor got.
///
/// Orders by argument index first and then by the number of characters of a
/// short option bundle already consumed. A finished cursor is past every
/// argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub token: usize,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Piece<'a> {
    index: usize,
    raw: &'a str,
    name: &'a str,
    value: Option<&'a str>,
    option: bool,
    short: bool,
    split: bool,
    offset: usize,
}

#[derive(Debug)]
pub struct Cursor<'a> {
    args: &'a [String],
    mode: &'a Mode,
    gnu: bool,
    next: usize,
    can_be_option: bool,
    piece: Option<Piece<'a>>,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor positioned on `args[1]`.
    ///
    /// With `gnu` set, no option may follow the first non option argument,
    /// even one that ends up as the value of an option.
    pub fn new(args: &'a [String], mode: &'a Mode, gnu: bool) -> Result<Cursor<'a>> {
        let mut res = Cursor { args, mode, gnu, next: 1, can_be_option: true, piece: None };
        res.reset()?;
        Ok(res)
    }

    pub fn reset(&mut self) -> Result<()> {
        self.next = 1;
        self.can_be_option = true;
        self.piece = None;
        self.advance()?;
        Ok(())
    }

    pub fn mode(&self) -> &'a Mode {
        self.mode
    }

    pub fn finished(&self) -> bool {
        self.piece.is_none()
    }

    pub fn is_option(&self) -> bool {
        self.piece.as_ref().map_or(false, |it| it.option)
    }

    pub fn is_short(&self) -> bool {
        self.piece.as_ref().map_or(false, |it| it.short)
    }

    /// Whether the current argument was given as `name=value`.
    pub fn was_split(&self) -> bool {
        self.piece.as_ref().map_or(false, |it| it.split)
    }

    /// The whole current argument, prefix included.
    pub fn raw(&self) -> &'a str {
        self.piece.as_ref().map_or("", |it| it.raw)
    }

    /// Option name without its prefix, the current letter for short
    /// options, or the part before the delimiter for positionals.
    pub fn name(&self) -> &'a str {
        self.piece.as_ref().map_or("", |it| it.name)
    }

    /// Inline value: after the delimiter, or the rest of a short bundle.
    pub fn value(&self) -> Option<&'a str> {
        self.piece.as_ref().and_then(|it| it.value)
    }

    pub fn separate<'s>(&self, token: &'s str) -> Option<(&'s str, &'s str)> {
        self.mode.separate(token)
    }

    pub fn position(&self) -> Position {
        match &self.piece {
            Some(piece) => Position { token: piece.index, offset: piece.offset },
            None => Position { token: self.args.len(), offset: 0 },
        }
    }

    /// Consumes the current argument as a whole.
    ///
    /// Returns `true` if there is nothing left or the next argument is an
    /// option, that is, when the next argument cannot serve as a value.
    pub fn advance_past_current_argument(&mut self) -> Result<bool> {
        self.advance()
    }

    /// Consumes the current letter of a short option bundle.
    pub fn advance_past_current_short_letter(&mut self) -> Result<()> {
        if let Some(piece) = &mut self.piece {
            if let Some(rest) = piece.value {
                let len = rest.chars().next().map_or(0, char::len_utf8);
                piece.name = &rest[..len];
                piece.value = Some(&rest[len..]).filter(|it| !it.is_empty());
                piece.offset += 1;
                return Ok(());
            }
        }
        self.advance_past_current_argument()?;
        Ok(())
    }

    fn advance(&mut self) -> Result<bool> {
        if self.next >= self.args.len() {
            self.piece = None;
            return Ok(true);
        }
        let piece = self.classify(self.next)?;
        self.next += 1;
        let option = piece.option;
        self.piece = Some(piece);
        Ok(option)
    }

    fn classify(&mut self, index: usize) -> Result<Piece<'a>> {
        let args = self.args;
        let raw = args[index].as_str();
        let long = raw.strip_prefix(self.mode.option_prefix());
        let short = match long {
            None if self.mode.short_addressing() => raw.strip_prefix('-'),
            _ => None,
        };

        if (long.is_some() || short.is_some()) && !self.can_be_option {
            bail!(Fatal, "unexpected argument `{raw}` after non option arguments")
        }

        let piece = match (long, short) {
            (Some(rest), _) => {
                if rest.is_empty() {
                    bail!(Fatal, "unexpected argument `{raw}`")
                }
                let (name, value, split) = self.split(rest);
                Piece { index, raw, name, value, option: true, short: false, split, offset: 0 }
            }
            (None, Some(rest)) => {
                let len = match rest.chars().next() {
                    Some(c) => c.len_utf8(),
                    None => bail!(Fatal, "unexpected argument `{raw}`"),
                };
                let value = Some(&rest[len..]).filter(|it| !it.is_empty());
                Piece {
                    index,
                    raw,
                    name: &rest[..len],
                    value,
                    option: true,
                    short: true,
                    split: false,
                    offset: 2,
                }
            }
            (None, None) => {
                if self.gnu {
                    self.can_be_option = false;
                }
                let (name, value, split) = self.split(raw);
                Piece { index, raw, name, value, option: false, short: false, split, offset: 0 }
            }
        };
        Ok(piece)
    }

    fn split(&self, s: &'a str) -> (&'a str, Option<&'a str>, bool) {
        match self.mode.separate(s) {
            Some((name, value)) => (name, Some(value), true),
            None => (s, None, false),
        }
    }
}
