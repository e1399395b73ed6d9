use logos::Logos;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Default, Error)]
pub enum LexerError {
    #[default]
    #[error("unknown token")]
    UnknownToken,
}

/// Whitespace separated words, with `|` split out even when it is glued to a
/// word. `<` and `>` are only operators when they stand alone; `a>b` is a word.
#[derive(Debug, Clone, Copy, PartialEq, Logos)]
#[logos(skip r"[ \t\r\n\f]+", error = LexerError)]
pub enum Token<'a> {
    #[token("|")]
    Pipe,
    #[token(">")]
    Write,
    #[token("<")]
    Read,

    #[regex(r"[^ \t\r\n\f|]+")]
    Word(&'a str),
}
