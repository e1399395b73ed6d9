use logos::Logos;
use thiserror::Error;

use crate::cmd::plan::{CommandPlan, StageSpec};

use self::token::{LexerError, Token};

pub mod token;

#[derive(Debug, Error, PartialEq)]
pub enum CommandParseError {
    #[error("failed to tokenize command")]
    Lexer(Vec<LexerError>),
    #[error("syntax error: expected a path after `{0}`")]
    MissingRedirectTarget(char),
    #[error("syntax error: `{0}` given more than once")]
    DuplicateRedirect(char),
    #[error("syntax error: empty command in pipeline")]
    EmptySegment,
    #[error("syntax error: missing command")]
    MissingCommand,
}

/// Parses one input line into a [`CommandPlan`].
///
/// Blank input is the no-op plan, never an error. Redirections are pulled out
/// of the token stream before the pipeline is split, so `a > out | b` writes
/// the output of `b` to `out`.
pub fn parse_command(line: &str) -> Result<CommandPlan, CommandParseError> {
    let mut line = line.trim();
    if line.is_empty() {
        return Ok(CommandPlan::default());
    }

    let mut background = false;
    if let Some(rest) = line.strip_suffix('&') {
        background = true;
        line = rest.trim_end();
    }

    let tokens = Token::lexer(line).collect::<Vec<_>>();

    if tokens.iter().any(|r| r.is_err()) {
        return Err(CommandParseError::Lexer(
            tokens.into_iter().filter_map(|r| r.err()).collect(),
        ));
    }

    let mut tokens = tokens.into_iter().flatten();

    let mut input = None::<String>;
    let mut output = None::<String>;
    let mut segments = vec![Vec::<String>::new()];

    while let Some(token) = tokens.next() {
        match token {
            Token::Word(word) => {
                // the vec always holds at least one segment
                if let Some(current) = segments.last_mut() {
                    current.push(word.to_owned());
                }
            }
            Token::Pipe => segments.push(Vec::new()),
            Token::Write => redirect(&mut output, '>', tokens.next())?,
            Token::Read => redirect(&mut input, '<', tokens.next())?,
        }
    }

    if segments.iter().all(Vec::is_empty) {
        return if segments.len() == 1 {
            Err(CommandParseError::MissingCommand)
        } else {
            Err(CommandParseError::EmptySegment)
        };
    }

    let mut stages = segments
        .into_iter()
        .map(complete)
        .collect::<Option<Vec<_>>>()
        .ok_or(CommandParseError::EmptySegment)?;

    let primary = stages.remove(0);

    Ok(CommandPlan {
        primary: Some(primary),
        stages,
        background,
        input,
        output,
    })
}

fn redirect(
    slot: &mut Option<String>,
    op: char,
    operand: Option<Token<'_>>,
) -> Result<(), CommandParseError> {
    let Some(Token::Word(path)) = operand else {
        return Err(CommandParseError::MissingRedirectTarget(op));
    };

    if slot.is_some() {
        return Err(CommandParseError::DuplicateRedirect(op));
    }

    *slot = Some(path.to_owned());

    Ok(())
}

fn complete(mut words: Vec<String>) -> Option<StageSpec> {
    if words.is_empty() {
        return None;
    }

    let command = words.remove(0).to_lowercase();

    Some(StageSpec {
        command,
        args: words,
    })
}
