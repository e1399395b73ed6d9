use std::io::{stdin, BufRead};

use crate::prelude::*;

#[derive(Debug, PartialEq)]
pub enum InputMessage {
    Line(String),
    Eof,
    Error(String),
}

/// Reads lines on a blocking thread, one line per request.
///
/// On a terminal nothing is read while a foreground command might be reading
/// stdin. Piped stdin is buffered ahead by the reader, so lines meant for a
/// child may be taken as commands instead.
pub struct InputReader {
    requests: Sender<()>,
    lines: Receiver<InputMessage>,
    pending: bool,
}

impl InputReader {
    pub fn stdin() -> Self {
        Self::spawn_with(|| stdin().lock())
    }

    pub fn spawn_with<F, R>(open: F) -> Self
    where
        F: FnOnce() -> R + Send + 'static,
        R: BufRead,
    {
        let (requests, mut rx) = unbounded_channel::<()>();
        let (tx, lines) = unbounded_channel();

        tokio::task::spawn_blocking(move || {
            let mut reader = open();

            while rx.blocking_recv().is_some() {
                let mut line = String::new();
                let msg = match reader.read_line(&mut line) {
                    Ok(0) => InputMessage::Eof,
                    Ok(_) => InputMessage::Line(line),
                    Err(err) => InputMessage::Error(err.to_string()),
                };

                let stop = !matches!(msg, InputMessage::Line(_));
                if tx.send(msg).is_err() || stop {
                    break;
                }
            }

            trace!("input thread finished");
        });

        Self {
            requests,
            lines,
            pending: false,
        }
    }

    /// Waits for the next line. Cancel safe: dropping the future keeps the
    /// outstanding request, the next call picks up its answer.
    pub async fn next_line(&mut self) -> InputMessage {
        if !self.pending {
            if self.requests.send(()).is_err() {
                return InputMessage::Eof;
            }
            self.pending = true;
        }

        let msg = self.lines.recv().await.unwrap_or(InputMessage::Eof);
        self.pending = false;
        msg
    }
}
