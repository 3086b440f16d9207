//! Interactive questions (overwrite confirmation, bad-operation choices).
//!
//! Prompting goes through the `Prompter` trait so the library never touches
//! the terminal directly; tests script the answers.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

pub trait Prompter {
    /// Ask `question`; `None` when no answer can be obtained (not a terminal, EOF).
    fn ask(&mut self, question: &str) -> Option<String>;
}

/// Reads answers from stdin, only when stdin is a terminal.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn ask(&mut self, question: &str) -> Option<String> {
        if !atty::is(atty::Stream::Stdin) {
            return None;
        }
        eprint!("{question} ");
        let _ = io::stderr().flush();
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }
}

/// Hands out pre-recorded answers; `None` once they run out.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    /// Every question asked, in order.
    pub asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, question: &str) -> Option<String> {
        self.asked.push(question.to_string());
        self.answers.pop_front()
    }
}

/// Yes/no question; anything but an answer starting with `y` is no.
pub fn confirm(prompter: &mut dyn Prompter, question: &str) -> bool {
    prompter
        .ask(&format!("{question} [y/N]"))
        .is_some_and(|a| a.trim_start().to_ascii_lowercase().starts_with('y'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_accepts_only_yes() {
        let mut p = ScriptedPrompter::new(["y", "Yes", "n", ""]);
        assert!(confirm(&mut p, "a?"));
        assert!(confirm(&mut p, "b?"));
        assert!(!confirm(&mut p, "c?"));
        assert!(!confirm(&mut p, "d?"));
        // exhausted: no answer counts as no
        assert!(!confirm(&mut p, "e?"));
        assert_eq!(p.asked.len(), 5);
        assert_eq!(p.asked[0], "a? [y/N]");
    }
}
