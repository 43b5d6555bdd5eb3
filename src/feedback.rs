//! Input and output ports.
//!
//! Machines never print. Every user-visible line goes through a
//! [`Feedback`] sink and every yes/no question through a [`Prompt`]. The
//! binary wires these to the terminal; tests use [`Transcript`] and
//! [`ScriptedAnswers`].

use std::collections::VecDeque;
use std::io::Write;

/// Sink for user-visible messages.
///
/// Saying something cannot fail from the caller's point of view: a
/// transition that already happened stays committed even if the line is
/// lost.
pub trait Feedback {
    fn say(&mut self, line: &str);
}

impl<F: Feedback + ?Sized> Feedback for &mut F {
    fn say(&mut self, line: &str) {
        (**self).say(line)
    }
}

impl<F: Feedback + ?Sized> Feedback for Box<F> {
    fn say(&mut self, line: &str) {
        (**self).say(line)
    }
}

/// Writes every line to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct Console;

impl Feedback for Console {
    fn say(&mut self, line: &str) {
        let mut stdout = std::io::stdout().lock();
        if let Err(error) = writeln!(stdout, "{line}") {
            tracing::warn!(%error, "failed to write feedback line");
        }
    }
}

/// Collects lines in memory.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    lines: Vec<String>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn last(&self) -> Option<&str> {
        self.lines.last().map(String::as_str)
    }

    /// Whether any line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.contains(needle))
    }

    /// Drain collected lines.
    pub fn take(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lines)
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

impl Feedback for Transcript {
    fn say(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Feedback for Silent {
    fn say(&mut self, _line: &str) {}
}

/// Source of yes/no answers.
pub trait Prompt {
    fn confirm(&mut self, question: &str) -> bool;
}

impl<P: Prompt + ?Sized> Prompt for &mut P {
    fn confirm(&mut self, question: &str) -> bool {
        (**self).confirm(question)
    }
}

/// Replays a fixed list of answers, then falls back to a default.
#[derive(Debug, Clone)]
pub struct ScriptedAnswers {
    answers: VecDeque<bool>,
    fallback: bool,
    asked: Vec<String>,
}

impl ScriptedAnswers {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            fallback: false,
            asked: Vec::new(),
        }
    }

    /// Answer every question with `answer`.
    pub fn always(answer: bool) -> Self {
        Self {
            answers: VecDeque::new(),
            fallback: answer,
            asked: Vec::new(),
        }
    }

    pub fn with_fallback(mut self, fallback: bool) -> Self {
        self.fallback = fallback;
        self
    }

    /// Questions asked so far.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl Prompt for ScriptedAnswers {
    fn confirm(&mut self, question: &str) -> bool {
        self.asked.push(question.to_string());
        self.answers.pop_front().unwrap_or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn greet(out: &mut dyn Feedback) {
        out.say("hello");
        out.say("world");
    }

    #[test]
    fn transcript_keeps_lines_in_order() {
        let mut transcript = Transcript::new();
        greet(&mut transcript);

        assert_eq!(transcript.lines(), ["hello", "world"]);
        assert_eq!(transcript.last(), Some("world"));
        assert!(transcript.contains("wor"));
    }

    #[test]
    fn take_drains() {
        let mut transcript = Transcript::new();
        transcript.say("one");
        assert_eq!(transcript.take(), vec!["one".to_string()]);
        assert!(transcript.lines().is_empty());
    }

    #[test]
    fn boxed_and_borrowed_sinks_forward() {
        let mut transcript = Transcript::new();
        {
            let mut borrowed = &mut transcript;
            borrowed.say("via ref");
        }
        assert!(transcript.contains("via ref"));

        let mut boxed: Box<dyn Feedback> = Box::new(Silent);
        boxed.say("dropped");
    }

    #[test]
    fn scripted_answers_then_fallback() {
        let mut prompt = ScriptedAnswers::new([true, false]).with_fallback(true);

        assert!(prompt.confirm("first?"));
        assert!(!prompt.confirm("second?"));
        assert!(prompt.confirm("third?"));
        assert_eq!(prompt.asked().len(), 3);
    }

    #[test]
    fn always_answers_the_same() {
        let mut prompt = ScriptedAnswers::always(false);
        assert!(!prompt.confirm("anything?"));
        assert!(!prompt.confirm("anything else?"));
    }
}
