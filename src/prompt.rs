//! Line-based terminal prompts.
//!
//! A [`Session`] owns the input and output handles for one interactive run and
//! is passed to every prompt. Generic over `BufRead`/`Write` so the flows can be
//! driven from byte buffers in tests.
//!
//! ```text
//! Select a main topic:
//! 1) Design
//! 2) Dev
//! Enter your choice: 2
//! ```
//!
//! Single selections re-prompt on invalid input. Multi selections take
//! comma-separated numbers and drop anything out of range. Optional prompts
//! accept an empty line as "skip". End of input is an error, never a loop.

use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PromptError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("input closed")]
    Closed,
    #[error("nothing to choose from for {0:?}")]
    NoChoices(String),
}

pub struct Session<R, W> {
    input: R,
    output: W,
}

impl Session<io::StdinLock<'static>, io::Stdout> {
    /// Session on the process's stdin/stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Flush and release the handles.
    pub fn close(mut self) -> Result<(R, W), PromptError> {
        self.output.flush()?;
        Ok((self.input, self.output))
    }

    /// Print a line.
    pub fn say(&mut self, text: &str) -> Result<(), PromptError> {
        writeln!(self.output, "{text}")?;
        Ok(())
    }

    fn read_line(&mut self, label: &str) -> Result<String, PromptError> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            return Err(PromptError::Closed);
        }
        writeln!(self.output)?;
        Ok(buf.trim_end_matches(['\r', '\n']).to_string())
    }

    fn print_choices(&mut self, question: &str, choices: &[String]) -> Result<(), PromptError> {
        if choices.is_empty() {
            return Err(PromptError::NoChoices(question.to_string()));
        }
        writeln!(self.output, "{question}")?;
        for (i, choice) in choices.iter().enumerate() {
            writeln!(self.output, "{}) {}", i + 1, choice)?;
        }
        Ok(())
    }

    fn parse_index(answer: &str, len: usize) -> Option<usize> {
        answer
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|n| (1..=len).contains(n))
            .map(|n| n - 1)
    }

    /// Free-text answer, returned as typed (minus the line ending).
    pub fn text(&mut self, question: &str) -> Result<String, PromptError> {
        writeln!(self.output, "{question}")?;
        self.read_line("> ")
    }

    /// Pick exactly one of `choices`, re-prompting until the answer is valid.
    pub fn select(&mut self, question: &str, choices: &[String]) -> Result<String, PromptError> {
        let i = self.select_index(question, choices)?;
        Ok(choices[i].clone())
    }

    /// Like [`Session::select`], returning the position of the pick.
    pub fn select_index(&mut self, question: &str, choices: &[String]) -> Result<usize, PromptError> {
        loop {
            self.print_choices(question, choices)?;
            let answer = self.read_line("Enter your choice: ")?;
            match Self::parse_index(&answer, choices.len()) {
                Some(i) => return Ok(i),
                None => self.say("Invalid choice. Please try again.\n")?,
            }
        }
    }

    /// Pick one of `choices` or press Enter to skip.
    pub fn select_optional(
        &mut self,
        question: &str,
        choices: &[String],
    ) -> Result<Option<String>, PromptError> {
        loop {
            self.print_choices(question, choices)?;
            let answer = self.read_line("Enter your choice (or press Enter to skip): ")?;
            if answer.trim().is_empty() {
                return Ok(None);
            }
            match Self::parse_index(&answer, choices.len()) {
                Some(i) => return Ok(Some(choices[i].clone())),
                None => self.say("Invalid choice. Please try again.\n")?,
            }
        }
    }

    /// Pick any number of `choices` as comma-separated numbers.
    ///
    /// Out-of-range and unparseable numbers are dropped; repeats count once.
    /// With nothing to choose from, nothing is asked.
    pub fn select_many(
        &mut self,
        question: &str,
        choices: &[String],
    ) -> Result<Vec<String>, PromptError> {
        if choices.is_empty() {
            return Ok(Vec::new());
        }
        self.print_choices(question, choices)?;
        let answer = self.read_line(
            "Enter your choices (comma-separated numbers, or press Enter to skip): ",
        )?;
        let mut picked: Vec<String> = Vec::new();
        for i in answer
            .split(',')
            .filter_map(|part| Self::parse_index(part, choices.len()))
        {
            if !picked.contains(&choices[i]) {
                picked.push(choices[i].clone());
            }
        }
        Ok(picked)
    }

    /// A yes/no question.
    pub fn confirm(&mut self, question: &str) -> Result<bool, PromptError> {
        let choices = ["yes".to_string(), "no".to_string()];
        Ok(self.select(question, &choices)? == "yes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(input: &str) -> Session<&[u8], Vec<u8>> {
        Session::new(input.as_bytes(), Vec::new())
    }

    fn choices(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn transcript(s: Session<&[u8], Vec<u8>>) -> String {
        let (_, out) = s.close().unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn select_lists_numbered_choices() {
        let mut s = session("2\n");
        let picked = s.select("Pick one:", &choices(&["a", "b"])).unwrap();
        assert_eq!(picked, "b");
        let out = transcript(s);
        assert!(out.contains("Pick one:\n1) a\n2) b\n"));
    }

    #[test]
    fn select_reprompts_on_invalid_input() {
        let mut s = session("0\nfoo\n3\n1\n");
        let picked = s.select("Pick:", &choices(&["a", "b"])).unwrap();
        assert_eq!(picked, "a");
        assert_eq!(transcript(s).matches("Invalid choice").count(), 3);
    }

    #[test]
    fn select_index_is_zero_based() {
        let mut s = session("3\n");
        let picked = s.select_index("Pick:", &choices(&["a", "b", "c"])).unwrap();
        assert_eq!(picked, 2);
    }

    #[test]
    fn select_on_closed_input_errors() {
        let mut s = session("");
        let err = s.select("Pick:", &choices(&["a"])).unwrap_err();
        assert!(matches!(err, PromptError::Closed));
    }

    #[test]
    fn select_without_choices_errors() {
        let mut s = session("1\n");
        let err = s.select("Pick:", &[]).unwrap_err();
        assert!(matches!(err, PromptError::NoChoices(_)));
    }

    #[test]
    fn optional_select_skips_on_empty_line() {
        let mut s = session("\n");
        assert_eq!(s.select_optional("Sub:", &choices(&["x"])).unwrap(), None);

        let mut s = session("9\n1\n");
        assert_eq!(
            s.select_optional("Sub:", &choices(&["x"])).unwrap(),
            Some("x".to_string())
        );
    }

    #[test]
    fn select_many_parses_and_filters() {
        let mut s = session("3, 1,9,x,1\n");
        let picked = s.select_many("Tags:", &choices(&["a", "b", "c"])).unwrap();
        assert_eq!(picked, vec!["c", "a"]);
    }

    #[test]
    fn select_many_empty_is_skip() {
        let mut s = session("\n");
        assert!(s.select_many("Tags:", &choices(&["a"])).unwrap().is_empty());
    }

    #[test]
    fn select_many_without_choices_asks_nothing() {
        let mut s = session("");
        assert!(s.select_many("Tags:", &[]).unwrap().is_empty());
    }

    #[test]
    fn text_keeps_inner_whitespace() {
        let mut s = session("  Hello world \r\n");
        assert_eq!(s.text("Title:").unwrap(), "  Hello world ");
    }

    #[test]
    fn confirm_maps_yes_and_no() {
        let mut s = session("1\n2\n");
        assert!(s.confirm("More?").unwrap());
        assert!(!s.confirm("More?").unwrap());
    }
}
