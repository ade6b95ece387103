use std::io::{self, BufRead, Write};

#[cfg(test)]
use mockall::automock;
use tracing::{event, Level};

/// The blocking user-facing surface: a modal message and a yes/no question.
#[cfg_attr(test, automock)]
pub trait Notifier: Send + Sync {
    fn alert(&self, message: &str);
    fn confirm(&self, question: &str) -> bool;
}

/// Writes alerts to stderr and asks confirmations on stdin.
pub struct TerminalNotifier {
    assume_yes: bool,
}

impl TerminalNotifier {
    pub fn new(assume_yes: bool) -> Self {
        TerminalNotifier { assume_yes }
    }
}

impl Notifier for TerminalNotifier {
    fn alert(&self, message: &str) {
        eprintln!("{}", message);
    }

    fn confirm(&self, question: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        eprint!("{} [y/N] ", question);
        if io::stderr().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(e) => {
                event!(Level::WARN, "Failed to read confirmation: {}", e);
                false
            }
        }
    }
}
