//! Terminal progress bar driven by a format string
//!
//! Supported placeholders: `%current%`, `%max%`, `%bar%`, `%percent%` and
//! `%message%`. A placeholder may carry a width, `%percent:3s%`, which right
//! aligns the value (`-3s` left aligns). Unknown placeholders are left as is.

use std::io::{self, Write};
use std::sync::LazyLock;

use regex::{Captures, Regex};

const BAR_WIDTH: usize = 28;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%([a-z_]+)(?::(-?)(\d+)s)?%").expect("valid placeholder pattern")
});

#[derive(Debug)]
pub struct ProgressBar {
    format: String,
    max: usize,
    current: usize,
    message: String,
    visible: bool,
}

impl ProgressBar {
    /// A bar drawn on stderr
    pub fn new(format: &str, max: usize) -> Self {
        Self {
            format: format.to_string(),
            max,
            current: 0,
            message: String::new(),
            visible: true,
        }
    }

    /// A bar that tracks progress without drawing anything
    pub fn hidden(format: &str, max: usize) -> Self {
        Self {
            visible: false,
            ..Self::new(format, max)
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    pub fn start(&mut self) {
        self.current = 0;
        self.display();
    }

    pub fn advance(&mut self) {
        self.current += 1;
        if self.current > self.max {
            self.max = self.current;
        }
        self.display();
    }

    pub fn finish(&mut self) {
        self.current = self.max;
        self.display();
        if self.visible {
            eprintln!();
        }
    }

    pub fn display(&self) {
        if !self.visible {
            return;
        }
        let mut stderr = io::stderr().lock();
        // Progress output is best-effort
        let _ = write!(stderr, "\r\x1b[2K{}", self.render());
        let _ = stderr.flush();
    }

    fn percent(&self) -> usize {
        if self.max == 0 {
            0
        } else {
            self.current * 100 / self.max
        }
    }

    fn bar(&self) -> String {
        let complete = if self.max == 0 {
            0
        } else {
            (self.current * BAR_WIDTH / self.max).min(BAR_WIDTH)
        };
        let mut bar = "=".repeat(complete);
        if complete < BAR_WIDTH {
            bar.push('>');
            bar.push_str(&"-".repeat(BAR_WIDTH - complete - 1));
        }
        bar
    }

    /// The current line, without terminal control sequences
    pub fn render(&self) -> String {
        PLACEHOLDER
            .replace_all(&self.format, |caps: &Captures| {
                let value = match &caps[1] {
                    "current" => self.current.to_string(),
                    "max" => self.max.to_string(),
                    "bar" => self.bar(),
                    "percent" => self.percent().to_string(),
                    "message" => self.message.clone(),
                    _ => return caps[0].to_string(),
                };
                let width: usize = caps
                    .get(3)
                    .and_then(|w| w.as_str().parse().ok())
                    .unwrap_or(0);
                if caps.get(2).is_some_and(|m| m.as_str() == "-") {
                    format!("{:<width$}", value, width = width)
                } else {
                    format!("{:>width$}", value, width = width)
                }
            })
            .into_owned()
    }
}
