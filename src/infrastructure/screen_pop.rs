//! Screen-pop URL construction and openers
//!
//! The URL template carries a `{number}` or `%s` placeholder; with neither,
//! the number is appended. The number is percent-encoded before insertion
//! since CRM deployments put `+`, `#` and spaces in dial strings.

use crate::domain::call::port::UrlOpener;
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use std::process::Command;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct UrlTemplate {
    template: String,
}

impl UrlTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn format(&self, number: &str) -> String {
        let encoded = percent_encode(number);
        if self.template.contains("{number}") {
            self.template.replace("{number}", &encoded)
        } else if self.template.contains("%s") {
            self.template.replace("%s", &encoded)
        } else {
            format!("{}{}", self.template, encoded)
        }
    }
}

fn percent_encode(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Opener that only logs; the default for headless runs and tests.
pub struct LogUrlOpener {
    template: UrlTemplate,
}

impl LogUrlOpener {
    pub fn new(template: UrlTemplate) -> Self {
        Self { template }
    }
}

impl UrlOpener for LogUrlOpener {
    fn open_url_for_number(&self, number: &str) -> Result<()> {
        info!(url = %self.template.format(number), "screen pop");
        Ok(())
    }
}

/// Opener that hands the URL to an external command (a browser launcher).
pub struct CommandUrlOpener {
    template: UrlTemplate,
    program: String,
}

impl CommandUrlOpener {
    pub fn new(template: UrlTemplate, program: impl Into<String>) -> Self {
        Self {
            template,
            program: program.into(),
        }
    }
}

impl UrlOpener for CommandUrlOpener {
    fn open_url_for_number(&self, number: &str) -> Result<()> {
        let url = self.template.format(number);
        debug!(program = %self.program, %url, "screen pop: spawning opener");
        match Command::new(&self.program).arg(&url).spawn() {
            Ok(_) => Ok(()),
            Err(err) => {
                warn!(program = %self.program, %err, "screen pop: spawn failed");
                Err(DomainError::Io(err.to_string()))
            }
        }
    }
}
