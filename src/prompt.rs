//! Interactive-versus-automatic value confirmation.
//!
//! The pipeline never checks for a console itself. It asks a [`ValueResolver`]
//! and lets the implementation decide whether to prompt.

use crate::error::{CliError, Result};
use std::io::{BufRead, Write};

/// Callback resolving a candidate value into the final one
pub trait ValueResolver {
    /// Resolve `prompt`. In automatic mode `default` is returned without
    /// prompting; otherwise empty input falls back to `default`.
    fn resolve(&self, prompt: &str, default: &str, automatic: bool) -> Result<String>;

    /// Ask a yes/no question, anything starting with `y` counts as yes
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        let default_text = if default { "Y" } else { "n" };
        let answer = self.resolve(&format!("{prompt} (Y|n)"), default_text, false)?;
        Ok(answer.to_lowercase().starts_with('y'))
    }
}

/// Resolver for unattended runs: every prompt takes its default
#[derive(Debug, Clone, Copy, Default)]
pub struct AutomaticResolver;

impl ValueResolver for AutomaticResolver {
    fn resolve(&self, prompt: &str, default: &str, _automatic: bool) -> Result<String> {
        log::debug!("{prompt}: using [{default}]");
        Ok(default.to_string())
    }
}

/// Resolver reading answers from standard input
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleResolver;

impl ValueResolver for ConsoleResolver {
    fn resolve(&self, prompt: &str, default: &str, automatic: bool) -> Result<String> {
        if automatic {
            return Ok(default.to_string());
        }
        let stdin = std::io::stdin();
        read_answer(prompt, default, &mut stdin.lock(), &mut std::io::stdout())
    }
}

/// Write the prompt to `output` and read one line from `input`
fn read_answer(
    prompt: &str,
    default: &str,
    input: &mut dyn BufRead,
    output: &mut dyn Write,
) -> Result<String> {
    let input_error = |source| CliError::InputFailed {
        prompt: prompt.to_string(),
        source,
    };

    write!(output, "\n??> {prompt}: [{default}] ").map_err(input_error)?;
    output.flush().map_err(input_error)?;

    let mut line = String::new();
    input.read_line(&mut line).map_err(input_error)?;
    let answer = line.trim();
    Ok(if answer.is_empty() {
        default.to_string()
    } else {
        answer.to_string()
    })
}
