//! Terminal I/O for the CLI: TTY detection and the interactive choice prompt.

use std::io::{self, BufRead, IsTerminal, Write};

use tokenshift::interaction::{ChoiceRequest, CodePreview, Interaction, LogLevel};

pub fn is_stdin_tty() -> bool {
    io::stdin().is_terminal()
}

pub fn is_stdout_tty() -> bool {
    io::stdout().is_terminal()
}

/// Prompts are only shown on a real terminal outside CI.
pub fn can_prompt() -> bool {
    is_stdin_tty() && is_stdout_tty() && std::env::var("CI").map_or(true, |v| v != "true")
}

pub fn prompt(message: &str) -> tokenshift::Result<String> {
    eprint!("{}", message);
    io::stderr().flush().ok();

    let stdin = io::stdin();
    let mut line = String::new();
    let read = stdin
        .lock()
        .read_line(&mut line)
        .map_err(|e| tokenshift::Error::interaction_failed(e.to_string()))?;
    if read == 0 {
        return Err(tokenshift::Error::interaction_failed("stdin closed"));
    }

    Ok(line.trim().to_string())
}

/// Interaction backed by the terminal. Prompts and log lines go to stderr so
/// stdout stays reserved for the JSON response.
pub struct TerminalInteraction {
    interactive: bool,
    verbose: bool,
}

impl TerminalInteraction {
    pub fn new(allow_prompts: bool, verbose: bool) -> Self {
        Self {
            interactive: allow_prompts && can_prompt(),
            verbose,
        }
    }
}

impl Interaction for TerminalInteraction {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn ask_choice(&mut self, request: &ChoiceRequest) -> tokenshift::Result<Option<String>> {
        eprintln!();
        eprintln!("{}", request.question);
        if let Some(preview) = &request.code_preview {
            eprint!("{}", render_preview(preview));
        }
        for (idx, option) in request.options.iter().enumerate() {
            let default = if idx == 0 { " (default)" } else { "" };
            eprintln!("  {}. {} - {}{}", idx + 1, option.label, option.description, default);
        }
        if request.allow_skip {
            eprintln!("  0. Skip");
        }
        if let Some(progress) = &request.progress {
            eprintln!(
                "Progress: [{}/{}] Processing {}",
                progress.current_file, progress.total_files, progress.current_file_name
            );
        }

        loop {
            let answer = prompt("Choice: ")?;
            match parse_choice(&answer, request.options.len(), request.allow_skip) {
                Some(Choice::Skip) => return Ok(None),
                Some(Choice::Option(idx)) => return Ok(Some(request.options[idx].value.clone())),
                None => eprintln!("Invalid choice '{}', try again.", answer),
            }
        }
    }

    fn log(&mut self, message: &str, level: LogLevel) {
        if level == LogLevel::Debug && !self.verbose {
            return;
        }
        eprintln!("[{}] {}", level, message);
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Choice {
    Skip,
    Option(usize),
}

/// Empty input picks the first option, `0` skips when allowed.
fn parse_choice(input: &str, option_count: usize, allow_skip: bool) -> Option<Choice> {
    let input = input.trim();
    if input.is_empty() {
        return (option_count > 0).then_some(Choice::Option(0));
    }
    match input.parse::<usize>().ok()? {
        0 if allow_skip => Some(Choice::Skip),
        n if (1..=option_count).contains(&n) => Some(Choice::Option(n - 1)),
        _ => None,
    }
}

fn render_preview(preview: &CodePreview) -> String {
    let first = preview.line_number - preview.before_lines.len();
    let width = (preview.line_number + preview.after_lines.len()).to_string().len();
    let mut out = format!("  {}:{}\n", preview.file_path, preview.line_number);

    for (offset, line) in preview.before_lines.iter().enumerate() {
        out.push_str(&format!("  {:>w$} | {}\n", first + offset, line, w = width));
    }
    out.push_str(&format!(
        "> {:>w$} | {}\n",
        preview.line_number,
        preview.change_line,
        w = width
    ));
    let caret_len = preview.highlight_end.saturating_sub(preview.highlight_start).max(1);
    out.push_str(&format!(
        "  {:>w$} | {}{}\n",
        "",
        " ".repeat(preview.highlight_start),
        "^".repeat(caret_len),
        w = width
    ));
    for (offset, line) in preview.after_lines.iter().enumerate() {
        out.push_str(&format!(
            "  {:>w$} | {}\n",
            preview.line_number + 1 + offset,
            line,
            w = width
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_choice_rules() {
        assert_eq!(parse_choice("", 2, true), Some(Choice::Option(0)));
        assert_eq!(parse_choice("0", 2, true), Some(Choice::Skip));
        assert_eq!(parse_choice("0", 2, false), None);
        assert_eq!(parse_choice("2", 2, true), Some(Choice::Option(1)));
        assert_eq!(parse_choice("3", 2, true), None);
        assert_eq!(parse_choice("x", 2, true), None);
    }

    #[test]
    fn preview_marks_the_match() {
        let preview = CodePreview::build(".a {\n  color: var(--t);\n}", "a.css", 14, 8);
        let rendered = render_preview(&preview);
        assert!(rendered.starts_with("  a.css:2\n"));
        assert!(rendered.contains("  1 | .a {\n"));
        assert!(rendered.contains("> 2 |   color: var(--t);\n"));
        assert!(rendered.contains("^^^^^^^^"));
    }
}
