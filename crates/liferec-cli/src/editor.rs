//! Interactive input support
//!
//! Records are composed in `$VISUAL`/`$EDITOR` through a small text
//! template:
//!
//! ```text
//! # comment lines above `content:` are ignored
//! tag: travel
//! title: Porto
//! content:
//! Everything from here on is the content, kept as written.
//! ```
//!
//! Also line prompts and `[y/N]` confirmation for the CLI.

use std::env;
use std::io::{self, Write};
use std::process::Command;

use anyhow::{bail, Context, Result};

use liferec_core::{Record, RecordFields};

const CONTENT_MARKER: &str = "content:";

#[cfg(windows)]
const FALLBACK_EDITOR: &str = "notepad";
#[cfg(not(windows))]
const FALLBACK_EDITOR: &str = "vi";

/// Template for composing a new record
pub fn new_record_template() -> String {
    record_template("New life record", "", "", "")
}

/// Template pre-filled with an existing record
pub fn edit_record_template(record: &Record) -> String {
    record_template(
        &format!("Edit record #{} (empty fields keep their value)", record.id),
        &record.tag,
        &record.title,
        &record.content,
    )
}

/// Template with the given heading and field values
pub fn record_template(heading: &str, tag: &str, title: &str, content: &str) -> String {
    format!(
        "# {heading}\n\
         # Lines starting with # are ignored above '{CONTENT_MARKER}'.\n\
         # Everything below it is the content, exactly as written.\n\
         \n\
         tag: {tag}\n\
         title: {title}\n\
         {CONTENT_MARKER}\n\
         {content}\n"
    )
}

/// Parse an edited template back into fields
///
/// Header lines (`tag:`, `title:`) are trimmed and `#` lines among them are
/// skipped. The content is every line after `content:` untouched, apart
/// from trailing line breaks.
pub fn parse_record_template(text: &str) -> RecordFields {
    let mut fields = RecordFields::new();
    let mut lines = text.lines();

    while let Some(line) = lines.next() {
        let header = line.trim();
        if header.starts_with('#') {
            continue;
        }

        if let Some(value) = header.strip_prefix("tag:") {
            fields.tag = Some(value.trim().to_string());
        } else if let Some(value) = header.strip_prefix("title:") {
            fields.title = Some(value.trim().to_string());
        } else if let Some(rest) = line.trim_start().strip_prefix(CONTENT_MARKER) {
            let inline = rest.strip_prefix(' ').unwrap_or(rest);
            let mut body: Vec<&str> = Vec::new();
            if !inline.is_empty() {
                body.push(inline);
            }
            body.extend(lines.by_ref());

            let content = body.join("\n");
            fields.content = Some(content.trim_end_matches(['\n', '\r']).to_string());
            break;
        }
    }

    fields
}

/// Open `template` in the editor and parse the result
pub fn edit_record(template: &str) -> Result<RecordFields> {
    let edited = edit_text(template)?;
    Ok(parse_record_template(&edited))
}

/// Let the user edit `initial_content`, returning the saved text
fn edit_text(initial_content: &str) -> Result<String> {
    let (program, args) = editor_command(env::var("VISUAL").ok(), env::var("EDITOR").ok());

    let mut file = tempfile::Builder::new()
        .prefix("liferec-")
        .suffix(".md")
        .tempfile()
        .context("Failed to create a temporary file to edit")?;
    file.write_all(initial_content.as_bytes())
        .and_then(|_| file.flush())
        .with_context(|| format!("Failed to write {:?}", file.path()))?;

    let status = Command::new(&program)
        .args(&args)
        .arg(file.path())
        .status()
        .with_context(|| format!("Failed to run editor '{}'. Set $VISUAL or $EDITOR.", program))?;

    if !status.success() {
        bail!("Editor '{}' exited with {}; nothing was saved.", program, status);
    }

    // Editors may replace the file instead of writing in place, so re-read by path
    std::fs::read_to_string(file.path())
        .with_context(|| format!("Failed to read edited file {:?}", file.path()))
}

/// Program and leading arguments for the editor
///
/// `$VISUAL` wins over `$EDITOR`. Values such as `code --wait` are split
/// on whitespace.
fn editor_command(visual: Option<String>, editor: Option<String>) -> (String, Vec<String>) {
    let chosen = [visual, editor]
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_EDITOR.to_string());

    let mut words = chosen.split_whitespace().map(str::to_string);
    let program = words.next().unwrap_or_else(|| FALLBACK_EDITOR.to_string());
    (program, words.collect())
}

/// Whether stdin is attached to a terminal
pub fn is_interactive() -> bool {
    atty::is(atty::Stream::Stdin)
}

/// Print `message` and read one trimmed line; `None` without a TTY
fn ask(message: &str) -> Result<Option<String>> {
    if !is_interactive() {
        return Ok(None);
    }

    print!("{}", message);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(Some(input.trim().to_string()))
}

/// Ask for one line of input (empty when stdin is not a TTY)
pub fn prompt(message: &str) -> Result<String> {
    Ok(ask(message)?.unwrap_or_default())
}

/// Ask a yes/no question; anything but `y`/`yes` (or no TTY) is a no
pub fn confirm(question: &str) -> Result<bool> {
    let answer = ask(&format!("{} [y/N] ", question))?;
    Ok(answer.is_some_and(|a| is_yes(&a)))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use liferec_core::RecordId;

    fn record(content: &str) -> Record {
        Record {
            id: RecordId::new(4),
            timestamp: "03-Mar-2024 18:45".to_string(),
            tag: "travel".to_string(),
            title: "Trip".to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_parse_record_template() {
        let text = "# New life record\n# ignored\n\ntag: travel\ntitle:  Porto \ncontent:\nFirst line\n\nSecond line\n";
        let parsed = parse_record_template(text);

        assert_eq!(parsed.tag.as_deref(), Some("travel"));
        assert_eq!(parsed.title.as_deref(), Some("Porto"));
        assert_eq!(parsed.content.as_deref(), Some("First line\n\nSecond line"));
    }

    #[test]
    fn test_parse_inline_content() {
        let parsed = parse_record_template("title: t\ncontent: all on one line\n");
        assert_eq!(parsed.content.as_deref(), Some("all on one line"));
        assert!(parsed.tag.is_none());
    }

    #[test]
    fn test_untouched_new_template_is_empty() {
        assert!(parse_record_template(&new_record_template()).is_empty());
    }

    #[test]
    fn test_title_edit_keeps_markdown_content() {
        let original = record("# Day 1\nwent hiking\n  - packed lunch\n\n# Day 2\nbeach");
        let edited = edit_record_template(&original).replace("title: Trip", "title: Trip!");

        let mut updated = original.clone();
        parse_record_template(&edited).apply_to(&mut updated);

        assert_eq!(updated.title, "Trip!");
        assert_eq!(updated.content, original.content);
    }

    #[test]
    fn test_unchanged_template_is_a_no_op() {
        let original = record("    indented first line\n# heading\ntrailing spaces   ");

        let mut updated = original.clone();
        parse_record_template(&edit_record_template(&original)).apply_to(&mut updated);

        assert_eq!(updated, original);
    }

    #[test]
    fn test_editor_command() {
        assert_eq!(
            editor_command(Some("code --wait".into()), Some("nano".into())),
            ("code".to_string(), vec!["--wait".to_string()])
        );
        assert_eq!(
            editor_command(Some("  ".into()), Some("nano".into())),
            ("nano".to_string(), Vec::new())
        );
        assert_eq!(
            editor_command(None, None),
            (FALLBACK_EDITOR.to_string(), Vec::new())
        );
    }

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y"));
        assert!(is_yes("YES"));
        assert!(!is_yes(""));
        assert!(!is_yes("nope"));
    }
}
