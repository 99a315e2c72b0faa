//! Record command handlers
//!
//! create, read, update and delete, each a thin layer over `RecordStore`
//! that gathers input (flags, JSON, prompts or $EDITOR) and renders output.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;
use tracing::debug;

use liferec_core::{Record, RecordFields, RecordId, RecordStore, StoreError};

use crate::editor::{confirm, edit_record, is_interactive, prompt, record_template};
use crate::output::{pretty_record, Output, OutputFormat};

/// Record fields given on the command line
#[derive(Args, Debug, Default, Clone)]
pub struct FieldArgs {
    /// Tag (optional)
    #[arg(short, long)]
    pub tag: Option<String>,
    /// Title
    #[arg(short = 'T', long)]
    pub title: Option<String>,
    /// Content
    #[arg(short, long)]
    pub content: Option<String>,
    /// All fields as a JSON object, e.g. '{"title": "...", "content": "..."}'
    #[arg(long, conflicts_with_all = ["tag", "title", "content", "editor"])]
    pub input: Option<String>,
    /// Compose the record in $EDITOR, pre-filled with the other flags
    #[arg(short, long)]
    pub editor: bool,
}

impl FieldArgs {
    /// Collect flag values, or the edited template with `--editor`
    fn to_fields(&self, current: Option<&Record>) -> Result<RecordFields> {
        if let Some(json) = &self.input {
            return fields_from_json(json);
        }

        let mut fields = RecordFields {
            tag: self.tag.clone(),
            title: self.title.clone(),
            content: self.content.clone(),
        };

        if self.editor {
            let pick = |given: &Option<String>, existing: Option<&str>| {
                given.clone().or(existing.map(str::to_string)).unwrap_or_default()
            };
            let heading = match current {
                Some(record) => format!("Edit record #{} (empty fields keep their value)", record.id),
                None => "New life record".to_string(),
            };
            let template = record_template(
                &heading,
                &pick(&fields.tag, current.map(|r| r.tag.as_str())),
                &pick(&fields.title, current.map(|r| r.title.as_str())),
                &pick(&fields.content, current.map(|r| r.content.as_str())),
            );
            fields = edit_record(&template).context("Failed to edit record")?;
        }

        Ok(fields)
    }
}

/// Create a new record
pub fn create(store: &mut RecordStore, args: FieldArgs, output: &Output) -> Result<()> {
    let mut fields = args.to_fields(None)?;

    if args.input.is_none() && output.should_prompt() && is_interactive() {
        prompt_missing(&mut fields)?;
    }

    let record = store.create(fields)?;
    debug!("create -> {}", record.id);

    match output.format {
        OutputFormat::Human => output.success(&format!(
            "Added life record #{}: {}",
            record.id, record.title
        )),
        _ => output.print_record(&record),
    }
    Ok(())
}

/// Show one record, or list all of them
pub fn read(store: &RecordStore, id: Option<String>, output: &Output) -> Result<()> {
    let Some(id) = id else {
        let records: Vec<&Record> = store.records().collect();
        output.print_records(&records);
        return Ok(());
    };

    let identifier = resolve_id(&id);
    let record = store
        .read_one(&identifier)
        .ok_or(StoreError::NotFound(identifier))?;
    output.print_record(record);
    Ok(())
}

/// Update an existing record
///
/// Without any field flags, prompts for each field; an empty answer keeps
/// the current value.
pub fn update(store: &mut RecordStore, id: String, args: FieldArgs, output: &Output) -> Result<()> {
    let identifier = resolve_id(&id);
    let current = store
        .read_one(&identifier)
        .cloned()
        .ok_or_else(|| StoreError::NotFound(identifier.clone()))?;

    let mut fields = args.to_fields(Some(&current))?;

    if args.input.is_none() && fields.is_empty() && output.should_prompt() && is_interactive() {
        println!("Current record:");
        println!("{}", pretty_record(&current));
        println!();
        println!("Enter a new value for each field, or press Enter to keep it.");
        fields = RecordFields {
            tag: Some(prompt("Updated tag (optional): ")?),
            title: Some(prompt("Updated title: ")?),
            content: Some(prompt("Updated content: ")?),
        };
    }

    let record = store.update(&identifier, fields)?;
    debug!("update -> {}", record.id);

    match output.format {
        OutputFormat::Human => output.success(&format!("Record #{} is updated.", record.id)),
        _ => output.print_record(&record),
    }
    Ok(())
}

/// Delete a record, asking for confirmation unless `yes`
pub fn delete(store: &mut RecordStore, id: String, yes: bool, output: &Output) -> Result<()> {
    let identifier = resolve_id(&id);
    let record = store
        .read_one(&identifier)
        .cloned()
        .ok_or_else(|| StoreError::NotFound(identifier.clone()))?;

    if !yes && output.should_prompt() {
        println!("Record you want to delete is:");
        println!("{}", pretty_record(&record));
        println!();
        if !confirm("Are you sure you want to delete this record?")? {
            output.message("Every record matters! Nothing was deleted.");
            return Ok(());
        }
    }

    store.delete(&identifier)?;
    output.success(&format!("Deleted record #{}", record.id));
    Ok(())
}

/// Normalize an identifier argument
///
/// Accepts `lr-<n>`, `#lr-<n>`, `#<n>` or a bare `<n>`. Anything else is
/// passed through unchanged and will simply not match.
pub fn resolve_id(arg: &str) -> String {
    let arg = arg.trim();
    let bare = arg.strip_prefix('#').unwrap_or(arg);

    if !bare.is_empty() && bare.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(seq) = bare.parse::<u64>() {
            return RecordId::new(seq).to_string();
        }
    }
    bare.to_string()
}

/// Parse `--input` JSON into validated fields
fn fields_from_json(json: &str) -> Result<RecordFields> {
    let value: Value = serde_json::from_str(json).context("--input is not valid JSON")?;
    Ok(RecordFields::try_from(&value)?)
}

/// Ask for any create field that was not given on the command line
fn prompt_missing(fields: &mut RecordFields) -> Result<()> {
    if fields.tag.is_none() {
        fields.tag = Some(prompt("What is the tag of this record? (optional): ")?);
    }
    if fields.title.is_none() {
        fields.title = Some(prompt("What is the title?: ")?);
    }
    if fields.content.is_none() {
        fields.content = Some(prompt("What do you want to remember?: ")?);
    }
    Ok(())
}
