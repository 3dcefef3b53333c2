//! Format-preserving editing of the reference spec.
//!
//! The spec is hand-written YAML, and re-serializing it from the logical
//! model would reflow every block scalar and drop comments. [`SpecDocument`]
//! keeps the original text and applies line-level edits addressed by the
//! entry's position in `functions`; lines it does not touch are written back
//! byte for byte. [`SpecFile`] pairs it with the logical [`DocSpec`] so both
//! views always change together.

use crate::error::{AuditError, Result};
use crate::spec::{DocEntry, DocExample, DocSpec};
use std::path::Path;
use tracing::debug;

/// Top-level key holding the reference entries.
pub const FUNCTIONS_KEY: &str = "functions";

const DEFAULT_INDENT: usize = 2;

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

fn is_seq_item(trimmed: &str) -> bool {
    trimmed == "-" || trimmed.starts_with("- ")
}

fn is_comment(trimmed: &str) -> bool {
    trimmed.starts_with('#')
}

/// Split `key: rest` into the unquoted key and the text after the colon.
fn split_key(text: &str) -> Option<(String, &str)> {
    let text = text.trim_start();
    let (key, rest) = if let Some(quote @ ('\'' | '"')) = text.chars().next() {
        let close = text[1..].find(quote)? + 1;
        let rest = text[close + 1..].trim_start();
        (text[1..close].to_string(), rest.strip_prefix(':')?)
    } else {
        let colon = text
            .char_indices()
            .find(|&(i, c)| c == ':' && text[i + 1..].chars().next().is_none_or(|n| n == ' '))?
            .0;
        (text[..colon].trim_end().to_string(), &text[colon + 1..])
    };
    Some((key, rest.trim()))
}

/// Whether the text after a key's colon holds an inline value.
fn has_inline_value(rest: &str) -> bool {
    !rest.is_empty() && !is_comment(rest)
}

/// Render a single-line scalar, quoting only when YAML requires it.
fn quote_scalar(value: &str) -> String {
    match serde_yaml::to_string(value) {
        Ok(rendered) if !rendered.trim_end().contains('\n') => rendered.trim_end().to_string(),
        _ => serde_json::to_string(value).unwrap_or_else(|_| format!("'{}'", value.replace('\'', "''"))),
    }
}

/// Render `key: value` at the given indentation. Multi-line values become
/// literal block scalars.
fn render_field(key: &str, value: &str, indent: usize) -> Vec<String> {
    let pad = " ".repeat(indent);
    if !value.contains('\n') {
        return vec![format!("{pad}{key}: {}", quote_scalar(value))];
    }

    let body = value.trim_end_matches('\n');
    let chomp = match value.len() - body.len() {
        0 => "-",
        1 => "",
        _ => "+",
    };
    let indicator = if body.starts_with(' ') { "2" } else { "" };

    let mut lines = vec![format!("{pad}{key}: |{indicator}{chomp}")];
    for line in body.split('\n') {
        if line.is_empty() {
            lines.push(String::new());
        } else {
            lines.push(format!("{pad}  {line}"));
        }
    }
    if chomp == "+" {
        lines.extend(std::iter::repeat_n(String::new(), value.len() - body.len() - 1));
    }
    lines
}

/// Turn the first line of a rendered mapping at `key_indent` into a sequence
/// item whose dash sits at `item_indent`.
fn as_sequence_item(lines: &mut [String], item_indent: usize, key_indent: usize) {
    if let Some(first) = lines.first_mut() {
        let gap = key_indent.saturating_sub(item_indent + 1).max(1);
        let text = first.trim_start().to_string();
        *first = format!("{}-{}{}", " ".repeat(item_indent), " ".repeat(gap), text);
    }
}

fn render_example(example: &DocExample, item_indent: usize) -> Vec<String> {
    let key_indent = item_indent + DEFAULT_INDENT;
    let mut lines = render_field("id", &example.id, key_indent);
    lines.extend(render_field("name", &example.name, key_indent));
    lines.extend(render_field("code", &example.code, key_indent));
    as_sequence_item(&mut lines, item_indent, key_indent);
    lines
}

fn render_entry(entry: &DocEntry, item_indent: usize) -> Vec<String> {
    let key_indent = item_indent + DEFAULT_INDENT;
    let mut lines = render_field("id", &entry.id, key_indent);
    if let Some(title) = &entry.title {
        lines.extend(render_field("title", title, key_indent));
    }
    if let Some(reference) = &entry.reference {
        lines.extend(render_field("$ref", reference, key_indent));
    }
    if let Some(description) = &entry.description {
        lines.extend(render_field("description", description, key_indent));
    }
    if let Some(examples) = entry.examples.as_ref().filter(|examples| !examples.is_empty()) {
        lines.push(format!("{}examples:", " ".repeat(key_indent)));
        for example in examples {
            lines.extend(render_example(example, key_indent + DEFAULT_INDENT));
        }
    }
    as_sequence_item(&mut lines, item_indent, key_indent);
    lines
}

/// Location of a top-level sequence.
#[derive(Debug, Clone, Copy)]
struct SequenceBlock {
    key_line: usize,
    content_end: usize,
    item_indent: Option<usize>,
    inline: bool,
}

/// Location of a sequence item (one reference entry).
#[derive(Debug, Clone, Copy)]
struct ItemSpan {
    start: usize,
    content_end: usize,
    item_indent: usize,
    key_indent: usize,
}

/// Location of one key of a mapping.
#[derive(Debug, Clone)]
struct FieldSpan {
    key: String,
    line: usize,
    content_end: usize,
    on_dash_line: bool,
    inline_value: Option<String>,
}

/// Line-oriented handle over the spec's YAML text.
#[derive(Debug, Clone)]
pub struct SpecDocument {
    lines: Vec<String>,
    newline: &'static str,
    trailing_newline: bool,
}

impl SpecDocument {
    /// Split the text into lines, remembering the line ending style.
    pub fn parse(text: &str) -> Self {
        let newline = if text.contains("\r\n") { "\r\n" } else { "\n" };
        let trailing_newline = text.ends_with('\n');
        let mut lines: Vec<String> = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect();
        if trailing_newline || text.is_empty() {
            lines.pop();
        }
        Self { lines, newline, trailing_newline }
    }

    /// Reassemble the text.
    pub fn render(&self) -> String {
        let mut text = self.lines.join(self.newline);
        if self.trailing_newline && !self.lines.is_empty() {
            text.push_str(self.newline);
        }
        text
    }

    /// Text of the lines after the colon of a mapping key at `line`.
    fn key_at(&self, line: usize, column: usize) -> Option<(String, String)> {
        let text = self.lines.get(line)?;
        let (key, rest) = split_key(text.get(column..)?)?;
        Some((key, rest.to_string()))
    }

    /// End of the value of a key at `key_indent`, exclusive of trailing blank
    /// and comment lines. Sequences at the key's own indentation belong to it.
    fn value_end(&self, key_line: usize, key_indent: usize, limit: usize) -> usize {
        let mut content_end = key_line + 1;
        for (offset, line) in self.lines[key_line + 1..limit].iter().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let indent = indent_of(line);
            if indent > key_indent || (indent == key_indent && is_seq_item(trimmed)) {
                content_end = key_line + 1 + offset + 1;
            } else if !is_comment(trimmed) {
                break;
            }
        }
        content_end
    }

    fn functions_block(&self) -> Option<SequenceBlock> {
        let key_line = self.lines.iter().position(|line| {
            indent_of(line) == 0 && split_key(line).is_some_and(|(key, _)| key == FUNCTIONS_KEY)
        })?;
        let (_, rest) = self.key_at(key_line, 0)?;
        let content_end = self.value_end(key_line, 0, self.lines.len());
        let item_indent = self.lines[key_line + 1..content_end]
            .iter()
            .find(|line| is_seq_item(line.trim()))
            .map(|line| indent_of(line));
        Some(SequenceBlock { key_line, content_end, item_indent, inline: has_inline_value(&rest) })
    }

    fn item_spans(&self) -> Vec<ItemSpan> {
        let Some(block) = self.functions_block() else {
            return Vec::new();
        };
        let Some(item_indent) = block.item_indent else {
            return Vec::new();
        };

        let starts: Vec<usize> = (block.key_line + 1..block.content_end)
            .filter(|&i| {
                let line = &self.lines[i];
                indent_of(line) == item_indent && is_seq_item(line.trim())
            })
            .collect();

        starts
            .iter()
            .enumerate()
            .map(|(n, &start)| {
                let limit = starts.get(n + 1).copied().unwrap_or(block.content_end);
                let after_dash = &self.lines[start][item_indent + 1..];
                let gap = after_dash.len() - after_dash.trim_start_matches(' ').len();
                let key_indent = item_indent + 1 + gap.max(1);
                let content_end = self.value_end(start, item_indent, limit);
                ItemSpan { start, content_end, item_indent, key_indent }
            })
            .collect()
    }

    fn fields(&self, item: &ItemSpan) -> Vec<FieldSpan> {
        let mut starts = Vec::new();
        if let Some((key, rest)) = self.key_at(item.start, item.key_indent) {
            starts.push((item.start, key, rest, true));
        }
        for line in item.start + 1..item.content_end {
            let text = &self.lines[line];
            let trimmed = text.trim();
            if indent_of(text) != item.key_indent || is_seq_item(trimmed) || is_comment(trimmed) {
                continue;
            }
            if let Some((key, rest)) = self.key_at(line, item.key_indent) {
                starts.push((line, key, rest, false));
            }
        }

        let limits: Vec<usize> = starts
            .iter()
            .skip(1)
            .map(|(line, ..)| *line)
            .chain(std::iter::once(item.content_end))
            .collect();

        starts
            .into_iter()
            .zip(limits)
            .map(|((line, key, rest, on_dash_line), limit)| FieldSpan {
                key,
                line,
                content_end: self.value_end(line, item.key_indent, limit),
                on_dash_line,
                inline_value: has_inline_value(&rest).then_some(rest),
            })
            .collect()
    }

    fn item(&self, position: usize, id: &str) -> Result<ItemSpan> {
        let item = self.item_spans().get(position).copied().ok_or_else(|| {
            AuditError::edit(format!("entry #{position} ('{id}') not found in document"))
        })?;
        let found = self
            .fields(&item)
            .into_iter()
            .find(|field| field.key == "id")
            .and_then(|field| field.inline_value)
            .and_then(|raw| serde_yaml::from_str::<serde_yaml::Value>(&raw).ok())
            .and_then(|value| match value {
                serde_yaml::Value::String(s) => Some(s),
                serde_yaml::Value::Number(n) => Some(n.to_string()),
                _ => None,
            });
        if found.as_deref() != Some(id) {
            return Err(AuditError::edit(format!(
                "entry #{position} has id {found:?} in document, expected '{id}'"
            )));
        }
        Ok(item)
    }

    /// Number of entries in the `functions` sequence.
    pub fn entry_count(&self) -> usize {
        self.item_spans().len()
    }

    /// Delete a key (and its value) from the entry at `position`. Returns
    /// whether the key was present.
    pub fn remove_entry_field(&mut self, position: usize, id: &str, key: &str) -> Result<bool> {
        let item = self.item(position, id)?;
        let fields = self.fields(&item);
        let Some(index) = fields.iter().position(|field| field.key == key) else {
            return Ok(false);
        };
        let field = &fields[index];

        if field.on_dash_line {
            let next = fields.get(index + 1).ok_or_else(|| {
                AuditError::edit(format!("cannot remove the only key of entry '{id}'"))
            })?;
            let mut promoted = vec![self.lines[next.line].clone()];
            as_sequence_item(&mut promoted, item.item_indent, item.key_indent);
            self.lines[next.line] = promoted.remove(0);
            self.lines.drain(field.line..next.line);
        } else {
            self.lines.drain(field.line..field.content_end);
        }
        debug!(entry = id, key, "removed field from document");
        Ok(true)
    }

    /// Append examples to the entry at `position`. `existing` is the entry's
    /// current example list, needed only when it is written inline.
    pub fn append_entry_examples(
        &mut self,
        position: usize,
        id: &str,
        existing: &[DocExample],
        added: &[DocExample],
    ) -> Result<()> {
        if added.is_empty() {
            return Ok(());
        }
        let item = self.item(position, id)?;
        let fields = self.fields(&item);
        let examples_key = " ".repeat(item.key_indent) + "examples:";

        match fields.iter().find(|field| field.key == "examples") {
            Some(field) if field.inline_value.is_some() => {
                let mut lines = vec![examples_key];
                for example in existing.iter().chain(added) {
                    lines.extend(render_example(example, item.key_indent + DEFAULT_INDENT));
                }
                if field.on_dash_line {
                    as_sequence_item(&mut lines, item.item_indent, item.key_indent);
                }
                self.lines.splice(field.line..field.content_end, lines);
            }
            Some(field) => {
                let example_indent = self.lines[field.line + 1..field.content_end]
                    .iter()
                    .find(|line| is_seq_item(line.trim()))
                    .map(|line| indent_of(line))
                    .unwrap_or(item.key_indent + DEFAULT_INDENT);
                let lines: Vec<String> =
                    added.iter().flat_map(|example| render_example(example, example_indent)).collect();
                self.lines.splice(field.content_end..field.content_end, lines);
            }
            None => {
                let mut lines = vec![examples_key];
                for example in added {
                    lines.extend(render_example(example, item.key_indent + DEFAULT_INDENT));
                }
                self.lines.splice(item.content_end..item.content_end, lines);
            }
        }
        debug!(entry = id, count = added.len(), "appended examples to document");
        Ok(())
    }

    /// Append entries at the end of the `functions` sequence, creating the
    /// key when the document has none.
    pub fn append_entries(&mut self, entries: &[DocEntry]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let Some(block) = self.functions_block() else {
            if self.lines.last().is_some_and(|line| !line.trim().is_empty()) {
                self.lines.push(String::new());
            }
            self.lines.push(format!("{FUNCTIONS_KEY}:"));
            self.lines.extend(entries.iter().flat_map(|entry| render_entry(entry, DEFAULT_INDENT)));
            self.trailing_newline = true;
            return Ok(());
        };

        if block.inline {
            let (_, rest) = self.key_at(block.key_line, 0).unwrap_or_default();
            if rest.trim() != "[]" {
                return Err(AuditError::edit(format!(
                    "cannot append to inline `{FUNCTIONS_KEY}` value '{rest}'"
                )));
            }
            self.lines[block.key_line] = format!("{FUNCTIONS_KEY}:");
        }

        let items = self.item_spans();
        let separated = items.len() >= 2 && self.lines[items[1].start - 1].trim().is_empty();
        let item_indent = block.item_indent.unwrap_or(DEFAULT_INDENT);

        let mut lines = Vec::new();
        for entry in entries {
            if separated {
                lines.push(String::new());
            }
            lines.extend(render_entry(entry, item_indent));
        }
        let insert_at = if block.inline { block.key_line + 1 } else { block.content_end };
        self.lines.splice(insert_at..insert_at, lines);
        debug!(count = entries.len(), "appended entries to document");
        Ok(())
    }
}

/// The spec as both a logical model and an editable document.
///
/// Every mutation edits the document first and only then the model, so a
/// failed edit leaves both untouched.
#[derive(Debug, Clone)]
pub struct SpecFile {
    spec: DocSpec,
    document: SpecDocument,
    changed: bool,
}

impl SpecFile {
    /// Parse the YAML text into both representations.
    pub fn parse(text: &str, origin: &Path) -> Result<Self> {
        let spec = DocSpec::from_yaml(text, origin)?;
        Self::with_spec(spec, text, origin)
    }

    /// Pair an already parsed spec with its source text. Fails when the
    /// document handle cannot address every entry, e.g. a flow-style
    /// `functions: [...]` sequence.
    pub fn with_spec(spec: DocSpec, text: &str, origin: &Path) -> Result<Self> {
        let document = SpecDocument::parse(text);
        let in_document = document.entry_count();
        if in_document != spec.functions.len() {
            return Err(AuditError::edit(format!(
                "{}: found {in_document} entries in the document but {} in the parsed spec",
                origin.display(),
                spec.functions.len()
            )));
        }
        Ok(Self { spec, document, changed: false })
    }

    pub fn spec(&self) -> &DocSpec {
        &self.spec
    }

    pub fn entries(&self) -> &[DocEntry] {
        &self.spec.functions
    }

    pub fn into_spec(self) -> DocSpec {
        self.spec
    }

    /// Whether any mutation has been applied.
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// The document text including all applied edits.
    pub fn render(&self) -> String {
        self.document.render()
    }

    fn entry(&self, position: usize) -> Result<&DocEntry> {
        self.spec
            .functions
            .get(position)
            .ok_or_else(|| AuditError::edit(format!("no entry at position {position}")))
    }

    /// Drop the manual description of an entry. Returns whether one existed.
    pub fn remove_description(&mut self, position: usize) -> Result<bool> {
        let entry = self.entry(position)?;
        if entry.description.is_none() {
            return Ok(false);
        }
        let id = entry.id.clone();
        if !self.document.remove_entry_field(position, &id, "description")? {
            return Err(AuditError::edit(format!(
                "entry '{id}' has a description that the document does not contain"
            )));
        }
        self.spec.functions[position].description = None;
        self.changed = true;
        Ok(true)
    }

    /// Append examples to an entry.
    pub fn append_examples(&mut self, position: usize, added: Vec<DocExample>) -> Result<()> {
        if added.is_empty() {
            return Ok(());
        }
        let entry = self
            .spec
            .functions
            .get(position)
            .ok_or_else(|| AuditError::edit(format!("no entry at position {position}")))?;
        self.document.append_entry_examples(position, &entry.id, entry.examples(), &added)?;
        self.spec.functions[position].examples.get_or_insert_with(Vec::new).extend(added);
        self.changed = true;
        Ok(())
    }

    /// Append a new entry to `functions`.
    pub fn append_entry(&mut self, entry: DocEntry) -> Result<()> {
        self.document.append_entries(std::slice::from_ref(&entry))?;
        self.spec.functions.push(entry);
        self.changed = true;
        Ok(())
    }
}
