//! Line-oriented record codec.
//!
//! One record per line, fields joined by commas. A value containing a comma,
//! a double quote or a line break is wrapped in double quotes and its internal
//! quotes are doubled; every other value is written raw.
//!
//! Decoding never judges field counts; callers decide what a short or long
//! row means. Splitting takes the expected field count so that a damaged line
//! with an unbalanced quote is cut off at its own line end.

use std::borrow::Cow;

/// Field separator.
pub const SEPARATOR: char = ',';

const QUOTE: char = '"';

fn needs_quoting(value: &str) -> bool {
    value
        .chars()
        .any(|c| c == SEPARATOR || c == QUOTE || c == '\n' || c == '\r')
}

/// Escape a single field value.
pub fn escape_field(value: &str) -> Cow<'_, str> {
    if !needs_quoting(value) {
        return Cow::Borrowed(value);
    }
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push(QUOTE);
    for ch in value.chars() {
        if ch == QUOTE {
            quoted.push(QUOTE);
        }
        quoted.push(ch);
    }
    quoted.push(QUOTE);
    Cow::Owned(quoted)
}

/// Encode an ordered list of field values as one line (without terminator).
pub fn encode<I, S>(fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut line = String::new();
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            line.push(SEPARATOR);
        }
        line.push_str(&escape_field(field.as_ref()));
    }
    line
}

/// Decode one logical line into its field values.
///
/// A doubled quote inside a quoted field yields a single quote. Separators
/// inside quotes are literal.
pub fn decode(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            QUOTE if in_quotes && chars.peek() == Some(&QUOTE) => {
                current.push(QUOTE);
                chars.next();
            }
            QUOTE => in_quotes = !in_quotes,
            SEPARATOR if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

/// Quote and separator state of a partially scanned record.
#[derive(Debug, Clone, Copy, Default)]
struct Scan {
    in_quotes: bool,
    separators: usize,
}

impl Scan {
    fn feed(&mut self, text: &str) {
        for ch in text.chars() {
            match ch {
                QUOTE => self.in_quotes = !self.in_quotes,
                SEPARATOR if !self.in_quotes => self.separators += 1,
                _ => {}
            }
        }
    }

    fn fields(&self) -> usize {
        self.separators + 1
    }
}

/// Byte spans of the `\n`-separated physical lines, without terminators.
fn physical_lines(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = 0;
    for (i, ch) in text.char_indices() {
        if ch == '\n' {
            spans.push((start, i));
            start = i + 1;
        }
    }
    if start < text.len() {
        spans.push((start, text.len()));
    }
    spans
}

/// Split file contents into logical lines.
///
/// A line that ends inside an open quote continues onto the following lines,
/// so a value with an embedded newline stays within its record. The
/// continuation is kept only if the quote closes at a later line end and the
/// joined record has exactly `field_count` fields. Otherwise the opening line
/// stands alone and splitting resumes on the next line. A trailing `\r`
/// left by CRLF line endings is dropped.
pub fn split_records(text: &str, field_count: usize) -> Vec<&str> {
    let spans = physical_lines(text);
    let mut lines = Vec::with_capacity(spans.len());
    let mut i = 0;

    while i < spans.len() {
        let (start, end) = spans[i];
        let mut scan = Scan::default();
        scan.feed(&text[start..end]);

        let mut last = i;
        if scan.in_quotes {
            let mut j = i + 1;
            while j < spans.len() && scan.fields() <= field_count {
                scan.feed(&text[spans[j].0..spans[j].1]);
                if !scan.in_quotes {
                    if scan.fields() == field_count {
                        last = j;
                    }
                    break;
                }
                j += 1;
            }
        }

        lines.push(trim_cr(&text[start..spans[last].1]));
        i = last + 1;
    }
    lines
}

fn trim_cr(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}
