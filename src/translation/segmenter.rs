/*!
 * Splits a Markdown document into ordered translation units.
 *
 * Fenced code blocks are hard boundaries and always form their own unit.
 * Prose is accumulated line by line and flushed before a line that would
 * push the buffer past the size threshold.
 */

use log::debug;

use super::document::{TranslationUnit, FENCE_MARKER};

/// Soft size limit of a prose unit, in characters of accumulated text
pub const MAX_UNIT_CHARS: usize = 4000;

/// Segment a document using the default threshold
pub fn segment(document_text: &str) -> Vec<TranslationUnit> {
    segment_with_limit(document_text, MAX_UNIT_CHARS)
}

/// Segment a document with an explicit prose threshold
///
/// An unterminated fence leaves the trailing buffer open; it is flushed as
/// an ordinary unit at end of input.
pub fn segment_with_limit(document_text: &str, max_chars: usize) -> Vec<TranslationUnit> {
    let mut units = Vec::new();
    let mut buffer = String::new();
    let mut buffer_chars = 0;
    let mut in_code_block = false;

    for line in document_text.lines() {
        if line.contains(FENCE_MARKER) {
            if in_code_block {
                push_line(&mut buffer, line);
                units.push(TranslationUnit::new(std::mem::take(&mut buffer)));
                buffer_chars = 0;
            } else {
                if !buffer.is_empty() {
                    units.push(TranslationUnit::new(std::mem::take(&mut buffer)));
                }
                push_line(&mut buffer, line);
                buffer_chars = line.chars().count() + 1;
            }
            in_code_block = !in_code_block;
            continue;
        }

        let line_chars = line.chars().count();
        // checked before appending, so one long line may overshoot
        if !in_code_block && !buffer.is_empty() && buffer_chars + line_chars > max_chars {
            units.push(TranslationUnit::new(std::mem::take(&mut buffer)));
            buffer_chars = 0;
        }
        push_line(&mut buffer, line);
        buffer_chars += line_chars + 1;
    }

    if !buffer.is_empty() {
        units.push(TranslationUnit::new(buffer));
    }

    debug!("Segmented document into {} units", units.len());
    units
}

fn push_line(buffer: &mut String, line: &str) {
    buffer.push_str(line);
    buffer.push('\n');
}
