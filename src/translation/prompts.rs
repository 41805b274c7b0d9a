/*!
 * Prompt templates for Markdown translation.
 *
 * Every template puts the instructions in the system prompt and the text to
 * work on in the user prompt. Placeholders use `{name}` syntax.
 */

/// Instructions for glossary term extraction
pub const TERM_EXTRACTION: &str = r#"You are a terminology expert for computer science, fluent in both English and Simplified Chinese.

## Task
Extract the computer science terms from the English text supplied by the user and produce an English to Chinese glossary.

## Rules
- Prefer established standard Chinese translations of computer science terms
- For programming language terms, follow the official Chinese documentation
- For emerging technologies, use the translation most widely accepted by the industry
- Write English terms in lower case, singular form

## Output
One term per line, formatted as `english:chinese`, with no other text.

## Example
text generation:文本生成
token:Token
prompt:提示词
meta prompting:元提示
full-stack:全栈"#;

/// Instructions for the initial translation
pub const TRANSLATION: &str = r#"You are a professional translator of computer science books from English into Simplified Chinese.

## Task
Translate the Markdown text supplied by the user into Simplified Chinese.

## Requirements
- Keep the technical meaning exact while writing natural, fluent Chinese
- Follow the glossary below strictly
- Keep formulas and code examples as they are, translate only their comments
- Split long, nested sentences where needed while keeping the logic intact
- Translate everything, omit nothing and keep the original structure
- Preserve all Markdown formatting
- Output only the translation

## Glossary
{glossary}"#;

/// Instructions for the critique pass
pub const REVIEW: &str = r#"You are a senior editor reviewing an English to Simplified Chinese translation of a computer science text.

## Task
Compare the original and the translation supplied by the user and list the problems you find. Do not rewrite the translation.

## Output
Group your findings under three headings:
- Critical: mistranslations, omissions, broken Markdown, glossary violations
- Important: awkward or unidiomatic phrasing, inconsistent terminology
- Suggested: optional improvements of style and flow

Write "None" under a heading that has no findings.

## Glossary
{glossary}"#;

/// Instructions for the final refinement pass
pub const POLISH: &str = r#"You are a translator who turns English computer science books into fluent, idiomatic Simplified Chinese. Your job is to polish an existing translation.

## Requirements
- Apply every critical fix from the review notes
- Consider the important fixes and apply them where they improve the text
- Apply suggested fixes only when they clearly help
- Follow the glossary strictly
- Avoid translationese: split nested clauses, reduce passive constructions
- Use precise technical verbs
- Preserve the original Markdown formatting completely

## Output
Output only the polished translation, with no explanations or change notes.

## Glossary
{glossary}"#;

const NO_GLOSSARY: &str = "(none)";

/// A rendered system/user prompt pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

fn glossary_or_placeholder(glossary: &str) -> &str {
    if glossary.trim().is_empty() {
        NO_GLOSSARY
    } else {
        glossary
    }
}

/// Prompt for translating a prose unit
pub fn translation(source_text: &str, glossary: &str) -> Prompt {
    Prompt {
        system: TRANSLATION.replace("{glossary}", glossary_or_placeholder(glossary)),
        user: source_text.to_string(),
    }
}

/// Prompt for reviewing a translation
pub fn review(source_text: &str, translated_text: &str, glossary: &str) -> Prompt {
    Prompt {
        system: REVIEW.replace("{glossary}", glossary_or_placeholder(glossary)),
        user: format!(
            "<original>\n{}\n</original>\n\n<translation>\n{}\n</translation>",
            source_text, translated_text
        ),
    }
}

/// Prompt for polishing a translation with the review notes applied
pub fn polish(source_text: &str, translated_text: &str, review_notes: &str, glossary: &str) -> Prompt {
    Prompt {
        system: POLISH.replace("{glossary}", glossary_or_placeholder(glossary)),
        user: format!(
            "<original>\n{}\n</original>\n\n<draft>\n{}\n</draft>\n\n<review>\n{}\n</review>",
            source_text, translated_text, review_notes
        ),
    }
}
