//! Text clean-up applied to OCR output before field extraction.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Zero-width characters OCR output sometimes carries between Thai syllables.
static ZERO_WIDTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\u{200B}\u{200C}\u{200D}\u{FEFF}]").unwrap());

/// Horizontal whitespace (any whitespace except newline).
static HORIZONTAL_WS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\S\n]+").unwrap());

static EXCESS_BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// A named text transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostProcessor {
    CleanThaiText,
    NormalizeNumbers,
}

impl PostProcessor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CleanThaiText => "clean_thai_text",
            Self::NormalizeNumbers => "normalize_numbers",
        }
    }

    /// Parse a config name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "clean_thai_text" => Some(Self::CleanThaiText),
            "normalize_numbers" => Some(Self::NormalizeNumbers),
            _ => None,
        }
    }

    pub fn apply(&self, text: &str) -> String {
        match self {
            Self::CleanThaiText => clean_thai_text(text),
            Self::NormalizeNumbers => normalize_numbers(text),
        }
    }
}

/// Remove zero-width characters and normalize whitespace.
///
/// Runs of spaces and tabs collapse to one space and each line is trimmed,
/// but line breaks are kept (at most one blank line in a row) so that
/// line-oriented extraction still sees the document layout.
pub fn clean_thai_text(text: &str) -> String {
    let text = ZERO_WIDTH.replace_all(text, "");
    let text = text.replace("\r\n", "\n");

    let lines: Vec<String> = text
        .split('\n')
        .map(|line| HORIZONTAL_WS.replace_all(line, " ").trim().to_string())
        .collect();
    let joined = lines.join("\n");

    EXCESS_BLANK_LINES
        .replace_all(&joined, "\n\n")
        .trim()
        .to_string()
}

/// Replace Thai digits (๐-๙) with ASCII digits.
pub fn normalize_numbers(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{0E50}'..='\u{0E59}' => {
                char::from(b'0' + (c as u32 - 0x0E50) as u8)
            }
            _ => c,
        })
        .collect()
}

/// Ordered list of post-processors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostProcessorChain {
    steps: Vec<PostProcessor>,
}

impl PostProcessorChain {
    pub fn new(steps: Vec<PostProcessor>) -> Self {
        Self { steps }
    }

    /// Append a post-processor.
    pub fn add(&mut self, step: PostProcessor) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[PostProcessor] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step in order.
    pub fn apply(&self, text: &str) -> String {
        self.steps
            .iter()
            .fold(text.to_string(), |acc, step| step.apply(&acc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_collapses_spaces_but_keeps_lines() {
        let input = "  บริษัท   อินโนเวท\tเทค จำกัด  \r\n\r\n\r\n\r\nโทร  02-123-4567 ";
        assert_eq!(
            clean_thai_text(input),
            "บริษัท อินโนเวท เทค จำกัด\n\nโทร 02-123-4567"
        );
    }

    #[test]
    fn test_clean_removes_zero_width() {
        assert_eq!(clean_thai_text("ใบ\u{200B}กำกับ\u{FEFF}ภาษี"), "ใบกำกับภาษี");
    }

    #[test]
    fn test_clean_is_idempotent() {
        let input = " a \u{00A0} b\n\n\n\n c\u{200C} \n";
        let once = clean_thai_text(input);
        assert_eq!(clean_thai_text(&once), once);
    }

    #[test]
    fn test_normalize_numbers() {
        assert_eq!(normalize_numbers("๐๑๒๓๔๕๖๗๘๙"), "0123456789");
        assert_eq!(normalize_numbers("โทร ๐๒-๑๒๓-๔๕๖๗"), "โทร 02-123-4567");
        assert_eq!(normalize_numbers("no digits"), "no digits");
    }

    #[test]
    fn test_from_name() {
        assert_eq!(
            PostProcessor::from_name("Clean_Thai_Text"),
            Some(PostProcessor::CleanThaiText)
        );
        assert_eq!(PostProcessor::from_name("upper"), None);
        for p in [PostProcessor::CleanThaiText, PostProcessor::NormalizeNumbers] {
            assert_eq!(PostProcessor::from_name(p.as_str()), Some(p));
        }
    }

    #[test]
    fn test_chain_applies_in_order() {
        let mut chain = PostProcessorChain::default();
        assert_eq!(chain.apply("  ๑  "), "  ๑  ");
        chain.add(PostProcessor::CleanThaiText);
        chain.add(PostProcessor::NormalizeNumbers);
        assert_eq!(chain.apply("  ๑   ๒  "), "1 2");
        assert_eq!(chain.steps().len(), 2);
    }
}
