//! Renders invocation outcomes into the reply text

use super::types::{InvocationOutcome, NO_ACTION_MESSAGE};
use crate::config::PipelineConfig;

const SUCCESS_MARK: &str = "✅";
const FAILURE_MARK: &str = "❌";
const ELLIPSIS: char = '…';
const LINE_JOINER: &str = " · ";

#[derive(Debug, Clone)]
pub struct Summarizer {
    max_result_chars: usize,
    transport_limit: usize,
}

impl Summarizer {
    pub fn new(max_result_chars: usize, transport_limit: usize) -> Self {
        Self {
            max_result_chars,
            transport_limit,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.max_result_chars, config.transport_limit)
    }

    /// One line per outcome, in order
    pub fn summarize(&self, outcomes: &[InvocationOutcome]) -> String {
        if outcomes.is_empty() {
            return NO_ACTION_MESSAGE.to_string();
        }

        let lines: Vec<String> = outcomes
            .iter()
            .map(|outcome| {
                let mark = if outcome.succeeded {
                    SUCCESS_MARK
                } else {
                    FAILURE_MARK
                };
                format!(
                    "{} {}: {}",
                    mark,
                    outcome.capability,
                    truncate_chars(&single_line(&outcome.text), self.max_result_chars)
                )
            })
            .collect();

        truncate_chars(&lines.join("\n"), self.transport_limit)
    }
}

impl Default for Summarizer {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

/// Join the non-blank lines of `text` so one outcome stays on one line
fn single_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(LINE_JOINER)
}

/// Keep at most `max` characters, ending with an ellipsis when cut
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.char_indices().nth(max).is_none() {
        return text.to_string();
    }
    let keep = max.saturating_sub(1);
    let end = text
        .char_indices()
        .nth(keep)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());
    let mut out = String::with_capacity(end + ELLIPSIS.len_utf8());
    out.push_str(&text[..end]);
    out.push(ELLIPSIS);
    out
}
