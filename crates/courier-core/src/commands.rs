//! Classification of inbound chat text
//!
//! Control commands are matched after trimming and lowercasing. Anything else
//! is a task for the pipeline.

/// Reply to `/start` and `/help`
pub const HELP_TEXT: &str = "Send me a task and I will plan and run it.\n\n\
Commands:\n\
/task <description> - run a task\n\
/reset or /clear - clear the conversation history\n\
/help - show this message";

/// Reply to `/task` without a description or to empty input
pub const USAGE_HINT: &str = "Please describe the task, e.g. /task find today's weather";

/// What an inbound message asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Clear the conversation history
    Reset,

    /// Show the help text
    Help,

    /// Nothing to do; reply with the usage hint
    Usage,

    /// Task description for the pipeline
    Task(String),
}

impl Input {
    pub fn is_task(&self) -> bool {
        matches!(self, Input::Task(_))
    }
}

/// Classify a raw message
pub fn classify(text: &str) -> Input {
    let trimmed = text.trim();
    let normalized = trimmed.to_lowercase();

    match normalized.as_str() {
        "" => return Input::Usage,
        "/clear" | "/reset" | "clear context" | "reset context" => return Input::Reset,
        "/start" | "/help" => return Input::Help,
        _ => {}
    }

    if let Some(rest) = task_argument(trimmed) {
        let description = rest.trim();
        return if description.is_empty() {
            Input::Usage
        } else {
            Input::Task(description.to_string())
        };
    }

    Input::Task(trimmed.to_string())
}

/// Text after a `/task` prefix, if present
fn task_argument(text: &str) -> Option<&str> {
    let (cmd, rest) = match text.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, rest),
        None => (text, ""),
    };
    // Telegram appends the bot name in groups: /task@courier_bot
    let cmd = cmd.split('@').next().unwrap_or(cmd);
    cmd.eq_ignore_ascii_case("/task").then_some(rest)
}
