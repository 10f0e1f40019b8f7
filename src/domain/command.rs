//! Side-channel bot commands

/// Commands answered with fixed text, outside the completion flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    /// Same reply as `Start`; no state exists to reset
    Reset,
    Help,
}

impl Command {
    /// Parse `/start`, `/reset` or `/help`.
    ///
    /// Accepts a `@botname` suffix and trailing arguments. Matching is case
    /// sensitive; anything else returns `None` and is treated as plain text.
    pub fn parse(text: &str) -> Option<Self> {
        let token = text.trim_start().split_whitespace().next()?;
        let name = token.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name);

        match name {
            "start" => Some(Command::Start),
            "reset" => Some(Command::Reset),
            "help" => Some(Command::Help),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Reset => "reset",
            Command::Help => "help",
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}", self.name())
    }
}
