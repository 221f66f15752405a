// Command error classification.
//
// The Discord layer turns whatever the framework hands us into a
// `CommandFailure`, and this module decides what (if anything) the user gets
// told. No Discord types in here so every branch can be unit tested.

use std::error::Error as StdError;
use std::fmt::Write as _;
use std::time::Duration;

/// Discord refuses messages longer than this.
pub const MESSAGE_LIMIT: usize = 2000;

/// Everything that can go wrong while running a command, already unwrapped
/// to its original cause.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandFailure {
    /// Nothing matched the invoked name.
    UnknownCommand,
    /// The bot itself lacks these permission slugs (e.g. `ban_members`).
    BotMissingPermissions(Vec<String>),
    /// The command was switched off in configuration.
    Disabled,
    /// Invoked again before the cooldown elapsed.
    Cooldown { retry_after: Duration },
    /// The caller lacks these permission slugs.
    UserMissingPermissions(Vec<String>),
    /// Arguments could not be parsed.
    InvalidInput,
    /// A guild-only command was used in a direct message.
    GuildOnlyInDirectMessage,
    /// Discord answered 403 to something we tried to do.
    Forbidden(String),
    /// A check failed with a message meant for the user.
    CheckFailed(String),
    /// Anything else. `trace` is the rendered cause chain.
    Unclassified { summary: String, trace: String },
}

/// What the Discord layer should do about a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum FailureResponse {
    /// Say nothing, log nothing.
    Ignore,
    /// Reply in the channel the command came from.
    Reply(String),
    /// Send the invoking user a DM. Refusals are dropped silently.
    DirectMessage(String),
    /// Platform refused an action: warning log only.
    LogWarning(String),
    /// Report to the error log channel (best effort) and always log.
    Report { summary: String, trace: String },
}

/// Maps a failure to exactly one response.
///
/// `prefix` is the command prefix shown in the usage hint.
pub fn classify(failure: CommandFailure, prefix: &str) -> FailureResponse {
    match failure {
        CommandFailure::UnknownCommand => FailureResponse::Ignore,
        CommandFailure::BotMissingPermissions(missing) => FailureResponse::Reply(format!(
            "I need the **{}** permission(s) to run this command.",
            format_permission_list(&missing)
        )),
        CommandFailure::Disabled => {
            FailureResponse::Reply("This command has been disabled.".to_string())
        }
        CommandFailure::Cooldown { retry_after } => FailureResponse::Reply(format!(
            "This command is on cooldown, please retry in {}s.",
            retry_seconds(retry_after)
        )),
        CommandFailure::UserMissingPermissions(missing) => FailureResponse::Reply(format!(
            "You need the **{}** permission(s) to use this command.",
            format_permission_list(&missing)
        )),
        CommandFailure::InvalidInput => FailureResponse::Reply(format!(
            "Invalid input. Please use `{}help` for instructions on how to use this command.",
            prefix
        )),
        CommandFailure::GuildOnlyInDirectMessage => FailureResponse::DirectMessage(
            "This command cannot be used in direct messages.".to_string(),
        ),
        CommandFailure::Forbidden(message) => FailureResponse::LogWarning(message),
        CommandFailure::CheckFailed(message) => FailureResponse::Reply(message),
        CommandFailure::Unclassified { summary, trace } => {
            FailureResponse::Report { summary, trace }
        }
    }
}

/// Whole seconds to wait, rounded up (2.3s becomes 3).
pub fn retry_seconds(retry_after: Duration) -> u64 {
    retry_after.as_secs_f64().ceil() as u64
}

/// Turns a permission slug such as `manage_guild` into `Manage Server`.
pub fn humanize_permission(slug: &str) -> String {
    let spaced = slug.replace('_', " ").replace("guild", "server");
    title_case(&spaced)
}

// Every alphabetic run starts uppercase, the rest of it lowercase.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_is_letter = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if previous_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(ch);
            previous_is_letter = false;
        }
    }
    out
}

/// Human readable permission list.
///
/// One or two entries are joined with " and ", three or more become
/// "A, B, and C".
pub fn format_permission_list<S: AsRef<str>>(slugs: &[S]) -> String {
    let names: Vec<String> = slugs
        .iter()
        .map(|slug| humanize_permission(slug.as_ref()))
        .collect();

    match names.split_last() {
        Some((last, rest)) if rest.len() >= 2 => format!("{}, and {}", rest.join(", "), last),
        _ => names.join(" and "),
    }
}

/// Renders an error the way we show it in the report channel: the debug
/// form of the error followed by every `source()` it wraps.
pub fn render_trace(error: &(dyn StdError + 'static)) -> String {
    let mut trace = format!("{:?}", error);
    let mut source = error.source();
    if source.is_some() {
        trace.push_str("\n\nCaused by:");
    }
    let mut depth = 0;
    while let Some(cause) = source {
        let _ = write!(trace, "\n    {}: {}", depth, cause);
        depth += 1;
        source = cause.source();
    }
    trace
}

/// Builds the report channel message, truncating the trace so the whole
/// thing stays within `MESSAGE_LIMIT`.
pub fn format_report(owner_mention: Option<&str>, trace: &str) -> String {
    let header = match owner_mention {
        Some(mention) => format!("{} An exception has been logged:\n```\n", mention),
        None => "An exception has been logged:\n```\n".to_string(),
    };
    let footer = "\n```";

    let budget = MESSAGE_LIMIT
        .saturating_sub(header.chars().count() + footer.chars().count());
    let body = truncate_chars(trace, budget);

    format!("{}{}{}", header, body, footer)
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
