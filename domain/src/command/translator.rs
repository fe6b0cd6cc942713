use crate::circuit_breaker::format_cooldown_time;
use crate::command::{CommandError, ErrorKind, Resolved};
use tracing::{error, warn};

/// Turns a failed invocation into the single reply the user gets.
///
/// The leaf command's table is consulted first, then its parent's.
pub fn translate(error: &CommandError, resolved: &Resolved<'_, '_>, prefix: &str) -> String {
    let command = format!("{prefix}{}", resolved.qualified_name());
    let kind = error.kind();

    match error {
        CommandError::Disabled { remaining } => {
            return format!(
                "`{command}` is temporarily disabled, try again in {}.",
                format_cooldown_time(*remaining)
            );
        }
        CommandError::Broken => {
            return format!(
                "`{command}` is temporarily broken and has been disabled until an administrator resets it."
            );
        }
        CommandError::Upstream(upstream) if kind == ErrorKind::MalformedResponse => {
            warn!(
                command = %command,
                service = upstream.service(),
                error = %upstream,
                "Upstream response did not match the expected shape",
            );
        }
        CommandError::Unexpected(detail) => {
            error!(command = %command, detail = %detail, "Unexpected command error");
        }
        _ => {}
    }

    let template = resolved
        .command
        .errors()
        .template(kind)
        .or_else(|| resolved.parent.and_then(|parent| parent.errors().template(kind)));

    let Some(template) = template else {
        warn!(command = %command, kind = ?kind, error = %error, "Unhandled command error");
        return format!("Something went wrong while running `{command}`.");
    };

    let mut message = render(template, error, &command, prefix);
    if matches!(kind, ErrorKind::Arity | ErrorKind::ArgumentType) {
        message.push_str(&format!(
            "\nUsage: `{}`",
            resolved.command.usage(prefix, resolved.parent)
        ));
    }
    message
}

fn render(template: &str, error: &CommandError, command: &str, prefix: &str) -> String {
    let token = match error {
        CommandError::ArgumentType(coercion) => coercion.token.as_str(),
        _ => "",
    };
    let service = match error {
        CommandError::Upstream(upstream) => upstream.service(),
        _ => "",
    };

    template
        .replace("{command}", command)
        .replace("{prefix}", prefix)
        .replace("{token}", token)
        .replace("{service}", service)
        .replace("{detail}", &error.to_string())
}
