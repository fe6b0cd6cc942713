//! Help listing rendered from the [`Registry`].

use crate::command::{Category, CommandDescriptor, Registry};
use domain_shared::reply::{Reply, MESSAGE_LIMIT};
use std::collections::BTreeMap;

const FENCE: &str = "```";

/// Help for the whole registry when `query` is empty, otherwise for the
/// command (and optional subcommand) it names.
pub fn render(registry: &Registry, prefix: &str, query: &[&str]) -> Reply {
    match query {
        [] => Reply::Pages(paginate(overview(registry, prefix), MESSAGE_LIMIT)),
        [name, rest @ ..] => {
            let Some(command) = registry.find(name) else {
                return Reply::text(format!("Command `{name}` not found"));
            };
            match rest.first() {
                None => Reply::Pages(paginate(details(command, None, prefix), MESSAGE_LIMIT)),
                Some(sub) => match command.find_subcommand(sub) {
                    Some(subcommand) => Reply::Pages(paginate(
                        details(subcommand, Some(command), prefix),
                        MESSAGE_LIMIT,
                    )),
                    None => Reply::text(format!(
                        "Command `{}` has no subcommand `{sub}`",
                        command.name()
                    )),
                },
            }
        }
    }
}

/// `!poll vote | v <poll> <option>`
pub fn signature(
    command: &CommandDescriptor,
    prefix: &str,
    parent: Option<&CommandDescriptor>,
) -> String {
    let names = command.names().collect::<Vec<_>>().join(" | ");
    let mut signature = match parent {
        Some(parent) => format!("{prefix}{} {names}", parent.name()),
        None => format!("{prefix}{names}"),
    };
    let parameters = command.parameter_signature();
    if !parameters.is_empty() {
        signature.push(' ');
        signature.push_str(&parameters);
    }
    signature
}

fn overview(registry: &Registry, prefix: &str) -> Vec<String> {
    let mut categories: BTreeMap<Category, Vec<&CommandDescriptor>> = BTreeMap::new();
    for command in registry.commands() {
        categories
            .entry(command.category_of())
            .or_default()
            .push(command);
    }

    let mut lines = vec![
        format!("Commands can be called with the prefix `{prefix}` or by mentioning the bot."),
        String::new(),
    ];
    for (category, mut commands) in categories {
        commands.sort_by(|a, b| a.name().cmp(b.name()));
        lines.push(format!("{} **{}**", category.emoji(), category.title()));
        lines.push(FENCE.to_string());
        for command in commands {
            lines.push(entry(command, prefix, None));
            for subcommand in command.subcommands() {
                lines.push(format!("  {}", entry(subcommand, prefix, Some(command))));
            }
        }
        lines.push(FENCE.to_string());
    }
    lines.push(format!(
        "For more info on a command use `{prefix}help [command] [subcommand]`"
    ));
    lines
}

fn entry(command: &CommandDescriptor, prefix: &str, parent: Option<&CommandDescriptor>) -> String {
    let signature = signature(command, prefix, parent);
    match command.summary() {
        "" => signature,
        summary => format!("{signature} - {summary}"),
    }
}

fn details(
    command: &CommandDescriptor,
    parent: Option<&CommandDescriptor>,
    prefix: &str,
) -> Vec<String> {
    let mut lines = vec![format!("**{}**", signature(command, prefix, parent))];
    lines.extend(command.help_text().lines().map(str::to_string));
    if !command.subcommands().is_empty() {
        lines.push(String::new());
        lines.push("Subcommands:".to_string());
        lines.push(FENCE.to_string());
        for subcommand in command.subcommands() {
            lines.push(entry(subcommand, prefix, Some(command)));
        }
        lines.push(FENCE.to_string());
    }
    lines
}

/// Joins lines into pages of at most `limit` bytes.
///
/// A code block interrupted by a page break is closed and reopened, and a
/// single line that cannot fit a page is split.
pub fn paginate<I, S>(lines: I, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    // a reopened page carries "```\n" and may need a closing "\n```"
    let chunk_limit = limit.saturating_sub(2 * (FENCE.len() + 1)).max(1);
    let mut pages = Vec::new();
    let mut page = String::new();
    let mut in_fence = false;

    for line in lines {
        for chunk in split_long(line.as_ref(), chunk_limit) {
            let needed = if page.is_empty() {
                chunk.len()
            } else {
                page.len() + 1 + chunk.len()
            };
            if !page.is_empty() && needed + FENCE.len() + 1 > limit {
                if in_fence {
                    page.push('\n');
                    page.push_str(FENCE);
                }
                pages.push(std::mem::take(&mut page));
                if in_fence {
                    page.push_str(FENCE);
                }
            }

            if !page.is_empty() {
                page.push('\n');
            }
            page.push_str(chunk);
            if chunk.trim_start().starts_with(FENCE) {
                in_fence = !in_fence;
            }
        }
    }

    if !page.is_empty() {
        pages.push(page);
    }
    pages
}

fn split_long(line: &str, width: usize) -> Vec<&str> {
    if line.len() <= width {
        return vec![line];
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < line.len() {
        let mut end = (start + width).min(line.len());
        while !line.is_char_boundary(end) {
            end -= 1;
        }
        if end == start {
            end = start + line[start..].chars().next().map_or(1, char::len_utf8);
        }
        chunks.push(&line[start..end]);
        start = end;
    }
    chunks
}
