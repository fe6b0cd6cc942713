use domain::command::{
    handler_fn, Arguments, Arity, Category, Coercer, CommandDescriptor, CommandError,
    CommandHandler, DuplicateCommandError, ErrorKind, ErrorTable, Invocation,
};
use domain::poll::{PollStatus, PollStore, Tally, VoteOutcome};
use domain_shared::reply::Reply;
use std::sync::Arc;

fn quoted<'a>(items: impl IntoIterator<Item = &'a str>) -> String {
    items
        .into_iter()
        .map(|item| format!("`{item}`"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

fn create(
    polls: &PollStore,
    invocation: &Invocation<'_>,
    arguments: Arguments,
) -> Result<Reply, CommandError> {
    let name = arguments.text(0)?;
    let options = arguments.texts_from(1)?;

    polls.create(
        invocation.channel,
        name,
        &options,
        invocation.author,
        invocation.received_at,
    )?;

    Ok(Reply::text(format!(
        "{} created poll `{name}` with {}: {}",
        invocation.author.display_name,
        plural(options.len(), "option"),
        quoted(options.iter().copied())
    )))
}

fn vote(
    polls: &PollStore,
    invocation: &Invocation<'_>,
    arguments: Arguments,
) -> Result<Reply, CommandError> {
    let (name, option) = (arguments.text(0)?, arguments.text(1)?);
    let voter = &invocation.author.display_name;

    let outcome = polls.vote(invocation.channel, name, option, invocation.author.id)?;

    Ok(Reply::text(match outcome {
        VoteOutcome::Cast => format!("Poll `{name}`: `{voter}` voted on option `{option}`."),
        VoteOutcome::Changed { previous } => format!(
            "Poll `{name}`: `{voter}` changed vote from option `{previous}` to option `{option}`."
        ),
        VoteOutcome::Unchanged => {
            format!("Poll `{name}`: `{voter}` already voted on option `{option}`.")
        }
    }))
}

fn counts(tally: &Tally) -> String {
    tally
        .counts
        .iter()
        .map(|(option, count)| format!("`{option}`: {}", plural(*count, "vote")))
        .collect::<Vec<_>>()
        .join("\n")
}

fn status(
    polls: &PollStore,
    invocation: &Invocation<'_>,
    arguments: Arguments,
) -> Result<Reply, CommandError> {
    let status = polls.status(invocation.channel, arguments.optional_text(0))?;

    Ok(Reply::text(match status {
        PollStatus::Overview(overview) => {
            let lines = overview
                .iter()
                .map(|(name, votes)| format!("`{name}`: {}", plural(*votes, "vote")))
                .collect::<Vec<_>>()
                .join("\n");
            format!("Ongoing polls on this channel:\n{lines}")
        }
        PollStatus::Single(tally) => format!(
            "Poll `{}` by {}:\n{}",
            tally.name,
            tally.creator,
            counts(&tally)
        ),
    }))
}

fn end(
    polls: &PollStore,
    invocation: &Invocation<'_>,
    arguments: Arguments,
) -> Result<Reply, CommandError> {
    let name = arguments.text(0)?;
    let tally = polls.end(
        invocation.channel,
        name,
        invocation.author.id,
        invocation.received_at,
    )?;

    let verdict = match tally.leaders().as_slice() {
        [] => "Nobody voted.".to_string(),
        [winner] => format!("The winner is `{winner}`!"),
        leaders => format!("It's a tie between {}.", quoted(leaders.iter().copied())),
    };

    Ok(Reply::text(format!(
        "Poll `{name}` has ended with {}.\n{}\n{verdict}",
        plural(tally.total(), "vote"),
        counts(&tally)
    )))
}

type PollFn = fn(&PollStore, &Invocation<'_>, Arguments) -> Result<Reply, CommandError>;

fn bind(polls: &Arc<PollStore>, operation: PollFn) -> Arc<dyn CommandHandler> {
    let polls = polls.clone();
    handler_fn(move |invocation, arguments| operation(&polls, invocation, arguments))
}

pub fn descriptor(polls: Arc<PollStore>) -> Result<CommandDescriptor, DuplicateCommandError> {
    let errors = |usage: &str| {
        ErrorTable::new()
            .usage(usage)
            .on(ErrorKind::Poll, "{detail}")
    };
    let create_usage = "`{command}` takes a poll name followed by at least 2 options.";

    CommandDescriptor::new("poll", bind(&polls, create), errors(create_usage))
        .category(Category::Poll)
        .help(
            "Creates a poll on this channel.\n\
             Names and options with spaces must be put in quotes, e.g. `\"ice cream\"`.",
        )
        .arity(Arity::AtLeast(3))
        .parameter("name", "Name of the poll", Coercer::Text)
        .parameter("options", "Options separated by spaces", Coercer::Text)
        .subcommand(
            CommandDescriptor::new("create", bind(&polls, create), errors(create_usage))
                .aliases(["c", "new"])
                .help("Creates a poll on this channel.")
                .arity(Arity::AtLeast(3))
                .parameter("name", "Name of the poll", Coercer::Text)
                .parameter("options", "Options separated by spaces", Coercer::Text),
        )?
        .subcommand(
            CommandDescriptor::new(
                "vote",
                bind(&polls, vote),
                errors("`{command}` takes the name of a poll and one of its options."),
            )
            .aliases(["v", "-v", "vt"])
            .help("Votes on an option of a poll, or changes your vote.")
            .arity(Arity::Exact(2))
            .parameter("poll", "Name of the poll", Coercer::Text)
            .parameter("option", "Option to vote for", Coercer::Text),
        )?
        .subcommand(
            CommandDescriptor::new(
                "status",
                bind(&polls, status),
                errors("`{command}` takes no arguments or the name of a poll."),
            )
            .aliases(["s", "-s", "stat"])
            .help("Lists the polls on this channel, or the votes of one poll.")
            .arity(Arity::AtMost(1))
            .parameter("poll", "Name of the poll", Coercer::Text),
        )?
        .subcommand(
            CommandDescriptor::new(
                "end",
                bind(&polls, end),
                errors("`{command}` takes the name of a poll."),
            )
            .aliases(["e", "-e"])
            .help("Ends a poll and shows its results.")
            .arity(Arity::Exact(1))
            .parameter("poll", "Name of the poll", Coercer::Text),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{author, dispatcher_with, reply_as, text_reply};
    use crate::dispatcher::Dispatcher;

    fn dispatcher() -> Dispatcher {
        dispatcher_with(vec![descriptor(Arc::new(PollStore::new())).unwrap()])
    }

    async fn as_bob(dispatcher: &Dispatcher, content: &str) -> String {
        reply_as(dispatcher, author(2, "bob"), content)
            .await
            .as_text()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn create_vote_and_end() {
        let dispatcher = dispatcher();

        assert_eq!(
            text_reply(&dispatcher, r#"!poll lunch pizza "fried rice""#).await,
            "alice created poll `lunch` with 2 options: `pizza`, `fried rice`"
        );
        assert_eq!(
            text_reply(&dispatcher, "!poll v lunch pizza").await,
            "Poll `lunch`: `alice` voted on option `pizza`."
        );
        assert_eq!(
            as_bob(&dispatcher, r#"!poll vote lunch "fried rice""#).await,
            "Poll `lunch`: `bob` voted on option `fried rice`."
        );
        assert_eq!(
            as_bob(&dispatcher, "!poll vote lunch pizza").await,
            "Poll `lunch`: `bob` changed vote from option `fried rice` to option `pizza`."
        );
        assert_eq!(
            as_bob(&dispatcher, "!poll vote lunch pizza").await,
            "Poll `lunch`: `bob` already voted on option `pizza`."
        );
        assert_eq!(
            text_reply(&dispatcher, "!poll end lunch").await,
            "Poll `lunch` has ended with 2 votes.\n`pizza`: 2 votes\n`fried rice`: 0 votes\nThe winner is `pizza`!"
        );
        assert_eq!(
            text_reply(&dispatcher, "!poll status").await,
            "There are no ongoing polls on this channel."
        );
    }

    #[tokio::test]
    async fn status_lists_and_details_polls() {
        let dispatcher = dispatcher();
        text_reply(&dispatcher, "!poll create lunch pizza sushi").await;
        text_reply(&dispatcher, "!poll c dinner soup salad").await;
        as_bob(&dispatcher, "!poll vote lunch sushi").await;

        assert_eq!(
            text_reply(&dispatcher, "!poll s").await,
            "Ongoing polls on this channel:\n`dinner`: 0 votes\n`lunch`: 1 vote"
        );
        assert_eq!(
            text_reply(&dispatcher, "!poll stat lunch").await,
            "Poll `lunch` by alice:\n`pizza`: 0 votes\n`sushi`: 1 vote"
        );
    }

    #[tokio::test]
    async fn ending_reports_ties_and_empty_polls() {
        let dispatcher = dispatcher();
        text_reply(&dispatcher, "!poll a x y").await;
        text_reply(&dispatcher, "!poll vote a x").await;
        as_bob(&dispatcher, "!poll vote a y").await;
        text_reply(&dispatcher, "!poll b x y").await;

        assert!(text_reply(&dispatcher, "!poll end a")
            .await
            .ends_with("It's a tie between `x`, `y`."));
        assert!(text_reply(&dispatcher, "!poll -e b")
            .await
            .ends_with("Nobody voted."));
    }

    #[tokio::test]
    async fn only_creator_ends_a_fresh_poll() {
        let dispatcher = dispatcher();
        text_reply(&dispatcher, "!poll lunch pizza sushi").await;

        let reply = as_bob(&dispatcher, "!poll end lunch").await;

        assert!(
            reply.starts_with("Only alice can end poll `lunch` during the next "),
            "{reply}"
        );
    }

    #[tokio::test]
    async fn poll_errors_are_shown_verbatim() {
        let dispatcher = dispatcher();
        text_reply(&dispatcher, "!poll lunch pizza sushi").await;

        assert_eq!(
            text_reply(&dispatcher, "!poll lunch a b").await,
            "A poll is already ongoing with the same name having the following options: `pizza`, `sushi`."
        );
        assert_eq!(
            text_reply(&dispatcher, "!poll vote lunch tacos").await,
            "No option `tacos` exists on poll `lunch`."
        );
        assert_eq!(
            text_reply(&dispatcher, "!poll vote dinner soup").await,
            "No poll named `dinner` exists on this channel."
        );
        assert_eq!(
            text_reply(&dispatcher, "!poll dinner soup soup").await,
            "Poll options must be different from each other."
        );
    }

    #[tokio::test]
    async fn malformed_poll_commands_show_usage() {
        let dispatcher = dispatcher();
        assert_eq!(
            text_reply(&dispatcher, "!poll lunch pizza").await,
            "`!poll` takes a poll name followed by at least 2 options.\nUsage: `!poll <name> <options>...`"
        );
        assert_eq!(
            text_reply(&dispatcher, "!poll vote lunch").await,
            "`!poll vote` takes the name of a poll and one of its options.\nUsage: `!poll vote <poll> <option>`"
        );
    }
}
