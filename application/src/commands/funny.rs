use async_trait::async_trait;
use domain::command::{
    handler_fn, Arguments, Arity, Category, Coercer, CommandDescriptor, CommandError,
    CommandHandler, ErrorKind, ErrorTable, Invocation,
};
use domain::ports::joke::JokeSource;
use domain::ports::UpstreamError;
use domain_shared::reply::Reply;
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;
use tracing::{instrument, warn};

const POOP_LIMIT: i64 = 198;

const EIGHT_BALL_ANSWERS: [&str; 20] = [
    "It is certain.",
    "It is decidedly so.",
    "Without a doubt.",
    "Yes - definitely.",
    "You may rely on it.",
    "As I see it, yes.",
    "Most likely.",
    "Outlook good.",
    "Yes.",
    "Signs point to yes.",
    "Reply hazy, try again.",
    "Ask again later.",
    "Better not tell you now.",
    "Cannot predict now.",
    "Concentrate and ask again.",
    "Don't count on it.",
    "My reply is no.",
    "My sources say no.",
    "Outlook not so good.",
    "Very doubtful.",
];

fn eight_ball_mark(index: usize) -> &'static str {
    match index {
        0..=9 => "✅",
        10..=14 => "🔅",
        _ => "❌",
    }
}

fn eight_ball(_: &Invocation<'_>, arguments: Arguments) -> Result<Reply, CommandError> {
    let question = arguments.texts_from(0)?.join(" ");
    let index = rand::thread_rng().gen_range(0..EIGHT_BALL_ANSWERS.len());

    Ok(Reply::text(format!(
        "`{question}`: {} {}",
        EIGHT_BALL_ANSWERS[index],
        eight_ball_mark(index)
    )))
}

fn poop(_: &Invocation<'_>, arguments: Arguments) -> Result<Reply, CommandError> {
    let count = arguments.optional_integer(0).unwrap_or(1).min(POOP_LIMIT);

    Ok(Reply::text("💩".repeat(count as usize)))
}

/// Asks each joke source in random order until one answers.
pub struct JokeHandler {
    sources: Vec<Arc<dyn JokeSource + Send + Sync>>,
}

impl JokeHandler {
    #[instrument(level = "trace", skip_all)]
    pub fn new(sources: Vec<Arc<dyn JokeSource + Send + Sync>>) -> Self {
        Self { sources }
    }
}

#[async_trait]
impl CommandHandler for JokeHandler {
    async fn handle(
        &self,
        _invocation: &Invocation<'_>,
        _arguments: Arguments,
    ) -> Result<Reply, CommandError> {
        let mut order: Vec<_> = self.sources.iter().collect();
        order.shuffle(&mut rand::thread_rng());

        let mut failures = Vec::new();
        for source in order {
            match source.fetch_joke().await {
                Ok(joke) => return Ok(Reply::text(joke.to_string())),
                Err(error) => {
                    warn!(error = %error, "Joke source failed, trying the next one");
                    failures.push(error.to_string());
                }
            }
        }

        Err(CommandError::Upstream(UpstreamError::Unreachable {
            service: "joke APIs".to_string(),
            reason: failures.join("; "),
        }))
    }
}

pub fn descriptors(joke_sources: Vec<Arc<dyn JokeSource + Send + Sync>>) -> Vec<CommandDescriptor> {
    let no_joke = "Can't retrieve a joke right now, try again later.";

    vec![
        CommandDescriptor::new(
            "8ball",
            handler_fn(eight_ball),
            ErrorTable::new()
                .usage("`{command}` needs a phrase on which to apply its fortune-telling powers."),
        )
        .aliases(["eightball", "8b"])
        .help("Answers a yes or no question.")
        .arity(Arity::AtLeast(1))
        .parameter("question", "Your question", Coercer::Text),
        CommandDescriptor::new(
            "poop",
            handler_fn(poop),
            ErrorTable::new().usage("`{command}` takes no arguments or a positive number."),
        )
        .help("Poops, up to 198 times.")
        .arity(Arity::AtMost(1))
        .parameter("count", "How many", Coercer::PositiveInteger),
        CommandDescriptor::new(
            "joke",
            Arc::new(JokeHandler::new(joke_sources)),
            ErrorTable::new()
                .usage("`{command}` takes no arguments.")
                .on(ErrorKind::UpstreamUnavailable, no_joke)
                .on(ErrorKind::UpstreamRejected, no_joke)
                .on(ErrorKind::MalformedResponse, no_joke),
        )
        .help("Tells a joke fetched from the internet."),
    ]
    .into_iter()
    .map(|descriptor| descriptor.category(Category::Funny))
    .collect()
}
