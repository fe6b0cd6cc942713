use async_trait::async_trait;
use chrono::Duration;
use domain::command::{
    Arguments, Arity, Category, Coercer, CommandDescriptor, CommandError, CommandHandler,
    DuplicateCommandError, ErrorKind, ErrorTable, Invocation,
};
use domain::ports::comic::{Comic, ComicPort};
use domain::ports::UpstreamError;
use domain_shared::reply::{Embed, Reply};
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Never published, the site answers it with a 404.
const MISSING_COMIC: u32 = 404;
const RANDOM_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, Copy)]
enum Lookup {
    Random,
    Latest,
    Id,
}

pub struct XkcdHandler {
    comics: Arc<dyn ComicPort + Send + Sync>,
    lookup: Lookup,
    embed_colour: u32,
}

impl XkcdHandler {
    async fn random(&self) -> Result<Comic, CommandError> {
        let latest = self.comics.latest().await?;
        if latest.number <= 1 {
            return Ok(latest);
        }

        for _ in 0..RANDOM_ATTEMPTS {
            let number = loop {
                let number = rand::thread_rng().gen_range(1..=latest.number);
                if number != MISSING_COMIC {
                    break number;
                }
            };
            if number == latest.number {
                return Ok(latest);
            }
            match self.comics.by_id(number).await {
                Err(error) if error.is_not_found() => {
                    debug!(number, "Randomly picked comic does not exist");
                }
                result => return Ok(result?),
            }
        }
        Err(CommandError::NotFound("a random xkcd comic".to_string()))
    }

    async fn by_id(&self, id: i64) -> Result<Comic, CommandError> {
        let not_found = || CommandError::NotFound(format!("xkcd #{id}"));
        let id = u32::try_from(id).map_err(|_| not_found())?;

        self.comics.by_id(id).await.map_err(|error| {
            if error.is_not_found() {
                not_found()
            } else {
                error.into()
            }
        })
    }
}

#[async_trait]
impl CommandHandler for XkcdHandler {
    #[instrument(level = "debug", skip(self, _invocation, arguments), fields(lookup = ?self.lookup))]
    async fn handle(
        &self,
        _invocation: &Invocation<'_>,
        arguments: Arguments,
    ) -> Result<Reply, CommandError> {
        let comic = match self.lookup {
            Lookup::Random => self.random().await?,
            Lookup::Latest => self.comics.latest().await?,
            Lookup::Id => self.by_id(arguments.integer(0)?).await?,
        };

        Ok(comic_embed(&comic, self.embed_colour).into())
    }
}

fn comic_embed(comic: &Comic, colour: u32) -> Embed {
    Embed::default()
        .author(
            format!("xkcd #{}: {}", comic.number, comic.title),
            Some(format!("https://xkcd.com/{}", comic.number)),
        )
        .image(&comic.image_url)
        .footer(&comic.alt)
        .colour(colour)
}

pub fn descriptor(
    comics: Arc<dyn ComicPort + Send + Sync>,
    embed_colour: u32,
    cooldown: Duration,
) -> Result<CommandDescriptor, DuplicateCommandError> {
    let handler = |lookup| {
        Arc::new(XkcdHandler {
            comics: comics.clone(),
            lookup,
            embed_colour,
        })
    };
    let errors = ErrorTable::new()
        .usage("`{command}` takes no arguments or one of the predefined ones (use `{prefix}help xkcd` for more info).")
        .on(
            ErrorKind::UpstreamUnavailable,
            "Can't reach xkcd.com right now, try again later.",
        )
        .on(
            ErrorKind::MalformedResponse,
            "Got a bad response from xkcd.com, `{command}` is temporarily broken.",
        )
        .on(
            ErrorKind::NotFound,
            "Couldn't find a comic on xkcd.com this time, try again.",
        );

    CommandDescriptor::new("xkcd", handler(Lookup::Random), errors)
        .category(Category::Xkcd)
        .help("Shows a random xkcd comic.")
        .circuit_breaker(cooldown)
        .subcommand(
            CommandDescriptor::new(
                "random",
                handler(Lookup::Random),
                ErrorTable::new().usage("`{command}` takes no arguments."),
            )
            .aliases(["r", "-r", "rand"])
            .help("Shows a random xkcd comic."),
        )?
        .subcommand(
            CommandDescriptor::new(
                "latest",
                handler(Lookup::Latest),
                ErrorTable::new().usage("`{command}` takes no arguments."),
            )
            .aliases(["l", "-l", "last"])
            .help("Shows the latest xkcd comic."),
        )?
        .subcommand(
            CommandDescriptor::new(
                "id",
                handler(Lookup::Id),
                ErrorTable::new()
                    .usage("`{command}` takes exactly 1 positive number.")
                    .on(
                        ErrorKind::NotFound,
                        "An xkcd comic with the given `id` was not found.",
                    ),
            )
            .aliases(["i", "-i", "number"])
            .help("Shows the xkcd comic with the given number.")
            .arity(Arity::Exact(1))
            .parameter("id", "Comic number", Coercer::PositiveInteger),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{author, dispatcher_with, reply_as, text_reply};
    use domain::ports::comic::MockComicPort;
    use mockall::predicate::eq;

    fn comic(number: u32) -> Comic {
        Comic {
            number,
            title: "Exploits of a Mom".into(),
            image_url: "https://imgs.xkcd.com/comics/exploits_of_a_mom.png".into(),
            alt: "Her daughter is named Help I'm trapped in a driver's license factory.".into(),
        }
    }

    fn dispatcher(comics: MockComicPort) -> crate::dispatcher::Dispatcher {
        dispatcher_with(vec![
            descriptor(Arc::new(comics), 0xffffff, Duration::minutes(5)).unwrap()
        ])
    }

    #[tokio::test]
    async fn id_renders_comic_embed() {
        let mut comics = MockComicPort::new();
        comics
            .expect_by_id()
            .with(eq(327))
            .times(1)
            .returning(|id| Ok(comic(id)));

        let reply = reply_as(&dispatcher(comics), author(1, "alice"), "!xkcd id 327").await;

        let Reply::Embed(embed) = reply else {
            panic!("expected an embed, got {reply:?}");
        };
        let author = embed.author.unwrap();
        assert_eq!(author.name, "xkcd #327: Exploits of a Mom");
        assert_eq!(author.url.as_deref(), Some("https://xkcd.com/327"));
        assert_eq!(
            embed.image.as_deref(),
            Some("https://imgs.xkcd.com/comics/exploits_of_a_mom.png")
        );
        assert!(embed.footer.unwrap().text.starts_with("Her daughter"));
    }

    #[tokio::test]
    async fn missing_id_is_not_found_not_unreachable() {
        let mut comics = MockComicPort::new();
        comics.expect_by_id().returning(|_| {
            Err(UpstreamError::Status {
                service: "xkcd.com".into(),
                status: 404,
            })
        });
        comics.expect_latest().returning(|| Ok(comic(1)));
        let dispatcher = dispatcher(comics);

        assert_eq!(
            text_reply(&dispatcher, "!xkcd -i 404").await,
            "An xkcd comic with the given `id` was not found."
        );
        // a 404 must not disable the command
        assert!(matches!(
            reply_as(&dispatcher, author(1, "alice"), "!xkcd latest").await,
            Reply::Embed(_)
        ));
    }

    #[tokio::test]
    async fn unreachable_site_disables_command() {
        let mut comics = MockComicPort::new();
        comics.expect_latest().times(1).returning(|| {
            Err(UpstreamError::Timeout {
                service: "xkcd.com".into(),
            })
        });
        let dispatcher = dispatcher(comics);

        assert_eq!(
            text_reply(&dispatcher, "!xkcd").await,
            "Can't reach xkcd.com right now, try again later."
        );
        assert!(text_reply(&dispatcher, "!xkcd latest")
            .await
            .starts_with("`!xkcd latest` is temporarily disabled"));
    }

    #[tokio::test]
    async fn schema_drift_breaks_command() {
        let mut comics = MockComicPort::new();
        comics.expect_latest().times(1).returning(|| {
            Err(UpstreamError::Malformed {
                service: "xkcd.com".into(),
                detail: "missing field `num`".into(),
            })
        });
        let dispatcher = dispatcher(comics);

        assert_eq!(
            text_reply(&dispatcher, "!xkcd l").await,
            "Got a bad response from xkcd.com, `!xkcd latest` is temporarily broken."
        );
        assert!(text_reply(&dispatcher, "!xkcd")
            .await
            .contains("disabled until an administrator resets it"));
    }

    #[tokio::test]
    async fn random_picks_within_published_range() {
        let mut comics = MockComicPort::new();
        comics.expect_latest().returning(|| Ok(comic(3)));
        comics
            .expect_by_id()
            .withf(|id| (1..3).contains(id))
            .returning(|id| Ok(comic(id)));
        let dispatcher = dispatcher(comics);

        for _ in 0..10 {
            let reply = reply_as(&dispatcher, author(1, "alice"), "!xkcd random").await;
            assert!(matches!(reply, Reply::Embed(_)), "{reply:?}");
        }
    }

    #[tokio::test]
    async fn non_numeric_id_shows_usage() {
        let dispatcher = dispatcher(MockComicPort::new());
        assert_eq!(
            text_reply(&dispatcher, "!xkcd id abc").await,
            "`!xkcd id` takes exactly 1 positive number.\nUsage: `!xkcd id <id>`"
        );
    }

    #[tokio::test]
    async fn unpublished_random_pick_is_retried_without_disabling() {
        let mut comics = MockComicPort::new();
        comics.expect_latest().returning(|| Ok(comic(3)));
        comics.expect_by_id().returning(|_| {
            Err(UpstreamError::Status {
                service: "xkcd.com".into(),
                status: 404,
            })
        });
        let dispatcher = dispatcher(comics);

        // picks of the latest comic succeed, the others keep missing
        for _ in 0..10 {
            match reply_as(&dispatcher, author(1, "alice"), "!xkcd").await {
                Reply::Embed(_) => {}
                Reply::Text(text) => assert_eq!(
                    text,
                    "Couldn't find a comic on xkcd.com this time, try again."
                ),
                other => panic!("unexpected reply {other:?}"),
            }
        }
        assert!(matches!(
            reply_as(&dispatcher, author(1, "alice"), "!xkcd latest").await,
            Reply::Embed(_)
        ));
    }
}
