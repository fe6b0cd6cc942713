use chrono::Duration;
use domain::command::{
    handler_fn, Arguments, Category, CommandDescriptor, CommandError, ErrorTable, Invocation,
};
use domain::ports::host::{HostInfo, HostInfoPort};
use domain_shared::reply::{Embed, Reply};
use rand::seq::SliceRandom;
use std::sync::Arc;

const GREETINGS: [&str; 7] = [
    "Hi",
    "Hello",
    "Hey",
    "Sup",
    "What's up",
    "Greetings",
    "Howdy",
];
const WAVES: [&str; 6] = ["👋", "🤙", "🖖", "🤟", "👊", "🙌"];

fn ping(_: &Invocation<'_>, _: Arguments) -> Result<Reply, CommandError> {
    Ok(Reply::text("pong"))
}

fn hi(invocation: &Invocation<'_>, _: Arguments) -> Result<Reply, CommandError> {
    let mut rng = rand::thread_rng();
    let greeting = GREETINGS.choose(&mut rng).copied().unwrap_or("Hi");
    let wave = WAVES.choose(&mut rng).copied().unwrap_or("👋");

    Ok(Reply::text(format!(
        "{greeting}, {} {wave}",
        invocation.author.display_name
    )))
}

fn info(colour: u32, invocation: &Invocation<'_>) -> Reply {
    Embed::default()
        .title("About me")
        .description("A hobby bot with dice, maths, jokes, comics, game stats and polls.")
        .colour(colour)
        .field("Version", env!("CARGO_PKG_VERSION"), true)
        .field("Framework", "poise + serenity", true)
        .field(
            "Commands",
            invocation.registry.commands().len().to_string(),
            true,
        )
        .footer(format!(
            "Use {}help to see what I can do",
            invocation.prefix
        ))
        .into()
}

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

fn system(colour: u32, host: &HostInfo) -> Reply {
    Embed::default()
        .author("🖥️ Host System Information", None)
        .colour(colour)
        .field("📟 OS", &host.os, false)
        .field(
            "🎛️ CPU",
            format!(
                "{}\n{} cores @ {:.2} GHz",
                host.cpu,
                host.cores,
                host.cpu_mhz as f64 / 1000.0
            ),
            false,
        )
        .field(
            "🧠 RAM",
            format!(
                "{:.2} / {:.2} GiB",
                host.used_memory_bytes as f64 / GIB,
                host.total_memory_bytes as f64 / GIB
            ),
            true,
        )
        .field("🕒 Up time", format_uptime(host.uptime), true)
        .into()
}

fn format_uptime(uptime: Duration) -> String {
    let minutes = uptime.num_minutes().max(0);
    let (days, hours, minutes) = (minutes / 1440, minutes / 60 % 24, minutes % 60);
    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else {
        format!("{hours}h {minutes}m")
    }
}

pub fn descriptors(
    embed_colour: u32,
    host: Arc<dyn HostInfoPort + Send + Sync>,
) -> Vec<CommandDescriptor> {
    let usage = || ErrorTable::new().usage("`{command}` takes no arguments.");

    vec![
        CommandDescriptor::new("ping", handler_fn(ping), usage())
            .help("Answers with pong, to check the bot is alive."),
        CommandDescriptor::new("hi", handler_fn(hi), usage())
            .aliases(["hello"])
            .help("Greets you."),
        CommandDescriptor::new(
            "info",
            handler_fn(move |invocation, _| Ok(info(embed_colour, invocation))),
            usage(),
        )
        .aliases(["information", "about"])
        .help("Shows information about the bot."),
        CommandDescriptor::new(
            "system",
            handler_fn(move |_, _| Ok(system(embed_colour, &host.host_info()))),
            usage(),
        )
        .aliases(["sys"])
        .help("Shows what the bot is running on."),
    ]
    .into_iter()
    .map(|descriptor| descriptor.category(Category::General))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{author, dispatcher_with, reply_as, text_reply};
    use domain::ports::host::MockHostInfoPort;

    fn host() -> HostInfo {
        HostInfo {
            os: "Linux 24.04 Ubuntu".into(),
            cpu: "AMD Ryzen 7 5800X".into(),
            cores: 16,
            cpu_mhz: 3800,
            used_memory_bytes: 4 * 1024 * 1024 * 1024,
            total_memory_bytes: 16 * 1024 * 1024 * 1024,
            uptime: Duration::hours(50) + Duration::minutes(7),
        }
    }

    fn general(colour: u32) -> crate::dispatcher::Dispatcher {
        let mut port = MockHostInfoPort::new();
        port.expect_host_info().returning(host);
        dispatcher_with(descriptors(colour, Arc::new(port)))
    }

    #[tokio::test]
    async fn ping_pongs() {
        let dispatcher = general(0);
        assert_eq!(text_reply(&dispatcher, "!ping").await, "pong");
        assert_eq!(
            text_reply(&dispatcher, "!ping pong").await,
            "`!ping` takes no arguments.\nUsage: `!ping`"
        );
    }

    #[tokio::test]
    async fn hi_greets_by_display_name() {
        let dispatcher = general(0);
        let reply = reply_as(&dispatcher, author(4, "Bob"), "!hello").await;
        let text = reply.as_text().unwrap();
        assert!(text.contains(", Bob "), "{text}");
        assert!(GREETINGS.iter().any(|greeting| text.starts_with(greeting)));
    }

    #[tokio::test]
    async fn info_is_an_embed() {
        let dispatcher = general(0xffffff);
        for content in ["!info", "!information", "!about"] {
            let Reply::Embed(embed) = reply_as(&dispatcher, author(1, "alice"), content).await else {
                panic!("expected an embed for {content}");
            };
            assert_eq!(embed.colour, Some(0xffffff));
            assert_eq!(embed.fields[2].value, "4");
        }
    }

    #[tokio::test]
    async fn system_describes_the_host() {
        let Reply::Embed(embed) = reply_as(&general(0), author(1, "alice"), "!sys").await else {
            panic!("expected an embed");
        };

        assert_eq!(
            embed.author.map(|author| author.name).as_deref(),
            Some("🖥️ Host System Information")
        );
        let values: Vec<_> = embed.fields.iter().map(|field| field.value.as_str()).collect();
        assert_eq!(
            values,
            [
                "Linux 24.04 Ubuntu",
                "AMD Ryzen 7 5800X\n16 cores @ 3.80 GHz",
                "4.00 / 16.00 GiB",
                "2d 2h 7m",
            ]
        );
    }

    #[test]
    fn short_uptime_omits_days() {
        assert_eq!(format_uptime(Duration::minutes(59)), "0h 59m");
    }
}
