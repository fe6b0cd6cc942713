use domain::command::{handler_fn, Category, CommandDescriptor, ErrorTable};
use domain_shared::reply::Reply;

const USAGE: &str = "`{command}` takes no arguments.";

fn emote(name: &str, aliases: &[&str], help: &str, art: &'static str) -> CommandDescriptor {
    CommandDescriptor::new(
        name,
        handler_fn(move |_, _| Ok(Reply::text(art))),
        ErrorTable::new().usage(USAGE),
    )
    .aliases(aliases.iter().copied())
    .category(Category::Ascii)
    .help(help)
}

pub fn descriptors() -> Vec<CommandDescriptor> {
    vec![
        emote(
            "tableflip",
            &["tf", "flip"],
            "Flips a table in rage.",
            "(╯°□°）╯︵ ┻━┻",
        ),
        emote(
            "tableunflip",
            &["tuf", "unflip"],
            "Puts the table back.",
            "┬─┬ ノ( ゜-゜ノ)",
        ),
        emote("shrug", &[], "Shrugs.", r"¯\\\_(ツ)\_/¯"),
    ]
}
