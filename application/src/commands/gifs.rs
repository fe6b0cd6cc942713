use domain::command::{handler_fn, Category, CommandDescriptor, ErrorTable};
use domain_shared::reply::Embed;

struct Gif {
    name: &'static str,
    aliases: &'static [&'static str],
    help: &'static str,
    url: &'static str,
    footer: &'static str,
}

const GIFS: [Gif; 3] = [
    Gif {
        name: "rickroll",
        aliases: &["rr"],
        help: "Never gonna give you up.",
        url: "https://media.giphy.com/media/LXONhtCmN32YU/giphy.gif",
        footer: "You've been rick rolled",
    },
    Gif {
        name: "ohgodno",
        aliases: &["godno"],
        help: "For when things go terribly wrong.",
        url: "https://media.giphy.com/media/12XMGIWtrHBl5e/giphy.gif",
        footer: "Noooooooooooooooooooooooooo",
    },
    Gif {
        name: "rekt",
        aliases: &[],
        help: "Get rekt.",
        url: "https://media.giphy.com/media/11yKQ9fN3c06fC/giphy.gif",
        footer: "rekt",
    },
];

pub fn descriptors(embed_colour: u32) -> Vec<CommandDescriptor> {
    GIFS.iter()
        .map(|gif| {
            let (url, footer) = (gif.url, gif.footer);
            CommandDescriptor::new(
                gif.name,
                handler_fn(move |_, _| {
                    Ok(Embed::default()
                        .colour(embed_colour)
                        .image(url)
                        .footer(footer)
                        .into())
                }),
                ErrorTable::new().usage("`{command}` takes no arguments."),
            )
            .aliases(gif.aliases.iter().copied())
            .help(gif.help)
            .category(Category::Gifs)
        })
        .collect()
}
