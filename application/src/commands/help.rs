use domain::command::{
    handler_fn, help, Arguments, Arity, Category, Coercer, CommandDescriptor, CommandError,
    ErrorTable, Invocation,
};
use domain_shared::reply::Reply;

fn show_help(invocation: &Invocation<'_>, arguments: Arguments) -> Result<Reply, CommandError> {
    let query = arguments.texts_from(0)?;

    Ok(help::render(invocation.registry, invocation.prefix, &query))
}

pub fn descriptor() -> CommandDescriptor {
    CommandDescriptor::new(
        "help",
        handler_fn(show_help),
        ErrorTable::new().usage("`{command}` takes an optional command and subcommand name."),
    )
    .aliases(["h"])
    .category(Category::Help)
    .help("Shows every command, or details about one of them.")
    .arity(Arity::AtMost(2))
    .parameter("command", "Command to describe", Coercer::Text)
    .parameter("subcommand", "Subcommand to describe", Coercer::Text)
}
