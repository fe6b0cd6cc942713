use domain::command::{
    handler_fn, Arguments, Arity, Category, Coercer, CommandDescriptor, CommandError,
    DuplicateCommandError, ErrorKind, ErrorTable, Invocation, Number,
};
use domain_shared::reply::Reply;
use rand::seq::SliceRandom;
use rand::Rng;

#[derive(Debug, Clone, Copy)]
enum Operation {
    Sum,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    fn symbol(self) -> &'static str {
        match self {
            Operation::Sum => "+",
            Operation::Subtract => "-",
            Operation::Multiply => "*",
            Operation::Divide => "/",
        }
    }

    fn apply(self, left: f64, right: f64) -> Result<f64, CommandError> {
        Ok(match self {
            Operation::Sum => left + right,
            Operation::Subtract => left - right,
            Operation::Multiply => left * right,
            Operation::Divide if right == 0.0 => return Err(CommandError::DivisionByZero),
            Operation::Divide => left / right,
        })
    }
}

/// Folds the operation left to right, e.g. `2 + 3 + 4 = **9**`.
fn calculate(operation: Operation, arguments: &Arguments) -> Result<Reply, CommandError> {
    let numbers = arguments.numbers()?;
    let (first, rest) = numbers
        .split_first()
        .ok_or_else(|| CommandError::unexpected("no numbers to calculate with"))?;

    let result = rest
        .iter()
        .try_fold(first.get(), |acc, number| operation.apply(acc, number.get()))?;
    let result = Number::new(result)
        .ok_or_else(|| CommandError::LimitExceeded("The result is too large.".to_string()))?;

    let expression = numbers
        .iter()
        .map(Number::to_string)
        .collect::<Vec<_>>()
        .join(&format!(" {} ", operation.symbol()));

    Ok(Reply::text(format!("{expression} = **{result}**")))
}

fn arithmetic(
    name: &str,
    aliases: &[&str],
    help: &str,
    operation: Operation,
) -> CommandDescriptor {
    let errors = ErrorTable::new()
        .usage("`{command}` takes at least 1 number.")
        .on(ErrorKind::DivisionByZero, "`{command}` can't divide by zero.")
        .on(ErrorKind::LimitExceeded, "`{command}`: {detail}");

    CommandDescriptor::new(
        name,
        handler_fn(move |_, arguments| calculate(operation, &arguments)),
        errors,
    )
    .aliases(aliases.iter().copied())
    .category(Category::Math)
    .help(help)
    .arity(Arity::AtLeast(1))
    .parameter("numbers", "Numbers separated by spaces", Coercer::Number)
}

fn dice(_: &Invocation<'_>, arguments: Arguments) -> Result<Reply, CommandError> {
    let die = arguments
        .optional_die(0)
        .unwrap_or(domain::command::Die::D20);
    let rolled = rand::thread_rng().gen_range(1..=die.sides());

    Ok(Reply::text(format!("Rolled a **{rolled}** with a {die}")))
}

fn random_float(_: &Invocation<'_>, _: Arguments) -> Result<Reply, CommandError> {
    let value: f64 = rand::thread_rng().gen();

    Ok(Reply::text(format!("Result: **{value}**")))
}

fn random_between(_: &Invocation<'_>, arguments: Arguments) -> Result<Reply, CommandError> {
    let (a, b) = (arguments.integer(0)?, arguments.integer(1)?);
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    let value = rand::thread_rng().gen_range(low..=high);

    Ok(Reply::text(format!("Result: **{value}**")))
}

fn random_from(_: &Invocation<'_>, arguments: Arguments) -> Result<Reply, CommandError> {
    let choices = arguments.texts_from(0)?;
    let choice = choices
        .choose(&mut rand::thread_rng())
        .ok_or_else(|| CommandError::unexpected("nothing to choose from"))?;

    Ok(Reply::text(format!("Result: **{choice}**")))
}

pub fn descriptors() -> Result<Vec<CommandDescriptor>, DuplicateCommandError> {
    let random = CommandDescriptor::new(
        "random",
        handler_fn(random_float),
        ErrorTable::new().usage(
            "`{command}` takes no arguments or one of the predefined ones (use `{prefix}help random` for more info).",
        ),
    )
    .aliases(["rand"])
    .category(Category::Math)
    .help("Generates a random number between 0 and 1.")
    .subcommand(
        CommandDescriptor::new(
            "number",
            handler_fn(random_float),
            ErrorTable::new().usage("`{command}` takes no arguments."),
        )
        .aliases(["n", "-n", "float"])
        .help("Generates a random number between 0 and 1."),
    )?
    .subcommand(
        CommandDescriptor::new(
            "between",
            handler_fn(random_between),
            ErrorTable::new().usage("`{command}` takes 2 integers as arguments."),
        )
        .aliases(["b", "-b", "betw"])
        .help("Generates a random integer between two bounds, both included.")
        .arity(Arity::Exact(2))
        .parameter("low", "Lower bound", Coercer::Integer)
        .parameter("high", "Upper bound", Coercer::Integer),
    )?
    .subcommand(
        CommandDescriptor::new(
            "from",
            handler_fn(random_from),
            ErrorTable::new().usage("`{command}` takes at least 1 argument."),
        )
        .aliases(["f", "-f", "fr"])
        .help("Picks one of the given choices at random.")
        .arity(Arity::AtLeast(1))
        .parameter("choices", "Choices separated by spaces", Coercer::Text),
    )?;

    Ok(vec![
        CommandDescriptor::new(
            "dice",
            handler_fn(dice),
            ErrorTable::new().usage(
                "`{command}` takes no arguments or one of the following: d4, d6, d8, d10, d12, d20.",
            ),
        )
        .aliases(["roll"])
        .category(Category::Math)
        .help("Rolls a die, a d20 unless told otherwise.")
        .arity(Arity::AtMost(1))
        .parameter("die", "Die to roll", Coercer::Die),
        random,
        arithmetic("sum", &["add", "+"], "Adds the given numbers.", Operation::Sum),
        arithmetic(
            "subtract",
            &["sub", "-"],
            "Subtracts the following numbers from the first one.",
            Operation::Subtract,
        ),
        arithmetic(
            "multiply",
            &["mul", "*"],
            "Multiplies the given numbers.",
            Operation::Multiply,
        ),
        arithmetic(
            "divide",
            &["div", "/"],
            "Divides the first number by the following ones.",
            Operation::Divide,
        ),
    ])
}
