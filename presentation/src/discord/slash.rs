//! Slash command definitions generated from the command catalogue, and the
//! way back from a received interaction to an [`InboundInteraction`].

use application_ports::dispatch::{
    CommandSummary, InboundInteraction, OptionValue, ParameterKind, ParameterSummary,
};
use domain_shared::discord::{Author, ChannelId, UserId};
use poise::serenity_prelude::{
    CommandInteraction, CommandOptionType, CreateCommand, CreateCommandOption, ResolvedOption,
    ResolvedValue,
};
use tracing::instrument;

#[instrument(level = "trace", skip_all)]
pub fn create_commands(catalogue: Vec<CommandSummary>) -> Vec<CreateCommand> {
    catalogue.into_iter().map(create_command).collect()
}

fn create_command(summary: CommandSummary) -> CreateCommand {
    let command = CreateCommand::new(summary.name).description(summary.description);

    if summary.subcommands.is_empty() {
        summary
            .parameters
            .into_iter()
            .fold(command, |command, parameter| {
                command.add_option(create_option(parameter))
            })
    } else {
        summary
            .subcommands
            .into_iter()
            .fold(command, |command, subcommand| {
                command.add_option(create_subcommand(subcommand))
            })
    }
}

fn create_subcommand(summary: CommandSummary) -> CreateCommandOption {
    let subcommand = CreateCommandOption::new(
        CommandOptionType::SubCommand,
        summary.name,
        summary.description,
    );

    summary
        .parameters
        .into_iter()
        .fold(subcommand, |subcommand, parameter| {
            subcommand.add_sub_option(create_option(parameter))
        })
}

fn create_option(parameter: ParameterSummary) -> CreateCommandOption {
    let option_type = match parameter.kind {
        ParameterKind::Text | ParameterKind::Choice(_) => CommandOptionType::String,
        ParameterKind::Integer | ParameterKind::PositiveInteger => CommandOptionType::Integer,
        ParameterKind::Number => CommandOptionType::Number,
        ParameterKind::Boolean => CommandOptionType::Boolean,
    };
    let option = CreateCommandOption::new(option_type, parameter.name, parameter.description)
        .required(parameter.required);

    match parameter.kind {
        ParameterKind::PositiveInteger => option.min_int_value(1),
        ParameterKind::Choice(choices) => choices
            .into_iter()
            .fold(option, |option, choice| {
                option.add_string_choice(choice.clone(), choice)
            }),
        _ => option,
    }
}

fn option_value(option: ResolvedOption<'_>) -> Option<(String, OptionValue)> {
    let value = match option.value {
        ResolvedValue::String(text) => OptionValue::Text(text.to_string()),
        ResolvedValue::Integer(integer) => OptionValue::Integer(integer),
        ResolvedValue::Number(number) => OptionValue::Number(number),
        ResolvedValue::Boolean(boolean) => OptionValue::Boolean(boolean),
        _ => return None,
    };
    Some((option.name.to_string(), value))
}

#[instrument(level = "trace", skip_all)]
pub fn inbound_interaction(interaction: &CommandInteraction) -> InboundInteraction {
    let mut path = vec![interaction.data.name.clone()];
    let mut options = Vec::new();

    for option in interaction.data.options() {
        match option.value {
            ResolvedValue::SubCommand(sub_options) => {
                path.push(option.name.to_string());
                options.extend(sub_options.into_iter().filter_map(option_value));
            }
            _ => options.extend(option_value(option)),
        }
    }

    InboundInteraction {
        path,
        options,
        channel: ChannelId(interaction.channel_id.get()),
        author: Author {
            id: UserId(interaction.user.id.get()),
            display_name: interaction.user.display_name().to_string(),
        },
    }
}
