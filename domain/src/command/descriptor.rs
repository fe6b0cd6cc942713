use crate::command::registry::{first_collision, DuplicateCommandError};
use crate::command::{Arity, Coercer, CommandHandler, ErrorTable};
use chrono::Duration;
use std::sync::Arc;

/// Help listing section a command belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    General,
    Math,
    Funny,
    Gifs,
    Ascii,
    Xkcd,
    Gaming,
    Poll,
    Help,
}

impl Category {
    pub fn title(self) -> &'static str {
        match self {
            Category::General => "General",
            Category::Math => "Math",
            Category::Funny => "Funny",
            Category::Gifs => "Gifs",
            Category::Ascii => "ASCII",
            Category::Xkcd => "xkcd",
            Category::Gaming => "Gaming",
            Category::Poll => "Poll",
            Category::Help => "Help",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Category::General => "🎛️",
            Category::Math => "🧮",
            Category::Funny => "🤡",
            Category::Gifs => "🎞️",
            Category::Ascii => "🔣",
            Category::Xkcd => "📰",
            Category::Gaming => "🎮",
            Category::Poll => "🗳️",
            Category::Help => "🆘",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub description: String,
    pub coercer: Coercer,
}

/// Static description of one command or subcommand.
pub struct CommandDescriptor {
    name: String,
    aliases: Vec<String>,
    category: Category,
    help: String,
    arity: Arity,
    parameters: Vec<Parameter>,
    handler: Arc<dyn CommandHandler>,
    errors: ErrorTable,
    subcommands: Vec<CommandDescriptor>,
    cooldown: Option<Duration>,
}

impl CommandDescriptor {
    pub fn new(
        name: impl Into<String>,
        handler: Arc<dyn CommandHandler>,
        errors: ErrorTable,
    ) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            category: Category::General,
            help: String::new(),
            arity: Arity::Zero,
            parameters: Vec::new(),
            handler,
            errors,
            subcommands: Vec::new(),
            cooldown: None,
        }
    }

    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    pub fn arity(mut self, arity: Arity) -> Self {
        self.arity = arity;
        self
    }

    pub fn parameter(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        coercer: Coercer,
    ) -> Self {
        self.parameters.push(Parameter {
            name: name.into(),
            description: description.into(),
            coercer,
        });
        self
    }

    /// Disables the command for `cooldown` after an unreachable upstream.
    pub fn circuit_breaker(mut self, cooldown: Duration) -> Self {
        self.cooldown = Some(cooldown);
        self
    }

    /// Attaches a subcommand, which inherits the parent's category.
    pub fn subcommand(
        mut self,
        subcommand: CommandDescriptor,
    ) -> Result<Self, DuplicateCommandError> {
        if let Some(name) = first_collision(&self.subcommands, &subcommand) {
            return Err(DuplicateCommandError { name });
        }
        self.subcommands.push(subcommand.category(self.category));
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias_list(&self) -> &[String] {
        &self.aliases
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    pub fn matches(&self, token: &str) -> bool {
        self.names().any(|name| name.eq_ignore_ascii_case(token))
    }

    pub fn category_of(&self) -> Category {
        self.category
    }

    pub fn help_text(&self) -> &str {
        &self.help
    }

    /// First line of the help text.
    pub fn summary(&self) -> &str {
        self.help.lines().next().unwrap_or_default()
    }

    pub fn arity_of(&self) -> Arity {
        self.arity
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn handler(&self) -> &Arc<dyn CommandHandler> {
        &self.handler
    }

    pub fn errors(&self) -> &ErrorTable {
        &self.errors
    }

    pub fn subcommands(&self) -> &[CommandDescriptor] {
        &self.subcommands
    }

    pub fn find_subcommand(&self, token: &str) -> Option<&CommandDescriptor> {
        self.subcommands.iter().find(|sub| sub.matches(token))
    }

    pub fn cooldown(&self) -> Option<Duration> {
        self.cooldown
    }

    /// The coercer applied to the argument at `index`.
    ///
    /// Positions past the declared parameters reuse the last one.
    pub fn coercer_for(&self, index: usize) -> Coercer {
        self.parameters
            .get(index)
            .or(self.parameters.last())
            .map(|parameter| parameter.coercer)
            .unwrap_or(Coercer::Text)
    }

    /// Renders the parameter list, e.g. `<poll> <option>` or `[die]`.
    pub fn parameter_signature(&self) -> String {
        let last = self.parameters.len().saturating_sub(1);
        self.parameters
            .iter()
            .enumerate()
            .filter_map(|(index, parameter)| match self.arity {
                Arity::Zero => None,
                Arity::AtMost(_) => Some(format!("[{}]", parameter.name)),
                Arity::AtLeast(_) if index == last => Some(format!("<{}>...", parameter.name)),
                Arity::Exact(_) | Arity::AtLeast(_) => Some(format!("<{}>", parameter.name)),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Full invocation syntax, e.g. `!poll vote <poll> <option>`.
    pub fn usage(&self, prefix: &str, parent: Option<&CommandDescriptor>) -> String {
        let mut usage = match parent {
            Some(parent) => format!("{prefix}{} {}", parent.name, self.name),
            None => format!("{prefix}{}", self.name),
        };
        let parameters = self.parameter_signature();
        if !parameters.is_empty() {
            usage.push(' ');
            usage.push_str(&parameters);
        }
        usage
    }

    pub(crate) fn wrap_handlers(
        mut self,
        parent: Option<&str>,
        wrap: &impl Fn(&str, Arc<dyn CommandHandler>) -> Arc<dyn CommandHandler>,
    ) -> Self {
        let qualified = match parent {
            Some(parent) => format!("{parent} {}", self.name),
            None => self.name.clone(),
        };
        self.handler = wrap(&qualified, self.handler);
        self.subcommands = std::mem::take(&mut self.subcommands)
            .into_iter()
            .map(|sub| sub.wrap_handlers(Some(&qualified), wrap))
            .collect();
        self
    }
}
