//! Everything needed to turn a line of chat into a typed handler call.

mod arguments;
mod arity;
mod coercer;
mod descriptor;
mod error;
mod handler;
pub mod help;
mod invocation;
mod logged;
mod registry;
mod tokenizer;
mod translator;

pub use arguments::Arguments;
pub use arity::Arity;
pub use coercer::{Coercer, CoercionError, Die, Number, Value};
pub use descriptor::{Category, CommandDescriptor, Parameter};
pub use error::{CommandError, ErrorKind, ErrorTable};
pub use handler::{handler_fn, CommandHandler};
pub use invocation::Invocation;
pub use logged::LoggedHandler;
pub use registry::{DuplicateCommandError, Registry, Resolved};
pub use tokenizer::tokenize;
pub use translator::translate;
