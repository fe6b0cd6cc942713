pub mod catalogue;
pub mod commands;
pub mod dispatcher;
