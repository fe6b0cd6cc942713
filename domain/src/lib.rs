pub mod circuit_breaker;
pub mod command;
pub mod poll;
pub mod ports;
