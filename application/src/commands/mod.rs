pub mod ascii;
pub mod funny;
pub mod gaming;
pub mod general;
pub mod gifs;
pub mod help;
pub mod math;
pub mod poll;
pub mod xkcd;

#[cfg(test)]
pub(crate) mod test_support;
