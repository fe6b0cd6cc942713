pub mod awesomenauts;
pub mod browser;
pub mod host;
pub mod http;
pub mod isthereanydeal;
pub mod jokes;
pub mod xkcd;
