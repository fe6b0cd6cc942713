pub mod dispatch;

pub use domain_shared::discord;
