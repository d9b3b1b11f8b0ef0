pub mod admin;
pub mod key;
pub mod package;
pub mod review;
pub mod settings;
pub mod token;
pub mod upi;
pub mod user;

pub use admin::Role;
pub use review::ReviewStatus;
pub use token::{TokenSource, TokenStatus};
