pub mod admin;
pub mod ledger;
pub mod package;
pub mod review;
pub mod settings;
pub mod stats;
pub mod upi;
pub mod user;

pub use admin::Admin;
pub use ledger::{Ledger, Redemption, Rejected};
pub use package::Package;
pub use review::{Decision, Resolved, Review};
pub use settings::Settings;
pub use stats::Stats;
pub use upi::Upi;
pub use user::User;
