pub mod config;
pub mod error;
pub mod profile;
pub mod schema;
pub mod store;

pub use config::Config;
pub use error::{Result, StoreError};
pub use profile::{UserStore, default_base_dir};
pub use store::{NS_CHAT_USAGE, NS_CULTIVATION, NS_REALM, NS_TASKS, Store};
