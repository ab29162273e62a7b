//! Command implementations for synchro-cli

pub mod list;
pub mod schema;
pub mod show;
pub mod sync;
pub mod validate;

pub use list::run_list;
pub use schema::run_schema;
pub use show::run_show;
pub use sync::run_sync;
pub use validate::run_validate;
