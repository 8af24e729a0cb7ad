//! Pipeline module - the preprocessing stages and their orchestration

pub mod balance;
pub mod encoder;
pub mod error;
pub mod features;
pub mod loader;
pub mod missing;
pub mod persist;
pub mod prune;
pub mod run;
pub mod schema;
pub mod split;

pub use balance::*;
pub use encoder::*;
pub use error::*;
pub use features::*;
pub use loader::*;
pub use missing::*;
pub use persist::*;
pub use prune::*;
pub use run::*;
pub use schema::*;
pub use split::*;
