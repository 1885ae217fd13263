//! Environment preparation for stored notebooks.
//!
//! [`EnvironmentPreparer::prepare`] turns a notebook plus request context into
//! a build context (dockerfile, `docker-compose.yml`, optional
//! `requirements.txt`) and a staged copy of the notebook's files, ready for
//! `docker-compose up`. Starting the containers is left to the caller.

pub mod credential;
pub mod error;
pub mod fs;
pub mod layout;
pub mod log;
pub mod port;
pub mod preparer;
pub mod probe;
pub mod render;
pub mod requirements;
pub mod store;
pub mod template;

pub use error::{Result, SpaceError};
pub use preparer::{EnvironmentPreparer, PreparedEnvironment};
