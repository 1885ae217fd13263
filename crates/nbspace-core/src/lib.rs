pub mod config;
pub mod notebook;
pub mod observability;
pub mod path_validation;

pub use notebook::{NotebookBasic, NotebookVersion, RequestContext};
