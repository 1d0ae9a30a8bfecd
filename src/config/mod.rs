pub mod loader;
pub mod schema;

pub use loader::ConfigError;
pub use schema::{
    Namespace, Output, Parameters, RemapConfig, Sources, TreeMode, TreeRule, ValidationError,
    ValidationIssue,
};
