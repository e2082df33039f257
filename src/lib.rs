pub mod cli;
pub mod error;
pub mod resolver;
pub mod report;
pub mod settings;

pub use error::{ResolveError, SettingsError};
pub use resolver::{escape_json_string, placeholders, Placeholder, Resolver, DEFAULT_MAX_DEPTH, MAX_DEPTH_LIMIT};
pub use report::{JsonCheck, ParseFailure, Report, DEFAULT_CONTEXT_RADIUS};
pub use settings::Settings;
