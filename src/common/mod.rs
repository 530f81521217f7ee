//! Shared helpers: database error categorization, handlebars setup and URL building

pub mod db_errors;
pub mod handlebars;
pub mod urls;

pub use handlebars::get_handlebars;
pub use urls::UrlBuilder;
