pub mod apply;
pub mod auth;
pub mod destroy;
pub mod import;
pub mod plan;
pub mod query;
pub mod refresh;
pub mod schema;
pub mod show;
