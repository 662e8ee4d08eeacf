pub mod assign;
pub mod completions;
pub mod create;
pub mod facets;
pub mod list;
pub mod resources;
pub mod show;
pub mod status;
