//! Database repositories for the casting service.
//!
//! All queries use parameterized statements. Handlers stay thin; the
//! repositories own the SQL and row mapping.

pub mod actors;
pub mod movies;

pub use actors::ActorsRepository;
pub use movies::MoviesRepository;
