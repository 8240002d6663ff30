/// PostgreSQL plumbing
///
/// - `pool`: connection pool creation, health check and shutdown
/// - `migrations`: embedded schema migrations
///
/// Row-level SQL lives next to the records in `models`.

pub mod migrations;
pub mod pool;
