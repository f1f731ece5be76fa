//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods that
//! accept any Postgres executor as the first argument: a `&PgPool` for
//! single statements, or `&mut *tx` to compose statements in a transaction.

pub mod objective_repo;
pub mod project_repo;
pub mod step_repo;

pub use objective_repo::ObjectiveRepo;
pub use project_repo::ProjectRepo;
pub use step_repo::StepRepo;
