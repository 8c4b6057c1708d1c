//! Concrete repository implementations over PostgreSQL.

pub mod complaint;
pub mod message;
pub mod stats;
pub mod user;

pub use complaint::ComplaintRepository;
pub use message::MessageRepository;
pub use stats::StatsRepository;
pub use user::UserRepository;

/// Whether `err` is a unique-constraint violation on `constraint`.
pub(crate) fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            db.is_unique_violation() && db.constraint() == Some(constraint)
        }
        _ => false,
    }
}
