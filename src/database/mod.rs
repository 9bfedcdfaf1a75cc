pub mod complaint_repository;
pub mod directory_repository;
pub mod manager;
pub mod models;
pub mod schema;

pub use complaint_repository::{ComplaintRepository, PgComplaintRepository};
pub use directory_repository::{DirectoryRepository, PgDirectoryRepository};
pub use manager::{DatabaseError, DatabaseManager};
