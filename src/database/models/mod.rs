pub mod complaint;
pub mod enterprise;
pub mod user;

pub use complaint::{Complaint, ComplaintPayload, ComplaintRow, NewComplaint};
pub use enterprise::Enterprise;
pub use user::{NewUser, User, UserCredentials, UserRow};
