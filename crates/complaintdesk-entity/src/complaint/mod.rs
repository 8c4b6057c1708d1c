//! Complaint domain entities.

pub mod category;
pub mod message;
pub mod model;
pub mod priority;
pub mod status;

pub use category::ComplaintCategory;
pub use message::{ComplaintMessage, MessageView};
pub use model::{Complaint, ComplaintDetail, ComplaintFilter, CreateComplaint, UpdateComplaint};
pub use priority::ComplaintPriority;
pub use status::ComplaintStatus;
