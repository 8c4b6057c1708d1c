//! Complaint filing, triage, and thread messages.

pub mod service;

pub use service::{ComplaintService, NewComplaint};
