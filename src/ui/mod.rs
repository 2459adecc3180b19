//! Terminal progress reporting for the collection loops

pub mod progress;
