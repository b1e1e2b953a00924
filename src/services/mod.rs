pub mod agent;
pub mod ai;
pub mod booking;
pub mod dates;
pub mod gate;
pub mod ingest;
pub mod profile;
pub mod retrieval;
pub mod tools;
pub mod validation;
