pub mod agenda;
pub mod filter;
pub mod normalizer;
pub mod projector;
pub mod recurrence;
pub mod validation;
