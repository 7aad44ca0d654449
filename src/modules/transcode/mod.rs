pub mod encoder;
pub mod job;
pub mod ladder;
pub mod layout;
