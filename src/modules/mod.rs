pub mod transcode;
pub mod upload;
