pub mod blob;
pub mod storage;
