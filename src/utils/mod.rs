pub mod error;
pub mod hashing;
pub mod image;
pub mod model;
pub mod pagination;
pub mod storage;
