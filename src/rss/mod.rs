pub mod controller;
pub mod feed;
pub mod index;
