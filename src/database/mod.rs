pub mod db;

pub use db::{blog_database, connect_to_mongo, ensure_admin_user, ensure_indexes};
