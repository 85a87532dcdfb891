pub mod request_meta;
pub mod time;
