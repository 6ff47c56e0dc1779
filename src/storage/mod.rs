pub mod connection;
pub mod entity;
pub mod repository;
pub mod seed;

pub use connection::establish_connection;
