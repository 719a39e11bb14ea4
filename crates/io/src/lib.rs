// File and store I/O: source workbooks, reference map, SQLite tables, CSV

pub mod csv;
pub mod error;
pub mod reference;
pub mod store;
pub mod xlsx;

pub use error::IoError;
