pub mod clipboard;
pub mod column;
pub mod coords;
pub mod error;
pub mod history;
pub mod mutation;
pub mod row;
pub mod staging;
pub mod state;
