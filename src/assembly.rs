//! Local and global assembly of the Newton system.
pub mod global;
pub mod local;
