//! Domain models for CMS Core

pub mod assignment;
pub mod common;
pub mod paging;
pub mod permission;
pub mod role;

pub use assignment::*;
pub use common::*;
pub use paging::*;
pub use permission::*;
pub use role::*;
