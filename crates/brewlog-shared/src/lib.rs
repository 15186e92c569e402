//! # Brewlog Shared
//!
//! Types shared between the synchronization core and any presentation
//! shell sitting on top of it.

pub mod notice;

pub use notice::{Notice, NoticeLevel, NoticeQueue, NoticeToken};
