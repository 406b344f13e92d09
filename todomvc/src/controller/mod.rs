//! Controllers translate user gestures into store actions.
//!
//! Each gesture becomes one action or one action batch, so every field change
//! it makes lands in the same dirty batch and is saved once.

mod item;
mod list;

pub use item::ItemController;
pub use list::ListController;
