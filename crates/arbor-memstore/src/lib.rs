//! Arbor Memstore - dictionary-backed adapter
//!
//! Keeps the whole tree in memory. Containers enumerate in name order.

mod item;
pub mod store;

pub use store::DictionaryStore;
