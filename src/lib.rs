pub mod config;
pub mod model;
pub mod storage;
pub mod store;
pub mod view;

pub use crate::{
    config::Config,
    model::{Category, Filter, Priority, Todo, TodoBuilder, TodoId},
    storage::{FileSlot, MemorySlot, Slot},
    store::TodoStore,
    view::ViewState,
};

/// Load the file-backed store described by `cfg`. The slot stays locked
/// until the returned store is dropped.
pub fn open(cfg: &Config) -> TodoStore<FileSlot> {
    TodoStore::load(cfg.slot())
}
