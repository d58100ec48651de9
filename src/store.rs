use std::collections::HashSet;

use anyhow::{Context, Result};
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::{
    model::{Category, Filter, Priority, Todo, TodoId},
    storage::Slot,
    view::{self, ViewState},
};

/// Source of candidate ids.
pub type Clock = fn() -> TodoId;

/// Milliseconds since the Unix epoch.
pub fn system_clock() -> TodoId {
    let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();
    TodoId((nanos / 1_000_000) as i64)
}

/// Ordered todo collection mirrored to a [`Slot`] after every change.
#[derive(Debug)]
pub struct TodoStore<S: Slot> {
    todos: Vec<Todo>,
    slot: S,
    clock: Clock,
}

impl<S: Slot> TodoStore<S> {
    /// Restore from `slot`. Anything unreadable starts an empty list.
    pub fn load(slot: S) -> Self {
        Self::load_with_clock(slot, system_clock)
    }

    pub fn load_with_clock(mut slot: S, clock: Clock) -> Self {
        let todos = match slot.read() {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
                Ok(records) => dedup_ids(parse_records(records)),
                Err(e) => {
                    warn!(error = %e, "stored todos are not an array, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "could not read stored todos, starting empty");
                Vec::new()
            }
        };
        debug!(count = todos.len(), "loaded todos");

        Self { todos, slot, clock }
    }

    /// Append a todo. Blank text is rejected with `Ok(None)` and nothing is
    /// written.
    pub fn add(
        &mut self,
        text: &str,
        due_date: &str,
        priority: Priority,
        category: Category,
    ) -> Result<Option<TodoId>> {
        let text = text.trim();
        if text.is_empty() {
            debug!("ignoring todo with empty text");
            return Ok(None);
        }

        let id = self.next_id();
        let todo = Todo::builder()
            .text(text)
            .due_date(due_date)
            .priority(priority)
            .category(category)
            .build(id);
        self.todos.push(todo);
        info!(%id, %priority, %category, "added todo");

        self.persist()?;
        Ok(Some(id))
    }

    /// Replace the text of `id`. Unlike [`add`](Self::add) the new text is
    /// taken as is, empty included.
    pub fn edit(&mut self, id: TodoId, text: &str) -> Result<bool> {
        let found = match self.todos.iter_mut().find(|t| t.id == id) {
            Some(t) => {
                t.text = text.to_owned();
                info!(%id, "edited todo");
                true
            }
            None => {
                debug!(%id, "edit: no such todo");
                false
            }
        };

        self.persist()?;
        Ok(found)
    }

    /// Flip `completed`. Returns the new value, `None` if `id` is unknown.
    pub fn toggle_complete(&mut self, id: TodoId) -> Result<Option<bool>> {
        let state = self.todos.iter_mut().find(|t| t.id == id).map(|t| {
            t.completed = !t.completed;
            t.completed
        });
        match state {
            Some(completed) => info!(%id, completed, "toggled todo"),
            None => debug!(%id, "toggle: no such todo"),
        }

        self.persist()?;
        Ok(state)
    }

    pub fn remove(&mut self, id: TodoId) -> Result<bool> {
        let before = self.todos.len();
        self.todos.retain(|t| t.id != id);
        let removed = self.todos.len() != before;
        if removed {
            info!(%id, "removed todo");
        } else {
            debug!(%id, "remove: no such todo");
        }

        self.persist()?;
        Ok(removed)
    }

    /// Todos containing `search` (any case) that pass both filters, in
    /// insertion order.
    pub fn query(
        &self,
        search: &str,
        priority: Filter<Priority>,
        category: Filter<Category>,
    ) -> Vec<&Todo> {
        let needle = search.to_lowercase();
        self.todos
            .iter()
            .filter(|t| view::matches(t, &needle, priority, category))
            .collect()
    }

    pub fn query_view(&self, view: &ViewState) -> Vec<&Todo> {
        self.query(&view.search, view.priority, view.category)
    }

    /// Percentage of completed todos in `[0, 100]`; `0` when empty.
    pub fn completion_ratio(&self) -> f64 {
        if self.todos.is_empty() {
            return 0.0;
        }
        self.completed_count() as f64 / self.todos.len() as f64 * 100.0
    }

    pub fn completed_count(&self) -> usize {
        self.todos.iter().filter(|t| t.completed).count()
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn get(&self, id: TodoId) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    pub fn into_slot(self) -> S {
        self.slot
    }

    /// Clock reading, bumped past any id already in use.
    fn next_id(&self) -> TodoId {
        let mut id = (self.clock)();
        while self.todos.iter().any(|t| t.id == id) {
            id = TodoId(id.0 + 1);
        }
        id
    }

    fn persist(&mut self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.todos).context("serializing todos")?;
        self.slot.write(&json)
    }
}

/// Records that still fail with every optional field defaulted are skipped.
fn parse_records(records: Vec<serde_json::Value>) -> Vec<Todo> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value::<Todo>(record) {
            Ok(todo) => Some(todo),
            Err(e) => {
                warn!(index, error = %e, "skipping unreadable stored todo");
                None
            }
        })
        .collect()
}

/// Keep the first record for each id.
fn dedup_ids(todos: Vec<Todo>) -> Vec<Todo> {
    let mut seen = HashSet::with_capacity(todos.len());
    let before = todos.len();
    let todos: Vec<Todo> = todos.into_iter().filter(|t| seen.insert(t.id)).collect();
    if todos.len() != before {
        warn!(dropped = before - todos.len(), "dropped todos with duplicate ids");
    }
    todos
}
