use crate::model::{Category, Filter, Priority, Todo, TodoId};

/// Presentation state that never reaches the slot: the current search,
/// both filter pickers and which todo (if any) is being edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub search: String,
    pub priority: Filter<Priority>,
    pub category: Filter<Category>,
    pub editing: Option<TodoId>,
}

impl ViewState {
    pub fn matches(&self, todo: &Todo) -> bool {
        matches(todo, &self.search.to_lowercase(), self.priority, self.category)
    }

    pub fn is_editing(&self, id: TodoId) -> bool {
        self.editing == Some(id)
    }
}

/// `needle` must already be lowercased.
pub(crate) fn matches(
    todo: &Todo,
    needle: &str,
    priority: Filter<Priority>,
    category: Filter<Category>,
) -> bool {
    todo.text.to_lowercase().contains(needle)
        && priority.matches(&todo.priority)
        && category.matches(&todo.category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_is_case_insensitive() {
        let todo = Todo::builder().text("Call MOM").build(TodoId(1));
        let view = ViewState {
            search: "mom".into(),
            ..ViewState::default()
        };
        assert!(view.matches(&todo));

        let view = ViewState {
            search: "Mo".into(),
            category: Filter::Only(Category::Work),
            ..ViewState::default()
        };
        assert!(!view.matches(&todo));
    }

    #[test]
    fn editing_marker() {
        let view = ViewState {
            editing: Some(TodoId(7)),
            ..ViewState::default()
        };
        assert!(view.is_editing(TodoId(7)));
        assert!(!view.is_editing(TodoId(8)));
    }
}
