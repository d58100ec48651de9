use std::{fmt, str::FromStr};

use anyhow::{Error, bail};
use serde::{Deserialize, Serialize};
use time::{Date, macros::format_description};

// --- Todo identifier ---

/// Creation timestamp in milliseconds, doubling as the primary key.
/// Serialized as a bare JSON number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct TodoId(pub i64);

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for TodoId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(TodoId)
    }
}

// --- Priority ---
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Priority::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
        {
            Some(p) => Ok(p),
            None => bail!("unknown priority `{s}` (expected low, medium or high)"),
        }
    }
}

// --- Category ---
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Work,
    #[default]
    Personal,
    Shopping,
    Other,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Work,
        Category::Personal,
        Category::Shopping,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Work => "work",
            Category::Personal => "personal",
            Category::Shopping => "shopping",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
        {
            Some(c) => Ok(c),
            None => bail!("unknown category `{s}` (expected work, personal, shopping or other)"),
        }
    }
}

// --- Query filter ---

/// Either the `all` sentinel or one concrete value to match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Filter<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Filter<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Filter::All => true,
            Filter::Only(wanted) => wanted == value,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::All => f.pad("all"),
            Filter::Only(v) => fmt::Display::fmt(v, f),
        }
    }
}

impl<T: FromStr<Err = Error>> FromStr for Filter<T> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Filter::All)
        } else {
            s.parse().map(Filter::Only)
        }
    }
}

// --- Todo object ---
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /** Immutable primary key (unique per collection) */
    pub id: TodoId,

    /** Free-form text, non-empty when created */
    pub text: String,

    #[serde(default)]
    pub completed: bool,

    /** `YYYY-MM-DD`, or empty for no due date */
    #[serde(default)]
    pub due_date: String,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default)]
    pub category: Category,
}

impl Todo {
    /// Creates a new builder chain (*without* text).
    pub fn builder() -> TodoBuilder<MissingText> {
        TodoBuilder {
            text: None,
            due_date: String::new(),
            priority: Priority::default(),
            category: Category::default(),
            _state: std::marker::PhantomData,
        }
    }

    /// Parsed due date. `None` when unset or not an ISO calendar date.
    pub fn due(&self) -> Option<Date> {
        parse_due_date(&self.due_date)
    }

    pub fn is_overdue(&self, today: Date) -> bool {
        !self.completed && self.due().is_some_and(|d| d < today)
    }
}

/// Parses the `YYYY-MM-DD` format an HTML date input produces.
pub fn parse_due_date(s: &str) -> Option<Date> {
    if s.is_empty() {
        return None;
    }
    Date::parse(s, format_description!("[year]-[month]-[day]")).ok()
}

// --- Zero size markers for the "typed-state" builder ---
pub struct MissingText;
pub struct HasText;

pub struct TodoBuilder<TextState> {
    text: Option<String>,
    due_date: String,
    priority: Priority,
    category: Category,

    // records builder state in the type system
    _state: std::marker::PhantomData<TextState>,
}

impl TodoBuilder<MissingText> {
    pub fn text<S: Into<String>>(self, t: S) -> TodoBuilder<HasText> {
        TodoBuilder {
            text: Some(t.into()),
            due_date: self.due_date,
            priority: self.priority,
            category: self.category,
            _state: std::marker::PhantomData,
        }
    }
}

impl<TextState> TodoBuilder<TextState> {
    pub fn due_date<S: Into<String>>(mut self, d: S) -> Self {
        self.due_date = d.into();
        self
    }

    pub fn priority(mut self, p: Priority) -> Self {
        self.priority = p;
        self
    }

    pub fn category(mut self, c: Category) -> Self {
        self.category = c;
        self
    }
}

impl TodoBuilder<HasText> {
    /// Consume the builder; the caller supplies a collection-unique id.
    pub fn build(self, id: TodoId) -> Todo {
        Todo {
            id,
            text: self.text.unwrap_or_default(),
            completed: false,
            due_date: self.due_date,
            priority: self.priority,
            category: self.category,
        }
    }
}
