use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand, ValueHint};
use time::OffsetDateTime;
use todo_store::{Category, Config, Filter, Priority, Slot, TodoId, TodoStore, ViewState};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Main verb. If omitted, `list` is default action.
    #[command(subcommand)]
    verb: Option<Verb>,

    /// Directory holding the todo slot.
    #[arg(short, long, global = true, env = "TODO_DIR", value_hint = ValueHint::DirPath)]
    dir: Option<PathBuf>,

    /// Slot name; the collection is stored as `<dir>/<key>.json`.
    #[arg(short, long, global = true, env = "TODO_KEY")]
    key: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Verb {
    Add {
        text: String,

        /// Due date, `YYYY-MM-DD`.
        #[arg(long, value_parser = parse_due)]
        due: Option<String>,

        #[arg(short, long, default_value_t = Priority::default())]
        priority: Priority,

        #[arg(short, long, default_value_t = Category::default())]
        category: Category,
    },
    Edit {
        id: TodoId,
        text: String,
    },
    Toggle {
        id: TodoId,
    },
    Remove {
        id: TodoId,
    },
    List {
        #[arg(short, long, default_value = "")]
        search: String,

        #[arg(short, long, default_value_t = Filter::All)]
        priority: Filter<Priority>,

        #[arg(short, long, default_value_t = Filter::All)]
        category: Filter<Category>,
    },
    Stats,
}

fn parse_due(s: &str) -> Result<String> {
    match todo_store::model::parse_due_date(s) {
        Some(_) => Ok(s.to_owned()),
        None => bail!("`{s}` is not a YYYY-MM-DD date"),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = Config::new(cli.dir, cli.key)?;
    let mut store = todo_store::open(&cfg);

    match cli.verb.unwrap_or(Verb::List {
        search: String::new(),
        priority: Filter::All,
        category: Filter::All,
    }) {
        Verb::Add {
            text,
            due,
            priority,
            category,
        } => match store.add(&text, due.as_deref().unwrap_or(""), priority, category)? {
            Some(id) => println!("{id}"),
            None => bail!("todo text must not be empty"),
        },
        Verb::Edit { id, text } => {
            if !store.edit(id, &text)? {
                eprintln!("no todo with id {id}");
            }
        }
        Verb::Toggle { id } => match store.toggle_complete(id)? {
            Some(true) => println!("{id} done"),
            Some(false) => println!("{id} open"),
            None => eprintln!("no todo with id {id}"),
        },
        Verb::Remove { id } => {
            if !store.remove(id)? {
                eprintln!("no todo with id {id}");
            }
        }
        Verb::List {
            search,
            priority,
            category,
        } => {
            let view = ViewState {
                search,
                priority,
                category,
                editing: None,
            };
            print_list(&store, &view);
        }
        Verb::Stats => {
            println!("total:     {}", store.len());
            println!("completed: {}", store.completed_count());
            println!("progress:  {:.0}%", store.completion_ratio());
        }
    }
    Ok(())
}

fn print_list<S: Slot>(store: &TodoStore<S>, view: &ViewState) {
    let today = OffsetDateTime::now_utc().date();

    println!("ID             | Done | Pri    | Category | Due         | Text");
    println!("---------------+------+--------+----------+-------------+----------------");

    for t in store.query_view(view) {
        let due = match (t.due_date.is_empty(), t.is_overdue(today)) {
            (true, _) => "-".to_owned(),
            (false, true) => format!("{}!", t.due_date),
            (false, false) => t.due_date.clone(),
        };
        println!(
            "{:<14} | {:<4} | {:<6} | {:<8} | {:<11} | {}",
            t.id,
            if t.completed { "x" } else { " " },
            t.priority,
            t.category,
            due,
            t.text
        );
    }

    println!("\n{:.0}% completed", store.completion_ratio());
}
