use std::fs;

use pretty_assertions::assert_eq;
use todo_store::{
    Category, Config, FileSlot, Filter, MemorySlot, Priority, Slot, TodoStore, storage::DEFAULT_KEY,
};

#[test]
fn restart_restores_last_mutation() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = Config::new(Some(dir.path().to_path_buf()), None).unwrap();

    let mut store = todo_store::open(&cfg);
    let milk = store
        .add("Buy milk", "", Priority::High, Category::Shopping)
        .unwrap()
        .unwrap();
    let report = store
        .add("Write report", "2024-05-01", Priority::Medium, Category::Work)
        .unwrap()
        .unwrap();
    let junk = store
        .add("junk", "", Priority::Low, Category::Other)
        .unwrap()
        .unwrap();
    store.toggle_complete(report).unwrap();
    store.edit(milk, "Buy oat milk").unwrap();
    store.remove(junk).unwrap();
    let before = store.todos().to_vec();
    drop(store);

    let reopened = todo_store::open(&cfg);
    assert_eq!(reopened.todos(), before.as_slice());
    assert_eq!(reopened.completion_ratio(), 50.0);
}

#[test]
fn stored_ids_are_numeric_literals() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = TodoStore::load(FileSlot::new(dir.path(), DEFAULT_KEY));
    let id = store
        .add("Buy milk", "", Priority::High, Category::Shopping)
        .unwrap()
        .unwrap();

    let raw = fs::read_to_string(dir.path().join("todos.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let record = &value.as_array().unwrap()[0];
    assert_eq!(record["id"].as_i64(), Some(id.0));
    assert_eq!(record["dueDate"], "");
    assert_eq!(record["priority"], "high");
    assert_eq!(record["category"], "shopping");
    assert_eq!(record["completed"], false);
}

#[test]
fn malformed_file_starts_empty_and_is_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("todos.json"), "{\"oops\": true").unwrap();

    let mut store = TodoStore::load(FileSlot::new(dir.path(), DEFAULT_KEY));
    assert!(store.is_empty());

    store.add("fresh", "", Priority::Low, Category::Personal).unwrap();
    drop(store);
    let reopened = TodoStore::load(FileSlot::new(dir.path(), DEFAULT_KEY));
    assert_eq!(reopened.len(), 1);
    assert_eq!(reopened.todos()[0].text, "fresh");
}

#[test]
fn reads_records_written_by_the_browser_app() {
    let raw = r#"[
        {"id":1712000000000,"text":"Pay rent","completed":true,"dueDate":"2024-04-01","priority":"high","category":"personal"},
        {"id":1712000000500,"text":"Groceries","completed":false,"dueDate":"","priority":"medium","category":"shopping"}
    ]"#;
    let store = TodoStore::load(MemorySlot::with_contents(raw));

    assert_eq!(store.len(), 2);
    assert_eq!(store.todos()[0].text, "Pay rent");
    assert!(store.todos()[0].due().is_some());
    assert_eq!(
        store
            .query("", Filter::All, Filter::Only(Category::Shopping))
            .len(),
        1
    );
}

#[test]
fn serialized_collection_round_trips() {
    let mut store = TodoStore::load(MemorySlot::new());
    for (text, p, c) in [
        ("one", Priority::Low, Category::Work),
        ("two", Priority::High, Category::Other),
        ("three", Priority::Medium, Category::Shopping),
    ] {
        store.add(text, "2030-01-01", p, c).unwrap();
    }
    let second = store.todos()[1].id;
    store.toggle_complete(second).unwrap();
    let before = store.todos().to_vec();

    let mut slot = store.into_slot();
    let restored = TodoStore::load(MemorySlot::with_contents(slot.read().unwrap().unwrap()));
    assert_eq!(restored.todos(), before.as_slice());
}

#[test]
fn every_mutation_writes_the_slot() {
    let mut store = TodoStore::load(MemorySlot::new());
    let id = store
        .add("a", "", Priority::Low, Category::Work)
        .unwrap()
        .unwrap();
    store.edit(id, "b").unwrap();
    store.toggle_complete(id).unwrap();
    store.remove(id).unwrap();
    assert_eq!(store.slot().writes(), 4);
    assert_eq!(store.slot().contents(), Some("[]"));

    store.query("b", Filter::All, Filter::All);
    store.completion_ratio();
    assert_eq!(store.slot().writes(), 4);
}

#[test]
fn overlapping_sessions_keep_both_adds() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = Config::new(Some(dir.path().to_path_buf()), None).unwrap();

    let mut first = todo_store::open(&cfg);
    let other_cfg = cfg.clone();
    let second = std::thread::spawn(move || {
        let mut store = todo_store::open(&other_cfg);
        store
            .add("from b", "", Priority::Low, Category::Work)
            .unwrap();
    });

    first
        .add("from a", "", Priority::High, Category::Personal)
        .unwrap();
    drop(first);
    second.join().unwrap();

    let reopened = todo_store::open(&cfg);
    let texts: Vec<&str> = reopened.todos().iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, vec!["from a", "from b"]);
}
