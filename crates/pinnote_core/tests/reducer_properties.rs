use pinnote_core::view::filter::{filter_notes, sections};
use pinnote_core::{reduce, Note, NoteId, NotePatch, NotesAction, Timestamp};

fn note(id: &str, title: &str, content: &str, pinned: bool) -> Note {
    Note {
        id: NoteId::new(id),
        title: title.to_string(),
        content: content.to_string(),
        is_pinned: pinned,
        owner_id: "u1".to_string(),
        created_at: Timestamp::from_millis(10),
        updated_at: Timestamp::from_millis(20),
    }
}

fn sample() -> Vec<Note> {
    vec![
        note("a", "Shopping", "milk", false),
        note("b", "Work", "standup at 9", true),
    ]
}

#[test]
fn reduce_never_mutates_its_input() {
    let current = sample();
    let frozen = current.clone();

    let actions = vec![
        NotesAction::Add(note("c", "New", "", false)),
        NotesAction::Delete(NoteId::new("a")),
        NotesAction::Update(NoteId::new("b"), NotePatch::new().title("Changed")),
        NotesAction::TogglePin(NoteId::new("a")),
        NotesAction::ImportMerge(vec![note("d", "Imported", "", false)]),
        NotesAction::ReplaceAll(Vec::new()),
    ];
    for action in actions {
        let _next = reduce(&current, action);
        assert_eq!(current, frozen);
    }
}

#[test]
fn replace_all_is_idempotent() {
    let snapshot = sample();
    let once = reduce(&[], NotesAction::ReplaceAll(snapshot.clone()));
    let twice = reduce(&once, NotesAction::ReplaceAll(snapshot.clone()));
    assert_eq!(once, snapshot);
    assert_eq!(twice, snapshot);
}

#[test]
fn update_of_missing_id_is_a_no_op() {
    let current = sample();
    let next = reduce(
        &current,
        NotesAction::Update(NoteId::new("missing"), NotePatch::new().title("x")),
    );
    assert_eq!(next, current);
}

#[test]
fn update_ignores_server_sentinel_locally() {
    let current = sample();
    let next = reduce(
        &current,
        NotesAction::Update(NoteId::new("a"), NotePatch::new().content("oat milk").touch()),
    );
    assert_eq!(next[0].content, "oat milk");
    assert_eq!(next[0].updated_at, current[0].updated_at);
}

#[test]
fn toggle_pin_twice_restores_flag() {
    let current = sample();
    let once = reduce(&current, NotesAction::TogglePin(NoteId::new("a")));
    assert!(once[0].is_pinned);
    let twice = reduce(&once, NotesAction::TogglePin(NoteId::new("a")));
    assert_eq!(twice, current);
}

#[test]
fn delete_and_toggle_of_missing_id_leave_list_unchanged() {
    let current = sample();
    assert_eq!(reduce(&current, NotesAction::Delete(NoteId::new("zz"))), current);
    assert_eq!(
        reduce(&current, NotesAction::TogglePin(NoteId::new("zz"))),
        current
    );
}

#[test]
fn add_prepends() {
    let next = reduce(&sample(), NotesAction::Add(note("c", "New", "", false)));
    let ids: Vec<&str> = next.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["c", "a", "b"]);
}

#[test]
fn import_merge_prepends_in_order() {
    let imported = vec![note("x", "X", "", false), note("y", "Y", "", false)];
    let next = reduce(&sample(), NotesAction::ImportMerge(imported));
    let ids: Vec<&str> = next.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["x", "y", "a", "b"]);
}

#[test]
fn search_matches_content_case_insensitively() {
    let notes = vec![
        note("a", "Shopping", "milk", false),
        note("b", "Work", "deadline", false),
    ];
    let matched = filter_notes(&notes, "MILK");
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].title, "Shopping");
}

#[test]
fn empty_search_returns_everything() {
    let notes = sample();
    assert_eq!(filter_notes(&notes, "").len(), 2);
}

#[test]
fn search_term_whitespace_is_significant() {
    let notes = vec![
        note("a", "milkshake", "", false),
        note("b", "oat milk today", "", false),
    ];
    let ids: Vec<&str> = filter_notes(&notes, "milk ")
        .into_iter()
        .map(|n| n.id.as_str())
        .collect();
    assert_eq!(ids, vec!["b"]);
    assert!(filter_notes(&notes, "   ").is_empty());
}

#[test]
fn sections_partition_matches_by_pin() {
    let notes = vec![
        note("a", "Shopping", "milk", false),
        note("b", "Milk run", "", true),
        note("c", "Work", "standup", false),
    ];
    let split = sections(&notes, "milk");
    assert_eq!(split.len(), 2);
    assert_eq!(split.pinned[0].id.as_str(), "b");
    assert_eq!(split.others[0].id.as_str(), "a");

    assert!(sections(&notes, "nothing matches").is_empty());
}
