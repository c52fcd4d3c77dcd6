use super::*;
use crate::error::TableError;
use crate::template::{Blueprint, TemplateCache, View};
use bubbletea_rs::{KeyMsg, Model as BubbleTeaModel, Msg};
use crossterm::event::{KeyCode, KeyModifiers};
use lipgloss_extras::lipgloss::Style;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Recording {
    batch: bool,
    calls: Vec<String>,
}

fn rows_of(at: &[Coordinate]) -> Vec<usize> {
    at.iter().map(|c| c.row).collect()
}

impl HostWidget for Recording {
    fn reload_data(&mut self) {
        self.calls.push("reload".into());
    }

    fn supports_batch_updates(&self) -> bool {
        self.batch
    }

    fn perform_batch_updates(&mut self, apply: &mut dyn FnMut(), update: BatchUpdate) {
        self.calls.push(format!(
            "batch +{:?} -{:?}",
            rows_of(&update.inserted),
            rows_of(&update.deleted)
        ));
        apply();
    }

    fn begin_updates(&mut self) {
        self.calls.push("begin".into());
    }

    fn end_updates(&mut self) {
        self.calls.push("end".into());
    }

    fn insert_rows(&mut self, at: &[Coordinate], _animation: RowAnimation) {
        self.calls.push(format!("insert {:?}", rows_of(at)));
    }

    fn delete_rows(&mut self, at: &[Coordinate], _animation: RowAnimation) {
        self.calls.push(format!("delete {:?}", rows_of(at)));
    }

    fn reload_rows(&mut self, at: &[Coordinate], _animation: RowAnimation) {
        self.calls.push(format!("reload_rows {:?}", rows_of(at)));
    }

    fn select_row(&mut self, at: Coordinate, animated: bool, scroll: ScrollPosition) {
        self.calls
            .push(format!("select {at} animated={animated} scroll={scroll:?}"));
    }
}

struct Editable;

impl RowController for Editable {
    fn render(&self, view: &View, _selected: bool) -> String {
        view.render("editable")
    }

    fn height(&self) -> usize {
        3
    }

    fn can_edit(&self) -> bool {
        true
    }

    fn edit_actions(&self) -> Vec<EditAction> {
        vec![EditAction::new("Archive"), EditAction::destructive("Delete")]
    }
}

struct Unregistered;

impl RowController for Unregistered {
    fn render(&self, view: &View, _selected: bool) -> String {
        view.render("never")
    }
}

fn cache() -> Arc<TemplateCache> {
    let registry = default_templates().with_template(
        std::any::type_name::<Editable>(),
        None,
        Blueprint::new(Style::new()),
    );
    Arc::new(TemplateCache::new(registry))
}

fn recording(batch: bool) -> ListController<Recording> {
    ListController::new(
        Recording {
            batch,
            calls: Vec::new(),
        },
        cache(),
    )
}

fn terminal(width: usize, height: usize) -> ListController<TerminalTable> {
    ListController::new(TerminalTable::new(width, height), cache())
}

fn row(title: &str) -> Row {
    DefaultRow::new(title).into_row()
}

fn assert_order(table: &ListController<impl HostWidget>, expected: &[&Row]) {
    let rows = table.rows().expect("flat table");
    assert_eq!(rows.len(), expected.len());
    for (actual, expected) in rows.iter().zip(expected) {
        assert!(Arc::ptr_eq(actual, expected));
    }
}

fn key(code: KeyCode) -> Msg {
    Box::new(KeyMsg {
        key: code,
        modifiers: KeyModifiers::NONE,
    }) as Msg
}

fn plain(s: &str) -> String {
    String::from_utf8(strip_ansi_escapes::strip(s.as_bytes())).unwrap()
}

type Events = Arc<Mutex<Vec<TableEvent>>>;

fn observe<H: HostWidget>(table: &mut ListController<H>) -> (Events, Arc<impl TableObserver>) {
    let events: Events = Arc::default();
    let sink = Arc::clone(&events);
    let observer = Arc::new(move |event: &TableEvent| sink.lock().unwrap().push(event.clone()));
    table.set_observer(&observer);
    (events, observer)
}

#[test]
fn test_insert_in_the_middle_animates_new_positions() {
    let mut table = recording(true);
    let (a, b, c) = (row("a"), row("b"), row("c"));
    table.set_rows(vec![a.clone(), b.clone(), c.clone()]);
    let (x, y) = (row("x"), row("y"));

    let inserted = table
        .insert(vec![x.clone(), y.clone()], 1, RowAnimation::Fade)
        .unwrap();

    assert_eq!(inserted, vec![Coordinate::new(0, 1), Coordinate::new(0, 2)]);
    assert_order(&table, &[&a, &x, &y, &b, &c]);
    assert_eq!(table.host().calls.last().unwrap(), "batch +[1, 2] -[]");
}

#[test]
fn test_insert_at_end_and_on_top() {
    let mut table = recording(true);
    let a = row("a");
    table.set_rows(vec![a.clone()]);

    let end = row("end");
    let at = table.insert(vec![end.clone()], 1, RowAnimation::Bottom).unwrap();
    assert_eq!(at, vec![Coordinate::new(0, 1)]);

    let top = row("top");
    let at = table.insert_on_top(vec![top.clone()], RowAnimation::Top).unwrap();
    assert_eq!(at, vec![Coordinate::new(0, 0)]);
    assert_order(&table, &[&top, &a, &end]);
}

#[test]
fn test_insert_past_end_is_rejected() {
    let mut table = recording(true);
    table.set_rows(vec![row("a")]);
    let err = table.insert(vec![row("x")], 2, RowAnimation::Fade).unwrap_err();
    assert_eq!(err, TableError::PositionOutOfRange { position: 2, len: 1 });
    assert_eq!(table.model().total_rows(), 1);
}

#[test]
fn test_insert_ignores_groups() {
    let mut table = recording(true);
    table.set_rows(Vec::new());
    let x = row("x");
    let items: Vec<ContentItem> = vec![DefaultSection::new("ignored").into(), x.clone().into()];
    let at = table.insert(items, 0, RowAnimation::Fade).unwrap();
    assert_eq!(at.len(), 1);
    assert_order(&table, &[&x]);
}

#[test]
fn test_remove_upper_bound_is_inclusive() {
    let mut table = recording(true);
    let (a, b, c, d) = (row("a"), row("b"), row("c"), row("d"));
    table.set_rows(vec![a.clone(), b, c, d.clone()]);

    let removed = table.remove(1, 1, RowAnimation::Left).unwrap();

    assert_eq!(removed, vec![Coordinate::new(0, 1), Coordinate::new(0, 2)]);
    assert_order(&table, &[&a, &d]);
    assert_eq!(table.host().calls.last().unwrap(), "batch +[] -[1, 2]");
}

#[test]
fn test_remove_clamps_to_existing_rows() {
    let mut table = recording(true);
    let (a, b) = (row("a"), row("b"));
    table.set_rows(vec![a.clone(), b]);

    let removed = table.remove(1, usize::MAX, RowAnimation::Fade).unwrap();
    assert_eq!(removed, vec![Coordinate::new(0, 1)]);
    assert_order(&table, &[&a]);

    let removed = table.remove(5, 0, RowAnimation::Fade).unwrap();
    assert!(removed.is_empty());
    assert_order(&table, &[&a]);
}

#[test]
fn test_mutations_use_bracket_without_batch_support() {
    let mut table = recording(false);
    let a = row("a");
    table.set_rows(vec![a.clone()]);
    table.insert(vec![row("b")], 0, RowAnimation::Fade).unwrap();
    table.remove(1, 0, RowAnimation::Fade).unwrap();

    assert_eq!(
        table.host().calls,
        vec!["reload", "begin", "insert [0]", "end", "begin", "delete [1]", "end"]
    );
    assert!(table.coordinate_of(&a).is_none());
}

#[test]
fn test_grouped_mutations_are_rejected() {
    let mut table = recording(true);
    table.set_items(vec![DefaultSection::new("g").into(), row("a").into()]);
    assert_eq!(table.mode(), DisplayMode::Grouped);

    assert_eq!(
        table.insert(vec![row("x")], 0, RowAnimation::Fade),
        Err(TableError::NotFlat)
    );
    assert_eq!(table.remove(0, 0, RowAnimation::Fade), Err(TableError::NotFlat));
    assert_eq!(table.row_count(0), 1);
}

#[test]
fn test_set_items_reloads_and_binds() {
    let mut table = recording(true);
    let a = row("a");
    assert!(a.table().is_none());
    table.set_items(vec![DefaultSection::new("g").into(), a.clone().into()]);

    assert_eq!(table.host().calls, vec!["reload"]);
    assert_eq!(a.table(), Some(table.id()));
    assert_eq!(table.section_at(0).and_then(GroupDescriptor::table), Some(table.id()));
    assert_eq!(table.coordinate_of(&a), Some(Coordinate::new(0, 0)));
    assert_eq!(table.title_for_header(0).as_deref(), Some("g"));
}

#[test]
fn test_rows_before_first_group_are_not_displayed() {
    let mut table = recording(true);
    let (orphan, kept) = (row("orphan"), row("kept"));
    table.set_items(vec![
        orphan.clone().into(),
        DefaultSection::new("g").into(),
        kept.clone().into(),
    ]);
    assert_eq!(table.section_count(), 1);
    assert!(table.coordinate_of(&orphan).is_none());
    assert_eq!(table.coordinate_of(&kept), Some(Coordinate::new(0, 0)));
}

#[test]
fn test_header_heights() {
    let mut table = recording(true);
    table.set_rows(vec![row("a")]);
    assert_eq!(table.header_height(0), 0);
    assert!(table.header_for_section(0).unwrap().is_none());

    table.set_items(vec![DefaultSection::new("g").into()]);
    assert_eq!(table.header_height(0), 2);
    assert_eq!(table.header_height(1), 0);
}

#[test]
fn test_mark_as_selected_does_not_animate_or_scroll() {
    let mut table = recording(true);
    let (a, b) = (row("a"), row("b"));
    table.set_rows(vec![a, b.clone()]);

    table.mark_as_selected(&b);
    assert_eq!(
        table.host().calls.last().unwrap(),
        "select [0, 1] animated=false scroll=None"
    );

    let calls = table.host().calls.len();
    table.mark_as_selected(&row("stranger"));
    assert_eq!(table.host().calls.len(), calls);
}

#[test]
fn test_reload_row_by_handle() {
    let mut table = recording(true);
    let (a, b) = (row("a"), row("b"));
    table.set_rows(vec![a, b.clone()]);
    assert!(table.reload_row(&b, RowAnimation::None));
    assert_eq!(table.host().calls.last().unwrap(), "reload_rows [1]");
    assert!(!table.reload_row(&row("stranger"), RowAnimation::None));
}

#[test]
fn test_edit_and_height_queries() {
    let mut table = recording(true);
    table.set_rows(vec![row("a"), RowDescriptor::new(Editable).into_row()]);

    assert!(!table.can_edit_row(Coordinate::new(0, 0)));
    assert!(table.can_edit_row(Coordinate::new(0, 1)));
    let actions = table.edit_actions_for_row(Coordinate::new(0, 1));
    assert_eq!(actions.len(), 2);
    assert!(actions[1].destructive);
    assert!(table.edit_actions_for_row(Coordinate::new(0, 9)).is_empty());

    assert_eq!(table.row_height(Coordinate::new(0, 1)), 3);
    assert_eq!(table.row_height(Coordinate::new(0, 5)), 0);
}

#[test]
fn test_observer_receives_selection_and_scroll() {
    let mut table = recording(true);
    let a = row("a");
    table.set_rows(vec![a.clone()]);
    let (events, _observer) = observe(&mut table);

    table.did_select_row(Coordinate::new(0, 0));
    table.did_select_row(Coordinate::new(0, 7));
    table.scroll(ScrollEvent::DidScroll {
        offset: ContentOffset::new(0, 3),
    });

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 2);
    match &events[0] {
        TableEvent::RowSelected { row, coordinate } => {
            assert!(Arc::ptr_eq(row, &a));
            assert_eq!(*coordinate, Coordinate::new(0, 0));
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert!(matches!(
        events[1],
        TableEvent::Scroll(ScrollEvent::DidScroll { offset }) if offset.y == 3
    ));
}

#[test]
fn test_observer_is_held_weakly() {
    let mut table = recording(true);
    table.set_rows(vec![row("a")]);

    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);
    let observer = Arc::new(move |_: &TableEvent| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    table.set_observer(&observer);

    table.did_select_row(Coordinate::new(0, 0));
    assert_eq!(seen.load(Ordering::SeqCst), 1);

    drop(observer);
    table.did_select_row(Coordinate::new(0, 0));
    assert_eq!(seen.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_reload_me_routes_to_owning_table() {
    let mut table = recording(true);
    let (a, b) = (row("a"), row("b"));
    table.set_rows(vec![a, b.clone()]);

    let cmd = b.reload_me(RowAnimation::Fade).expect("row is bound");
    let msg = cmd.await.expect("reload message");

    let mut other = recording(true);
    assert!(!other.handle_reload(&msg));
    assert!(table.handle_reload(&msg));
    assert_eq!(table.host().calls.last().unwrap(), "reload_rows [1]");
}

#[tokio::test]
async fn test_reload_for_removed_row_is_consumed_quietly() {
    let mut table = recording(true);
    let (a, b) = (row("a"), row("b"));
    table.set_rows(vec![a, b.clone()]);
    let msg = b.reload_me(RowAnimation::Fade).unwrap().await.unwrap();

    table.remove(1, 0, RowAnimation::Fade).unwrap();
    let calls = table.host().calls.len();
    assert!(table.handle_reload(&msg));
    assert_eq!(table.host().calls.len(), calls);
}

#[tokio::test]
async fn test_group_reload_me_reloads_table() {
    let mut table = recording(true);
    table.set_items(vec![DefaultSection::new("g").into(), row("a").into()]);
    let cmd = table.groups().unwrap()[0].reload_me().expect("group is bound");
    let msg = cmd.await.unwrap();

    assert!(table.handle_reload(&msg));
    assert_eq!(table.host().calls, vec!["reload", "reload"]);
}

#[test]
fn test_terminal_shows_empty_state() {
    let table = terminal(20, 5);
    assert_eq!(plain(&table.view()), "No rows.");
}

#[test]
fn test_terminal_clips_to_viewport_and_announces_visible_rows() {
    let mut table = terminal(20, 2);
    table.set_rows(vec![row("a"), row("b"), row("c")]);
    let (events, _observer) = observe(&mut table);

    let view = plain(&table.view());
    assert_eq!(view, "  a\n  b");

    let shown: Vec<Coordinate> = events
        .lock()
        .unwrap()
        .iter()
        .filter_map(|e| match e {
            TableEvent::WillDisplay { coordinate, .. } => Some(*coordinate),
            _ => None,
        })
        .collect();
    assert_eq!(shown, vec![Coordinate::new(0, 0), Coordinate::new(0, 1)]);
}

#[test]
fn test_terminal_renders_headers_and_cursor() {
    let mut table = terminal(20, 10);
    table.set_items(vec![
        DefaultSection::new("Fruit").into(),
        row("Apple").into(),
        row("Pear").into(),
    ]);
    table.update(key(KeyCode::Down));

    let view = plain(&table.view());
    let lines: Vec<&str> = view.lines().collect();
    assert_eq!(lines[0], "  Fruit");
    assert_eq!(lines[1], "  ─────");
    assert_eq!(lines[2], "  Apple");
    assert_eq!(lines[3], format!("{CURSOR_MARK} Pear"));
}

#[test]
fn test_terminal_reports_missing_template() {
    let mut table = terminal(60, 5);
    table.set_rows(vec![RowDescriptor::new(Unregistered).into_row()]);
    let view = plain(&table.view());
    assert!(view.starts_with("template not found:"));
    assert!(view.contains("Unregistered"));
}

#[test]
fn test_terminal_static_dimensions_ignore_row_height() {
    let cache = cache();
    let host = TerminalTable::new(20, 10)
        .with_dimension_mode(DimensionMode::Static)
        .with_row_height(1);
    let mut table = ListController::new(host, cache);
    table.set_rows(vec![row("a"), RowDescriptor::new(Editable).into_row()]);
    let layout = table.host().layout(&table);
    assert_eq!(layout[1].top, 1);
    assert_eq!(layout[1].height, 1);

    let mut table = terminal(20, 10);
    table.set_rows(vec![RowDescriptor::new(Editable).into_row(), row("a")]);
    let layout = table.host().layout(&table);
    assert_eq!(layout[1].top, 3);
}

#[test]
fn test_terminal_cursor_scrolls_viewport() {
    let mut table = terminal(20, 2);
    table.set_rows(vec![row("a"), row("b"), row("c")]);
    let (events, _observer) = observe(&mut table);

    table.update(key(KeyCode::Down));
    assert_eq!(table.host().offset().y, 0);
    table.update(key(KeyCode::Down));
    assert_eq!(table.host().cursor(), Some(Coordinate::new(0, 2)));
    assert_eq!(table.host().offset().y, 1);
    assert_eq!(plain(&table.view()), format!("  b\n{CURSOR_MARK} c"));

    let scrolls = events
        .lock()
        .unwrap()
        .iter()
        .filter(|e| matches!(e, TableEvent::Scroll(_)))
        .count();
    assert_eq!(scrolls, 1);
}

#[test]
fn test_terminal_page_down_emits_drag_sequence() {
    let mut table = terminal(20, 2);
    table.set_rows((0..5).map(|i| row(&i.to_string())).collect());
    let (events, _observer) = observe(&mut table);

    table.update(key(KeyCode::PageDown));

    let scrolls: Vec<ScrollEvent> = events
        .lock()
        .unwrap()
        .iter()
        .filter_map(|e| match e {
            TableEvent::Scroll(s) => Some(*s),
            _ => None,
        })
        .collect();
    let start = ContentOffset::new(0, 0);
    let end = ContentOffset::new(0, 2);
    assert_eq!(
        scrolls,
        vec![
            ScrollEvent::WillBeginDragging { offset: start },
            ScrollEvent::DidScroll { offset: end },
            ScrollEvent::DidEndDragging {
                offset: end,
                will_decelerate: true
            },
            ScrollEvent::DidEndDecelerating { offset: end },
        ]
    );
    assert_eq!(table.host().cursor(), Some(Coordinate::new(0, 2)));
}

#[test]
fn test_terminal_enter_selects_cursor_row() {
    let mut table = terminal(20, 5);
    let (a, b) = (row("a"), row("b"));
    table.set_rows(vec![a, b.clone()]);
    let (events, _observer) = observe(&mut table);

    table.update(key(KeyCode::End));
    table.update(key(KeyCode::Enter));

    assert_eq!(table.host().selected(), Some(Coordinate::new(0, 1)));
    let events = events.lock().unwrap();
    assert!(events.iter().any(|e| matches!(
        e,
        TableEvent::RowSelected { row, .. } if Arc::ptr_eq(row, &b)
    )));
}

#[test]
fn test_terminal_records_transactions() {
    let mut table = terminal(20, 5);
    table.set_rows(vec![row("a")]);
    table.insert_on_top(vec![row("b")], RowAnimation::Fade).unwrap();

    assert_eq!(table.host().reloads(), 1);
    assert_eq!(table.host().transactions(), 1);
    let batch = table.host().last_batch().unwrap();
    assert_eq!(batch.inserted, vec![Coordinate::new(0, 0)]);
    assert_eq!(batch.animation, RowAnimation::Fade);
}

#[test]
fn test_window_size_resizes_viewport() {
    let mut table = terminal(20, 5);
    table.update(Box::new(bubbletea_rs::WindowSizeMsg {
        width: 100,
        height: 30,
    }) as Msg);
    assert_eq!(table.host().width(), 100);
    assert_eq!(table.host().height(), 30);
}

#[test]
fn test_init_uses_default_templates() {
    let (mut table, cmd) = ListController::<TerminalTable>::init();
    assert!(cmd.is_none());
    table.set_items(vec![row("hello").into()]);
    assert_eq!(plain(&table.view()), "  hello");
}

#[test]
fn test_inserting_at_the_cursor_keeps_it_on_its_row() {
    let mut table = terminal(20, 10);
    let (a, b, c) = (row("a"), row("b"), row("c"));
    table.set_rows(vec![a.clone(), b.clone(), c.clone()]);
    table.host_mut().set_cursor(Some(Coordinate::new(0, 1)));

    table
        .insert(vec![row("x"), row("y")], 1, RowAnimation::Fade)
        .unwrap();

    assert_eq!(table.coordinate_of(&b), Some(Coordinate::new(0, 3)));
    assert_eq!(table.host().cursor(), table.coordinate_of(&b));
}

#[test]
fn test_duplicate_handles_are_displayed_once() {
    let mut table = recording(true);
    let (a, b) = (row("a"), row("b"));
    table.set_rows(vec![a.clone(), a.clone(), b.clone()]);

    assert_order(&table, &[&a, &b]);
    assert_eq!(table.coordinate_of(&b), Some(Coordinate::new(0, 1)));
}

#[test]
fn test_insert_skips_rows_already_displayed() {
    let mut table = recording(true);
    let (a, x) = (row("a"), row("x"));
    table.set_rows(vec![a.clone()]);

    let at = table
        .insert(vec![a.clone(), x.clone(), x.clone()], 0, RowAnimation::Fade)
        .unwrap();

    assert_eq!(at, vec![Coordinate::new(0, 0)]);
    assert_order(&table, &[&x, &a]);
}

#[test]
fn test_remove_under_the_cursor_after_duplicate_assignment() {
    let mut table = terminal(20, 10);
    let (a, b) = (row("a"), row("b"));
    table.set_rows(vec![a.clone(), a.clone(), b.clone()]);
    table.host_mut().set_cursor(Some(Coordinate::new(0, 1)));

    let removed = table.remove(0, 1, RowAnimation::Fade).unwrap();

    assert_eq!(removed, vec![Coordinate::new(0, 0), Coordinate::new(0, 1)]);
    assert_eq!(table.model().total_rows(), 0);
    assert_eq!(table.host().cursor(), Some(Coordinate::new(0, 0)));
}

fn announced(events: &Events) -> Vec<Coordinate> {
    events
        .lock()
        .unwrap()
        .drain(..)
        .filter_map(|e| match e {
            TableEvent::WillDisplay { coordinate, .. } => Some(coordinate),
            _ => None,
        })
        .collect()
}

#[test]
fn test_terminal_announces_only_newly_visible_rows() {
    let mut table = terminal(20, 2);
    table.set_rows(vec![row("a"), row("b"), row("c")]);
    let (events, _observer) = observe(&mut table);

    table.view();
    table.view();
    assert_eq!(
        announced(&events),
        vec![Coordinate::new(0, 0), Coordinate::new(0, 1)]
    );

    table.update(key(KeyCode::Down));
    table.update(key(KeyCode::Down));
    table.view();
    assert_eq!(announced(&events), vec![Coordinate::new(0, 2)]);

    table.reload_data();
    table.view();
    assert_eq!(
        announced(&events),
        vec![Coordinate::new(0, 1), Coordinate::new(0, 2)]
    );
}
