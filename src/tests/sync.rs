use std::time::Duration;

use tracing::Span;
use web_time::Instant;

use crate::{
    config::EditorConfig,
    error::{HostError, SyncError},
    nav::{Caret, Region},
    node::{navigation::{FocusState, Intent}, tree::{Node, NodeId, Slot}},
    sync::{EditSync, PREVIEW_FALLBACK},
};

use super::util::MockHost;

fn open(text: &str) -> EditSync<MockHost> {
    EditSync::open(MockHost::with_text(text), EditorConfig::default(), Span::none())
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn test_open() {
    let sync = open("a \\frac{1}{2}");

    assert_eq!(sync.serialized(), "a \\frac{1}{2}");
    assert_eq!(sync.focus_state(), FocusState::Root);
    assert_eq!(sync.deadline(), None);
    assert_eq!(sync.stats().reparses, 0);
    assert_eq!(sync.host().previews, vec!["a \\frac{1}{2}".to_string()]);
    assert!(sync.host().writes.is_empty());
}

#[test]
fn test_debounce() {
    let mut sync = open("");
    let t0 = Instant::now();

    assert_eq!(sync.apply(Intent::InsertFraction, t0), FocusState::InNumerator);
    assert_eq!(sync.deadline(), Some(t0 + ms(500)));
    assert_eq!(sync.poll(t0 + ms(499)).unwrap(), false);

    // More typing restarts the wait
    sync.apply(Intent::TypeChar('1'), t0 + ms(300));
    assert_eq!(sync.deadline(), Some(t0 + ms(800)));
    assert_eq!(sync.poll(t0 + ms(600)).unwrap(), false);
    assert!(sync.host().writes.is_empty());

    assert_eq!(sync.poll(t0 + ms(800)).unwrap(), true);
    assert_eq!(sync.host().writes, vec!["\\frac{1}{}".to_string()]);
    assert_eq!(sync.deadline(), None);
    assert_eq!(sync.stats().pushes, 1);

    // Nothing left to do
    assert_eq!(sync.poll(t0 + ms(5000)).unwrap(), false);
    assert_eq!(sync.stats().pushes, 1);
}

#[test]
fn test_navigation_alone_schedules_nothing() {
    let mut sync = open("\\frac{1}{2}");
    let t0 = Instant::now();

    assert_eq!(sync.apply(Intent::Next, t0), FocusState::Root);
    assert_eq!(sync.apply(Intent::ExitAfter(NodeId(0)), t0), FocusState::InContinuation);
    assert_eq!(sync.deadline(), None);
    assert_eq!(sync.serialized(), "\\frac{1}{2}");
}

#[test]
fn test_custom_debounce() {
    let config = EditorConfig { debounce_ms: 50, ..EditorConfig::default() };
    let mut sync = EditSync::open(MockHost::default(), config, Span::none());
    let t0 = Instant::now();

    sync.apply(Intent::TypeChar('a'), t0);
    assert_eq!(sync.poll(t0 + ms(50)).unwrap(), true);
    assert_eq!(sync.host().text, "a");
}

#[test]
fn test_own_writes_are_not_reparsed() {
    let mut sync = open("");
    let t0 = Instant::now();

    sync.apply(Intent::InsertFraction, t0);
    sync.apply(Intent::TypeChar('x'), t0);
    assert!(sync.flush().unwrap());

    let caret = *sync.caret();
    let pushed = sync.host().text.clone();
    assert!(!sync.on_host_text_changed(&pushed));

    assert_eq!(sync.stats().skipped_echoes, 1);
    assert_eq!(sync.stats().reparses, 0);
    assert_eq!(*sync.caret(), caret);
    assert_eq!(sync.focus_state(), FocusState::InNumerator);
}

#[test]
fn test_external_change_reparses() {
    let mut sync = open("x");

    assert!(sync.on_host_text_changed("a\\frac{b}{c}"));
    assert_eq!(sync.stats().reparses, 1);
    assert_eq!(sync.serialized(), "a\\frac{b}{c}");
    assert_eq!(*sync.caret(), sync.document().end_caret());
    assert_eq!(sync.host().previews.last().map(String::as_str), Some("a\\frac{b}{c}"));

    // The same text again is an echo
    assert!(!sync.on_host_text_changed("a\\frac{b}{c}"));
    assert_eq!(sync.stats().reparses, 1);
}

#[test]
fn test_external_change_normalises() {
    let mut sync = open("");

    assert!(sync.on_host_text_changed("\\frac{ 1 }{ 2 }"));
    assert_eq!(sync.serialized(), "\\frac{1}{2}");

    // Differs from the canonical form, but it's what the host last told us
    assert!(!sync.on_host_text_changed("\\frac{ 1 }{ 2 }"));
    assert_eq!(sync.stats().reparses, 1);
}

#[test]
fn test_external_change_cancels_push() {
    let mut sync = open("");
    let t0 = Instant::now();

    sync.apply(Intent::TypeChar('z'), t0);
    assert!(sync.deadline().is_some());

    assert!(sync.on_host_text_changed("other"));
    assert_eq!(sync.deadline(), None);
    assert_eq!(sync.poll(t0 + ms(1000)).unwrap(), false);
    assert!(sync.host().writes.is_empty());
    assert_eq!(sync.serialized(), "other");
}

#[test]
fn test_push_skipped_when_host_matches() {
    let mut sync = open("");
    let t0 = Instant::now();

    sync.apply(Intent::TypeChar('q'), t0);
    sync.host_mut().text = "q".into();

    assert_eq!(sync.poll(t0 + ms(500)).unwrap(), false);
    assert_eq!(sync.stats().skipped_pushes, 1);
    assert_eq!(sync.stats().pushes, 0);
    assert!(sync.host().writes.is_empty());
    assert_eq!(sync.deadline(), None);
}

#[test]
fn test_close_discards_pending_push() {
    let mut sync = open("start");
    let t0 = Instant::now();

    sync.apply(Intent::TypeChar('!'), t0);
    let host = sync.close();

    assert_eq!(host.text, "start");
    assert!(host.writes.is_empty());
}

#[test]
fn test_failed_push_retries() {
    let mut sync = open("");
    let t0 = Instant::now();
    sync.host_mut().fail_writes = true;

    sync.apply(Intent::TypeChar('q'), t0);
    let result = sync.poll(t0 + ms(500));
    assert!(matches!(result, Err(SyncError::Host(HostError::Rejected(_)))));
    assert_eq!(sync.deadline(), Some(t0 + ms(500)));

    sync.host_mut().fail_writes = false;
    assert_eq!(sync.poll(t0 + ms(600)).unwrap(), true);
    assert_eq!(sync.host().writes, vec!["q".to_string()]);
    assert_eq!(sync.deadline(), None);
}

#[test]
fn test_preview_fallback() {
    let host = MockHost { fail_previews: true, ..MockHost::with_text("x") };
    let mut sync = EditSync::open(host, EditorConfig::default(), Span::none());
    assert_eq!(sync.host().preview_errors, vec![PREVIEW_FALLBACK.to_string()]);

    sync.apply(Intent::TypeChar('y'), Instant::now());
    assert_eq!(sync.host().preview_errors.len(), 2);

    // The document is unaffected
    assert_eq!(sync.serialized(), "xy");

    sync.host_mut().fail_previews = false;
    sync.on_host_text_changed("z");
    assert_eq!(sync.host().previews, vec!["z".to_string()]);
}

#[test]
fn test_identities_not_reused_after_reparse() {
    let mut sync = open("\\frac{a}{b}");
    let old_caret = Caret::new(Region::Slot(NodeId(0), Slot::Numerator), 0, 1);

    assert!(sync.on_host_text_changed("x\\frac{c}{d}"));
    assert_eq!(sync.document().resolve_owner(NodeId(0)), None);
    assert!(matches!(sync.document().resolve_owner(NodeId(1)), Some(Node::Fraction { .. })));

    // References from before the reparse don't reach into the new tree
    let t0 = Instant::now();
    assert_eq!(sync.apply(Intent::ExitAfter(NodeId(0)), t0), FocusState::Root);
    assert_eq!(sync.document().root.items.len(), 2);
    assert_eq!(sync.set_caret(old_caret), FocusState::Root);
    assert_eq!(*sync.caret(), sync.document().end_caret());
    assert_eq!(sync.deadline(), None);

    sync.apply(Intent::TypeChar('!'), t0);
    assert_eq!(sync.serialized(), "x\\frac{c}{d}!");
}

#[test]
fn test_edit_parsed_construct() {
    let mut sync = open("\\frac{a}{b}");
    let t0 = Instant::now();

    assert_eq!(
        sync.set_caret(Caret::new(Region::Slot(NodeId(0), Slot::Numerator), 0, 1)),
        FocusState::InNumerator,
    );
    assert_eq!(sync.deadline(), None);

    assert_eq!(sync.apply(Intent::TypeChar('c'), t0), FocusState::InNumerator);
    assert_eq!(sync.serialized(), "\\frac{ac}{b}");
    assert_eq!(sync.apply(Intent::Next, t0), FocusState::InDenominator);

    assert_eq!(sync.apply(Intent::Backspace, t0), FocusState::InDenominator);
    assert_eq!(sync.serialized(), "\\frac{ac}{}");

    // Deleting from an empty region takes the whole fraction with it
    assert_eq!(sync.apply(Intent::Backspace, t0), FocusState::Root);
    assert_eq!(sync.serialized(), "");

    assert!(sync.flush().unwrap());
    assert_eq!(sync.host().text, "");
}
