use pretty_assertions::assert_eq;
use recordkit_events::{Emitter, EventBus, SubscriptionId};
use std::cell::RefCell;
use std::rc::Rc;

type Log = Rc<RefCell<Vec<String>>>;

fn recorder(log: &Log, tag: &'static str) -> Box<dyn FnMut(&String)> {
    let log = Rc::clone(log);
    Box::new(move |payload: &String| log.borrow_mut().push(format!("{tag}:{payload}")))
}

// ── subscribe / publish ──────────────────────────────────────────

#[test]
fn publish_without_handlers_runs_nothing() {
    let mut bus: EventBus<String> = EventBus::new();
    assert_eq!(bus.publish("change", &"x".to_string()), 0);
}

#[test]
fn publish_reaches_every_handler_of_the_event() {
    let log: Log = Rc::default();
    let mut bus = EventBus::new();
    bus.subscribe("change", recorder(&log, "a"));
    bus.subscribe("change", recorder(&log, "b"));

    assert_eq!(bus.publish("change", &"1".to_string()), 2);
    assert_eq!(*log.borrow(), vec!["a:1", "b:1"]);
}

#[test]
fn publish_is_scoped_to_the_event_name() {
    let log: Log = Rc::default();
    let mut bus = EventBus::new();
    bus.subscribe("change", recorder(&log, "change"));
    bus.subscribe("saved", recorder(&log, "saved"));

    bus.publish("saved", &"s".to_string());
    assert_eq!(*log.borrow(), vec!["saved:s"]);
}

#[test]
fn handlers_run_on_every_publish() {
    let log: Log = Rc::default();
    let mut bus = EventBus::new();
    bus.subscribe("change", recorder(&log, "h"));

    bus.publish("change", &"1".to_string());
    bus.publish("change", &"2".to_string());
    assert_eq!(*log.borrow(), vec!["h:1", "h:2"]);
}

// ── unsubscribe ──────────────────────────────────────────────────

#[test]
fn unsubscribe_by_id_removes_only_that_handler() {
    let log: Log = Rc::default();
    let mut bus = EventBus::new();
    let a = bus.subscribe("change", recorder(&log, "a"));
    bus.subscribe("change", recorder(&log, "b"));

    assert_eq!(bus.unsubscribe("change", Some(a)), 1);
    bus.publish("change", &"1".to_string());
    assert_eq!(*log.borrow(), vec!["b:1"]);
}

#[test]
fn unsubscribe_without_id_removes_all_handlers_of_event() {
    let log: Log = Rc::default();
    let mut bus = EventBus::new();
    bus.subscribe("change", recorder(&log, "a"));
    bus.subscribe("change", recorder(&log, "b"));
    bus.subscribe("saved", recorder(&log, "s"));

    assert_eq!(bus.unsubscribe("change", None), 2);
    assert_eq!(bus.handler_count("change"), 0);
    assert_eq!(bus.handler_count("saved"), 1);
}

#[test]
fn unsubscribe_unknown_id_is_noop() {
    let log: Log = Rc::default();
    let mut bus = EventBus::new();
    bus.subscribe("change", recorder(&log, "a"));

    assert_eq!(bus.unsubscribe("change", Some(SubscriptionId::new())), 0);
    assert_eq!(bus.unsubscribe("missing", None), 0);
    assert_eq!(bus.handler_count("change"), 1);
}

// ── SubscriptionId ───────────────────────────────────────────────

#[test]
fn subscription_ids_are_unique() {
    let mut bus: EventBus<String> = EventBus::new();
    let a = bus.subscribe("change", Box::new(|_| {}));
    let b = bus.subscribe("change", Box::new(|_| {}));
    assert_ne!(a, b);
}

#[test]
fn subscription_id_display_roundtrip() {
    let id = SubscriptionId::new();
    let parsed: SubscriptionId = id.to_string().parse().unwrap();
    assert_eq!(id, parsed);
}

#[test]
fn subscription_id_serde_is_transparent() {
    let id = SubscriptionId::new();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, format!("\"{id}\""));
    let parsed: SubscriptionId = serde_json::from_str(&json).unwrap();
    assert_eq!(id, parsed);
}
