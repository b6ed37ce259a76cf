use hatch_host::{
    HostError, MemoryDocument, Route, ScriptEvent, ScriptHost, ScriptListener, ScriptRequest,
};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct Recorder {
    events: RefCell<Vec<ScriptEvent>>,
}

impl ScriptListener for Recorder {
    fn on_event(&self, event: ScriptEvent) {
        self.events.borrow_mut().push(event);
    }
}

#[test]
fn request_carries_async_javascript_attributes() {
    let request = ScriptRequest::new("/bundle.js");
    assert!(request.is_async);
    assert_eq!(request.script_type, "text/javascript");
    assert_eq!(request.charset, "utf-8");
}

#[test]
fn error_route_reports_error_synchronously() {
    let document = MemoryDocument::new();
    let recorder = Rc::new(Recorder::default());
    document.route("/missing.js", Route::error());

    let node = document
        .append_script(&ScriptRequest::new("/missing.js"), recorder.clone())
        .expect("append should succeed");

    assert_eq!(*recorder.events.borrow(), vec![ScriptEvent::Error]);
    assert!(document.contains(node));
}

#[test]
fn hold_route_never_settles_on_its_own() {
    let document = MemoryDocument::new();
    let recorder = Rc::new(Recorder::default());
    document.route("/slow.js", Route::hold());

    document
        .append_script(&ScriptRequest::new("/slow.js"), recorder.clone())
        .expect("append should succeed");

    assert!(recorder.events.borrow().is_empty());
    assert_eq!(document.listeners(), 1);
}

#[test]
fn removed_node_leaves_the_head() {
    let document = MemoryDocument::new();
    let recorder = Rc::new(Recorder::default());

    let first = document
        .append_script(&ScriptRequest::new("/a.js"), recorder.clone())
        .expect("append should succeed");
    let second = document
        .append_script(&ScriptRequest::new("/b.js"), recorder)
        .expect("append should succeed");
    assert_ne!(first, second);

    document.remove_script(first).expect("node should be attached");

    assert!(!document.is_attached("/a.js"));
    assert!(document.is_attached("/b.js"));
    assert_eq!(document.injections("/a.js"), 1);
    assert!(matches!(document.remove_script(first), Err(HostError::NodeNotFound { .. })));
}

#[test]
fn fire_targets_the_oldest_listening_node() {
    let document = MemoryDocument::new();
    let first = Rc::new(Recorder::default());
    let second = Rc::new(Recorder::default());

    document.append_script(&ScriptRequest::new("/x.js"), first.clone()).expect("append");
    document.append_script(&ScriptRequest::new("/x.js"), second.clone()).expect("append");

    assert!(document.fire("/x.js", ScriptEvent::Load));
    assert_eq!(*first.events.borrow(), vec![ScriptEvent::Load]);
    assert!(second.events.borrow().is_empty());
    assert!(!document.fire("/nope.js", ScriptEvent::Load));
}
