//! Event propagation through the node tree

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rstest::{fixture, rstest};

use domtree::domain::{DomainError, Event, ListenerResult, Node, NodeRef};
use domtree::util::testing;

type Calls = Rc<RefCell<Vec<String>>>;

fn record(calls: &Calls, name: &str) -> impl Fn(&Event) -> ListenerResult + 'static {
    let calls = Rc::clone(calls);
    let name = name.to_string();
    move |_| {
        calls.borrow_mut().push(name.clone());
        Ok(())
    }
}

/// div
/// - img (1.png)
/// - img (2.png)
/// - div
/// - - img (3.png)
struct Page {
    root: NodeRef,
    first: NodeRef,
    second: NodeRef,
    nested: NodeRef,
    third: NodeRef,
}

#[fixture]
fn page() -> Page {
    testing::init_test_setup();
    let first = Node::image("1.png", "first");
    let second = Node::image("2.png", "second");
    let third = Node::image("3.png", "third");
    let nested = Node::container(vec![Rc::clone(&third)], None).unwrap();
    let root = Node::container(
        vec![Rc::clone(&first), Rc::clone(&second), Rc::clone(&nested)],
        None,
    )
    .unwrap();
    Page {
        root,
        first,
        second,
        nested,
        third,
    }
}

// ============================================================
// Delivery order
// ============================================================

#[rstest]
fn given_listeners_on_root_and_first_leaf_when_emit_then_two_calls_in_order(page: Page) {
    let calls: Calls = Rc::default();
    page.root.on("click", record(&calls, "L1"));
    page.first.on("click", record(&calls, "L2"));

    page.root.emit("click").unwrap();

    assert_eq!(*calls.borrow(), vec!["L1", "L2"]);
}

#[rstest]
fn given_listeners_on_every_node_when_emit_then_preorder_with_local_listeners_first(page: Page) {
    let calls: Calls = Rc::default();
    page.root.on("click", record(&calls, "root.0"));
    page.root.on("click", record(&calls, "root.1"));
    page.first.on("click", record(&calls, "first.0"));
    page.second.on("click", record(&calls, "second.0"));
    page.nested.on("click", record(&calls, "nested.0"));
    page.nested.on("click", record(&calls, "nested.1"));
    page.third.on("click", record(&calls, "third.0"));

    page.root.emit("click").unwrap();

    assert_eq!(
        *calls.borrow(),
        vec!["root.0", "root.1", "first.0", "second.0", "nested.0", "nested.1", "third.0"]
    );
}

#[rstest]
fn given_emit_on_leaf_when_emit_then_only_leaf_listeners_fire(page: Page) {
    let calls: Calls = Rc::default();
    page.root.on("click", record(&calls, "root"));
    page.first.on("click", record(&calls, "first"));
    page.second.on("click", record(&calls, "second"));

    page.first.emit("click").unwrap();

    assert_eq!(*calls.borrow(), vec!["first"]);
}

#[rstest]
fn given_emit_on_inner_composite_when_emit_then_ancestors_untouched(page: Page) {
    let calls: Calls = Rc::default();
    page.root.on("click", record(&calls, "root"));
    page.nested.on("click", record(&calls, "nested"));
    page.third.on("click", record(&calls, "third"));

    page.nested.emit("click").unwrap();

    assert_eq!(*calls.borrow(), vec!["nested", "third"]);
}

#[rstest]
fn given_same_callback_registered_twice_when_emit_then_invoked_twice(page: Page) {
    let count = Rc::new(RefCell::new(0));
    let callback: Rc<dyn Fn(&Event) -> ListenerResult> = {
        let count = Rc::clone(&count);
        Rc::new(move |_: &Event| -> ListenerResult {
            *count.borrow_mut() += 1;
            Ok(())
        })
    };
    for _ in 0..2 {
        let callback = Rc::clone(&callback);
        page.second.on("click", move |e| callback(e));
    }

    page.root.emit("click").unwrap();
    assert_eq!(*count.borrow(), 2);

    page.second.emit("click").unwrap();
    assert_eq!(*count.borrow(), 4);
}

#[rstest]
fn given_other_event_name_when_emit_then_nothing_fires(page: Page) {
    let calls: Calls = Rc::default();
    page.root.on("hover", record(&calls, "root"));

    page.root.emit("click").unwrap();

    assert!(calls.borrow().is_empty());
}

#[rstest]
fn given_listeners_when_emit_then_source_is_current_node(page: Page) {
    let sources: Calls = Rc::default();
    for (_, node) in page.root.walk() {
        let sources = Rc::clone(&sources);
        node.on("click", move |e: &Event| {
            assert_eq!(e.name, "click");
            sources.borrow_mut().push(e.source.describe());
            Ok(())
        });
    }

    page.root.emit("click").unwrap();

    assert_eq!(
        *sources.borrow(),
        vec![
            "div",
            "img src=1.png alt=first",
            "img src=2.png alt=second",
            "div",
            "img src=3.png alt=third"
        ]
    );
}

// ============================================================
// Fail-fast
// ============================================================

#[rstest]
fn given_failing_listener_on_middle_sibling_when_emit_then_later_nodes_skipped(page: Page) {
    let calls: Calls = Rc::default();
    page.root.on("click", record(&calls, "root"));
    page.first.on("click", record(&calls, "first"));
    page.second.on("click", record(&calls, "second"));
    page.second.on("click", |_| Err("second broke".into()));
    page.second.on("click", record(&calls, "second.after"));
    page.nested.on("click", record(&calls, "nested"));
    page.third.on("click", record(&calls, "third"));

    let err = page.root.emit("click").unwrap_err();

    // no rollback of earlier calls
    assert_eq!(*calls.borrow(), vec!["root", "first", "second"]);
    match err {
        DomainError::ListenerFailed {
            event,
            label,
            source,
        } => {
            assert_eq!(event, "click");
            assert_eq!(label, "img");
            assert_eq!(source.to_string(), "second broke");
        }
        other => panic!("unexpected error: {other}"),
    }
}

// ============================================================
// Re-entrancy
// ============================================================

#[rstest]
fn given_listener_registering_listener_when_emit_then_new_listener_fires_next_time(page: Page) {
    let calls: Calls = Rc::default();
    let first = Rc::downgrade(&page.first);
    let c = Rc::clone(&calls);
    page.first.on("click", move |_| {
        c.borrow_mut().push("outer".to_string());
        if let Some(first) = first.upgrade() {
            let c = Rc::clone(&c);
            first.on("click", move |_| {
                c.borrow_mut().push("inner".to_string());
                Ok(())
            });
        }
        Ok(())
    });

    page.root.emit("click").unwrap();
    assert_eq!(*calls.borrow(), vec!["outer"]);

    page.root.emit("click").unwrap();
    assert_eq!(*calls.borrow(), vec!["outer", "outer", "inner"]);
}

#[rstest]
fn given_listener_emitting_other_event_when_emit_then_nested_emit_completes(page: Page) {
    let calls: Calls = Rc::default();
    page.third.on("focus", record(&calls, "third.focus"));

    let nested = Rc::downgrade(&page.nested);
    let c = Rc::clone(&calls);
    page.nested.on("click", move |_| {
        c.borrow_mut().push("nested.click".to_string());
        if let Some(nested) = nested.upgrade() {
            nested.emit("focus")?;
        }
        Ok(())
    });
    page.third.on("click", record(&calls, "third.click"));

    page.root.emit("click").unwrap();

    assert_eq!(
        *calls.borrow(),
        vec!["nested.click", "third.focus", "third.click"]
    );
}

#[rstest]
fn given_listener_reemitting_on_own_node_when_emit_then_guarded_reentry_completes(page: Page) {
    let calls: Calls = Rc::default();
    let depth = Rc::new(Cell::new(0));
    let nested = Rc::downgrade(&page.nested);
    let c = Rc::clone(&calls);
    let d = Rc::clone(&depth);
    page.nested.on("click", move |_| {
        c.borrow_mut().push(format!("nested.{}", d.get()));
        if d.get() == 0 {
            if let Some(nested) = nested.upgrade() {
                d.set(1);
                let result = nested.emit("click");
                d.set(0);
                result?;
            }
        }
        Ok(())
    });
    page.third.on("click", record(&calls, "third"));

    page.root.emit("click").unwrap();

    assert_eq!(
        *calls.borrow(),
        vec!["nested.0", "nested.1", "third", "third"]
    );
}

// ============================================================
// Structure
// ============================================================

#[rstest]
fn given_node_reused_within_one_subtree_when_building_then_rejected(page: Page) {
    let result = Node::container(vec![Rc::clone(&page.nested), Rc::clone(&page.third)], None);
    assert!(matches!(result, Err(DomainError::DuplicateNode { .. })));
}

#[test]
fn given_leaf_owned_by_one_parent_when_second_parent_built_then_rejected() {
    testing::init_test_setup();
    let leaf = Node::image("1.png", "first");
    let calls: Calls = Rc::default();
    leaf.on("click", record(&calls, "leaf"));

    let first = Node::container(vec![Rc::clone(&leaf)], None).unwrap();
    let second = Node::composite("section", vec![Rc::clone(&leaf)]);

    match second {
        Err(DomainError::DuplicateNode { label }) => assert_eq!(label, "img"),
        other => panic!("expected duplicate node, got {other:?}"),
    }
    first.emit("click").unwrap();
    assert_eq!(*calls.borrow(), vec!["leaf"]);
}

#[rstest]
fn given_page_when_inspecting_then_counts_match(page: Page) {
    assert_eq!(page.root.node_count(), 5);
    assert_eq!(page.root.depth(), 3);
    assert_eq!(page.root.leaf_labels(), vec!["img", "img", "img"]);
    assert_eq!(page.root.children().len(), 3);
    assert!(page.third.is_leaf());
}
