//! End-to-end render scenarios against the in-memory host.
//!
//! Each test drives a root through the public API and checks the host tree,
//! the recorded host calls and the committed fiber tree.
//!
//! Run with: cargo test --test scenarios -- --nocapture

use std::cell::RefCell;
use std::rc::Rc;

use spark_reconciler::{
    Component, Dispatch, Element, Flags, HookError, HostOp, MemoryHost, Node, PropValue,
    ReconcileError, RenderError, Root, RootOptions, create_root, create_root_with_options,
    update_root, use_state,
};

// =============================================================================
// Helpers
// =============================================================================

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn memory_root() -> Root<MemoryHost> {
    init_logger();
    let host = MemoryHost::new();
    let container = host.container();
    create_root(host, container)
}

fn markup(root: &Root<MemoryHost>) -> String {
    root.with_host(|host| host.to_markup())
}

fn take_ops(root: &Root<MemoryHost>) -> Vec<HostOp> {
    root.with_host(|host| host.take_ops())
}

fn fiber_count(root: &Root<MemoryHost>) -> usize {
    root.with_fibers(|tree, _| tree.len())
}

/// Slot a component writes its latest dispatch handle into.
type Captured<S> = Rc<RefCell<Vec<Dispatch<S>>>>;

fn latest<S>(captured: &Captured<S>) -> Dispatch<S> {
    captured
        .borrow()
        .last()
        .cloned()
        .expect("component rendered at least once")
}

/// Every committed fiber carries no flags and no staged deletions.
fn assert_clean(root: &Root<MemoryHost>) {
    root.with_fibers(|tree, current| {
        for id in tree.subtree(current) {
            let fiber = &tree[id];
            assert_eq!(fiber.flags, Flags::NONE, "flags left on `{}`", fiber.display_name());
            assert_eq!(
                fiber.subtree_flags,
                tree.collect_subtree_flags(id),
                "subtree flags out of sync on `{}`",
                fiber.display_name()
            );
            assert!(fiber.deletions.is_empty());
        }
    });
}

// =============================================================================
// Mount
// =============================================================================

#[test]
fn test_mount_host_element_with_text() {
    let root = memory_root();
    update_root(Element::host("div").with_child("100"), &root).unwrap();

    assert_eq!(markup(&root), "<div>100</div>");
    assert_eq!(
        take_ops(&root),
        vec![
            HostOp::CreateTextInstance {
                id: 1,
                content: "100".into()
            },
            HostOp::CreateInstance {
                id: 2,
                tag: "div".into()
            },
            HostOp::AppendInitialChild {
                parent: 2,
                child: 1
            },
            HostOp::AppendToContainer {
                parent: 0,
                child: 2
            },
        ],
        "the subtree is built detached and attached once"
    );
    assert_eq!(root.last_commit().placements, 1);
    assert_clean(&root);
}

#[test]
fn test_component_layers_have_no_host_node() {
    let inner = Component::new("Inner", |_| {
        Ok(Element::host("b").with_child("deep").into())
    });
    let outer = {
        let inner = inner.clone();
        Component::new("Outer", move |_| Ok(Element::component(&inner).into()))
    };

    let root = memory_root();
    root.render(Element::component(&outer)).unwrap();

    assert_eq!(markup(&root), "<b>deep</b>");
    let attaches = take_ops(&root)
        .into_iter()
        .filter(|op| matches!(op, HostOp::AppendToContainer { .. }))
        .count();
    assert_eq!(attaches, 1);
}

#[test]
fn test_props_reach_host_and_components() {
    let label = Component::new("Label", |props| {
        let text = match props.get("text") {
            Some(PropValue::Str(text)) => Node::Text(text.clone()),
            _ => Node::Empty,
        };
        Ok(Element::host("label").with_prop("for", "name").with_child(text).into())
    });

    let root = memory_root();
    root.render(Element::component(&label).with_prop("text", "Name"))
        .unwrap();
    assert_eq!(markup(&root), "<label for=\"name\">Name</label>");
}

// =============================================================================
// Updates
// =============================================================================

#[test]
fn test_state_update_patches_text_in_place() {
    let captured: Captured<i32> = Rc::default();
    let app = {
        let captured = captured.clone();
        Component::new("App", move |_| {
            let (num, set_num) = use_state(100)?;
            captured.borrow_mut().push(set_num);
            let child: Node = if num == 1 { "haha".into() } else { num.into() };
            Ok(Element::host("div").with_key("1").with_child(child).into())
        })
    };

    let root = memory_root();
    root.render(Element::component(&app)).unwrap();
    assert_eq!(markup(&root), "<div>100</div>");
    let div_before = root.container().children()[0].clone();
    take_ops(&root);

    latest(&captured).set(1).unwrap();

    assert_eq!(markup(&root), "<div>haha</div>");
    assert_eq!(
        take_ops(&root),
        vec![HostOp::CommitTextUpdate {
            id: 1,
            content: "haha".into()
        }],
        "same key and type: only the text is patched"
    );
    assert_eq!(root.container().children()[0], div_before, "div identity kept");
    assert_eq!(root.last_commit().updates, 1);
    assert_clean(&root);
}

#[test]
fn test_functional_updates_compose() {
    let captured: Captured<i32> = Rc::default();
    let counter = {
        let captured = captured.clone();
        Component::new("Counter", move |_| {
            let (count, set_count) = use_state(0)?;
            captured.borrow_mut().push(set_count);
            Ok(Node::from(count))
        })
    };

    let root = memory_root();
    root.render(Element::component(&counter)).unwrap();

    let dispatch = latest(&captured);
    dispatch.update(|n| n + 1).unwrap();
    dispatch.update(|n| n * 10).unwrap();
    assert_eq!(markup(&root), "10");

    dispatch.set(7).unwrap();
    assert_eq!(markup(&root), "7");
}

#[test]
fn test_dispatch_identity_is_stable() {
    let captured: Captured<i32> = Rc::default();
    let counter = {
        let captured = captured.clone();
        Component::new("Counter", move |_| {
            let (count, set_count) = use_state(0)?;
            captured.borrow_mut().push(set_count);
            Ok(Node::from(count))
        })
    };

    let root = memory_root();
    root.render(Element::component(&counter)).unwrap();
    latest(&captured).set(1).unwrap();
    latest(&captured).set(2).unwrap();

    let handles = captured.borrow();
    assert_eq!(handles.len(), 3);
    assert!(handles[0].ptr_eq(&handles[1]));
    assert!(handles[1].ptr_eq(&handles[2]));
}

#[test]
fn test_rerender_same_description_is_noop() {
    let root = memory_root();
    let describe = || Element::host("div").with_key("1").with_child("same");

    root.render(describe()).unwrap();
    let div = root.container().children()[0].clone();
    take_ops(&root);

    root.render(describe()).unwrap();

    assert!(root.last_commit().is_empty());
    assert!(take_ops(&root).is_empty(), "no host calls for an unchanged tree");
    assert_eq!(root.container().children()[0], div);
    root.with_fibers(|tree, current| {
        assert_eq!(tree[current].aggregate_flags(), Flags::NONE);
    });
}

#[test]
fn test_toggle_replaces_instance() {
    let captured: Captured<bool> = Rc::default();
    let app = {
        let captured = captured.clone();
        Component::new("App", move |_| {
            let (on, set_on) = use_state(false)?;
            captured.borrow_mut().push(set_on);
            Ok(if on {
                Element::host("div").with_child("haha").into()
            } else {
                Element::host("span").with_child("mini-react").into()
            })
        })
    };

    let root = memory_root();
    root.render(Element::component(&app)).unwrap();
    assert_eq!(markup(&root), "<span>mini-react</span>");
    take_ops(&root);

    latest(&captured).set(true).unwrap();

    assert_eq!(markup(&root), "<div>haha</div>");
    let mutations: Vec<HostOp> = take_ops(&root)
        .into_iter()
        .filter(HostOp::is_mutation)
        .collect();
    assert_eq!(
        mutations,
        vec![
            HostOp::AppendInitialChild {
                parent: 4,
                child: 3
            },
            HostOp::AppendToContainer {
                parent: 0,
                child: 4
            },
            HostOp::RemoveChild {
                parent: 0,
                child: 2
            },
        ]
    );

    let summary = root.last_commit();
    assert_eq!((summary.placements, summary.deletions), (1, 1));
    assert_eq!(summary.released_fibers, 2, "span and its text");
    assert_clean(&root);

    latest(&captured).set(false).unwrap();
    assert_eq!(markup(&root), "<span>mini-react</span>");
}

#[test]
fn test_element_to_text_flip() {
    let root = memory_root();
    root.render(Element::host("div").with_child(Element::host("i"))).unwrap();
    root.render(Element::host("div").with_child(5)).unwrap();
    assert_eq!(markup(&root), "<div>5</div>");

    root.render(Element::host("div").with_child(Element::host("i"))).unwrap();
    assert_eq!(markup(&root), "<div><i></i></div>");
    assert_clean(&root);
}

#[test]
fn test_key_change_remounts_component_state() {
    let captured: Captured<i32> = Rc::default();
    let counter = {
        let captured = captured.clone();
        Component::new("Counter", move |_| {
            let (count, set_count) = use_state(0)?;
            captured.borrow_mut().push(set_count);
            Ok(Node::from(count))
        })
    };

    let root = memory_root();
    root.render(Element::component(&counter).with_key("a")).unwrap();
    let old = latest(&captured);
    old.set(5).unwrap();
    assert_eq!(markup(&root), "5");

    root.render(Element::component(&counter).with_key("b")).unwrap();
    assert_eq!(markup(&root), "0", "new key mounts fresh state");
    assert!(!latest(&captured).ptr_eq(&old));

    take_ops(&root);
    old.set(9).unwrap();
    assert_eq!(markup(&root), "0", "the old instance is gone");
    assert!(take_ops(&root).is_empty());
}

// =============================================================================
// Unmount / teardown
// =============================================================================

#[test]
fn test_update_after_unmount_is_ignored() {
    let captured: Captured<i32> = Rc::default();
    let child = {
        let captured = captured.clone();
        Component::new("Child", move |_| {
            let (n, set_n) = use_state(1)?;
            captured.borrow_mut().push(set_n);
            Ok(Element::host("p").with_child(n).into())
        })
    };

    let root = memory_root();
    root.render(Element::component(&child)).unwrap();
    root.render(Node::Empty).unwrap();
    assert_eq!(markup(&root), "");
    assert_eq!(fiber_count(&root), 2, "only the root pair survives");
    take_ops(&root);

    assert_eq!(latest(&captured).set(2), Ok(()));
    assert!(take_ops(&root).is_empty());
}

#[test]
fn test_dispatch_after_root_dropped() {
    let captured: Captured<i32> = Rc::default();
    let child = {
        let captured = captured.clone();
        Component::new("Child", move |_| {
            let (n, set_n) = use_state(1)?;
            captured.borrow_mut().push(set_n);
            Ok(Node::from(n))
        })
    };

    let root = memory_root();
    root.render(Element::component(&child)).unwrap();
    drop(root);

    assert_eq!(latest(&captured).set(2), Ok(()));
}

#[test]
fn test_list_children_degrade_to_nothing() {
    let root = memory_root();
    root.render(Element::host("ul").with_child(Node::list([
        Element::host("li").into(),
        Element::host("li").into(),
    ])))
    .unwrap();
    assert_eq!(markup(&root), "<ul></ul>");
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_use_state_outside_render() {
    init_logger();
    assert_eq!(use_state(0).unwrap_err(), HookError::OutsideRender);
}

#[test]
fn test_hook_count_change_is_fatal() {
    let captured: Captured<bool> = Rc::default();
    let flaky = {
        let captured = captured.clone();
        Component::new("Flaky", move |_| {
            let (extra, set_extra) = use_state(false)?;
            captured.borrow_mut().push(set_extra);
            if extra {
                use_state(0)?;
            }
            Ok(Node::from("stable"))
        })
    };

    let root = memory_root();
    root.render(Element::component(&flaky)).unwrap();
    let fibers = fiber_count(&root);

    let err = latest(&captured).set(true).unwrap_err();
    assert_eq!(
        err,
        ReconcileError::Hook(HookError::TooManyHooks {
            component: "Flaky".into(),
            expected: 1,
        })
    );
    assert_eq!(markup(&root), "stable", "committed tree untouched");
    assert_eq!(fiber_count(&root), fibers, "partial tree discarded");
    assert!(!root.is_rendering());
}

#[test]
fn test_component_failure_aborts_pass_only() {
    let fragile = Component::new("Fragile", |props| {
        if props.get("fail") == Some(&PropValue::Bool(true)) {
            return Err(RenderError::component("refused"));
        }
        Ok(Element::host("p").with_child("ok").into())
    });

    let root = memory_root();
    root.render(Element::component(&fragile).with_prop("fail", false))
        .unwrap();
    let fibers = fiber_count(&root);
    let before = root.last_commit();
    take_ops(&root);

    let result = root.render(Element::component(&fragile).with_prop("fail", true));
    assert!(result.is_ok(), "component failures are not returned");
    assert_eq!(markup(&root), "<p>ok</p>");
    assert_eq!(fiber_count(&root), fibers);
    assert_eq!(root.last_commit(), before, "nothing was committed");
    assert!(take_ops(&root).iter().all(|op| !op.is_mutation()));

    root.render(Element::component(&fragile).with_prop("fail", false))
        .unwrap();
    assert_eq!(markup(&root), "<p>ok</p>");
    assert_clean(&root);
}

// =============================================================================
// Updates during a pass
// =============================================================================

#[test]
fn test_dispatch_during_render_runs_follow_up_pass() {
    let settle = Component::new("Settle", |_| {
        let (n, set_n) = use_state(0)?;
        if n < 3 {
            set_n.update(|n| n + 1).map_err(RenderError::component)?;
        }
        Ok(Node::from(n))
    });

    let root = memory_root();
    root.render(Element::component(&settle)).unwrap();
    assert_eq!(markup(&root), "3");
    assert!(!root.is_rendering());
}

#[test]
fn test_runaway_updates_hit_the_limit() {
    init_logger();
    let runaway = Component::new("Runaway", |_| {
        let (n, set_n) = use_state(0)?;
        set_n.update(|n| n + 1).map_err(RenderError::component)?;
        Ok(Node::from(n))
    });

    let host = MemoryHost::new();
    let container = host.container();
    let root = create_root_with_options(
        host,
        container,
        RootOptions::default()
            .with_nested_update_limit(3)
            .with_label("runaway"),
    );

    let err = root.render(Element::component(&runaway)).unwrap_err();
    assert_eq!(err, ReconcileError::NestedUpdateLimit { limit: 3 });
    assert!(!root.is_rendering());
}

#[test]
fn test_roots_are_independent() {
    let left = memory_root();
    let right = memory_root();

    left.render(Element::host("aside")).unwrap();
    right.render("plain").unwrap();

    assert_eq!(markup(&left), "<aside></aside>");
    assert_eq!(markup(&right), "plain");
}
