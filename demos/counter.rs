//! Counter Demo - Hook state driving host mutations
//!
//! Mounts a small component tree into a `MemoryHost`, dispatches a few
//! updates and prints what each commit did to the host tree.
//!
//! Run with: RUST_LOG=spark_reconciler=debug cargo run --example counter

use std::cell::RefCell;
use std::rc::Rc;

use spark_reconciler::{
    Component, Dispatch, Element, MemoryHost, Node, ReconcileError, Root, RootOptions,
    create_root_with_options, use_state,
};

fn print_commit(step: &str, root: &Root<MemoryHost>) {
    let summary = root.last_commit();
    let ops = root.with_host(|host| host.take_ops());
    println!("--- {step}");
    println!("markup:  {}", root.with_host(|host| host.to_markup()));
    println!(
        "commit:  {} placed, {} updated, {} deleted",
        summary.placements, summary.updates, summary.deletions
    );
    for op in ops {
        println!("  host:  {op:?}");
    }
}

fn main() -> Result<(), ReconcileError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("=== spark-reconciler Counter Demo ===\n");

    // The component publishes its dispatch handle so main can drive it
    let handle: Rc<RefCell<Option<Dispatch<i32>>>> = Rc::default();

    let banner = Component::new("Banner", |_| {
        Ok(Element::host("span").with_child("mini-react").into())
    });

    let counter = {
        let handle = handle.clone();
        let banner = banner.clone();
        Component::new("Counter", move |_| {
            let (num, set_num) = use_state(100)?;
            handle.borrow_mut().replace(set_num);

            Ok(match num {
                0 => Element::component(&banner).into(),
                1 => Element::host("div").with_key("1").with_child("haha").into(),
                n => Element::host("div").with_key("1").with_child(n).into(),
            })
        })
    };

    let host = MemoryHost::new();
    let container = host.container();
    let root = create_root_with_options(host, container, RootOptions::default().with_label("demo"));

    root.render(Element::component(&counter))?;
    print_commit("mount", &root);

    let Some(set_num) = handle.borrow().clone() else {
        return Ok(());
    };

    set_num.set(1)?;
    print_commit("set(1): text patched in place", &root);

    set_num.update(|n| n + 41)?;
    print_commit("update(+41)", &root);

    set_num.set(0)?;
    print_commit("set(0): div replaced by a component", &root);

    root.render(Node::Empty)?;
    print_commit("unmount", &root);

    set_num.set(5)?;
    println!("\nDispatch after unmount is ignored: {:?}", root.with_host(|host| host.to_markup()));

    Ok(())
}
