#![no_main]

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use arbitrary::Arbitrary;
use attrwatch_core::Element;
use attrwatch_values::{FnDelegate, ValueListObserver, parse_from_str};
use libfuzzer_sys::fuzz_target;

const ATTR: &str = "data-n";

#[derive(Arbitrary, Debug)]
enum FuzzOp {
    Set { target: bool, words: Vec<u8> },
    Remove { target: bool },
    Detach,
    Attach,
    Refresh,
    Start,
    Stop,
    Sweep,
}

fn word(b: u8) -> String {
    match b % 5 {
        0 => "x".to_string(),
        1 => (b / 5).to_string(),
        _ => (b % 8).to_string(),
    }
}

fuzz_target!(|ops: Vec<FuzzOp>| {
    let root = Element::new("root");
    let child = Element::new("child");
    let _ = root.append_child(&child);

    let live: Rc<RefCell<BTreeMap<u8, i64>>> = Rc::default();
    let on_match = Rc::clone(&live);
    let on_unmatch = Rc::clone(&live);
    let delegate = FnDelegate::new(parse_from_str::<u8>)
        .on_matched(move |_, v| *on_match.borrow_mut().entry(*v).or_default() += 1)
        .on_unmatched(move |_, v| {
            let mut live = on_unmatch.borrow_mut();
            let count = live.entry(*v).or_default();
            *count -= 1;
            assert!(*count >= 0, "value {v} unmatched more often than matched");
        });
    let mut obs = ValueListObserver::new(root.clone(), ATTR, delegate);

    for op in ops.into_iter().take(256) {
        let target = |t: bool| if t { &child } else { &root };
        match op {
            FuzzOp::Set { target: t, words } => {
                let value: Vec<String> = words.into_iter().take(16).map(word).collect();
                target(t).set_attribute(ATTR, value.join(" "));
            }
            FuzzOp::Remove { target: t } => {
                target(t).remove_attribute(ATTR);
            }
            FuzzOp::Detach => {
                root.remove_child(&child);
            }
            FuzzOp::Attach => {
                let _ = root.append_child(&child);
            }
            FuzzOp::Refresh => obs.refresh(),
            FuzzOp::Start => obs.start(),
            FuzzOp::Stop => obs.stop(),
            FuzzOp::Sweep => {
                obs.sweep();
            }
        }
        let tracked: i64 = live.borrow().values().sum();
        assert_eq!(obs.matched_count() as i64, tracked);
    }
});
