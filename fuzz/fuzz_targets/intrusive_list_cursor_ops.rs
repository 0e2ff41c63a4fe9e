#![no_main]

use libfuzzer_sys::fuzz_target;
use refcache::ds::IntrusiveList;

// Fuzz cursor walks over IntrusiveList
//
// Each op byte pushes a value or walks the cursor a number of steps and then
// removes or promotes the node it stopped on. A Vec mirrors the expected order.
fuzz_target!(|data: &[u8]| {
    let mut list: IntrusiveList<u8> = IntrusiveList::new();
    let mut model: Vec<u8> = Vec::new();

    for pair in data.chunks_exact(2) {
        let op = pair[0] % 4;
        let arg = pair[1];

        match op {
            0 => {
                // push_front
                list.push_front(arg);
                model.insert(0, arg);
                assert_eq!(list.front(), Some(&arg));
            }
            1 | 2 => {
                // walk, then remove (1) or promote (2)
                if model.is_empty() {
                    let mut cursor = list.cursor_mut();
                    assert!(!cursor.move_next());
                    assert!(cursor.remove_current().is_err());
                    continue;
                }
                let steps = usize::from(arg) % model.len();
                let mut cursor = list.cursor_mut();
                for _ in 0..=steps {
                    assert!(cursor.move_next());
                }
                assert_eq!(cursor.current(), Some(&model[steps]));

                if op == 1 {
                    let removed = cursor.remove_current().unwrap();
                    assert_eq!(removed, model.remove(steps));
                    assert!(cursor.remove_current().is_err());
                } else {
                    cursor.move_current_to_front().unwrap();
                    let value = model.remove(steps);
                    model.insert(0, value);
                }

                // the cursor resumes after the node it just moved
                if cursor.move_next() {
                    let expected = if op == 1 { steps } else { steps + 1 };
                    assert_eq!(cursor.current(), model.get(expected));
                }
            }
            3 => {
                // full walk matches the model
                let mut cursor = list.cursor_mut();
                let mut seen = Vec::new();
                while cursor.move_next() {
                    seen.push(*cursor.current().unwrap());
                }
                assert_eq!(seen, model);
                assert!(!cursor.move_next());
            }
            _ => unreachable!(),
        }

        assert_eq!(list.len(), model.len());
        assert_eq!(list.back(), model.last());
        list.debug_validate_invariants();
    }
});
