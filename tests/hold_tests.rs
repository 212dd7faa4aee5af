extern crate tg_share;

use std::alloc::Layout;
use tg_share::alloc::{Hold, HoldError, TallyHold, global_hold};
use tg_share::share::{ShareError, StrongPtr};

#[test]
fn test_error_conversions() {
    assert_eq!(ShareError::from(HoldError::OutOfMemory), ShareError::OutOfMemory);
    assert_eq!(ShareError::from(HoldError::Unsupported("test")), ShareError::Unsupported("test"));
    assert_eq!(ShareError::Unsupported("test").to_string(), "unsupported: test");
    assert_eq!(HoldError::OutOfMemory.to_string(), "out of memory");
    assert_eq!(HoldError::Unsupported("test").to_string(), "unsupported allocation: test");
}

#[test]
fn test_global_hold_alloc_dealloc() {
    let hold = global_hold();
    let layout = Layout::new::<[u32; 4]>();
    unsafe {
        let data = match hold.alloc(layout) {
            Ok(data) => data,
            Err(error) => panic!("allocation failed: {}", error),
        };
        assert_eq!(data.as_ptr() as usize % layout.align(), 0);
        data.as_ptr().write_bytes(0xA5, layout.size());
        hold.dealloc(data, layout);
    }
}

#[test]
fn test_global_hold_zero_sized() {
    let hold = global_hold();
    let result = unsafe { hold.alloc(Layout::new::<()>()) };
    assert_eq!(result.err(), Some(HoldError::Unsupported("zero-sized block")));
}

#[test]
fn test_tally_hold_counts() {
    let hold = TallyHold::new();
    let small = Layout::new::<u64>();
    let large = Layout::new::<[u64; 8]>();
    unsafe {
        let x = Hold::alloc(&hold, small).unwrap();
        assert_eq!(hold.live(), 1);
        assert_eq!(hold.used(), 8);
        let y = Hold::alloc(&hold, large).unwrap();
        assert_eq!(hold.live(), 2);
        assert_eq!(hold.used(), 72);
        assert_eq!(hold.allocs(), 2);

        Hold::dealloc(&hold, x, small);
        assert_eq!(hold.live(), 1);
        assert_eq!(hold.used(), 64);
        Hold::dealloc(&hold, y, large);
    }
    assert_eq!(hold.live(), 0);
    assert_eq!(hold.used(), 0);
    assert_eq!(hold.allocs(), 2);
    assert_eq!(format!("{:?}", hold), "TallyHold { live: 0, used: 0, allocs: 2 }");
}

#[test]
fn test_tally_hold_shared_by_groups() {
    let hold = TallyHold::new();
    let x = StrongPtr::hold_new(&hold, 1u8);
    let y = StrongPtr::hold_from_box(&hold, Box::new(2u8));
    let z = x.clone();
    assert_eq!(hold.live(), 2);
    assert_eq!(hold.allocs(), 2);

    drop(x);
    drop(y);
    assert_eq!(hold.live(), 1);
    drop(z);
    assert_eq!(hold.live(), 0);
    assert_eq!(hold.used(), 0);
}
