#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

/// Enables trace logging for the test binary; repeat calls are ignored.
pub fn init_logger() {
    let _ = simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Trace)
        .init();
}

/// Counts how many `Tracked` values tied to it have been dropped.
#[derive(Clone, Debug, Default)]
pub struct DropTally {
    drops: Rc<Cell<usize>>,
}

impl DropTally {
    pub fn new() -> DropTally {
        DropTally::default()
    }

    pub fn track<T>(&self, value: T) -> Tracked<T> {
        Tracked { value, tally: self.clone() }
    }

    pub fn drops(&self) -> usize {
        self.drops.get()
    }
}

/// A value that reports its drop to a `DropTally`.
#[derive(Debug)]
pub struct Tracked<T> {
    pub value: T,
    tally: DropTally,
}

impl<T> Drop for Tracked<T> {
    fn drop(&mut self) {
        self.tally.drops.set(self.tally.drops.get() + 1);
    }
}
