//! View-update suppression.
//!
//! Batched edits are bracketed by a suppression scope so the host editor does
//! not redraw layout and cursor for every single mutation. The guard is
//! reference-counted and re-enables on drop, on every exit path including
//! unwinds.

use std::cell::Cell;
use std::rc::Rc;

/// RAII guard holding one level of view-update suppression.
#[must_use = "dropping the guard immediately re-enables view updates"]
pub struct ViewSuspension {
    depth: Rc<Cell<u32>>,
}

impl ViewSuspension {
    pub(crate) fn acquire(depth: &Rc<Cell<u32>>) -> Self {
        depth.set(depth.get() + 1);
        Self {
            depth: Rc::clone(depth),
        }
    }
}

impl Drop for ViewSuspension {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nesting_and_release() {
        let depth = Rc::new(Cell::new(0));
        {
            let _outer = ViewSuspension::acquire(&depth);
            assert_eq!(depth.get(), 1);
            {
                let _inner = ViewSuspension::acquire(&depth);
                assert_eq!(depth.get(), 2);
            }
            assert_eq!(depth.get(), 1);
        }
        assert_eq!(depth.get(), 0);
    }
}
