//! Free-list allocator over fixed-size cells holding tagged values.
//!
//! Mirrors the pool design of the original "sl" interpreter
//! (`expr_pool.c`): a linked list of backing arrays, threaded into a single
//! free list for O(1) allocation and release. Rust has no safe
//! pointer-to-union-member aliasing, so a cell is addressed by
//! `(array index, slot index)` instead of a raw pointer, and the
//! free/occupied distinction is carried as an enum discriminant (`Slot`)
//! rather than a flag bit shared with a C union.

use crate::value::Value;

/// Size of the first backing array, matching `POOL_BASE_SZ` in the source
/// interpreter.
pub const POOL_BASE_SIZE: usize = 512;

/// A stable address for a live or free pool cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRef {
    array: u32,
    slot: u32,
}

enum Slot {
    Free(Option<CellRef>),
    Occupied(Value),
}

struct Cell {
    marked: bool,
    slot: Slot,
}

/// A single backing array of cells. Once allocated, never resized in
/// place; new capacity comes from a fresh array, not reallocation.
struct BackingArray {
    cells: Vec<Cell>,
}

/// The value pool. Owns every live and free cell in the interpreter.
pub struct Pool {
    arrays: Vec<BackingArray>,
    free_head: Option<CellRef>,
}

impl Pool {
    /// Allocates the first backing array of `initial_size` cells, threads
    /// them into the free list, and marks them all free.
    pub fn new(initial_size: usize) -> Self {
        let mut pool = Pool {
            arrays: Vec::new(),
            free_head: None,
        };
        pool.expand(initial_size.max(1));
        pool
    }

    /// Appends a new backing array of `extra` cells, prepending it onto the
    /// free list ahead of any existing free cells.
    pub fn expand(&mut self, extra: usize) {
        let array_index = self.arrays.len() as u32;
        let mut cells = Vec::with_capacity(extra);
        for i in 0..extra {
            let next = if i + 1 < extra {
                Some(CellRef {
                    array: array_index,
                    slot: (i + 1) as u32,
                })
            } else {
                self.free_head
            };
            cells.push(Cell {
                marked: false,
                slot: Slot::Free(next),
            });
        }
        self.arrays.push(BackingArray { cells });
        self.free_head = Some(CellRef {
            array: array_index,
            slot: 0,
        });
    }

    /// Pops a cell from the free list and stores `value` in it. Returns
    /// `None` when the free list is exhausted; callers that want automatic
    /// growth should use [`Pool::alloc_or_expand`].
    pub fn alloc(&mut self, value: Value) -> Option<CellRef> {
        let cell_ref = self.free_head?;
        let cell = self.cell_mut(cell_ref);
        let next = match cell.slot {
            Slot::Free(next) => next,
            Slot::Occupied(_) => unreachable!("free list pointed at an occupied cell"),
        };
        cell.marked = false;
        cell.slot = Slot::Occupied(value);
        self.free_head = next;
        Some(cell_ref)
    }

    /// Allocates `value`, expanding the pool by `grow_by` cells first if the
    /// free list is empty.
    pub fn alloc_or_expand(&mut self, value: Value, grow_by: usize) -> CellRef {
        if self.free_head.is_none() {
            self.expand(grow_by.max(1));
        }
        self.alloc(value)
            .expect("pool expansion failed to produce a free cell")
    }

    /// Releases `cell_ref`'s owned sub-resources (by dropping the stored
    /// `Value`) and returns the cell to the free list.
    pub fn free(&mut self, cell_ref: CellRef) {
        let head = self.free_head;
        let cell = self.cell_mut(cell_ref);
        cell.marked = false;
        cell.slot = Slot::Free(head);
        self.free_head = Some(cell_ref);
    }

    pub fn get(&self, cell_ref: CellRef) -> &Value {
        match &self.cell(cell_ref).slot {
            Slot::Occupied(v) => v,
            Slot::Free(_) => panic!("dangling reference to a freed pool cell"),
        }
    }

    pub fn get_mut(&mut self, cell_ref: CellRef) -> &mut Value {
        match &mut self.cell_mut(cell_ref).slot {
            Slot::Occupied(v) => v,
            Slot::Free(_) => panic!("dangling reference to a freed pool cell"),
        }
    }

    pub fn is_marked(&self, cell_ref: CellRef) -> bool {
        self.cell(cell_ref).marked
    }

    pub fn set_marked(&mut self, cell_ref: CellRef) {
        self.cell_mut(cell_ref).marked = true;
    }

    /// Clears `MARKED` on every occupied cell. First phase of a collection.
    pub fn unmark_all(&mut self) {
        for array in &mut self.arrays {
            for cell in &mut array.cells {
                if matches!(cell.slot, Slot::Occupied(_)) {
                    cell.marked = false;
                }
            }
        }
    }

    /// Frees every occupied, unmarked cell. Second phase of a collection.
    /// Returns the number of cells reclaimed.
    pub fn sweep(&mut self) -> usize {
        let mut reclaimed = 0;
        for (array_index, array) in self.arrays.iter_mut().enumerate() {
            for (slot_index, cell) in array.cells.iter_mut().enumerate() {
                let should_free = matches!(&cell.slot, Slot::Occupied(_)) && !cell.marked;
                if should_free {
                    cell.slot = Slot::Free(None);
                    reclaimed += 1;
                    let cell_ref = CellRef {
                        array: array_index as u32,
                        slot: slot_index as u32,
                    };
                    // Relink below, after releasing the mutable borrow on `cell`.
                    let _ = cell_ref;
                }
            }
        }
        // Rebuild the free list from scratch: simpler and just as cheap as
        // threading it during the scan above, and avoids holding two
        // mutable borrows into `self.arrays` at once.
        self.rebuild_free_list();
        reclaimed
    }

    fn rebuild_free_list(&mut self) {
        let mut head = None;
        for (array_index, array) in self.arrays.iter_mut().enumerate().rev() {
            for (slot_index, cell) in array.cells.iter_mut().enumerate().rev() {
                if let Slot::Free(_) = cell.slot {
                    let cell_ref = CellRef {
                        array: array_index as u32,
                        slot: slot_index as u32,
                    };
                    cell.slot = Slot::Free(head);
                    head = Some(cell_ref);
                }
            }
        }
        self.free_head = head;
    }

    /// Yields every live (occupied) cell reference currently in the pool.
    /// Used only by the collector's mark phase when it needs to assert
    /// invariants, and by tests.
    pub fn live_cells(&self) -> Vec<CellRef> {
        let mut out = Vec::new();
        for (array_index, array) in self.arrays.iter().enumerate() {
            for (slot_index, cell) in array.cells.iter().enumerate() {
                if matches!(cell.slot, Slot::Occupied(_)) {
                    out.push(CellRef {
                        array: array_index as u32,
                        slot: slot_index as u32,
                    });
                }
            }
        }
        out
    }

    pub fn total_cells(&self) -> usize {
        self.arrays.iter().map(|a| a.cells.len()).sum()
    }

    fn cell(&self, cell_ref: CellRef) -> &Cell {
        &self.arrays[cell_ref.array as usize].cells[cell_ref.slot as usize]
    }

    fn cell_mut(&mut self, cell_ref: CellRef) -> &mut Cell {
        &mut self.arrays[cell_ref.array as usize].cells[cell_ref.slot as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_and_get_roundtrip() {
        let mut pool = Pool::new(4);
        let r = pool.alloc(Value::Integer(42)).unwrap();
        assert!(matches!(pool.get(r), Value::Integer(42)));
    }

    #[test]
    fn alloc_exhausts_then_fails() {
        let mut pool = Pool::new(2);
        assert!(pool.alloc(Value::Integer(1)).is_some());
        assert!(pool.alloc(Value::Integer(2)).is_some());
        assert!(pool.alloc(Value::Integer(3)).is_none());
    }

    #[test]
    fn alloc_or_expand_grows_pool() {
        let mut pool = Pool::new(1);
        let _a = pool.alloc(Value::Integer(1)).unwrap();
        let b = pool.alloc_or_expand(Value::Integer(2), 4);
        assert!(matches!(pool.get(b), Value::Integer(2)));
        assert!(pool.total_cells() >= 5);
    }

    #[test]
    fn free_then_realloc_reuses_cell() {
        let mut pool = Pool::new(1);
        let a = pool.alloc(Value::Integer(1)).unwrap();
        pool.free(a);
        let b = pool.alloc(Value::Integer(2)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn sweep_reclaims_unmarked_and_keeps_marked() {
        let mut pool = Pool::new(4);
        let keep = pool.alloc(Value::Integer(1)).unwrap();
        let drop_me = pool.alloc(Value::Integer(2)).unwrap();
        pool.unmark_all();
        pool.set_marked(keep);
        let reclaimed = pool.sweep();
        assert_eq!(reclaimed, 1);
        assert!(matches!(pool.get(keep), Value::Integer(1)));
        let _ = drop_me;
        // The freed cell is back on the free list and reusable.
        let reused = pool.alloc(Value::Integer(3)).unwrap();
        assert!(matches!(pool.get(reused), Value::Integer(3)));
    }
}
