//! Intrusive red-black tree over pooled `PriceLevel`s, keyed by `Price`
//! (§4.3). No node wrapper: `left`/`right`/`parent`/`red` live on the
//! `PriceLevel` itself and are addressed through `LevelHandle`s borrowed
//! from a `LevelPool`. `L_NONE` doubles as the CLRS sentinel `NIL`, which
//! is always considered black.
//!
//! Deletion of a two-child node physically relinks the in-order successor
//! into the removed node's structural position rather than copying the
//! price key into place, per the REDESIGN note in the source spec: any
//! `LevelHandle` held elsewhere (e.g. in a `PriceIndex`) stays valid
//! across the removal of a *different* handle.
#![allow(dead_code)]

use crate::pool::LevelPool;
use crate::types::{L_NONE, LevelHandle, Price};

#[derive(Default)]
pub struct RbTree {
    root: LevelHandle,
}

#[inline]
fn is_red(pool: &LevelPool, h: LevelHandle) -> bool {
    h != L_NONE && pool.get(h).red
}

#[inline]
fn set_red(pool: &mut LevelPool, h: LevelHandle, red: bool) {
    if h != L_NONE {
        pool.get_mut(h).red = red;
    }
}

#[inline]
fn left(pool: &LevelPool, h: LevelHandle) -> LevelHandle {
    pool.get(h).left
}
#[inline]
fn right(pool: &LevelPool, h: LevelHandle) -> LevelHandle {
    pool.get(h).right
}
#[inline]
fn parent(pool: &LevelPool, h: LevelHandle) -> LevelHandle {
    pool.get(h).parent
}
#[inline]
fn set_left(pool: &mut LevelPool, h: LevelHandle, v: LevelHandle) {
    pool.get_mut(h).left = v;
}
#[inline]
fn set_right(pool: &mut LevelPool, h: LevelHandle, v: LevelHandle) {
    pool.get_mut(h).right = v;
}
#[inline]
fn set_parent(pool: &mut LevelPool, h: LevelHandle, v: LevelHandle) {
    pool.get_mut(h).parent = v;
}
#[inline]
fn price_of(pool: &LevelPool, h: LevelHandle) -> Price {
    pool.get(h).price
}

impl RbTree {
    pub fn new() -> Self {
        Self { root: L_NONE }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root == L_NONE
    }

    pub fn find(&self, pool: &LevelPool, price: Price) -> Option<LevelHandle> {
        let mut cur = self.root;
        while cur != L_NONE {
            let p = price_of(pool, cur);
            if price == p {
                return Some(cur);
            }
            cur = if price < p { left(pool, cur) } else { right(pool, cur) };
        }
        None
    }

    /// Leftmost (`minimum == true`) or rightmost node, `None` if empty.
    pub fn best(&self, pool: &LevelPool, minimum: bool) -> Option<LevelHandle> {
        if self.root == L_NONE {
            return None;
        }
        let mut cur = self.root;
        loop {
            let next = if minimum { left(pool, cur) } else { right(pool, cur) };
            if next == L_NONE {
                return Some(cur);
            }
            cur = next;
        }
    }

    fn rotate_left(&mut self, pool: &mut LevelPool, x: LevelHandle) {
        let y = right(pool, x);
        set_right(pool, x, left(pool, y));
        if left(pool, y) != L_NONE {
            set_parent(pool, left(pool, y), x);
        }
        set_parent(pool, y, parent(pool, x));
        let px = parent(pool, x);
        if px == L_NONE {
            self.root = y;
        } else if x == left(pool, px) {
            set_left(pool, px, y);
        } else {
            set_right(pool, px, y);
        }
        set_left(pool, y, x);
        set_parent(pool, x, y);
    }

    fn rotate_right(&mut self, pool: &mut LevelPool, x: LevelHandle) {
        let y = left(pool, x);
        set_left(pool, x, right(pool, y));
        if right(pool, y) != L_NONE {
            set_parent(pool, right(pool, y), x);
        }
        set_parent(pool, y, parent(pool, x));
        let px = parent(pool, x);
        if px == L_NONE {
            self.root = y;
        } else if x == right(pool, px) {
            set_right(pool, px, y);
        } else {
            set_left(pool, px, y);
        }
        set_right(pool, y, x);
        set_parent(pool, x, y);
    }

    /// Inserts `h` (already carrying its `price`) keeping the BST ordered.
    /// Caller guarantees `price` is not already present.
    pub fn insert(&mut self, pool: &mut LevelPool, h: LevelHandle) {
        set_left(pool, h, L_NONE);
        set_right(pool, h, L_NONE);
        set_parent(pool, h, L_NONE);
        set_red(pool, h, true);

        let price = price_of(pool, h);
        let mut parent_h = L_NONE;
        let mut cur = self.root;
        while cur != L_NONE {
            parent_h = cur;
            let p = price_of(pool, cur);
            debug_assert!(price != p, "duplicate price inserted into tree");
            cur = if price < p { left(pool, cur) } else { right(pool, cur) };
        }
        set_parent(pool, h, parent_h);
        if parent_h == L_NONE {
            self.root = h;
        } else if price < price_of(pool, parent_h) {
            set_left(pool, parent_h, h);
        } else {
            set_right(pool, parent_h, h);
        }
        self.insert_fixup(pool, h);
    }

    fn insert_fixup(&mut self, pool: &mut LevelPool, mut z: LevelHandle) {
        while is_red(pool, parent(pool, z)) {
            let p = parent(pool, z);
            let g = parent(pool, p);
            if p == left(pool, g) {
                let u = right(pool, g);
                if is_red(pool, u) {
                    set_red(pool, p, false);
                    set_red(pool, u, false);
                    set_red(pool, g, true);
                    z = g;
                } else {
                    if z == right(pool, p) {
                        z = p;
                        self.rotate_left(pool, z);
                    }
                    let p = parent(pool, z);
                    let g = parent(pool, p);
                    set_red(pool, p, false);
                    set_red(pool, g, true);
                    self.rotate_right(pool, g);
                }
            } else {
                let u = left(pool, g);
                if is_red(pool, u) {
                    set_red(pool, p, false);
                    set_red(pool, u, false);
                    set_red(pool, g, true);
                    z = g;
                } else {
                    if z == left(pool, p) {
                        z = p;
                        self.rotate_right(pool, z);
                    }
                    let p = parent(pool, z);
                    let g = parent(pool, p);
                    set_red(pool, p, false);
                    set_red(pool, g, true);
                    self.rotate_left(pool, g);
                }
            }
        }
        set_red(pool, self.root, false);
    }

    /// Replaces subtree rooted at `u` with subtree rooted at `v` (CLRS TRANSPLANT).
    fn transplant(&mut self, pool: &mut LevelPool, u: LevelHandle, v: LevelHandle) {
        let pu = parent(pool, u);
        if pu == L_NONE {
            self.root = v;
        } else if u == left(pool, pu) {
            set_left(pool, pu, v);
        } else {
            set_right(pool, pu, v);
        }
        if v != L_NONE {
            set_parent(pool, v, pu);
        }
    }

    /// Removes `z`, known to be present, from the tree. On the two-child
    /// case the in-order successor is physically relinked into `z`'s
    /// structural position; `z`'s own links are left in whatever state
    /// CLRS delete leaves them (the caller returns `z` to the pool right
    /// after, so they are about to be cleared anyway).
    pub fn remove(&mut self, pool: &mut LevelPool, z: LevelHandle) {
        let mut y = z;
        let mut y_original_red = is_red(pool, y);
        let x;
        let x_parent;

        if left(pool, z) == L_NONE {
            x = right(pool, z);
            x_parent = parent(pool, z);
            self.transplant(pool, z, x);
        } else if right(pool, z) == L_NONE {
            x = left(pool, z);
            x_parent = parent(pool, z);
            self.transplant(pool, z, x);
        } else {
            // two children: y = minimum of right subtree, physically moved
            // into z's position (not key-copied).
            y = {
                let mut cur = right(pool, z);
                while left(pool, cur) != L_NONE {
                    cur = left(pool, cur);
                }
                cur
            };
            y_original_red = is_red(pool, y);
            x = right(pool, y);
            if parent(pool, y) == z {
                x_parent = y;
                if x != L_NONE {
                    set_parent(pool, x, y);
                }
            } else {
                x_parent = parent(pool, y);
                self.transplant(pool, y, right(pool, y));
                set_right(pool, y, right(pool, z));
                set_parent(pool, right(pool, y), y);
            }
            self.transplant(pool, z, y);
            set_left(pool, y, left(pool, z));
            set_parent(pool, left(pool, y), y);
            set_red(pool, y, is_red(pool, z));
        }

        if !y_original_red {
            self.delete_fixup(pool, x, x_parent);
        }
    }

    /// `x` may be `L_NONE` (the sentinel); `x_parent` tracks its logical
    /// parent since the sentinel carries no `parent` field of its own.
    fn delete_fixup(&mut self, pool: &mut LevelPool, mut x: LevelHandle, mut x_parent: LevelHandle) {
        while x != self.root && !is_red(pool, x) {
            if x == left(pool, x_parent) {
                let mut w = right(pool, x_parent);
                if is_red(pool, w) {
                    set_red(pool, w, false);
                    set_red(pool, x_parent, true);
                    self.rotate_left(pool, x_parent);
                    w = right(pool, x_parent);
                }
                if !is_red(pool, left(pool, w)) && !is_red(pool, right(pool, w)) {
                    set_red(pool, w, true);
                    x = x_parent;
                    x_parent = parent(pool, x);
                } else {
                    if !is_red(pool, right(pool, w)) {
                        set_red(pool, left(pool, w), false);
                        set_red(pool, w, true);
                        self.rotate_right(pool, w);
                        w = right(pool, x_parent);
                    }
                    set_red(pool, w, is_red(pool, x_parent));
                    set_red(pool, x_parent, false);
                    set_red(pool, right(pool, w), false);
                    self.rotate_left(pool, x_parent);
                    x = self.root;
                }
            } else {
                let mut w = left(pool, x_parent);
                if is_red(pool, w) {
                    set_red(pool, w, false);
                    set_red(pool, x_parent, true);
                    self.rotate_right(pool, x_parent);
                    w = left(pool, x_parent);
                }
                if !is_red(pool, right(pool, w)) && !is_red(pool, left(pool, w)) {
                    set_red(pool, w, true);
                    x = x_parent;
                    x_parent = parent(pool, x);
                } else {
                    if !is_red(pool, left(pool, w)) {
                        set_red(pool, right(pool, w), false);
                        set_red(pool, w, true);
                        self.rotate_left(pool, w);
                        w = left(pool, x_parent);
                    }
                    set_red(pool, w, is_red(pool, x_parent));
                    set_red(pool, x_parent, false);
                    set_red(pool, left(pool, w), false);
                    self.rotate_right(pool, x_parent);
                    x = self.root;
                }
            }
        }
        set_red(pool, x, false);
    }

    /// In-order traversal collecting `(price, handle)` pairs. Test/debug
    /// use only (P5's tree-consistency check).
    pub fn in_order(&self, pool: &LevelPool) -> Vec<(Price, LevelHandle)> {
        let mut out = Vec::new();
        self.in_order_rec(pool, self.root, &mut out);
        out
    }

    fn in_order_rec(&self, pool: &LevelPool, h: LevelHandle, out: &mut Vec<(Price, LevelHandle)>) {
        if h == L_NONE {
            return;
        }
        self.in_order_rec(pool, left(pool, h), out);
        out.push((price_of(pool, h), h));
        self.in_order_rec(pool, right(pool, h), out);
    }

    /// Checks the red-black invariants (root black, no red-red edge,
    /// uniform black-height). Returns `Err` with a message on violation.
    pub fn check_invariants(&self, pool: &LevelPool) -> Result<(), &'static str> {
        if self.root != L_NONE && is_red(pool, self.root) {
            return Err("root is red");
        }
        self.check_rec(pool, self.root).map(|_| ())
    }

    fn check_rec(&self, pool: &LevelPool, h: LevelHandle) -> Result<usize, &'static str> {
        if h == L_NONE {
            return Ok(1);
        }
        if is_red(pool, h) {
            if is_red(pool, left(pool, h)) || is_red(pool, right(pool, h)) {
                return Err("red node with red child");
            }
        }
        let lh = self.check_rec(pool, left(pool, h))?;
        let rh = self.check_rec(pool, right(pool, h))?;
        if lh != rh {
            return Err("unequal black-height");
        }
        Ok(if is_red(pool, h) { lh } else { lh + 1 })
    }
}
