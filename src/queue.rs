//! Single-producer/single-consumer command ring buffer (§4.6). Producer
//! and consumer cursors are each pinned to their own cache line via
//! `crossbeam_utils::CachePadded` so the I/O thread's publish and the
//! matching thread's busy-spin never false-share.
//!
//! True SPSC, unlike the teacher's `InboundQueue`: exactly one producer
//! and one consumer are ever live, so a release-store/acquire-load pair
//! is enough to hand a slot off — no CAS claim step is needed (that's
//! reserved for a multi-producer variant the teacher's queue modeled but
//! this core doesn't need).
#![allow(dead_code)]

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_utils::CachePadded;

use crate::types::{OrderId, Price, Qty, Side};

/// One decoded inbound command, copied verbatim into a ring slot by the
/// decoder (§4.7).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Command {
    pub order_id: OrderId,
    pub price: Price,
    pub qty: Qty,
    pub side: Side,
}

impl Default for Command {
    fn default() -> Self {
        Self { order_id: 0, price: 0, qty: 0, side: Side::Buy }
    }
}

pub struct CommandRing {
    buffer: Box<[UnsafeCell<Command>]>,
    mask: usize,
    head: CachePadded<AtomicUsize>, // consumer-owned cursor
    tail: CachePadded<AtomicUsize>, // producer-owned cursor
}

// SAFETY: exactly one producer thread ever calls `push`/`try_push` and
// exactly one consumer thread ever calls `pop`; the cursors establish a
// release/acquire happens-before edge between a slot write and its read.
unsafe impl Send for CommandRing {}
unsafe impl Sync for CommandRing {}

impl CommandRing {
    /// Rounds `capacity` up to a power of two, per §4.6.
    pub fn with_capacity(capacity: u32) -> Self {
        let cap = (capacity.max(1) as usize).next_power_of_two();
        let buffer: Box<[UnsafeCell<Command>]> =
            (0..cap).map(|_| UnsafeCell::new(Command::default())).collect();
        Self {
            buffer,
            mask: cap - 1,
            head: CachePadded::new(AtomicUsize::new(0)),
            tail: CachePadded::new(AtomicUsize::new(0)),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.mask + 1
    }

    #[inline]
    pub fn len(&self) -> usize {
        let tail = self.tail.load(Ordering::Acquire);
        let head = self.head.load(Ordering::Acquire);
        tail.wrapping_sub(head)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Producer-only. Claims the next slot and publishes it with a
    /// release store. Returns `false` if the consumer is a full lap
    /// behind (back-pressure; never overwrites an unread slot).
    #[inline]
    pub fn try_push(&self, cmd: Command) -> bool {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);
        if tail.wrapping_sub(head) == self.capacity() {
            return false;
        }
        unsafe {
            *self.buffer[tail & self.mask].get() = cmd;
        }
        self.tail.store(tail.wrapping_add(1), Ordering::Release);
        true
    }

    /// Producer-only. Spins until a slot frees (§4.6: "no drop").
    #[inline]
    pub fn push_spin(&self, cmd: Command) {
        while !self.try_push(cmd) {
            std::hint::spin_loop();
        }
    }

    /// Consumer-only. `None` if the ring is currently empty.
    #[inline]
    pub fn try_pop(&self) -> Option<Command> {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);
        if head == tail {
            return None;
        }
        let cmd = unsafe { *self.buffer[head & self.mask].get() };
        self.head.store(head.wrapping_add(1), Ordering::Release);
        Some(cmd)
    }

    /// Consumer-only. Busy-spins until a command is available (the
    /// matching thread's steady-state loop, §5).
    #[inline]
    pub fn pop_spin(&self) -> Command {
        loop {
            if let Some(cmd) = self.try_pop() {
                return cmd;
            }
            std::hint::spin_loop();
        }
    }

    /// Drains whatever is currently queued, for graceful shutdown (§5).
    pub fn drain(&self) -> Vec<Command> {
        let mut out = Vec::with_capacity(self.len());
        while let Some(cmd) = self.try_pop() {
            out.push(cmd);
        }
        out
    }
}
