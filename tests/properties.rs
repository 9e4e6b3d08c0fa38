//! Black-box property tests against the public API (§8 P1–P4, P6), plus
//! a per-step P5 check that the tree and the price index stay in
//! lockstep (§3 invariant 1) via `Engine::check_book_consistency`. The
//! red-black-specific half of P5 (rotations, recoloring) and the
//! large-scale fuzz run (scenario 6) live next to the red-black tree
//! itself, where the pool and handles needed to assert them directly
//! are available.

use std::collections::HashMap;

use proptest::prelude::*;

use lob_core::{EngineCfg, Engine, EngineEvent, RecordingSink, Side};

#[derive(Debug, Clone, Copy)]
struct Input {
    price: i64,
    qty: i64,
    side: Side,
}

fn input_strategy() -> impl Strategy<Value = Input> {
    (1i64..=20, 1i64..=20, proptest::bool::ANY).prop_map(|(price, qty, buy)| Input {
        price,
        qty,
        side: if buy { Side::Buy } else { Side::Sell },
    })
}

fn run(inputs: &[Input]) -> (Engine, RecordingSink, Vec<i64>) {
    let cfg = EngineCfg { order_pool_capacity: 4096, level_pool_capacity: 256, ..EngineCfg::default() };
    let mut engine = Engine::new(cfg);
    let mut sink = RecordingSink::default();
    let mut ids = Vec::with_capacity(inputs.len());

    for (i, input) in inputs.iter().enumerate() {
        let id = (i + 1) as i64;
        ids.push(id);

        // P2: no crossed book, checked before and after every step.
        assert_book_not_crossed(&engine);
        engine.accept_order(id, input.price, input.qty, input.side, &mut sink);
        assert_book_not_crossed(&engine);
        // P5 / §3 invariant 1: tree and index agree on exactly which
        // prices have a resting level, on both sides, after every step.
        engine.check_book_consistency().expect("tree/index lockstep broken after engine step");
    }
    (engine, sink, ids)
}

fn assert_book_not_crossed(engine: &Engine) {
    if let (Some(bid), Some(ask)) = (engine.best_bid(), engine.best_ask()) {
        assert!(bid < ask, "book crossed: best_bid {bid} >= best_ask {ask}");
    }
}

proptest! {
    /// P1 — mass conservation: every order's fill slices plus its final
    /// accepted remainder (0 if it fully filled) sum to its submitted qty.
    #[test]
    fn p1_mass_conservation(inputs in proptest::collection::vec(input_strategy(), 1..60)) {
        let (_, sink, ids) = run(&inputs);

        let mut filled: HashMap<i64, i64> = HashMap::new();
        let mut accepted: HashMap<i64, i64> = HashMap::new();
        for ev in &sink.events {
            match ev {
                EngineEvent::Trade(t) => *filled.entry(t.order_id).or_insert(0) += t.qty,
                EngineEvent::Accepted(a) => {
                    accepted.insert(a.order_id, a.qty);
                }
            }
        }

        for (i, input) in inputs.iter().enumerate() {
            let id = ids[i];
            let got = filled.get(&id).copied().unwrap_or(0) + accepted.get(&id).copied().unwrap_or(0);
            prop_assert_eq!(got, input.qty, "order {} mass not conserved", id);
        }
    }

    /// P3 — the aggressor's own fills never happen at a price that
    /// improves on its limit.
    #[test]
    fn p3_aggressor_never_improves(inputs in proptest::collection::vec(input_strategy(), 1..60)) {
        let cfg = EngineCfg { order_pool_capacity: 4096, level_pool_capacity: 256, ..EngineCfg::default() };
        let mut engine = Engine::new(cfg);
        let mut sink = RecordingSink::default();

        for (i, input) in inputs.iter().enumerate() {
            let id = (i + 1) as i64;
            let before = sink.events.len();
            engine.accept_order(id, input.price, input.qty, input.side, &mut sink);
            for ev in &sink.events[before..] {
                if let EngineEvent::Trade(t) = ev {
                    if t.order_id == id {
                        match input.side {
                            Side::Buy => prop_assert!(t.price <= input.price),
                            Side::Sell => prop_assert!(t.price >= input.price),
                        }
                    }
                }
            }
        }
    }

    /// P4 — within a level, two orders rest and fill in the order they
    /// were accepted (time priority).
    #[test]
    fn p4_fifo_within_level(qtys in proptest::collection::vec(1i64..=20, 2..10)) {
        let cfg = EngineCfg { order_pool_capacity: 4096, level_pool_capacity: 256, ..EngineCfg::default() };
        let mut engine = Engine::new(cfg);
        let mut sink = RecordingSink::default();

        for (i, &qty) in qtys.iter().enumerate() {
            engine.accept_order((i + 1) as i64, 100, qty, Side::Buy, &mut sink);
        }
        let total: i64 = qtys.iter().sum();
        engine.accept_order(1000, 100, total, Side::Sell, &mut sink);

        let fill_order: Vec<i64> = sink
            .events
            .iter()
            .filter_map(|ev| match ev {
                EngineEvent::Trade(t) if t.order_id != 1000 => Some(t.order_id),
                _ => None,
            })
            .collect();
        let mut dedup = fill_order.clone();
        dedup.dedup();
        let expected: Vec<i64> = (1..=qtys.len() as i64).collect();
        prop_assert_eq!(dedup, expected, "passive fills must occur in arrival order");
    }

    /// P6 — pool closure: available slots always equal capacity minus
    /// the number of currently-open orders/levels.
    #[test]
    fn p6_pool_closure(inputs in proptest::collection::vec(input_strategy(), 1..60)) {
        let cfg = EngineCfg { order_pool_capacity: 4096, level_pool_capacity: 256, ..EngineCfg::default() };
        let mut engine = Engine::new(cfg);
        let mut sink = RecordingSink::default();

        for (i, input) in inputs.iter().enumerate() {
            let id = (i + 1) as i64;
            engine.accept_order(id, input.price, input.qty, input.side, &mut sink);

            let (open_orders, open_prices) = open_resting_state(&sink);
            prop_assert_eq!(
                engine.order_pool_available() as i64,
                engine.order_pool_capacity() as i64 - open_orders
            );
            prop_assert_eq!(
                engine.level_pool_available() as i64,
                engine.level_pool_capacity() as i64 - open_prices
            );
        }
    }
}

/// Re-derives the currently-resting order count and distinct resting
/// price count from the event log: an order is resting once ACCEPTED and
/// stops once every unit of its accepted quantity has appeared in a
/// later FILLED slice. Used only to cross-check `Engine::order_pool_available`
/// / `Engine::level_pool_available` from outside the pool.
fn open_resting_state(sink: &RecordingSink) -> (i64, i64) {
    let mut remaining: HashMap<i64, (i64, i64)> = HashMap::new(); // id -> (price, qty)
    for ev in &sink.events {
        match ev {
            EngineEvent::Accepted(a) => {
                remaining.insert(a.order_id, (a.price, a.qty));
            }
            EngineEvent::Trade(t) => {
                if let Some((_, r)) = remaining.get_mut(&t.order_id) {
                    *r -= t.qty;
                }
            }
        }
    }
    let open_orders = remaining.values().filter(|(_, q)| *q > 0).count() as i64;
    let open_prices =
        remaining.values().filter(|(_, q)| *q > 0).map(|(p, _)| *p).collect::<std::collections::HashSet<_>>().len()
            as i64;
    (open_orders, open_prices)
}
