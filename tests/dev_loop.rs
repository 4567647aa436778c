use std::sync::{Arc, Mutex};

use pos_ledger::consensus::dev_loop::{DevLoop, DevLoopConfig, DevNode};
use pos_ledger::types::{BlockOrder, BlockView, Fingerprint};
use pos_ledger::{ChainConfig, ChainEngine, ChainError, SharedEngine};

#[derive(Default)]
struct FakeState {
    height: u64,
    ticks: u64,
    heights: Vec<u64>,
    fail: bool,
}

struct FakeNode {
    state: Arc<Mutex<FakeState>>,
}

impl FakeNode {
    fn new(state: Arc<Mutex<FakeState>>) -> Self { Self { state } }
}

impl DevNode for FakeNode {
    fn height(&self) -> u64 { self.state.lock().unwrap().height }

    fn produce_block(&mut self) -> Result<BlockView, ChainError> {
        let mut st = self.state.lock().unwrap();
        st.ticks += 1;
        if st.fail {
            return Err(ChainError::NoActiveValidators);
        }
        st.height += 1;
        let h = st.height;
        st.heights.push(h);
        Ok(BlockView {
            height: h,
            created_at: 0,
            fingerprint: Fingerprint::genesis_parent(),
            previous_fingerprint: Fingerprint::genesis_parent(),
            producer: "fake".into(),
            transactions: vec![],
        })
    }

    fn now_unix(&self) -> u64 { 0 }
}

fn fast() -> DevLoopConfig {
    DevLoopConfig { slot_ms: 1, ..DevLoopConfig::default() }
}

#[test]
fn run_for_slots_produces_exact_blocks() {
    let state = Arc::new(Mutex::new(FakeState::default()));
    let mut dl = DevLoop::new(FakeNode::new(state.clone()), fast());
    assert_eq!(dl.run_for_slots(5), 5);
    let st = state.lock().unwrap();
    assert_eq!(st.height, 5);
    assert_eq!(st.ticks, 5);
    assert_eq!(st.heights, vec![1, 2, 3, 4, 5]);
}

#[test]
fn run_until_height_stops_exactly() {
    let state = Arc::new(Mutex::new(FakeState::default()));
    let mut dl = DevLoop::new(FakeNode::new(state.clone()), fast());
    assert!(dl.run_until_height(7));
    let st = state.lock().unwrap();
    assert_eq!(st.height, 7);
    assert_eq!(st.ticks, 7);
}

#[test]
fn run_for_duration_ticks_expected() {
    use std::ops::RangeInclusive;
    let state = Arc::new(Mutex::new(FakeState::default()));
    let cfg = DevLoopConfig { slot_ms: 100, ..DevLoopConfig::default() };
    let mut dl = DevLoop::new(FakeNode::new(state.clone()), cfg);
    dl.run_for_duration(450);
    let st = state.lock().unwrap();
    let range: RangeInclusive<u64> = 4..=5;
    assert!(range.contains(&st.ticks), "ticks={} outside 4-5", st.ticks);
    assert_eq!(st.height, st.ticks);
    assert_eq!(st.heights, (1..=st.ticks).collect::<Vec<_>>());
}

#[test]
fn failed_slots_are_skipped_and_stall_is_bounded() {
    let state = Arc::new(Mutex::new(FakeState { fail: true, ..FakeState::default() }));
    let cfg = DevLoopConfig { slot_ms: 1, max_stalled_slots: 3 };
    let mut dl = DevLoop::new(FakeNode::new(state.clone()), cfg);
    assert_eq!(dl.run_for_slots(4), 0);
    assert!(!dl.run_until_height(1));
    let st = state.lock().unwrap();
    assert_eq!(st.ticks, 4 + 3);
    assert_eq!(st.height, 0);
}

struct RecordingNode {
    inner: ChainEngine,
    blocks: Arc<Mutex<Vec<(usize, u64)>>>,
}

impl DevNode for RecordingNode {
    fn height(&self) -> u64 { self.inner.height() }

    fn produce_block(&mut self) -> Result<BlockView, ChainError> {
        let b = self.inner.produce_block()?;
        self.blocks.lock().unwrap().push((b.transactions.len(), b.height));
        Ok(b)
    }

    fn now_unix(&self) -> u64 { DevNode::now_unix(&self.inner) }
}

#[test]
fn empty_pool_produces_reward_only_blocks() {
    let engine = ChainEngine::new(ChainConfig::default().with_seed(3)).unwrap();
    let blocks = Arc::new(Mutex::new(Vec::new()));
    let rec = RecordingNode { inner: engine, blocks: blocks.clone() };
    let mut dl = DevLoop::new(rec, fast());
    dl.run_for_slots(3);
    let b = blocks.lock().unwrap();
    assert_eq!(b.len(), 3);
    for (i, (txc, h)) in b.iter().enumerate() {
        assert_eq!(*txc, 1);
        assert_eq!(*h as usize, i + 1);
    }
    assert_eq!(dl.node.inner.total_supply(), 2_400_000.0 + 3.0 * 50.0);
}

#[test]
fn shared_engine_drives_from_loop() {
    let shared = SharedEngine::new(ChainEngine::new(ChainConfig::default().with_seed(8)).unwrap());
    let mut dl = DevLoop::new(shared.clone(), fast());
    assert!(dl.run_until_height(4));
    assert_eq!(shared.height(), 4);
    let newest = shared.list_blocks(BlockOrder::NewestFirst);
    assert_eq!(newest.first().map(|b| b.height), Some(4));
    assert!(shared.verify_chain().is_ok());
}
