//! Replay convergence: two nodes applying the same command sequence end
//! up with identical state, including identical deterministic failures.

use std::sync::Arc;

use bytes::Bytes;
use trellis_repl::{Applier, Command, CommandLog, LocalLog};
use trellis_store::{MemoryEngine, Registry};

fn node() -> LocalLog {
    let applier = Applier::new(Registry::new(), Arc::new(MemoryEngine::new()));
    LocalLog::new(Arc::new(applier))
}

fn cmd(name: &str, arguments: &[&str]) -> Command {
    Command::new(
        name,
        arguments
            .iter()
            .map(|s| Bytes::copy_from_slice(s.as_bytes()))
            .collect(),
    )
}

#[test]
fn test_identical_sequences_converge() {
    let sequence = vec![
        cmd("PutCols", &["row1", "t", "x", "1"]),
        cmd("PutCols", &["row1", "t", "y", "2"]),
        cmd("PutCols", &["row2", "t", "x", "9"]),
        cmd("PutRow", &["row1", "t", "z", "3"]),
        // A deterministic failure: applied (and rejected) on both nodes.
        cmd("PutCols", &["row2", "t", "dangling"]),
        cmd("DelRow", &["row2", "t"]),
    ];

    let node_a = node();
    let node_b = node();

    let outcomes_a: Vec<_> = sequence
        .iter()
        .map(|c| node_a.append(c.clone()).unwrap())
        .collect();
    let outcomes_b: Vec<_> = sequence
        .iter()
        .map(|c| node_b.append(c.clone()).unwrap())
        .collect();

    // Byte-identical outcomes at every log position.
    assert_eq!(outcomes_a, outcomes_b);
    assert_eq!(node_a.last_applied(), node_b.last_applied());

    // Byte-identical read results afterwards.
    for read in [
        cmd("GetRow", &["row1", "t"]),
        cmd("GetRow", &["row2", "t"]),
        cmd("GetCols", &["row1", "t", "z"]),
    ] {
        let a = node_a.append(read.clone()).unwrap();
        let b = node_b.append(read).unwrap();
        assert_eq!(a, b);
        assert!(a.is_ok());
    }
}
