//! Remote index example.
//!
//! The "sender" holds the original tree and answers lookups over a
//! channel; the "receiver" only has the modified bytes. Lookups the sender
//! is too slow to answer degrade to literals.
//!
//! Run with:
//!     cargo run --example remote_index

use std::io::Cursor;
use std::thread;
use std::time::Duration;

use chunkdiff::{
    ChunkConfig, ChunkLookup, DeltaGenerator, LocalIndex, LookupConfig, RemoteIndex, build_tree,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let original: Vec<u8> = (0..400_000u32)
        .map(|i| (i.wrapping_mul(2_654_435_761) >> 13) as u8)
        .collect();
    let mut modified = original.clone();
    modified.splice(200_000..200_000, b"a few new bytes".iter().copied());

    let config = ChunkConfig::new(1024, 4096, 16 * 1024).expect("invalid config");

    // Sender side: index the original and serve lookups from it.
    let sender_index = LocalIndex::build(&build_tree(Cursor::new(&original), config)?)?;
    let (remote, requests) = RemoteIndex::channel(LookupConfig::new(Duration::from_millis(250)));

    let server = thread::spawn(move || {
        let mut served = 0usize;
        for request in requests {
            let meta = sender_index.lookup(request.hash());
            if request.respond(meta) {
                served += 1;
            }
        }
        served
    });

    // Receiver side: only the modified bytes and the remote index.
    let delta = DeltaGenerator::new(config)?.generate(Cursor::new(&modified), &remote)?;
    drop(remote);

    let served = server.join().expect("lookup server panicked");
    println!("Sender answered {served} lookups");
    println!(
        "Delta: {} copies, {} literal bytes, {:.2}% reused",
        delta.stats.copy_ops,
        delta.stats.literal_bytes,
        delta.stats.reuse_ratio() * 100.0
    );

    Ok(())
}
