//! File example: diff two files and report what would be transferred.
//!
//! Run with:
//!     cargo run --example sync_file -- /path/to/old /path/to/new

use std::env;
use std::fs::File;
use std::io::BufReader;

use chunkdiff::{ChunkConfig, DeltaGenerator, LocalIndex, build_tree};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let old = args.next().unwrap_or_else(|| "Cargo.toml".to_string());
    let new = args.next().unwrap_or_else(|| old.clone());

    println!("Original: {old}");
    println!("Modified: {new}\n");

    let config = ChunkConfig::default();

    let tree = build_tree(BufReader::new(File::open(&old)?), config)?;
    for (i, root) in tree.roots().iter().enumerate() {
        println!(
            "Root {}: level={}, len={:>10}, hash={}",
            i,
            root.level(),
            root.length(),
            root.hash()
        );
    }

    let index = LocalIndex::build(&tree)?;
    println!(
        "\nIndexed {} leaves ({} distinct), {} bytes",
        index.leaf_count(),
        index.len(),
        index.total_length()
    );

    let stats = DeltaGenerator::new(config)?.generate_with(
        BufReader::new(File::open(&new)?),
        &index,
        |_| std::ops::ControlFlow::Continue(()),
    )?;

    println!(
        "Delta: {} copies ({} bytes), {} literals ({} bytes)",
        stats.copy_ops, stats.copy_bytes, stats.literal_ops, stats.literal_bytes
    );
    println!(
        "Transfer: {} of {} bytes ({:.2}% reused)",
        stats.literal_bytes,
        stats.output_len(),
        stats.reuse_ratio() * 100.0
    );

    Ok(())
}
