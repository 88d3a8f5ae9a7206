//! Basic synchronous example: tree, index, delta and reconstruction.
//!
//! Run with:
//!     cargo run --example sync_basic

use std::io::Cursor;

use chunkdiff::{ChunkConfig, DeltaGenerator, DeltaOp, LocalIndex, apply_delta, build_tree};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1 MB of pseudo-random data
    let mut seed = 0x853c_49e6_748f_ea9bu64;
    let original: Vec<u8> = (0..1024 * 1024)
        .map(|_| {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            seed as u8
        })
        .collect();

    // Edit it: overwrite a few bytes, insert a block, drop a block
    let mut modified = original.clone();
    modified[100_000..100_016].copy_from_slice(b"edited in place!");
    modified.splice(500_000..500_000, b"inserted ".repeat(200));
    modified.drain(800_000..820_000);

    let config = ChunkConfig::new(
        2 * 1024,  // min: 2 KiB
        8 * 1024,  // avg: 8 KiB
        32 * 1024, // max: 32 KiB
    )
    .expect("invalid config");

    let tree = build_tree(Cursor::new(&original), config)?;
    println!(
        "Original: {} bytes, {} leaves, {} roots at level {}",
        tree.length(),
        tree.leaves().count(),
        tree.roots().len(),
        tree.roots().first().map_or(0, |root| root.level())
    );

    let index = LocalIndex::build(&tree)?;
    let delta = DeltaGenerator::new(config)?.generate(Cursor::new(&modified), &index)?;

    println!("\nDelta for {} bytes:", modified.len());
    for op in &delta.ops {
        match op {
            DeltaOp::Copy { hash, offset, len } => {
                println!("  COPY    {len:>8} bytes from {offset:>8}  {}", &hash.to_hex()[..16])
            }
            DeltaOp::Literal(data) => println!("  LITERAL {:>8} bytes", data.len()),
        }
    }

    let stats = delta.stats;
    println!(
        "\n{} copies ({} bytes), {} literals ({} bytes), {:.2}% reused",
        stats.copy_ops,
        stats.copy_bytes,
        stats.literal_ops,
        stats.literal_bytes,
        stats.reuse_ratio() * 100.0
    );

    let mut rebuilt = Vec::with_capacity(modified.len());
    apply_delta(Cursor::new(&original), &delta.ops, &mut rebuilt)?;
    assert_eq!(rebuilt, modified);
    println!("Reconstruction verified");

    Ok(())
}
