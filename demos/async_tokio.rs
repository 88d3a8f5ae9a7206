//! Async example: build trees for several streams concurrently on tokio.
//!
//! Run with:
//!     cargo run --example async_tokio --features async-io

use chunkdiff::{ChunkConfig, DeltaGenerator, LocalIndex, build_tree_async};
use futures_util::StreamExt;
use tokio_util::compat::TokioAsyncReadCompatExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ChunkConfig::new(1024, 4096, 16 * 1024).expect("invalid config");

    // Three versions of one stream
    let base: Vec<u8> = (0..300_000u32).map(|i| (i.wrapping_mul(40_503) >> 7) as u8).collect();
    let mut versions = vec![base.clone(), base.clone(), base];
    versions[1].splice(100_000..100_000, b"version two".iter().copied());
    versions[2].truncate(250_000);

    // Build every tree concurrently
    let handles: Vec<_> = versions
        .iter()
        .cloned()
        .enumerate()
        .map(|(id, data)| {
            tokio::spawn(async move {
                let (reader, mut writer) = tokio::io::duplex(8 * 1024);
                tokio::spawn(async move {
                    use tokio::io::AsyncWriteExt;
                    let _ = writer.write_all(&data).await;
                });
                build_tree_async(reader.compat(), config)
                    .await
                    .map(|tree| (id, tree))
            })
        })
        .collect();

    let mut trees = Vec::new();
    for handle in handles {
        let (id, tree) = handle.await??;
        println!(
            "Version {id}: {} bytes, {} leaves, root hash {}",
            tree.length(),
            tree.leaves().count(),
            tree.roots().first().map(|root| root.hash().to_hex()).unwrap_or_default()
        );
        trees.push(tree);
    }

    // Diff each version against the first
    let index = LocalIndex::build(&trees[0])?;
    let generator = DeltaGenerator::new(config)?;
    for (id, data) in versions.iter().enumerate().skip(1) {
        let data = data.clone();
        let delta = generator.generate_bytes(data, &index);
        println!(
            "Version {id} vs 0: {} copies, {} literal bytes",
            delta.stats.copy_ops, delta.stats.literal_bytes
        );
    }

    // The leaf stream can also be consumed directly
    let mut leaves = chunkdiff::chunk_async(&versions[0][..], config);
    let mut count = 0;
    while let Some(chunk) = leaves.next().await {
        chunk?;
        count += 1;
    }
    println!("Version 0 has {count} leaves");

    Ok(())
}
