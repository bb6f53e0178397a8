use criterion::{Criterion, criterion_group, criterion_main};

use tilegrid::{GridConfig, RegionBuild, RegionItem, Tile, TileLayout, wrap_region};

fn seeded_region(config: &GridConfig, tiles: usize) -> RegionBuild {
    let mut region = RegionBuild::new();
    for idx in 0..tiles {
        let mut tile = Tile::new(config);
        tile.module = "bean".to_string();
        tile.delta = format!("tile-{idx}");
        tile.region = "content".to_string();
        tile.width = 1 + (idx as u16 * 5) % 12;
        tile.offset = (idx as u16) % 3;
        tile.weight = (tiles - idx) as i32;
        region.push(RegionItem::tile(tile, "<p>body</p>"));
    }
    region
}

fn bench_wrap_region(c: &mut Criterion) {
    let config = GridConfig::default();
    c.bench_function("wrap_region_100_tiles", |b| {
        b.iter_batched(
            || seeded_region(&config, 100),
            |mut region| wrap_region(&mut region, &config),
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_consolidation(c: &mut Criterion) {
    let config = GridConfig::default();
    c.bench_function("consolidate_300_records", |b| {
        b.iter_batched(
            || {
                let mut layout = TileLayout::new("region", "front");
                for idx in 0..100 {
                    for breakpoint in ["mobile", "standard", "default"] {
                        let mut tile = Tile::new(&config);
                        tile.module = "bean".to_string();
                        tile.delta = format!("tile-{idx}");
                        tile.region = "content".to_string();
                        tile.breakpoint = breakpoint.to_string();
                        tile.width = 1 + (idx as u16) % 12;
                        tile.weight = idx;
                        layout.add_tile(tile);
                    }
                }
                layout
            },
            |mut layout| {
                layout.all_sorted(&config);
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_wrap_region, bench_consolidation);
criterion_main!(benches);
