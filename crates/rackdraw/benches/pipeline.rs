use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use rackdraw::render::{LayoutOptions, RackEngine, SvgRenderOptions, render_svg};
use rackdraw::{DeviceRecord, Inventory};

fn full_rack() -> Inventory {
    Inventory {
        rack_name: Some("bench".to_string()),
        compute: (1..=20)
            .map(|u| DeviceRecord::new(format!("c{u}"), "alpha_1u", format!("U{u}"), "ACTIVE"))
            .collect(),
        storage: (0..10)
            .map(|i| {
                DeviceRecord::new(
                    format!("s{i}"),
                    "beta_2u",
                    format!("U{}", 22 + i * 2),
                    "ACTIVE",
                )
            })
            .collect(),
    }
}

fn bench_generate(c: &mut Criterion) {
    let engine = RackEngine::default();
    let layout = LayoutOptions::default();
    let inventory = full_rack();

    c.bench_function("generate_inventory", |b| {
        b.iter(|| engine.generate_inventory(&inventory, &layout))
    });
}

fn bench_render_svg(c: &mut Criterion) {
    let engine = RackEngine::default();
    let layout = LayoutOptions::default();
    let svg_opts = SvgRenderOptions::default();
    let inventory = full_rack();

    c.bench_function("generate_and_render_svg", |b| {
        b.iter_batched(
            || inventory.clone(),
            |inv| render_svg(&engine.generate_inventory(&inv, &layout), &svg_opts),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_generate, bench_render_svg);
criterion_main!(benches);
