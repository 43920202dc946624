use anyhow::Context;
use chartlet::{logging::init_logging, prelude::*};
use geo_types::point;

/// Drives the chart scheduling core without a map engine: loads a synthetic
/// inventory, replays a pan gesture through the throttler and resolves a tap
/// against an in-memory feature index.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    println!("⚓ Chartlet Headless Example");
    println!("============================");

    let options = ChartViewProfile::Balanced.resolve();
    options.validate().context("balanced profile should be valid")?;

    // Synthetic inventory: a few overview cells and many harbour cells
    let mut inventory: Vec<ChartPackRef> = (0..6)
        .map(|i| ChartPackRef::new(format!("US2EC{:02}", i), format!("charts/us2ec{:02}.mbtiles", i)))
        .collect();
    inventory.extend((0..40).map(|i| {
        ChartPackRef::new(format!("US5MA{:02}", i), format!("charts/us5ma{:02}.mbtiles", i))
    }));
    inventory.push(ChartPackRef::new("basemap", "charts/basemap.mbtiles"));

    println!("\n📦 Loading {} chart packs:", inventory.len());
    let mut loader = ChartLoader::new(options.loader.clone());
    let updates = loader.subscribe();
    loader.start(&inventory).context("failed to schedule chart loading")?;

    while loader.is_loading() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    for update in updates.try_iter() {
        println!(
            "   {} ({}/{}) phase={}",
            update.progress.phase_label,
            update.progress.current,
            update.progress.total,
            update.phase
        );
    }

    println!("\n🎥 Replaying a pan gesture:");
    let throttler = CameraThrottler::new(options.camera.clone());
    for step in 0..30 {
        let payload = EngineCameraPayload::new(-70.9 + step as f64 * 0.002, 42.35, 13.0 + step as f64 * 0.05);
        throttler.handle_event(&CameraEvent::changing(payload))?;
        tokio::time::sleep(Duration::from_millis(16)).await;
    }
    throttler.handle_event(&CameraEvent::idle(EngineCameraPayload::new(-70.84, 42.35, 14.5)))?;
    let emitted = throttler.try_recv_updates();
    println!("   31 camera events -> {} updates", emitted.len());

    let camera = throttler.current().unwrap_or_default();
    let scope = loader.query_scope(camera.zoom);
    println!(
        "   zoom {:.2}: {} of {} packs queryable",
        camera.zoom,
        scope.len(),
        loader.render_set().len()
    );

    println!("\n👆 Resolving a tap:");
    let mut index = RenderedFeatureIndex::new();
    index.extend([
        RenderedFeature::new(point!(x: 512.0, y: 384.0), 17)
            .with_property("OBJNAM", "Nun \"4\"")
            .with_source("US5MA03"),
        RenderedFeature::new(point!(x: 515.0, y: 380.0), 75)
            .with_property("LITCHR", 2)
            .with_source("US5MA03"),
        RenderedFeature::new(point!(x: 520.0, y: 390.0), 129)
            .with_property("DEPTH", 6.1)
            .with_source("US5MA03"),
    ]);
    let resolver = FeatureResolver::new(Arc::new(index), options.picking.clone());
    let flags = LayerVisibilityFlags::default().with(LayerKey::Soundings, false);
    let tap = TapEvent::new(camera.center, Point::new(512.0, 384.0));
    let target = resolver.target_for_view(&loader, &camera);

    match resolver.on_tap(&tap, &flags, &target).await {
        TapOutcome::Resolved(resolution) => {
            for (rank, feature) in resolution.features().iter().enumerate() {
                println!(
                    "   {}. {} (code {}, priority {})",
                    rank + 1,
                    feature.display_type,
                    feature.classification_code,
                    feature.priority()
                );
            }
        }
        TapOutcome::Nothing => println!("   nothing here"),
        TapOutcome::Superseded => println!("   superseded by a newer tap"),
    }

    throttler.teardown();
    loader.teardown();
    println!("\n✅ Done");
    Ok(())
}
