//! Basic usage example for `PoolRegistry`.
//!
//! This example simulates a few frames of a shooter: bullets come out of a pool, expire after
//! a delay and go back into the pool, while an explosion effect without a pool is created and
//! destroyed directly.

use std::time::Duration;

use prefab_pool::PoolRegistry;
use prefab_pool::fake::FakeHost;

const FRAME: Duration = Duration::from_millis(16);

fn main() {
    let mut host = FakeHost::new();
    let bullet = host.spawn(false);
    let explosion = host.spawn(false);

    let mut registry = PoolRegistry::new();
    let bullets = registry.create_pool(&mut host, bullet, 8, None);

    println!(
        "Created bullet pool with {} idle bullets",
        registry.idle_count(bullets).unwrap_or_default()
    );

    for frame in 0..30_u32 {
        // Fire two bullets every frame, each living for five frames.
        for _ in 0..2 {
            let shot = registry.acquire(&mut host, bullet);
            registry.destroy_after(shot, FRAME * 5);
        }

        if frame == 10 {
            // Nobody pooled explosions, so this is a plain create and a plain destroy.
            let boom = registry.acquire(&mut host, explosion);
            registry.destroy_after(boom, FRAME * 3);
        }

        registry.update(&mut host, FRAME);
    }

    println!(
        "After 30 frames: {} active, {} idle, {} bullets in total",
        registry.active_count(bullets).unwrap_or_default(),
        registry.idle_count(bullets).unwrap_or_default(),
        registry.total_count(bullets).unwrap_or_default()
    );
    println!(
        "The host created {} objects and destroyed {}",
        host.instantiated_count(),
        host.destroyed_count()
    );

    registry.shutdown(&mut host);

    println!(
        "After shutdown {} objects remain (the prototypes)",
        host.live_count()
    );
}
