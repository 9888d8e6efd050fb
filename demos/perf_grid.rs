use ledge::*;
use std::time::Instant;

fn lcg(seed: &mut u32) -> u32 {
    *seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
    *seed
}

fn unit(seed: &mut u32) -> f64 {
    lcg(seed) as f64 / u32::MAX as f64
}

fn main() -> ledge::Result<()> {
    env_logger::init();

    let cfg = WorldConfig::default().with_bounds([0.0, 0.0], [1000.0, 1000.0]).with_cell_size(8.0);
    let mut world = World::new(cfg)?;

    // Tile floor plus scattered ledges.
    for i in 0..250 {
        world.add_static(Shape::aabb(Point::new(2.0 + 4.0 * i as f64, 2.0), 4.0, 4.0));
    }
    let mut seed = 7u32;
    for _ in 0..500 {
        let x = unit(&mut seed) * 1000.0;
        let y = 50.0 + unit(&mut seed) * 900.0;
        world.add_static(Shape::aabb(Point::new(x, y), 12.0, 2.0));
    }

    let n = 5_000usize;
    let t0 = Instant::now();
    for i in 0..n {
        let x = unit(&mut seed) * 1000.0;
        let y = 50.0 + unit(&mut seed) * 900.0;
        let vx = unit(&mut seed) * 40.0 - 20.0;
        let shape = if i % 2 == 0 { Shape::aabb(Point::ORIGIN, 1.0, 1.0) } else { Shape::circle(Point::ORIGIN, 0.5) };
        world.add_object(ObjectDesc::new(Point::new(x, y), shape, SpatialCategory::Particle).with_motion(Vector::new(vx, -60.0)))?;
    }
    let t_add = t0.elapsed();

    let frames = 60;
    let t1 = Instant::now();
    for _ in 0..frames {
        world.update(1.0 / 60.0);
    }
    let t_run = t1.elapsed();

    let stats = world.grid_stats();
    println!(
        "N={} add={:.3}ms update={:.3}ms/frame grid={}x{} occupied={} overflow={}",
        n,
        t_add.as_secs_f64() * 1000.0,
        t_run.as_secs_f64() * 1000.0 / frames as f64,
        stats.rows,
        stats.cols,
        stats.occupied_cells,
        stats.overflow,
    );
    Ok(())
}
