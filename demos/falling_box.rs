use ledge::*;

fn main() -> ledge::Result<()> {
    env_logger::init();

    let mut world = World::new(WorldConfig::default())?;
    world.add_static(Shape::aabb(Point::new(50.0, 5.0), 100.0, 10.0));
    world.add_static(Shape::aat(Point::new(70.0, 10.0), -20.0, 20.0));

    let crate_id = world.add_object(
        ObjectDesc::new(Point::new(20.0, 60.0), Shape::aabb(Point::ORIGIN, 4.0, 4.0), SpatialCategory::Living)
            .with_motion(Vector::new(0.0, -30.0)),
    )?;
    let ball_id = world.add_object(
        ObjectDesc::new(Point::new(62.0, 80.0), Shape::circle(Point::ORIGIN, 1.5), SpatialCategory::Projectile)
            .with_motion(Vector::new(0.0, -45.0)),
    )?;

    let dt = 1.0 / 60.0;
    for frame in 0..180 {
        world.do_update(dt);
        if frame % 20 == 0 {
            let c = world.position_of(crate_id)?;
            let b = world.position_of(ball_id)?;
            println!("frame {:3}: crate {}  ball {}", frame, c, b);
        }
    }

    for id in [crate_id, ball_id] {
        if let Some(obj) = world.object(id) {
            for hit in obj.ecb.collisions() {
                println!("{} resting: t={:.3} normal={}", id, hit.time, hit.normal);
            }
        }
    }
    println!("{:?}", world.grid_stats());
    Ok(())
}
