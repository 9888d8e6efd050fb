use ledge::*;

fn report(label: &str, hit: Option<Collision>) {
    match hit {
        Some(c) => println!("{:<22} t={:.4} plane={} normal={}", label, c.time, c.plane, c.normal),
        None => println!("{:<22} no contact", label),
    }
}

fn main() -> ledge::Result<()> {
    let push = Vector::new(10.0, 0.0);

    let ball = Shape::circle(Point::ORIGIN, 1.0);
    let target = Shape::circle(Point::new(5.0, 0.0), 1.0);
    report("circle -> circle", ball.sweep(&target, push));

    let wall = Shape::aabb(Point::new(5.0, 0.0), 2.0, 2.0);
    report("circle -> box", ball.sweep(&wall, push));

    let block = Shape::aabb(Point::ORIGIN, 2.0, 2.0);
    report("box -> box", block.sweep(&wall, push));
    report("box -> circle", block.sweep(&target, push));

    let ramp = Shape::aat(Point::new(0.0, 0.0), 4.0, 4.0);
    let falling = Shape::aabb(Point::new(3.0, 6.0), 2.0, 2.0);
    report("box -> slope", falling.sweep(&ramp, Vector::new(0.0, -6.0)));

    let diamond = Shape::convex(
        Point::new(0.0, 4.0),
        vec![Vector::new(0.0, -1.0), Vector::new(1.0, 0.0), Vector::new(0.0, 1.0), Vector::new(-1.0, 0.0)],
    )?;
    let floor = Shape::aabb(Point::ORIGIN, 10.0, 2.0);
    report("diamond -> floor", diamond.sweep(&floor, Vector::new(0.0, -4.0)));
    report("zero motion", ball.sweep(&target, Vector::ZERO));
    Ok(())
}
