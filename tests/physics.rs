use rice_racer::simulation::{
    Car, CarId, CollisionAxis, Controller, PhysicsEngine, CAR_DECELERATION_FACTOR,
    CAR_FORWARD_ACCELERATION_MSS, CAR_FORWARD_VELOCITY_MAX_MS, CAR_LATERAL_VELOCITY_MAX_MS,
    CAR_TRACK_EDGE_DAMPING,
};
use rice_racer::track::{ControlPoint, Track, SEGMENT_SPACING_M};

const DT: f32 = 1.0 / 60.0;

fn car(id: usize, lateral: f32, longitudinal: f32, speed: f32) -> Car {
    let mut car = Car::new(CarId(id), format!("Car {}", id), Controller::Computer);
    car.position.x = lateral;
    car.position.y = longitudinal;
    car.velocity.y = speed;
    car
}

fn oval() -> Track {
    Track::build(
        "Oval",
        5,
        vec![
            ControlPoint::new([0.0, 0.0, 0.0], [0.0, 0.0, 100.0]),
            ControlPoint::new([100.0, 0.0, 0.0], [0.0, 0.0, -100.0]),
        ],
    )
    .expect("oval builds")
}

#[test]
fn test_integration_moves_in_segments() {
    let physics = PhysicsEngine::new();
    let mut cars = vec![car(0, 0.0, 0.0, 20.0)];
    cars[0].velocity.x = 3.0;
    cars[0].acceleration.x = 1.0;
    cars[0].acceleration.y = 1.0;

    physics.integrate(&mut cars, 0.5);
    assert!((cars[0].position.x - 1.5).abs() < 1e-6);
    assert!((cars[0].position.y - 20.0 * 0.5 / SEGMENT_SPACING_M).abs() < 1e-4);
}

#[test]
fn test_velocity_stays_within_limits() {
    let physics = PhysicsEngine::new();
    let mut cars = vec![car(0, 0.0, 0.0, 0.0), car(1, 0.0, 100.0, 40.0)];
    cars[0].acceleration.x = -80.0;
    cars[0].acceleration.y = CAR_FORWARD_ACCELERATION_MSS;
    cars[1].acceleration.x = 80.0;
    cars[1].acceleration.y = CAR_FORWARD_ACCELERATION_MSS;

    for _ in 0..2000 {
        physics.integrate(&mut cars, DT);
        for car in &cars {
            assert!(car.velocity.x.abs() <= CAR_LATERAL_VELOCITY_MAX_MS);
            assert!(car.velocity.y >= 0.0 && car.velocity.y <= CAR_FORWARD_VELOCITY_MAX_MS);
        }
    }

    // Pinned at the cap, another step changes nothing
    let mut capped = vec![car(0, 0.0, 0.0, CAR_FORWARD_VELOCITY_MAX_MS)];
    capped[0].velocity.x = CAR_LATERAL_VELOCITY_MAX_MS;
    capped[0].acceleration.x = 80.0;
    capped[0].acceleration.y = CAR_FORWARD_ACCELERATION_MSS;
    physics.integrate(&mut capped, DT);
    assert_eq!(capped[0].velocity.y, CAR_FORWARD_VELOCITY_MAX_MS);
    assert_eq!(capped[0].velocity.x, CAR_LATERAL_VELOCITY_MAX_MS);
}

#[test]
fn test_braking_never_reverses() {
    let physics = PhysicsEngine::new();
    let mut cars = vec![car(0, 0.0, 50.0, 5.0)];
    cars[0].acceleration.y = -CAR_FORWARD_ACCELERATION_MSS;

    physics.integrate(&mut cars, DT);
    let expected = 5.0 - CAR_FORWARD_ACCELERATION_MSS * DT * CAR_DECELERATION_FACTOR;
    assert!((cars[0].velocity.y - expected).abs() < 1e-4);

    for _ in 0..120 {
        physics.integrate(&mut cars, DT);
    }
    assert_eq!(cars[0].velocity.y, 0.0);
    let stopped_at = cars[0].position.y;

    physics.integrate(&mut cars, DT);
    assert_eq!(cars[0].position.y, stopped_at);
}

#[test]
fn test_coasting_decays_to_rest() {
    let physics = PhysicsEngine::new();
    let mut cars = vec![car(0, 0.0, 0.0, 5.0)];
    cars[0].velocity.x = 4.0;

    for _ in 0..400 {
        physics.integrate(&mut cars, DT);
    }
    assert!(cars[0].velocity.y < 0.01, "{}", cars[0].velocity.y);
    assert!(cars[0].velocity.x.abs() < 0.01, "{}", cars[0].velocity.x);
}

#[test]
fn test_lateral_contact_pushes_cars_apart() {
    let physics = PhysicsEngine::new();
    let mut cars = vec![car(0, 0.0, 10.0, 20.0), car(1, 0.6, 10.0, 20.0)];

    let collisions = physics.process_collisions(&mut cars);
    assert_eq!(collisions.len(), 1);
    let collision = collisions[0];
    assert_eq!((collision.first, collision.second), (CarId(0), CarId(1)));
    assert_eq!(collision.axis, CollisionAxis::Lateral);
    assert!((collision.penetration + 0.4).abs() < 1e-5);

    assert!((cars[0].position.x + 0.16).abs() < 1e-5);
    assert!((cars[1].position.x - 0.76).abs() < 1e-5);
    // Same speeds, only positions move on a side-by-side hit
    assert_eq!(cars[0].velocity.y, 20.0);
    assert_eq!(cars[1].velocity.y, 20.0);

    // Relaxed separation leaves a fifth of the overlap behind
    let again = physics.process_collisions(&mut cars);
    assert_eq!(again.len(), 1);
    assert!((again[0].penetration + 0.08).abs() < 1e-4);
}

#[test]
fn test_rear_end_contact_swaps_speeds() {
    let physics = PhysicsEngine::new();
    let mut cars = vec![car(0, 0.0, 10.0, 20.0), car(1, 0.0, 10.5, 10.0)];

    let collisions = physics.process_collisions(&mut cars);
    assert_eq!(collisions.len(), 1);
    assert_eq!(collisions[0].axis, CollisionAxis::Longitudinal);
    assert!((collisions[0].penetration + 0.3).abs() < 1e-4);

    assert!((cars[0].position.y - 9.7).abs() < 1e-4, "{}", cars[0].position.y);
    assert!((cars[1].position.y - 10.8).abs() < 1e-4, "{}", cars[1].position.y);
    assert!((cars[0].velocity.y - 9.5).abs() < 1e-5);
    assert!((cars[1].velocity.y - 18.0).abs() < 1e-5);
}

#[test]
fn test_rear_end_contact_is_order_independent() {
    let physics = PhysicsEngine::new();
    let mut cars = vec![car(0, 0.0, 10.5, 10.0), car(1, 0.0, 10.0, 20.0)];

    physics.process_collisions(&mut cars);
    assert!((cars[1].position.y - 9.7).abs() < 1e-4);
    assert!((cars[0].position.y - 10.8).abs() < 1e-4);
    assert!((cars[1].velocity.y - 9.5).abs() < 1e-5);
    assert!((cars[0].velocity.y - 18.0).abs() < 1e-5);
}

#[test]
fn test_separated_cars_do_not_collide() {
    let physics = PhysicsEngine::new();
    let mut cars = vec![
        car(0, -1.25, 10.0, 20.0),
        car(1, 1.25, 10.0, 20.0),
        car(2, -1.25, 20.0, 20.0),
    ];
    let before: Vec<_> = cars.iter().map(|car| car.position).collect();

    assert!(physics.process_collisions(&mut cars).is_empty());
    let after: Vec<_> = cars.iter().map(|car| car.position).collect();
    assert_eq!(before, after);
}

#[test]
fn test_barriers_stop_sideways_slide() {
    let physics = PhysicsEngine::new();
    assert_eq!(physics.lateral_limit(), 2.0);

    let mut cars = vec![car(0, 5.0, 0.0, 20.0), car(1, -2.5, 0.0, 10.0), car(2, 1.0, 0.0, 30.0)];
    cars[0].velocity.x = 6.0;
    cars[2].velocity.x = 6.0;

    physics.constrain_to_track(&mut cars);
    assert_eq!(cars[0].position.x, 2.0);
    assert_eq!(cars[0].velocity.x, 0.0);
    assert!((cars[0].velocity.y - 20.0 * CAR_TRACK_EDGE_DAMPING).abs() < 1e-5);
    assert_eq!(cars[1].position.x, -2.0);

    // Inside the barriers nothing changes
    assert_eq!(cars[2].position.x, 1.0);
    assert_eq!(cars[2].velocity.x, 6.0);
    assert_eq!(cars[2].velocity.y, 30.0);
}

#[test]
fn test_cornering_force_only_pushes_the_human() {
    let physics = PhysicsEngine::new();
    let track = oval();

    // Well into the first bend
    let bend_at = track.len() as f32 / 4.0;
    assert!(track.turn_angle(bend_at).abs() > 0.0);

    let mut human = car(0, 0.0, bend_at, 30.0);
    human.controller = Controller::Human;
    let mut cars = vec![human, car(1, 0.0, bend_at, 30.0)];

    physics.apply_cornering_force(&mut cars, &track);
    let expected = -30.0 * track.turn_angle(bend_at) * 80.0;
    assert!((cars[0].acceleration.x - expected).abs() < 1e-4);
    assert_ne!(cars[0].acceleration.x, 0.0);
    assert_eq!(cars[1].acceleration.x, 0.0);

    // Standing still there is nothing to throw the car outwards
    cars[0].acceleration.x = 0.0;
    cars[0].velocity.y = 0.0;
    physics.apply_cornering_force(&mut cars, &track);
    assert_eq!(cars[0].acceleration.x, 0.0);
}
