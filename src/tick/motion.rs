use std::collections::HashSet;

use crate::room::models::{Bounds, Direction, Position};

/// Lowest coordinate a participant may reach on either axis
pub const LOWER_LIMIT: f64 = -1.0;

/// Unit-less direction from the held keys; opposing keys cancel out
pub fn direction(held: &HashSet<Direction>) -> (f64, f64) {
    let mut dx = 0.0;
    let mut dy = 0.0;
    for key in held {
        match key {
            Direction::Up => dy -= 1.0,
            Direction::Down => dy += 1.0,
            Direction::Left => dx -= 1.0,
            Direction::Right => dx += 1.0,
        }
    }
    (dx, dy)
}

/// Scales a non-zero delta to exactly `magnitude`
pub fn rescale((dx, dy): (f64, f64), magnitude: f64) -> (f64, f64) {
    let length = dx.hypot(dy);
    if length == 0.0 {
        return (0.0, 0.0);
    }
    (dx / length * magnitude, dy / length * magnitude)
}

/// Clamps one coordinate to `[LOWER_LIMIT, upper]`; a non-positive upper is unbounded
pub fn clamp_axis(value: f64, upper: f64) -> f64 {
    let upper = if upper > 0.0 { upper } else { f64::INFINITY };
    value.clamp(LOWER_LIMIT, upper)
}

/// Next position after one tick
pub fn step(
    position: Position,
    held: &HashSet<Direction>,
    bounds: Bounds,
    magnitude: f64,
) -> Position {
    let (dx, dy) = rescale(direction(held), magnitude);
    Position::new(
        clamp_axis(position.x + dx, bounds.width),
        clamp_axis(position.y + dy, bounds.height),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use rstest::rstest;

    fn held(keys: &[Direction]) -> HashSet<Direction> {
        keys.iter().copied().collect()
    }

    #[rstest]
    #[case(&[Direction::Up], (0.0, -1.0))]
    #[case(&[Direction::Right, Direction::Down], (1.0, 1.0))]
    #[case(&[Direction::Left, Direction::Right], (0.0, 0.0))]
    #[case(&[Direction::Up, Direction::Down, Direction::Left], (-1.0, 0.0))]
    #[case(&[], (0.0, 0.0))]
    fn test_direction(#[case] keys: &[Direction], #[case] expected: (f64, f64)) {
        assert_eq!(direction(&held(keys)), expected);
    }

    #[test]
    fn test_rescale_gives_exact_magnitude() {
        for delta in [(1.0, 0.0), (1.0, 1.0), (-1.0, 1.0), (0.0, -1.0)] {
            let (dx, dy) = rescale(delta, 5.0);
            assert!((dx.hypot(dy) - 5.0).abs() < 1e-9);
        }
        assert_eq!(rescale((0.0, 0.0), 5.0), (0.0, 0.0));
    }

    #[test]
    fn test_diagonal_is_not_faster() {
        let bounds = Bounds::new(1000.0, 1000.0);
        let start = Position::new(500.0, 500.0);

        let next = step(start, &held(&[Direction::Up, Direction::Right]), bounds, 5.0);

        let travelled = (next.x - start.x).hypot(next.y - start.y);
        assert!((travelled - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_clamps_to_bounds() {
        let bounds = Bounds::new(100.0, 50.0);

        let corner = step(
            Position::new(99.0, 49.0),
            &held(&[Direction::Right, Direction::Down]),
            bounds,
            5.0,
        );
        assert_eq!(corner, Position::new(100.0, 50.0));

        let origin = step(Position::new(0.0, 0.0), &held(&[Direction::Left]), bounds, 5.0);
        assert_eq!(origin, Position::new(LOWER_LIMIT, 0.0));
    }

    #[test]
    fn test_unset_bounds_have_no_upper_limit() {
        let next = step(
            Position::new(1e6, 0.0),
            &held(&[Direction::Right]),
            Bounds::default(),
            5.0,
        );
        assert_eq!(next.x, 1e6 + 5.0);
    }

    #[test]
    fn test_random_walk_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        let bounds = Bounds::new(320.0, 240.0);
        let all = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];
        let mut position = bounds.centre();

        for _ in 0..10_000 {
            let keys: HashSet<Direction> =
                all.iter().copied().filter(|_| rng.random_bool(0.5)).collect();
            let magnitude = rng.random_range(0.1..50.0);
            position = step(position, &keys, bounds, magnitude);

            assert!((LOWER_LIMIT..=bounds.width).contains(&position.x));
            assert!((LOWER_LIMIT..=bounds.height).contains(&position.y));
        }
    }
}
