//! # Field of View
//!
//! Recursive shadowcasting over eight octants. Opaque cells that are reached
//! are lit themselves (walls are visible) but hide everything behind them.
//! Cells outside the grid count as opaque.

use crate::game::{GameMap, Position};
use std::collections::HashSet;

/// Octant transforms: `xx, xy, yx, yy` per octant.
const OCTANTS: [[i32; 8]; 4] = [
    [1, 0, 0, -1, -1, 0, 0, 1],
    [0, 1, -1, 0, 0, -1, 1, 0],
    [0, 1, 1, 0, 0, -1, -1, 0],
    [1, 0, 0, 1, -1, 0, 0, -1],
];

/// Cells visible from `origin` within `radius`.
///
/// `is_transparent` is queried for every examined cell.
pub fn compute_fov(
    origin: Position,
    radius: i32,
    is_transparent: impl Fn(Position) -> bool,
) -> HashSet<Position> {
    let mut caster = Shadowcaster {
        origin,
        radius: radius.max(0),
        is_transparent,
        lit: HashSet::new(),
    };
    caster.lit.insert(origin);
    for octant in 0..8 {
        let transform = [
            OCTANTS[0][octant],
            OCTANTS[1][octant],
            OCTANTS[2][octant],
            OCTANTS[3][octant],
        ];
        caster.cast_light(1, 1.0, 0.0, transform);
    }
    caster.lit
}

/// Recomputes `map.visible` from `origin` and folds it into `map.explored`.
pub fn update_fov(map: &mut GameMap, origin: Position, radius: i32) {
    let visible = compute_fov(origin, radius, |position| map.is_transparent(position));
    map.set_visible_cells(visible);
}

struct Shadowcaster<F> {
    origin: Position,
    radius: i32,
    is_transparent: F,
    lit: HashSet<Position>,
}

impl<F: Fn(Position) -> bool> Shadowcaster<F> {
    fn cast_light(&mut self, row: i32, mut start: f64, end: f64, [xx, xy, yx, yy]: [i32; 4]) {
        if start < end {
            return;
        }
        let radius_squared = self.radius * self.radius;
        let mut new_start = start;

        for distance in row..=self.radius {
            let dy = -distance;
            let mut blocked = false;

            for dx in -distance..=0 {
                let cell = Position::new(
                    self.origin.x + dx * xx + dy * xy,
                    self.origin.y + dx * yx + dy * yy,
                );
                let left_slope = (dx as f64 - 0.5) / (dy as f64 + 0.5);
                let right_slope = (dx as f64 + 0.5) / (dy as f64 - 0.5);

                if start < right_slope {
                    continue;
                }
                if end > left_slope {
                    break;
                }

                if dx * dx + dy * dy <= radius_squared {
                    self.lit.insert(cell);
                }

                let opaque = !(self.is_transparent)(cell);
                if blocked {
                    if opaque {
                        new_start = right_slope;
                    } else {
                        blocked = false;
                        start = new_start;
                    }
                } else if opaque && distance < self.radius {
                    blocked = true;
                    self.cast_light(distance + 1, start, left_slope, [xx, xy, yx, yy]);
                    new_start = right_slope;
                }
            }

            if blocked {
                break;
            }
        }
    }
}
