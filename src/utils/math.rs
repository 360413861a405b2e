//! # Game Mathematics
//!
//! Grid geometry helpers shared by generation, targeting and pathfinding.

use crate::Position;

/// Cells on the Bresenham line from `start` to `end`, both endpoints included.
///
/// # Examples
///
/// ```
/// use tombs::{bresenham_line, Position};
///
/// let line = bresenham_line(Position::new(0, 0), Position::new(3, 1));
/// assert_eq!(line.first(), Some(&Position::new(0, 0)));
/// assert_eq!(line.last(), Some(&Position::new(3, 1)));
/// assert_eq!(line.len(), 4);
/// ```
pub fn bresenham_line(start: Position, end: Position) -> Vec<Position> {
    let dx = (end.x - start.x).abs();
    let dy = -(end.y - start.y).abs();
    let step_x = if start.x < end.x { 1 } else { -1 };
    let step_y = if start.y < end.y { 1 } else { -1 };

    let mut cells = Vec::with_capacity((dx.max(-dy) + 1) as usize);
    let mut current = start;
    let mut error = dx + dy;

    loop {
        cells.push(current);
        if current == end {
            break;
        }
        let doubled = 2 * error;
        if doubled >= dy {
            error += dy;
            current.x += step_x;
        }
        if doubled <= dx {
            error += dx;
            current.y += step_y;
        }
    }

    cells
}

/// Octile distance with cardinal steps costing `cardinal` and diagonal steps `diagonal`.
pub fn octile_distance(from: Position, to: Position, cardinal: u32, diagonal: u32) -> u32 {
    let dx = from.x.abs_diff(to.x);
    let dy = from.y.abs_diff(to.y);
    let (low, high) = if dx < dy { (dx, dy) } else { (dy, dx) };
    cardinal * (high - low) + diagonal * low
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_straight_lines() {
        let horizontal = bresenham_line(Position::new(2, 5), Position::new(6, 5));
        assert_eq!(horizontal.len(), 5);
        assert!(horizontal.iter().all(|cell| cell.y == 5));

        let vertical = bresenham_line(Position::new(3, 7), Position::new(3, 4));
        assert_eq!(
            vertical,
            vec![
                Position::new(3, 7),
                Position::new(3, 6),
                Position::new(3, 5),
                Position::new(3, 4)
            ]
        );
    }

    #[test]
    fn test_single_cell_line() {
        assert_eq!(
            bresenham_line(Position::new(4, 4), Position::new(4, 4)),
            vec![Position::new(4, 4)]
        );
    }

    #[test]
    fn test_octile_distance() {
        assert_eq!(octile_distance(Position::new(0, 0), Position::new(3, 0), 2, 3), 6);
        assert_eq!(octile_distance(Position::new(0, 0), Position::new(3, 3), 2, 3), 9);
        assert_eq!(octile_distance(Position::new(0, 0), Position::new(4, 1), 2, 3), 9);
    }

    proptest! {
        #[test]
        fn prop_line_steps_are_adjacent(
            x1 in -20i32..20, y1 in -20i32..20, x2 in -20i32..20, y2 in -20i32..20
        ) {
            let start = Position::new(x1, y1);
            let end = Position::new(x2, y2);
            let line = bresenham_line(start, end);

            prop_assert_eq!(line.first().copied(), Some(start));
            prop_assert_eq!(line.last().copied(), Some(end));
            prop_assert_eq!(line.len() as u32, start.chebyshev_distance(end) + 1);
            for pair in line.windows(2) {
                prop_assert_eq!(pair[0].chebyshev_distance(pair[1]), 1);
            }
        }
    }
}
