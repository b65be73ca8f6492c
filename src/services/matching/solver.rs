//! Global assignment over the candidate cost matrix
//!
//! Thin wrapper around the Kuhn-Munkres (Hungarian) implementation in
//! the `pathfinding` crate. The library needs at least as many columns
//! as rows, so tall matrices are solved transposed and the pairing
//! mapped back. Assignments landing on sentinel cells are dropped from
//! the result; they only exist to make the matrix rectangular.

use pathfinding::kuhn_munkres::kuhn_munkres_min;
use pathfinding::matrix::Matrix;

use super::matrix::INFEASIBLE_CELL;
use super::MatchError;

// ==========================================================================
// Tests First (TDD)
// ==========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_matrix_yields_no_pairs() {
        assert!(solve_assignment(&[]).unwrap().is_empty());
        assert!(solve_assignment(&[Vec::new()]).unwrap().is_empty());
    }

    #[test]
    fn test_diagonal_optimum_on_square_matrix() {
        let cells = vec![vec![1, 1000], vec![1000, 1]];
        let pairs = solve_assignment(&cells).unwrap();
        assert_eq!(pairs, vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn test_cross_optimum_on_square_matrix() {
        let cells = vec![vec![10, 1], vec![1, 10]];
        let pairs = solve_assignment(&cells).unwrap();
        assert_eq!(pairs, vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn test_wide_matrix_leaves_worst_column_unused() {
        // 2 rows, 3 columns: the expensive middle column loses out.
        let cells = vec![vec![1, 500, 9], vec![8, 500, 2]];
        let pairs = solve_assignment(&cells).unwrap();
        assert_eq!(pairs, vec![(0, 0), (1, 2)]);
    }

    #[test]
    fn test_tall_matrix_is_solved_transposed() {
        // 3 rows, 2 columns: only two rows can be assigned.
        let cells = vec![vec![1, 100], vec![100, 1], vec![50, 50]];
        let pairs = solve_assignment(&cells).unwrap();
        assert_eq!(pairs, vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn test_sentinel_assignments_are_filtered() {
        // Row 0 has no feasible column; the forced sentinel assignment
        // must not surface as a pair.
        let cells = vec![vec![INFEASIBLE_CELL, INFEASIBLE_CELL], vec![1, 2]];
        let pairs = solve_assignment(&cells).unwrap();
        assert_eq!(pairs, vec![(1, 0)]);
    }

    #[test]
    fn test_fully_infeasible_matrix_yields_no_pairs() {
        let cells = vec![vec![INFEASIBLE_CELL]];
        assert!(solve_assignment(&cells).unwrap().is_empty());
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        let cells = vec![vec![1, 2], vec![3]];
        assert!(solve_assignment(&cells).is_err());
    }
}

// ==========================================================================
// Implementation
// ==========================================================================

/// Solve the minimum-cost assignment for a rectangular cost matrix.
///
/// Returns `(row, column)` pairs sorted by row. Rows or columns left
/// unmatched (more of one side than the other, or feasible only against
/// sentinel cells) simply do not appear.
pub fn solve_assignment(cells: &[Vec<i64>]) -> Result<Vec<(usize, usize)>, MatchError> {
    if cells.is_empty() || cells[0].is_empty() {
        return Ok(Vec::new());
    }
    let rows = cells.len();
    let columns = cells[0].len();

    let mut pairs: Vec<(usize, usize)> = if rows <= columns {
        let weights = Matrix::from_rows(cells.iter().map(|row| row.iter().copied()))?;
        let (_, assignment) = kuhn_munkres_min(&weights);
        assignment.into_iter().enumerate().collect()
    } else {
        // Solve the transpose, then swap each pairing back
        let transposed = Matrix::from_rows(
            (0..columns).map(|c| cells.iter().map(move |row| row[c])),
        )?;
        let (_, assignment) = kuhn_munkres_min(&transposed);
        assignment
            .into_iter()
            .enumerate()
            .map(|(column, row)| (row, column))
            .collect()
    };

    pairs.sort_unstable();
    pairs.retain(|&(row, column)| cells[row][column] < INFEASIBLE_CELL);
    Ok(pairs)
}
