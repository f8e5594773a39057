mod common;
use common::*;

#[cfg(test)]
mod perft
{
    use super::*;

    /// Canonical Base leaf counts at depths 0-5, the binding oracle for the move generator.
    /// Only depths 0-3 are exercised below; 21600 and 516240 are left untested here to keep this
    /// suite fast, but are part of the same oracle and should hold for any correct generator.
    const LEAF_COUNTS: [u64; 6] = [1, 4, 96, 1440, 21600, 516240];

    #[test]
    fn base_perft_matches_canonical_leaf_counts()
    {
        let _setup = setup::setup();
        let mut board = Board::default();

        for (depth, expected) in LEAF_COUNTS.iter().enumerate().take(4)
        {
            assert_eq!(board.perft(depth as u8), *expected, "perft({depth}) mismatch");
        }
    }

    #[test]
    fn base_perft_parallel_agrees_with_the_serial_walk()
    {
        let _setup = setup::setup();
        let board = Board::default();

        for (depth, expected) in LEAF_COUNTS.iter().enumerate().take(4)
        {
            assert_eq!(board.perft_parallel(depth as u8, 4), *expected, "perft_parallel({depth}) mismatch");
        }
    }

    #[test]
    fn perft_parallel_with_a_single_thread_matches_many_threads()
    {
        let _setup = setup::setup();
        let board = Board::default();

        assert_eq!(board.perft_parallel(3, 1), board.perft_parallel(3, 8));
    }
}
