mod common;
use common::*;

#[cfg(test)]
mod notation
{
    use super::*;

    #[test]
    fn piece_identifiers_are_case_insensitive()
    {
        let _setup = setup::setup();

        let lower: Piece = "wa1".parse().unwrap();
        let upper: Piece = "wA1".parse().unwrap();
        let mixed: Piece = "Wa1".parse().unwrap();

        assert_eq!(lower, upper);
        assert_eq!(mixed, upper);
    }

    #[test]
    fn move_strings_tolerate_mixed_case_piece_letters()
    {
        let _setup = setup::setup();

        let canonical: MoveString = "wA1".parse().unwrap();
        let lower: MoveString = "wa1".parse().unwrap();

        let board = Board::default();
        assert_eq!(Move::from(&canonical, &board).unwrap(), Move::from(&lower, &board).unwrap());
    }

    #[test]
    fn pass_is_case_insensitive()
    {
        let _setup = setup::setup();

        for candidate in ["pass", "PASS", "Pass", "pAsS"]
        {
            let movestr: MoveString = candidate.parse().unwrap();
            assert_eq!(format!("{movestr}"), "pass");
        }
    }
}
