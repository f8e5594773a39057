use clap::Parser;

use crate::prelude::*;

#[derive(Clone, Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct UhpOptions
{
    #[arg(short, long, default_value = "info")]
    /// lowest log level to show
    pub log_level: String,

    #[arg(short, long, default_value_t = 4)]
    /// number of worker threads to split a perft calculation across
    pub num_threads: usize,
}

pub struct Server
{
    options: UhpOptions,
    board:   Option<Board>,
    exiting: bool,
}

impl Server
{
    /// Creates a new server with the given capabilities.
    pub fn new(options: UhpOptions) -> Self
    {
        Server {
            options,
            board: None,
            exiting: false,
        }
    }

    /// Starts the server, running until `exit` is received or stdin closes.
    pub fn run(&mut self) -> Result<()>
    {
        loop
        {
            let mut cmdstr: String = String::new();
            let bytes = std::io::stdin().read_line(&mut cmdstr)?;

            if bytes == 0
            {
                // EOF on stdin; there is nobody left to talk to.
                return Ok(());
            }

            let args: Vec<&str> = cmdstr.split_whitespace().filter(|s| !s.is_empty()).collect();
            let cmd = *args.first().unwrap_or(&"");

            self.apply(cmd, &args[1..])?;

            if self.exiting
            {
                return Ok(());
            }
        }
    }
}

impl Server
{
    /// Matches the command to the server's functionality.
    fn apply(&mut self, cmd: &str, args: &[&str]) -> Result<()>
    {
        let result = match cmd
        {
            | "" => Ok(()),
            | "bestmove" => self.best_move(args),
            | "exit" =>
            {
                self.exiting = true;
                Ok(())
            }
            | "info" => self.info(),
            | "newgame" => self.new_game(args),
            | "options" => self.options(args),
            | "pass" => self.play_move(&["pass"]),
            | "perft" => self.perft(args),
            | "play" => self.play_move(args),
            | "undo" => self.undo(args),
            | "validmoves" => self.valid_moves(),
            | _ => Err(Error::new(Kind::UnrecognizedCommand, cmd.into())),
        };

        match result
        {
            | Ok(_) =>
            {
                log::debug!("Command completed successfully: {cmd} {}", args.join(" "));
                self.ok()
            }
            | Err(err) if err.kind == Kind::InvalidMove => self.invalid_move(&err),
            | Err(err) => match err.fatal()
            {
                | true =>
                {
                    let _ = self.err(&err);
                    Err(err)
                }
                | false =>
                {
                    log::warn!("encountered recoverable error:\n{err}");
                    self.err(&err)
                }
            },
        }
    }

    /// Returns the best move available in this position (for the player to move).
    ///
    /// No search is implemented; this returns an arbitrary legal move, matching the engine's
    /// own stub (`bestMove = *(validMoves->begin())`).
    fn best_move(&mut self, _args: &[&str]) -> Result<()>
    {
        let board = self.ensure_playable()?;

        let moves = board.generate_moves(false);
        let mv = moves.first().copied().unwrap_or(Move::Pass);

        println!("{}", Into::<MoveString>::into(mv));
        Ok(())
    }

    /// Ensures there is a board loaded on this server.
    fn ensure_started(&self) -> Result<&Board>
    {
        match self.board.as_ref()
        {
            | Some(b) => Ok(b),
            | None => Err(Error::empty(Kind::GameNotStarted)),
        }
    }

    /// Ensures there is a board loaded on this server.
    fn ensure_started_mut(&mut self) -> Result<&mut Board>
    {
        match self.board.as_mut()
        {
            | Some(b) => Ok(b),
            | None => Err(Error::empty(Kind::GameNotStarted)),
        }
    }

    /// Ensures there is a board loaded and that the game it holds has not already concluded.
    fn ensure_playable(&self) -> Result<&Board>
    {
        let board = self.ensure_started()?;
        match board.state()
        {
            | GameState::Draw | GameState::WhiteWins | GameState::BlackWins =>
            {
                Err(Error::new(Kind::GameIsOver, format!("The game has already ended ({}).", board.state())))
            }
            | GameState::NotStarted | GameState::InProgress => Ok(board),
        }
    }

    /// Prints an error to the UHP stream.
    fn err(&self, err: &Error) -> Result<()>
    {
        println!("err {}", err);
        self.ok()
    }

    /// Prints a failed `play`/`pass` as `invalidmove <msg>` instead of `err <msg>`.
    ///
    /// The engine reports every unplayable move with the same generic message regardless of why
    /// parsing or application failed, rather than leaking the internal error taxonomy over UHP.
    fn invalid_move(&self, _err: &Error) -> Result<()>
    {
        println!("invalidmove Unable to play that move at this time.");
        self.ok()
    }

    /// Prints the server's ID.
    fn info(&self) -> Result<()>
    {
        println!("id MzingaCpp 0.9.2");
        println!("Mosquito;Ladybug;Pillbug");
        Ok(())
    }

    /// Creates a new game with the given options string.
    fn new_game(&mut self, args: &[&str]) -> Result<()>
    {
        if !args.is_empty()
        {
            let gamestr: GameString = args.join(" ").parse::<GameString>()?;
            self.board = Some(gamestr.into());
        }
        else
        {
            self.board = Some(Board::default())
        }

        let board = self.ensure_started()?;
        println!("{}", GameString::from(board));
        Ok(())
    }

    /// Prints the ok footer to the UHP stream.
    fn ok(&self) -> Result<()>
    {
        println!("ok");
        Ok(())
    }

    /// Implements the optionsmap interface for this server.
    ///
    /// Neither option (tournament rules, expansion set) is renegotiable mid-game over UHP, so
    /// this command is accepted but does nothing, matching the `newgame <GameTypeString>` being
    /// the sole way to select them.
    fn options(&mut self, _args: &[&str]) -> Result<()>
    {
        Ok(())
    }

    /// Runs a perft calculation to the given depth (inclusive), printing one line per depth.
    fn perft(&mut self, args: &[&str]) -> Result<()>
    {
        if args.is_empty()
        {
            return Err(Error::new(Kind::ParseError, "You must provide a maximum depth.".into()));
        }

        let Ok(max_depth) = args[0].parse::<u8>()
        else
        {
            return Err(Error::for_parse::<u8>(args[0].into()));
        };

        let board = self.ensure_started_mut()?;
        let threads = self.options.num_threads;

        for depth in 0..=max_depth
        {
            let start = std::time::Instant::now();
            let leaves = board.perft_parallel(depth, threads);
            let elapsed = start.elapsed();

            let millis = elapsed.as_millis().max(1);
            let rate = (leaves as u128 * 1000 / millis) / 1000;

            println!("perft({}) = {} in {} ms. {} KN/s", depth, leaves, elapsed.as_millis(), rate);
        }

        Ok(())
    }

    /// Plays the given move on the current board, if one exists.
    fn play_move(&mut self, args: &[&str]) -> Result<()>
    {
        if args.is_empty()
        {
            return Err(Error::new(Kind::ParseError, "You must provide a MoveString.".into()));
        }

        self.ensure_playable()?;
        let board = self.ensure_started_mut()?;

        let movestr = args.join(" ");

        let to_invalid_move = |_| Error::empty(Kind::InvalidMove);
        let mv = movestr.parse::<MoveString>().map_err(to_invalid_move).and_then(|ms| Move::from(&ms, &*board).map_err(to_invalid_move))?;
        board.play(&mv).map_err(to_invalid_move)?;

        println!("{}", GameString::from(&*board));
        Ok(())
    }

    /// Undoes the given number of moves on the current board.
    fn undo(&mut self, args: &[&str]) -> Result<()>
    {
        let mut n: u8 = 1;
        match args.len()
        {
            | 0 =>
            {}
            | _ =>
            {
                let try_n = args[0].parse::<u8>();
                if let Ok(num) = try_n
                {
                    n = num;
                }
                else
                {
                    return Err(Error::for_parse::<u8>(args[0].into()));
                }
            }
        };

        let board = self.ensure_started_mut()?;
        board.undo(n)?;

        println!("{}", GameString::from(&*board));
        Ok(())
    }

    /// Gets all of the valid moves in this position.
    fn valid_moves(&self) -> Result<()>
    {
        let board = self.ensure_playable()?;
        let moves = board.generate_moves(false);
        let movelist = moves.iter().map(|mv| format!("{}", Into::<MoveString>::into(*mv))).collect::<Vec<_>>().join(";");
        let movelist = if movelist.is_empty() { "pass".to_owned() } else { movelist };

        println!("{}", movelist);
        Ok(())
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn server() -> Server
    {
        let options = UhpOptions {
            log_level:   "info".into(),
            num_threads: 1,
        };
        Server::new(options)
    }

    #[test]
    fn perft_runs_to_depth_without_error()
    {
        let mut server = server();
        server.apply("newgame", &[]).unwrap();
        server.apply("perft", &["2"]).unwrap();
    }

    #[test]
    fn perft_rejects_missing_depth()
    {
        let mut server = server();
        server.apply("newgame", &[]).unwrap();
        assert!(server.perft(&[]).is_err());
    }

    #[test]
    fn exit_sets_the_exiting_flag_and_leaves_the_command_successful()
    {
        let mut server = server();
        server.apply("exit", &[]).unwrap();
        assert!(server.exiting);
    }

    #[test]
    fn play_of_an_unparsable_move_is_reported_as_invalid_move_not_a_generic_error()
    {
        let mut server = server();
        server.apply("newgame", &[]).unwrap();
        let err = server.play_move(&["notamove"]).unwrap_err();
        assert_eq!(err.kind, Kind::InvalidMove);
    }
}
