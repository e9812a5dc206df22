use std::fs::File;
use std::path::PathBuf;
use std::process;
use std::time::Instant;

use simple_logger::SimpleLogger;
use structopt::StructOpt;

use crate::board::Board;
use crate::error::SolverError;
use crate::gaddag::Gaddag;
use crate::solver::Solver;

pub mod board;
pub mod error;
pub mod gaddag;
pub mod letter_set;
pub mod rack;
pub mod solver;
pub mod util;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "wwf-solver",
    about = "Enumerate every legal play for a rack on a WWF board"
)]
struct Opt {
    /// Word list, one word per line
    #[structopt(short = "d", long = "dictionary", default_value = "words")]
    dictionary: PathBuf,

    /// Board file: the rack on the first line, then one line per row
    #[structopt(default_value = "board")]
    board: PathBuf,

    /// Write the compiled automaton as a GraphViz digraph and exit
    #[structopt(short = "W", long = "dump-dot")]
    dump: Option<PathBuf>,
}

fn main() {
    SimpleLogger::from_env().init().unwrap();

    let opt = Opt::from_args();
    if let Err(err) = run(opt) {
        eprintln!("error: {}", err);
        process::exit(1);
    }
}

fn run(opt: Opt) -> Result<(), SolverError> {
    let start = Instant::now();
    let gaddag = Gaddag::build_from_file(&opt.dictionary)?;
    log::info!("dictionary compiled in {:?}", start.elapsed());

    if let Some(path) = opt.dump {
        let mut out = File::create(&path).map_err(|e| SolverError::io(&path, e))?;
        gaddag
            .dump_dot(&mut out)
            .map_err(|e| SolverError::io(&path, e))?;
        return Ok(());
    }

    let board = Board::from_file(&opt.board)?;
    log::info!("board is {}x{}", board.rows(), board.cols());

    let start = Instant::now();
    let plays = Solver::new(&board, &gaddag).solve();
    log::info!("{} plays found in {:?}", plays.len(), start.elapsed());

    for play in &plays {
        println!("{}", play);
        print!("{}", board.render_with_word(&play.start, &play.word));
    }
    Ok(())
}
