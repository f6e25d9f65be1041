
extern crate clap;
#[macro_use] extern crate log;
extern crate fern;
extern crate chrono;
extern crate term_grid;

pub mod assembler;

use clap::{Arg, ArgMatches, App};
use term_grid::{Grid, GridOptions, Direction, Filling, Cell};

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use assembler::ast::Instruction;
use assembler::symbols::SymbolTable;

fn main() {
    let args = process_arguments();
    initialize_logging(args.occurrences_of("verbose"));

    debug!("Arguments:\n\tVerbosity: {}\n\tTokens Only: {}\n\tOutfile: {}\n\tInfile: {}",
        match args.occurrences_of("verbose") {
            0 => log::LevelFilter::Error.to_string(),
            1 => log::LevelFilter::Warn.to_string(),
            2 => log::LevelFilter::Info.to_string(),
            3 | _ => log::LevelFilter::Debug.to_string(),
        },
        args.is_present("tokens"),
        args.value_of("output").unwrap_or("None"),
        args.value_of("INPUT").unwrap()
    );

    let ifile = args.value_of("INPUT").unwrap();
    let ipath = Path::new(ifile);

    let source = match fs::read_to_string(&ipath) {
        Err(err) => {
            error!("fatal: unable to read input file `{}`: {}", ipath.display(), err);
            std::process::exit(1);
        },
        Ok(source) => source,
    };

    if args.is_present("tokens") {
        let (tokens, errors) = assembler::lexer::tokenize(&source);
        for tok in tokens.iter() {
            println!("{}", tok);
        }
        for err in errors.iter() {
            error!("{}", err);
        }
        std::process::exit(if errors.is_empty() { 0 } else { 1 });
    }

    let asm = match assembler::assemble(&source) {
        Ok(asm) => asm,
        Err(errors) => {
            for err in errors.iter() {
                error!("{}: {:?} error: {}", ipath.display(), err.kind(), err);
            }
            error!("Stopped assembly due to {} error(s).", errors.len());
            std::process::exit(1);
        }
    };

    debug!("symbol table holds {} name(s)", asm.symbols.len());
    if args.is_present("print-debug") {
        print_listing(&asm);
    }

    let opath = match args.value_of("output") {
        Some(filename) => PathBuf::from(filename),
        None => default_output_path(ipath),
    };

    if let Some(dir) = opath.parent() {
        if !dir.as_os_str().is_empty() {
            if let Err(err) = fs::create_dir_all(dir) {
                error!("fatal: unable to create output directory `{}`: {}", dir.display(), err);
                std::process::exit(1);
            }
        }
    }

    let mut ofile = match File::create(&opath) {
        Err(err) => {
            error!("fatal: unable to open output file `{}`: {}", opath.display(), err);
            std::process::exit(1);
        },
        Ok(file) => file,
    };

    for line in asm.lines().iter() {
        if let Err(err) = writeln!(ofile, "{}", line) {
            error!("fatal: unable to write to output file `{}`: {}", opath.display(), err);
            std::process::exit(1);
        }
    }

    info!("wrote {} word(s) to `{}`", asm.words.len(), opath.display());
}

/// `dir/Prog.asm` assembles to `dir/build/Prog.hack`.
fn default_output_path(ipath: &Path) -> PathBuf {
    let mut name = ipath.file_stem().unwrap_or_else(|| ipath.as_os_str()).to_os_string();
    name.push(".hack");
    let dir = ipath.parent().unwrap_or_else(|| Path::new(""));
    dir.join("build").join(name)
}

fn print_listing(asm: &assembler::Assembly) {
    let mut grid = Grid::new(GridOptions {
        filling:     Filling::Spaces(1),
        direction:   Direction::LeftToRight,
    });

    let mut words = asm.words.iter().enumerate();
    for st in asm.statements.iter() {
        if let Instruction::L(label) = &st.instruction {
            grid.add(Cell::from(String::new()));
            grid.add(Cell::from(format!("({})", label)));
            grid.add(Cell::from(String::new()));
            grid.add(Cell::from(String::new()));
            continue;
        }

        if let Some((idx, word)) = words.next() {
            grid.add(Cell::from(format!("{:5}:", idx)));
            grid.add(Cell::from(format!("{}", st)));
            grid.add(Cell::from("=>".to_string()));
            grid.add(Cell::from(assembler::codegen::to_binary(*word)));
        }
    }

    println!("{}", grid.fit_into_columns(4));

    let mut symbols: Vec<(&String, &u16)> = asm.symbols.iter()
        .filter(|(name, _)| !SymbolTable::is_reserved(name))
        .collect();
    symbols.sort_by_key(|(name, address)| (**address, (*name).clone()));

    println!("{} symbol(s) defined by the program:", symbols.len());
    for (name, address) in symbols {
        println!("{:>8} {}", address, name);
    }
}

fn process_arguments() -> ArgMatches<'static> {
    App::new(option_env!("CARGO_PKG_NAME").unwrap())
        .version(option_env!("CARGO_PKG_VERSION").unwrap())
        .author(option_env!("CARGO_PKG_AUTHORS").unwrap())
        .about(option_env!("CARGO_PKG_DESCRIPTION").unwrap())
        .arg(Arg::with_name("INPUT")
            .help("Sets the input file to use")
            .required(true)
            .multiple(false)
            .index(1))
        .arg(Arg::with_name("verbose")
            .short("v")
            .multiple(true)
            .takes_value(false)
            .help("Sets the level of verbosity"))
        .arg(Arg::with_name("output")
            .short("o")
            .takes_value(true)
            .help("write output to an outfile (default: <input dir>/build/<input>.hack)"))
        .arg(Arg::with_name("tokens")
            .short("t")
            .takes_value(false)
            .help("prints the token stream and exits without assembling"))
        .arg(Arg::with_name("print-debug")
            .short("d")
            .alias("show")
            .alias("s")
            .takes_value(false)
            .help("prints the debug information alongside the assembly to STDOUT"))
        .get_matches()
}

fn initialize_logging(verbosity: u64) {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(match verbosity {
            0 => log::LevelFilter::Error,
            1 => log::LevelFilter::Warn,
            2 => log::LevelFilter::Info,
            3 | _ => log::LevelFilter::Debug,
        })
        .chain(std::io::stdout())
        .apply().ok();
}
