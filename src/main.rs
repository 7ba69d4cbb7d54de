use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::filter::LevelFilter;

use aglearn::*;
use aglearn::error::Result;
use aglearn::io::{self, PrettyFormatter};
use aglearn::learner::{DEFAULT_ORDER, RulesFormatter};
use aglearn::model::NgramFormatter;

/// Learns co-occurrence and linear order rules from a corpus and checks held-out sequences against them
#[derive( Parser, Debug )]
#[command( name = "aglearn", version )]
struct Args {
    /// Training corpus, one sequence of space separated symbols per line
    train: PathBuf,

    /// Test file, one `<symbols>,<gold label>` record per line
    test: PathBuf,

    /// Where to write the tab separated report
    output: PathBuf,

    /// Comma separated symbols of the alphabet
    #[arg( long, default_value = "a,c,d,e,f,g", value_delimiter = ',' )]
    alphabet: Vec<String>,

    /// Number of preceding tokens the sequence model conditions on
    #[arg( long, default_value_t = DEFAULT_ORDER )]
    order: usize,

    /// Count the corpus on all cores
    #[arg( long )]
    parallel: bool,

    /// Also export the learned rules as JSON
    #[arg( long, value_name = "PATH" )]
    rules_json: Option<PathBuf>,

    /// Print must-precede and must-follow sets in the summary
    #[arg( long )]
    show_must: bool,

    /// Print occurrence and co-occurrence counts in the summary
    #[arg( long )]
    show_counts: bool,

    /// Log more (repeat for trace output)
    #[arg( short, long, action = clap::ArgAction::Count )]
    verbose: u8,

    /// Only log warnings and errors
    #[arg( short, long, conflicts_with = "verbose" )]
    quiet: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    prepare_logging( log_level( &args ));

    match run( &args ) {
	Ok( () ) => ExitCode::SUCCESS,
	Err( err ) => {
	    error!( "{err}" );
	    eprintln!( "aglearn: {err}" );
	    ExitCode::from( err.exit_code() )
	},
    }
}

fn run( args: &Args ) -> Result<()> {
    let alphabet = Alphabet::new( args.alphabet.iter().map( |symbol| symbol.trim() ).filter( |symbol| !symbol.is_empty() ));
    info!( "Alphabet of {} symbols", alphabet.len() );

    let corpus = io::read_corpus( &args.train )?;
    let learner = if args.parallel {
	RuleLearner::train_parallel( alphabet, &corpus )
    } else {
	RuleLearner::train( alphabet, &corpus )
    };
    let grammar = learner.finish( args.order );
    grammar.rules.log( "learned", Level::DEBUG );

    let mut rules_formatter = RulesFormatter::new();
    if args.show_must { rules_formatter.show_must(); }
    if args.show_counts { rules_formatter.show_counts(); }
    print!( "{}", rules_formatter.format_pretty( &grammar.rules ));
    print!( "{}", NgramFormatter::new().format_pretty( &grammar.model ));

    if let Some( path ) = &args.rules_json {
	io::write_rules_json( &grammar.rules, path )?;
	info!( "Wrote rules to {}", path.display() );
    }

    let records = io::read_test_records( &args.test )?;
    let evaluations = evaluate( &grammar, records );
    io::save_report( &evaluations, &args.output )?;

    println!( "{}", Agreement::tally( &evaluations ));
    Ok( () )
}

fn log_level( args: &Args ) -> LevelFilter {
    if args.quiet {
	return LevelFilter::WARN;
    }
    match args.verbose {
	0 => LevelFilter::INFO,
	1 => LevelFilter::DEBUG,
	_ => LevelFilter::TRACE,
    }
}

fn prepare_logging( level: LevelFilter ) {
    let tracer = tracing_subscriber::fmt::fmt()
	.with_max_level( level )
	.with_writer( std::io::stderr )
	.finish();
    if tracing::subscriber::set_global_default( tracer ).is_err() {
	eprintln!( "aglearn: logging was already initialized" );
    }
}
