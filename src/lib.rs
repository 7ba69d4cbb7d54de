
pub mod data;
pub mod error;
pub mod learner;
pub mod checker;
pub mod model;
pub mod evaluation;
pub mod io;

use tracing::{Level, debug, error, info, trace, warn};

pub use data::{Alphabet, Symbol, SymbolSet, Sequence, Count};
pub use learner::{RuleLearner, RuleTables, Grammar};
pub use checker::{RuleChecker, Classification, Verdict};
pub use model::{SequenceModel, NgramModel};
pub use evaluation::{TestRecord, Evaluation, Agreement, evaluate};

/// Objects that can be recorded in the log
pub trait Loggable {
    fn log(&self, message: &str, level: tracing::Level );
}

/// Emits a message at a level only known at run time
pub fn log_at( level: Level, message: &str ) {
    match level {
	Level::ERROR => error!( "{message}" ),
	Level::WARN => warn!( "{message}" ),
	Level::INFO => info!( "{message}" ),
	Level::DEBUG => debug!( "{message}" ),
	_ => trace!( "{message}" ),
    }
}
