
use std::path::PathBuf;

use thiserror::Error;

/// Failures of a learning and checking run. None of them is recovered from.
#[derive( Error, Debug )]
pub enum Error {
    #[error( "cannot read {}: {source}", .path.display() )]
    Read { path: PathBuf, source: std::io::Error },

    #[error( "cannot write {}: {source}", .path.display() )]
    Write { path: PathBuf, source: std::io::Error },

    #[error( "line {line_number}: no comma-separated gold label in {line:?}" )]
    MissingLabel { line_number: usize, line: String },

    #[error( "cannot serialize rules: {0}" )]
    Serialize( #[from] serde_json::Error ),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {

    /// Process exit status, following sysexits.h
    pub fn exit_code( &self ) -> u8 {
	match self {
	    Error::Read{ .. } => 66,         // EX_NOINPUT
	    Error::MissingLabel{ .. } => 65, // EX_DATAERR
	    Error::Write{ .. } => 73,        // EX_CANTCREAT
	    Error::Serialize( _ ) => 70,     // EX_SOFTWARE
	}
    }

    pub fn read( path: impl Into<PathBuf>, source: std::io::Error ) -> Error {
	Error::Read{ path: path.into(), source }
    }

    pub fn write( path: impl Into<PathBuf>, source: std::io::Error ) -> Error {
	Error::Write{ path: path.into(), source }
    }
}
