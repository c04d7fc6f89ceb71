use std::{error, fmt};

// -------------------------------------------------------------------------------------------------

/// Provides an enumeration of all possible errors reported by opldrive.
///
/// These only ever surface at the non-real-time API boundary (string or index addressed
/// parameter and binding access from UIs or preset files). The per-sample processing path is
/// total by design and never produces errors.
#[derive(Debug)]
pub enum Error {
    ParameterNotFound(String),
    ParameterIndexOutOfRange(usize),
    SourceIndexOutOfRange(usize),
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParameterNotFound(name) => write!(f, "No parameter named '{name}'"),
            Self::ParameterIndexOutOfRange(index) => {
                write!(f, "Parameter index {index} out of range")
            }
            Self::SourceIndexOutOfRange(index) => {
                write!(f, "Modulation source index {index} out of range")
            }
        }
    }
}
