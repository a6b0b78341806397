#[derive(Debug)]
pub enum Error {
    IOError(std::io::Error),
    TOMLParseError(toml::de::Error),
    JSONError(serde_json::Error),
    SpawnError(std::io::Error),
    EmptyRunCommand,
    BadLogLevel(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IOError(e) => {
                write!(f, "input/output error: {}", e)
            }
            Self::TOMLParseError(e) => {
                write!(f, "error parsing TOML: {}", e)
            }
            Self::JSONError(e) => {
                write!(f, "JSON error: {}", e)
            }
            Self::SpawnError(e) => {
                write!(f, "cannot launch solution: {}", e)
            }
            Self::EmptyRunCommand => {
                write!(f, "run command is empty")
            }
            Self::BadLogLevel(e) => {
                write!(f, "invalid log level {}", e)
            }
        }
    }
}

impl std::error::Error for Error {}
