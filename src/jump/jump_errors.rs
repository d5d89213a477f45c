use std::fmt;

#[derive(Debug)]
pub enum JumpError {
    DegenerateBox(String),
    NonMonotonicTimestamp(NonMonotonicTimestamp),
    BadConfig(String),
    ConfigParse(toml::de::Error),
    Serialization(serde_json::Error),
    Io(std::io::Error),
}

impl From<NonMonotonicTimestamp> for JumpError {
    fn from(e: NonMonotonicTimestamp) -> Self {
        JumpError::NonMonotonicTimestamp(e)
    }
}

impl From<toml::de::Error> for JumpError {
    fn from(e: toml::de::Error) -> Self {
        JumpError::ConfigParse(e)
    }
}

impl From<serde_json::Error> for JumpError {
    fn from(e: serde_json::Error) -> Self {
        JumpError::Serialization(e)
    }
}

impl From<std::io::Error> for JumpError {
    fn from(e: std::io::Error) -> Self {
        JumpError::Io(e)
    }
}

impl fmt::Display for JumpError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            JumpError::DegenerateBox(txt) => write!(f, "DegenerateBox: {}", txt),
            JumpError::NonMonotonicTimestamp(e) => write!(f, "{}", e),
            JumpError::BadConfig(txt) => write!(f, "BadConfig: {}", txt),
            JumpError::ConfigParse(e) => write!(f, "ConfigParse: {}", e),
            JumpError::Serialization(e) => write!(f, "Serialization: {}", e),
            JumpError::Io(e) => write!(f, "Io: {}", e),
        }
    }
}

impl std::error::Error for JumpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            JumpError::ConfigParse(e) => Some(e),
            JumpError::Serialization(e) => Some(e),
            JumpError::Io(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct NonMonotonicTimestamp {
    pub previous: i64,
    pub current: i64,
}
impl fmt::Display for NonMonotonicTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "NonMonotonicTimestamp: got {} ms after {} ms",
            self.current, self.previous
        )
    }
}
