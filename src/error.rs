#[derive(Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Referential,
    Grouping,
    Output,
}

#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
}

impl Error {
    pub fn new<T: Into<String>>(kind: ErrorKind, message: T) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn new_referential<T: Into<String>>(message: T) -> Self {
        Self::new(ErrorKind::Referential, message)
    }

    pub fn new_grouping<T: Into<String>>(message: T) -> Self {
        Self::new(ErrorKind::Grouping, message)
    }

    pub fn new_output<T: Into<String>>(message: T) -> Self {
        Self::new(ErrorKind::Output, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} error: {}", self.kind, self.message)
    }
}

impl std::error::Error for Error {}
