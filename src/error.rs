#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Config(toml::de::Error),
    /// No response arrived within the request timeout.
    Timeout,
    NotConnected,
    AlreadyConnected,
    /// Error code 1 from the device.
    InvalidParameter,
    /// Error code 2 from the device.
    FunctionNotSupported,
    /// Error code 3 from the device.
    UnknownDeviceError,
    WrongResponseLength {
        function_id: u8,
        expected: usize,
        actual: usize,
    },
    /// A field held a value outside its documented range.
    UnexpectedValue {
        function_id: u8,
        value: u8,
    },
    InvalidUid(String),
    WrongDeviceType {
        uid: String,
        expected: u16,
        actual: u16,
    },
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<toml::de::Error> for Error {
    fn from(value: toml::de::Error) -> Self {
        Self::Config(value)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::Config(e) => write!(f, "invalid configuration: {e}"),
            Error::Timeout => f.write_str("timed out waiting for a response"),
            Error::NotConnected => f.write_str("not connected"),
            Error::AlreadyConnected => f.write_str("already connected"),
            Error::InvalidParameter => f.write_str("device rejected a parameter"),
            Error::FunctionNotSupported => f.write_str("function not supported by device"),
            Error::UnknownDeviceError => f.write_str("device reported an unknown error"),
            Error::WrongResponseLength {
                function_id,
                expected,
                actual,
            } => write!(
                f,
                "response to function {function_id} has {actual} payload bytes, expected {expected}"
            ),
            Error::UnexpectedValue { function_id, value } => {
                write!(f, "unexpected value {value} in response to function {function_id}")
            }
            Error::InvalidUid(uid) => write!(f, "invalid UID {uid:?}"),
            Error::WrongDeviceType {
                uid,
                expected,
                actual,
            } => write!(
                f,
                "device {uid} has identifier {actual}, expected {expected}"
            ),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Config(e) => Some(e),
            _ => None,
        }
    }
}

