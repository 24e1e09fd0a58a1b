/// Log line queued for delivery on the next outbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogNotice {
    pub message: String,
    pub level: &'static str,
}

impl LogNotice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: "INFO",
        }
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: "WARN",
        }
    }

    pub fn cmd(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: "CMD",
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: "SUCCESS",
        }
    }
}
