use thiserror::Error;

/// Failures raised before a tool is dispatched. These surface as protocol
/// errors, never as tool content.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdapterError {
    #[error("Unknown action: {0}")]
    UnknownAction(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_displays_offending_name() {
        let e = AdapterError::UnknownAction("unknown_tool".into());
        assert_eq!(e.to_string(), "Unknown action: unknown_tool");
    }
}
