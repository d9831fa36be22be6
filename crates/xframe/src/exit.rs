use std::fmt;
use std::io;

use xframe::host::HostError;
use xframe::router::RouterError;
use xframe::wire::WireError;
use xframe::ScenarioError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const NOT_FOUND: i32 = 44;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::NotFound => NOT_FOUND,
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn wire_error(context: &str, err: WireError) -> CliError {
    CliError::new(DATA_INVALID, format!("{context}: {err}"))
}

pub fn host_error(context: &str, err: HostError) -> CliError {
    let code = match &err {
        HostError::InsecureUrl(_)
        | HostError::InvalidUrl { .. }
        | HostError::SameOriginPing(_)
        | HostError::Wire(_) => DATA_INVALID,
        HostError::NonExistentFrame(_) | HostError::NotAcquired(_) => USAGE,
        HostError::InconsistentState(_) => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn router_error(context: &str, err: RouterError) -> CliError {
    let code = match &err {
        RouterError::Identity(_) | RouterError::Wire(_) => DATA_INVALID,
        RouterError::NoListener(_) | RouterError::Configuration(_) => FAILURE,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn scenario_error(context: &str, err: ScenarioError) -> CliError {
    match err {
        ScenarioError::Host(err) => host_error(context, err),
        ScenarioError::Router(err) => router_error(context, err),
        other => CliError::new(USAGE, format!("{context}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xframe::wire::CallerId;

    #[test]
    fn maps_io_kinds() {
        let err = io_error("read", io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.code, NOT_FOUND);
        assert_eq!(err.message, "read: gone");
    }

    #[test]
    fn maps_lifecycle_errors_to_usage() {
        let err = host_error("teardown", HostError::NotAcquired(CallerId::from("4")));
        assert_eq!(err.code, USAGE);
        let err = scenario_error(
            "simulate",
            ScenarioError::Host(HostError::NonExistentFrame("v".to_string())),
        );
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn maps_bad_input_to_data_invalid() {
        let err = wire_error("decode", WireError::MissingMarker);
        assert_eq!(err.code, DATA_INVALID);
        let err = router_error("route", RouterError::Identity(WireError::MissingIdentity));
        assert_eq!(err.code, DATA_INVALID);
    }

    #[test]
    fn strict_configuration_failure_is_plain_failure() {
        let err = router_error("route", RouterError::Configuration("missing hook".into()));
        assert_eq!(err.code, FAILURE);
    }
}
