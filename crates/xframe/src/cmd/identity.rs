use xframe::wire::{FrameIdentity, Sentinel};

use crate::cmd::IdentityArgs;
use crate::exit::{wire_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_identity, OutputFormat};

pub fn run(args: IdentityArgs, format: OutputFormat) -> CliResult<i32> {
    let sentinel = Sentinel::new(args.sentinel);
    if sentinel.is_empty() {
        return Err(CliError::new(USAGE, "sentinel must not be empty"));
    }

    let mut identity = FrameIdentity::new(sentinel);
    if let Some(script_src) = args.script_src {
        identity = identity.with_script_src(script_src);
    }

    let payload = identity
        .to_payload()
        .map_err(|err| wire_error("failed to encode identity", err))?;
    print_identity(&identity, &payload, format);
    Ok(SUCCESS)
}
