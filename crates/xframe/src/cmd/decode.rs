use std::io::Read;

use xframe::wire::{decode_envelope, message_type};

use crate::cmd::DecodeArgs;
use crate::exit::{io_error, wire_error, CliResult, SUCCESS};
use crate::output::{print_envelope, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let raw = if args.message == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|err| io_error("failed to read stdin", err))?;
        buf.trim_end().to_string()
    } else {
        args.message
    };

    let envelope = decode_envelope(&raw).map_err(|err| wire_error("decode failed", err))?;
    tracing::debug!(
        msg_type = %envelope.msg_type,
        sentinel = %envelope.sentinel,
        "Decoded envelope"
    );
    if !message_type::is_known(&envelope.msg_type) {
        tracing::warn!(msg_type = %envelope.msg_type, "Unrecognized message type");
    }
    print_envelope(&envelope, format);
    Ok(SUCCESS)
}
