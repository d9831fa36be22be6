use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("xframe {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: xframe");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("envelope_marker: {}", xframe::wire::MARKER);
    println!("sentinel_attribute: {}", xframe::host::SENTINEL_ATTRIBUTE);
    println!(
        "message_types: {}, {}, {}",
        xframe::wire::EVENT_BATCH,
        xframe::wire::DATA,
        xframe::wire::READY
    );
    println!(
        "features: async={}, cli=true",
        cfg!(feature = "async")
    );

    Ok(SUCCESS)
}
