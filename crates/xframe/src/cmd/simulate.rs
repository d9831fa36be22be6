use xframe::{run_scenario, Scenario};

use crate::cmd::SimulateArgs;
use crate::exit::{io_error, scenario_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_report, OutputFormat};

pub fn run(args: SimulateArgs, format: OutputFormat) -> CliResult<i32> {
    let context = format!("scenario {}", args.path.display());
    let text = std::fs::read_to_string(&args.path).map_err(|err| io_error(&context, err))?;
    let mut scenario = Scenario::from_json(&text)
        .map_err(|err| CliError::new(DATA_INVALID, format!("{context}: {err}")))?;
    scenario.strict |= args.strict;

    tracing::info!(
        path = %args.path.display(),
        transports = scenario.transports.len(),
        steps = scenario.steps.len(),
        "Replaying scenario"
    );

    let report = run_scenario(&scenario).map_err(|err| scenario_error(&context, err))?;
    print_report(&report, format);
    Ok(SUCCESS)
}
