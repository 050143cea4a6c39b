use clap::ArgMatches;
use clap_complete::generate;

use crate::cli::CompletionsArgs;
use crate::config::Context;
use crate::error::CliError;

use super::util;

pub fn handle(m: &ArgMatches, _ctx: &Context, root: &clap::Command) -> Result<(), CliError> {
    let args: CompletionsArgs = util::parse_args(m)?;
    let mut cmd = root.clone();
    let name = cmd.get_name().to_owned();
    generate(args.shell, &mut cmd, name, &mut std::io::stdout());
    Ok(())
}
