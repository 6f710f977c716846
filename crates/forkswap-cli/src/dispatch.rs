use forkswap_core::{
    environment_status, outcome_from_error, switch_to_local, switch_to_official, CommandContext,
    CommandGroup, CommandInfo, ExecutionOutcome, GlobalOptions, SwitchRequest,
};

use crate::cli::CommandGroupCli;

pub fn command_info(group: &CommandGroupCli) -> CommandInfo {
    match group {
        CommandGroupCli::Local(_) => CommandInfo::new(CommandGroup::Local, "local"),
        CommandGroupCli::Official(_) => CommandInfo::new(CommandGroup::Official, "official"),
        CommandGroupCli::Status(_) => CommandInfo::new(CommandGroup::Status, "status"),
    }
}

pub fn dispatch_command(
    global: &GlobalOptions,
    group: &CommandGroupCli,
) -> (CommandInfo, ExecutionOutcome) {
    let info = command_info(group);
    let ctx = match CommandContext::new(global) {
        Ok(ctx) => ctx,
        Err(err) => return (info, outcome_from_error(&err)),
    };
    tracing::debug!(
        command = info.name,
        root = %ctx.root().display(),
        installer = ctx.config().installer().as_str(),
        "dispatching"
    );
    let outcome = match group {
        CommandGroupCli::Local(args) => core_call(info, || {
            switch_to_local(
                &ctx,
                &SwitchRequest {
                    dry_run: args.dry_run,
                },
            )
        }),
        CommandGroupCli::Official(args) => core_call(info, || {
            switch_to_official(
                &ctx,
                &SwitchRequest {
                    dry_run: args.dry_run,
                },
            )
        }),
        CommandGroupCli::Status(_) => core_call(info, || environment_status(&ctx)),
    };
    (info, outcome)
}

fn core_call<F>(info: CommandInfo, action: F) -> ExecutionOutcome
where
    F: FnOnce() -> anyhow::Result<ExecutionOutcome>,
{
    match action() {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::debug!(command = info.name, error = ?err, "command failed");
            outcome_from_error(&err)
        }
    }
}
