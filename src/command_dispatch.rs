//! Purpose: Hold top-level CLI command dispatch for `flashmark`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Markup goes to stdout only after the whole batch decoded successfully.

use super::*;

pub(super) fn dispatch_command(command: Command) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "flashmark", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Palette { json } => {
            if json {
                emit_json(palette_json());
            } else {
                emit_palette_human();
            }
            Ok(RunOutcome::ok())
        }
        Command::Render {
            input,
            no_dismiss,
            input_mode,
            strict_severity,
        } => {
            let policy = if strict_severity {
                SeverityPolicy::Strict
            } else {
                SeverityPolicy::Fallback
            };
            let options = RenderOptions::dismissable(!no_dismiss);
            let text = read_input(input.as_deref())?;
            let markup = render_input(&text, input_mode, policy, &options)?;
            write_stdout(&markup)?;
            Ok(RunOutcome::ok())
        }
    }
}
