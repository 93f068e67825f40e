//! Purpose: Hold top-level CLI command dispatch for `ocarina-bridge`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Command output is emitted only after any capture region has closed.
//! Invariants: Native faults are reported in the JSON payload, not as process errors.

use clap::CommandFactory;
use ocarina_bridge::api::{
    Backend, CallResult, ProbeEngine, ProbeScript, Session, WriteMode, classify, extract_message,
};
use serde::Serialize;

use super::*;

pub(super) fn dispatch_command(command: Command, color_mode: ColorMode) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "ocarina-bridge", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Version => {
            emit_version_output(color_mode);
            Ok(RunOutcome::ok())
        }
        Command::Classify { file } => {
            let text = read_input(file.as_deref())?;
            let diagnostics = classify(&text);
            emit_json(to_json(&diagnostics)?, color_mode);
            Ok(RunOutcome::ok())
        }
        Command::ExtractFault { file } => {
            let text = read_input(file.as_deref())?;
            emit_json(json!({ "message": extract_message(&text) }), color_mode);
            Ok(RunOutcome::ok())
        }
        Command::Probe(args) => {
            let mut session = Session::new(ProbeEngine::new(probe_script(&args)));
            let result = run_probe_call(&mut session, args.call, &args.arg)?;
            let calls = session.engine().calls().to_vec();
            emit_json(
                json!({
                    "call": format!("{:?}", args.call).to_lowercase(),
                    "engine_calls": calls,
                    "result": result,
                }),
                color_mode,
            );
            Ok(RunOutcome::ok())
        }
        Command::Selftest => {
            let checks = selftest::run_checks()?;
            let ok = checks.iter().all(|check| check.ok);
            if !ok {
                let failed = checks.iter().filter(|check| !check.ok).count();
                let use_color = color_mode.use_color(io::stderr().is_terminal());
                eprintln!(
                    "{} {failed} selftest check(s) failed",
                    colorize_label("warning:", use_color, AnsiColor::Yellow)
                );
            }
            emit_json(json!({ "ok": ok, "checks": to_json(&checks)? }), color_mode);
            Ok(if ok {
                RunOutcome::ok()
            } else {
                RunOutcome::with_code(1)
            })
        }
    }
}

fn probe_script(args: &ProbeArgs) -> ProbeScript {
    let mode = if args.raw {
        WriteMode::Raw
    } else {
        WriteMode::Stdio
    };
    let script = ProbeScript::new()
        .with_stdout(args.stdout.as_str())
        .with_stderr(args.stderr.as_str())
        .with_mode(mode);
    match &args.fault {
        Some(message) => script.with_fault(message.as_str()),
        None => script,
    }
}

fn run_probe_call(
    session: &mut Session<ProbeEngine>,
    call: ProbeCall,
    arg: &str,
) -> Result<Value, Error> {
    match call {
        ProbeCall::Version => result_json(session.version()?),
        ProbeCall::Status => result_json(session.status()?),
        ProbeCall::Reset => result_json(session.reset()?),
        ProbeCall::Load => result_json(session.load(arg)?),
        ProbeCall::Analyze => result_json(session.analyze()?),
        ProbeCall::Instantiate => result_json(session.instantiate(arg)?),
        ProbeCall::Generate => {
            let backend = arg.parse::<Backend>()?;
            result_json(session.generate(backend)?)
        }
        ProbeCall::Root => result_json(session.get_root()?),
    }
}

fn result_json<T: Serialize>(result: CallResult<T>) -> Result<Value, Error> {
    to_json(&result)
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, Error> {
    serde_json::to_value(value).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("failed to encode output")
            .with_source(err)
    })
}
