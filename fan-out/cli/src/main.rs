// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

mod cli_args;
mod commands;
mod telemetry;

use anyhow::Context;
use clap::Parser;
use cli_args::{Cli, Command, FieldOptions, PiOptions, RuntimeKind};
use fan_out_core::{WorkDispatcher, WorkerRuntime};
use fan_out_process_pipe::ProcessRuntime;
use fan_out_task_channels::TaskRuntime;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::warn;

enum Job {
    Pi(PiOptions),
    Field(FieldOptions),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Workers share the parent's stderr, keep them quiet by default.
    let default_level = match cli.command {
        Command::Worker => "warn",
        _ => "info",
    };
    telemetry::init_tracing(default_level);

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> anyhow::Result<()> {
    let (dispatch, job) = match command {
        Command::Worker => return commands::serve_worker(),
        Command::Pi(options) => (options.dispatch.clone(), Job::Pi(options)),
        Command::Field(options) => (options.dispatch.clone(), Job::Field(options)),
    };
    let config = commands::dispatch_config(&dispatch)?;

    match dispatch.runtime {
        RuntimeKind::Tasks => execute(WorkDispatcher::new(TaskRuntime, config), &job).await,
        RuntimeKind::Processes => {
            let runtime =
                ProcessRuntime::current_exe().context("cannot locate the fanout executable")?;
            execute(WorkDispatcher::new(runtime, config), &job).await
        }
    }
}

async fn execute<R: WorkerRuntime>(dispatcher: WorkDispatcher<R>, job: &Job) -> anyhow::Result<()> {
    cancel_on_ctrl_c(dispatcher.cancellation_token());
    match job {
        Job::Pi(options) => commands::pi(&dispatcher, options).await,
        Job::Field(options) => commands::field(&dispatcher, options).await,
    }
}

/// Setup Ctrl+C handler
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Ctrl+C received, cancelling workers");
            token.cancel();
        }
    });
}
