// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The runner harness: the `iterate` contract, the loop that hosts it, and
//! the two ways to host a worker — on a thread of this process, or in a
//! fresh child process.

mod error;
mod handle;
mod harness;
mod lifecycle;
mod process;
mod runner;
mod thread_runner;

pub use error::{IterateError, RunnerConstructionError};
pub use handle::RunnerHandle;
pub use harness::{run_life, HarnessContext};
pub use lifecycle::Lifecycle;
pub use process::{run_spawned_worker, InterruptFlag, ProcessRunner, ProcessSpawnSpec, SPAWN_SPEC_ENV_VAR};
pub use runner::{construct_harnessed, FailedConstruction, Interruptor, Runner};
pub use thread_runner::ThreadRunner;
