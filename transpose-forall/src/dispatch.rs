//
// Copyright (c) 2013, Intel Corporation
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions
// are met:
//
// * Redistributions of source code must retain the above copyright
//       notice, this list of conditions and the following disclaimer.
// * Redistributions in binary form must reproduce the above
//       copyright notice, this list of conditions and the following
//       disclaimer in the documentation and/or other materials provided
//       with the distribution.
// * Neither the name of Intel Corporation nor the names of its
//       contributors may be used to endorse or promote products
//       derived from this software without specific prior written
//       permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS
// "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT
// LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS
// FOR A PARTICULAR PURPOSE ARE DISCLAIMED. IN NO EVENT SHALL THE
// COPYRIGHT OWNER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT,
// INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING,
// BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR SERVICES;
// LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
// CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT
// LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN
// ANY WAY OUT OF THE USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE
// POSSIBILITY OF SUCH DAMAGE.

//! Runtime selection of the policy pair.

use log::debug;
use prk::IterationTimer;

use crate::config::{Backend, Config};
use crate::kernel::{abs_error, initialize, transpose};
#[cfg(feature = "fork-join")]
use crate::policy::ForkJoinExec;
#[cfg(feature = "task-pool")]
use crate::policy::TaskExec;
use crate::policy::{InnerPolicy, OuterPolicy, SeqExec, SimdExec};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Time spent in sweeps 1..=iterations
    pub seconds: f64,
    pub abserr: f64,
}

/// Allocates, initializes and runs `iterations + 1` sweeps under `O`/`I`.
pub fn run<O, I>(config: &Config) -> Measurement
where
    O: OuterPolicy,
    I: InnerPolicy,
{
    let order = config.order;
    let schedule = config.schedule();
    debug!(
        "outer={} inner={} schedule={:?}",
        O::NAME,
        I::NAME,
        schedule
    );

    let nelems: usize = order * order;
    let mut a: Vec<f64> = vec![0.0; nelems];
    let mut b: Vec<f64> = vec![0.0; nelems];
    initialize::<O, I>(order, &schedule, &mut a, &mut b);

    let mut timer = IterationTimer::new();
    for k in 0..=config.iterations {
        timer.tick(k);
        transpose::<O, I>(order, &schedule, &mut a, &mut b);
    }
    let seconds = timer.seconds();
    debug!("{} timed sweeps in {:.6} s", config.iterations, seconds);

    Measurement {
        seconds,
        abserr: abs_error(order, config.iterations, &b),
    }
}

/// Runs the benchmark with the policies named by `config`. Asking for a
/// backend this build was compiled without aborts the process.
#[allow(unreachable_patterns)]
pub fn execute(config: &Config) -> Measurement {
    if !config.backend.available() {
        unsupported(config.backend);
    }
    match (config.backend, config.simd) {
        (Backend::Seq, false) => run::<SeqExec, SeqExec>(config),
        (Backend::Seq, true) => run::<SeqExec, SimdExec>(config),
        #[cfg(feature = "fork-join")]
        (Backend::Omp, false) => run::<ForkJoinExec, SeqExec>(config),
        #[cfg(feature = "fork-join")]
        (Backend::Omp, true) => run::<ForkJoinExec, SimdExec>(config),
        #[cfg(feature = "task-pool")]
        (Backend::Tbb, false) => run::<TaskExec, SeqExec>(config),
        #[cfg(feature = "task-pool")]
        (Backend::Tbb, true) => run::<TaskExec, SimdExec>(config),
        (backend, _) => unsupported(backend),
    }
}

fn unsupported(backend: Backend) -> ! {
    println!(
        "You are trying to use {} but this build does not support it!",
        backend.label()
    );
    std::process::abort()
}
