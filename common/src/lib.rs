/*
Copyright (c) 2015, Intel Corporation
Copyright (c) 2025, Christian Asch

Redistribution and use in source and binary forms, with or without
modification, are permitted provided that the following conditions
are met:

* Redistributions of source code must retain the above copyright
      notice, this list of conditions and the following disclaimer.
* Redistributions in binary form must reproduce the above
      copyright notice, this list of conditions and the following
      disclaimer in the documentation and/or other materials provided
      with the distribution.
* Neither the name of Intel Corporation nor the names of its
      contributors may be used to endorse or promote products
      derived from this software without specific prior written
      permission.

THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS
"AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT
LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS
FOR A PARTICULAR PURPOSE ARE DISCLAIMED. IN NO EVENT SHALL THE
COPYRIGHT OWNER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT,
INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING,
BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR SERVICES;
LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT
LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN
ANY WAY OUT OF THE USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE
POSSIBILITY OF SUCH DAMAGE.
*/

//! Shared harness for the Rust Parallel Research Kernels: banner, the
//! warm-up-skipping iteration timer and the bandwidth report.

use std::mem;
use std::time::{Duration, Instant};

/// Validation threshold shared by the kernels.
pub const EPSILON: f64 = 1.0e-8;

pub fn banner(kernel: &str) {
    println!("Parallel Research Kernels version {}", env!("CARGO_PKG_VERSION"));
    println!("Rust {}", kernel);
}

/// Wall clock that ignores iteration 0.
///
/// Kernels run `iterations + 1` passes and call [`IterationTimer::tick`] at
/// the top of each one; the clock restarts when pass 1 begins so the
/// warm-up pass is not counted.
#[derive(Debug)]
pub struct IterationTimer {
    timer: Instant,
    t0: Duration,
}

impl IterationTimer {
    pub fn new() -> Self {
        let timer = Instant::now();
        IterationTimer {
            t0: timer.elapsed(),
            timer,
        }
    }

    pub fn tick(&mut self, k: u64) {
        if k == 1 {
            self.t0 = self.timer.elapsed();
        }
    }

    pub fn seconds(&self) -> f64 {
        self.timer.elapsed().saturating_sub(self.t0).as_secs_f64()
    }
}

impl Default for IterationTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Bytes moved by `words` double precision loads or stores.
pub fn f64_bytes(words: usize) -> usize {
    words * mem::size_of::<f64>()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rate {
    /// Megabytes per second
    pub mbs: f64,
    /// Seconds per timed iteration
    pub avgtime: f64,
}

impl Rate {
    pub fn new(bytes: usize, total_time: f64, iterations: u64) -> Self {
        let avgtime = total_time / iterations as f64;
        Rate {
            mbs: 1.0e-6 * bytes as f64 / avgtime,
            avgtime,
        }
    }

    pub fn print(&self) {
        println!(
            "Rate (MB/s): {:10.3} Avg time (s): {:10.3}",
            self.mbs, self.avgtime
        );
    }
}
