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

//! Command line parsing.
//!
//! Two positionals followed by free-form `key=value` words, the way the
//! C++ kernels take their variant switches:
//!
//! ```text
//! transpose <# iterations> <matrix order> [nested=y|n] [for=seq|omp|tbb]
//!           [simd=y|n] [tiled=y|n] [permute=ij|ji] [tile=<n>]
//! ```

use std::fmt;

use clap::Parser;
use log::warn;

use crate::error::ConfigError;
use crate::kernel::Schedule;

pub const DEFAULT_TILE_SIZE: usize = 32;

/// floor(sqrt(i32::MAX)): larger orders overflow a 32-bit element index.
pub const MAX_ORDER: i64 = 46340;

#[derive(Parser, Debug)]
#[command(
    name = "transpose",
    version,
    about = "Matrix transpose B = A^T under selectable execution policies",
    long_about = None
)]
pub struct Args {
    /// Number of timed transposes
    #[arg(allow_negative_numbers = true)]
    pub iterations: i64,
    /// Order of the square matrices
    #[arg(allow_negative_numbers = true)]
    pub order: i64,
    /// nested={y|n} for={seq|omp|tbb} simd={y|n} tiled={y|n} permute={ij|ji} tile=<n>
    #[arg(value_name = "KEY=VALUE")]
    pub options: Vec<String>,
}

/// Which library runs the outer loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Backend {
    #[default]
    Seq,
    /// data-parallel fork-join
    Omp,
    /// task pool
    Tbb,
}

impl Backend {
    pub fn label(&self) -> &'static str {
        match self {
            Backend::Seq => "Sequential",
            Backend::Omp => "OpenMP",
            Backend::Tbb => "TBB",
        }
    }

    /// Whether this build carries the backend.
    pub fn available(&self) -> bool {
        match self {
            Backend::Seq => true,
            Backend::Omp => cfg!(feature = "fork-join"),
            Backend::Tbb => cfg!(feature = "task-pool"),
        }
    }
}

/// Loop order inside a tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Permute {
    #[default]
    None,
    Ij,
    Ji,
}

impl fmt::Display for Permute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permute::None => write!(f, "no"),
            Permute::Ij => write!(f, "ij"),
            Permute::Ji => write!(f, "ji"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub iterations: u64,
    pub order: usize,
    pub backend: Backend,
    pub nested: bool,
    pub simd: bool,
    pub tiled: bool,
    pub permute: Permute,
    pub tile_size: usize,
}

fn yes_no(value: &str) -> Option<bool> {
    match value {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

impl Config {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        if args.iterations < 1 {
            return Err(ConfigError::Iterations(args.iterations));
        }
        if args.order <= 0 {
            return Err(ConfigError::NonPositiveOrder(args.order));
        } else if args.order > MAX_ORDER {
            return Err(ConfigError::OrderTooLarge(args.order));
        }

        let mut config = Config {
            iterations: args.iterations as u64,
            order: args.order as usize,
            backend: Backend::Seq,
            nested: true,
            simd: true,
            tiled: false,
            permute: Permute::None,
            tile_size: DEFAULT_TILE_SIZE,
        };
        for word in &args.options {
            config.apply(word)?;
        }

        let explicit_tile = args.options.iter().any(|w| w.starts_with("tile="));
        if config.clamp_tile(explicit_tile) {
            warn!(
                "tile size exceeds matrix order {}, clamping",
                config.order
            );
        }
        if config.tiled && !config.nested {
            warn!("tiled=y needs nested=y, running untiled");
        }
        Ok(config)
    }

    /// Caps the tile at the order. Returns true when the clamp changes a
    /// tile that is actually used or was asked for with `tile=`.
    fn clamp_tile(&mut self, explicit: bool) -> bool {
        if self.tile_size <= self.order {
            return false;
        }
        self.tile_size = self.order;
        explicit || (self.tiled && self.nested)
    }

    fn apply(&mut self, word: &str) -> Result<(), ConfigError> {
        let Some((key, value)) = word.split_once('=') else {
            warn!("ignoring option {:?}", word);
            return Ok(());
        };
        let flag = |current: bool| match yes_no(value) {
            Some(v) => v,
            None => {
                warn!("ignoring {}={}", key, value);
                current
            }
        };
        match key {
            "for" => match value {
                "seq" => self.backend = Backend::Seq,
                "omp" | "openmp" => self.backend = Backend::Omp,
                "tbb" => self.backend = Backend::Tbb,
                _ => warn!("ignoring for={}", value),
            },
            "simd" => self.simd = flag(self.simd),
            "nested" => self.nested = flag(self.nested),
            "tiled" => self.tiled = flag(self.tiled),
            "permute" => match value {
                "ij" => self.permute = Permute::Ij,
                "ji" => self.permute = Permute::Ji,
                _ => warn!("ignoring permute={}", value),
            },
            "tile" => {
                self.tile_size = value
                    .parse::<usize>()
                    .ok()
                    .filter(|&t| t > 0)
                    .ok_or_else(|| ConfigError::TileSize(value.to_string()))?;
            }
            _ => warn!("unknown option {:?}", key),
        }
        Ok(())
    }

    /// Iteration space layout implied by nested/tiled/permute.
    pub fn schedule(&self) -> Schedule {
        if !self.nested {
            Schedule::rows(self.order)
        } else if self.tiled {
            Schedule::tiled(self.tile_size, self.permute)
        } else {
            Schedule::nested(self.order, self.permute)
        }
    }

    pub fn print(&self) {
        let yes = |b: bool| if b { "yes" } else { "no" };
        println!("Number of iterations  = {}", self.iterations);
        println!("Matrix order          = {}", self.order);
        println!("Tile size             = {}", self.tile_size);
        println!("Threading             = {}", self.backend.label());
        println!("Nested forall         = {}", yes(self.nested));
        println!("Use simd              = {}", yes(self.simd));
        println!("Use tiling            = {}", yes(self.tiled));
        println!("Use permute           = {}", self.permute);
    }
}
