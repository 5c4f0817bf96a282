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

//! End-to-end runs of the `transpose` binary.

use assert_cmd::Command;
use predicates::prelude::*;

fn transpose() -> Command {
    Command::cargo_bin("transpose").unwrap()
}

fn validates(args: &[&str]) {
    transpose()
        .args(args)
        .assert()
        .success()
        .stdout(predicate::str::contains("Solution validates"))
        .stdout(predicate::str::contains("Rate (MB/s):"));
}

// ---------------------------------------------------------------------------
// Successful runs
// ---------------------------------------------------------------------------

#[test]
fn default_policies() {
    transpose()
        .args(["4", "50"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Parallel Research Kernels"))
        .stdout(predicate::str::contains("Number of iterations  = 4"))
        .stdout(predicate::str::contains("Matrix order          = 50"))
        .stdout(predicate::str::contains("Threading             = Sequential"))
        .stdout(predicate::str::contains("Solution validates"));
}

#[test]
fn sequential_variants() {
    validates(&["3", "40", "nested=n", "simd=n"]);
    validates(&["3", "40", "nested=n", "simd=y"]);
    validates(&["3", "41", "tiled=y", "tile=8"]);
    validates(&["3", "41", "tiled=y", "tile=8", "permute=ji", "simd=n"]);
}

#[cfg(feature = "fork-join")]
#[test]
fn openmp_variants() {
    transpose()
        .args(["3", "64", "for=omp"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Threading             = OpenMP"));
    validates(&["3", "64", "for=openmp", "nested=n"]);
    validates(&["3", "67", "for=omp", "tiled=y", "permute=ji"]);
}

#[cfg(feature = "task-pool")]
#[test]
fn tbb_variants() {
    transpose()
        .args(["3", "64", "for=tbb"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Threading             = TBB"));
    validates(&["3", "64", "for=tbb", "nested=n", "simd=n"]);
    validates(&["3", "67", "for=tbb", "tiled=y", "tile=16"]);
}

#[test]
fn oversized_tile_is_clamped() {
    transpose()
        .env_remove("PRK_LOG")
        .args(["2", "10", "tiled=y", "tile=64"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tile size             = 10"))
        .stderr(predicate::str::contains("clamping"));
}

#[test]
fn default_tile_on_small_untiled_matrix_is_quiet() {
    transpose()
        .env_remove("PRK_LOG")
        .args(["2", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tile size             = 10"))
        .stderr(predicate::str::contains("clamping").not());
}

// ---------------------------------------------------------------------------
// Rejected input
// ---------------------------------------------------------------------------

#[test]
fn zero_iterations() {
    transpose()
        .args(["0", "10"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("ERROR: iterations must be >= 1"))
        .stdout(predicate::str::contains("Solution validates").not());
}

#[test]
fn negative_iterations() {
    transpose()
        .args(["-2", "10"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("ERROR: iterations must be >= 1"));
}

#[test]
fn non_positive_order() {
    transpose()
        .args(["1", "0"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("ERROR: Matrix Order must be greater than 0"));
}

#[test]
fn order_too_large() {
    transpose()
        .args(["1", "50000"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("overflow risk"));
}

#[test]
fn bad_tile() {
    transpose()
        .args(["1", "16", "tile=0"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("tile size must be a positive integer"));
}

#[test]
fn missing_arguments_prints_usage() {
    transpose()
        .arg("10")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Usage"))
        .stderr(predicate::str::contains("Usage").not());
}

#[test]
fn non_numeric_iterations() {
    transpose()
        .args(["ten", "10"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("invalid value 'ten'"))
        .stderr(predicate::str::contains("invalid value").not());
}

#[test]
fn unknown_flag() {
    transpose()
        .args(["1", "8", "-x"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("error:"))
        .stderr(predicate::str::contains("error:").not());
}

#[test]
fn help_flag() {
    transpose()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("KEY=VALUE"));
}

#[cfg(not(feature = "fork-join"))]
#[test]
fn missing_backend_aborts() {
    transpose()
        .args(["1", "8", "for=omp"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("does not support it"));
}
