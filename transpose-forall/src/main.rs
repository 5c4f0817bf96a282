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

//////////////////////////////////////////////////////////////////////
//
// NAME:    transpose
//
// PURPOSE: This program measures the time for the transpose of a
//          column-major stored matrix into a row-major stored matrix.
//
// USAGE:   Program input is the number of times to repeat the operation,
//          the matrix order and a set of execution policy switches:
//
//          transpose <# iterations> <matrix order>
//                    [nested={y|n}] [for={seq|omp|tbb}] [simd={y|n}]
//                    [tiled={y|n}] [permute={ij|ji}] [tile=<n>]
//
//          The output consists of diagnostics to make sure the
//          transpose worked and timing statistics. Set PRK_LOG=debug
//          for the sum of absolute differences.
//
// HISTORY: Written by  Rob Van der Wijngaart, February 2009.
//          Converted to C++11 by Jeff Hammond, February 2016 and May 2017.
//
//////////////////////////////////////////////////////////////////////

use std::process::ExitCode;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use log::{debug, LevelFilter};

use transpose_forall::{execute, Args, Config};

fn run(args: &Args) -> Result<ExitCode> {
    ///////////////////////////////////////////////
    // Read and test input parameters
    ///////////////////////////////////////////////

    let config = Config::from_args(args)?;
    config.print();

    ///////////////////////////////////////////////
    // Allocate, initialize and run the transpose
    ///////////////////////////////////////////////

    let m = execute(&config);

    ///////////////////////////////////////////////
    // Analyze and output results
    ///////////////////////////////////////////////

    debug!("Sum of absolute differences: {:30.15}", m.abserr);

    if m.abserr < prk::EPSILON {
        println!("Solution validates");
        let bytes = 2 * prk::f64_bytes(config.order * config.order);
        prk::Rate::new(bytes, m.seconds, config.iterations).print();
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "ERROR: Aggregate squared error {:30.15} exceeds threshold {:30.15}",
            m.abserr,
            prk::EPSILON
        );
        Ok(ExitCode::FAILURE)
    }
}

fn main() -> ExitCode {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Warn)
        .parse_env(env_logger::Env::default().filter_or("PRK_LOG", "warn"))
        .init();

    prk::banner("forall Matrix transpose: B = A^T");

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            println!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            println!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
