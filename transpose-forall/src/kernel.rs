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

//! Initialization, the transpose sweep and the closed-form check.
//!
//! Both matrices are `order * order`, row-major, indexed `i * order + j`.
//! One sweep performs `B[i,j] += A[j,i]; A[j,i] += 1.0` for every `(i,j)`.
//! Work is handed to the outer policy as disjoint row bands of B and of A,
//! so the fused update is split into a gather pass over B that only reads
//! A, followed by the increment pass over A. Every element sees the same
//! sequence of values as with the fused loop.

use crate::config::Permute;
use crate::policy::{InnerPolicy, OuterPolicy};

/// Shape of the iteration space: the outer policy distributes bands of
/// `band` rows of B; each band is walked in tiles `width` columns wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub band: usize,
    pub width: usize,
    pub permute: Permute,
}

impl Schedule {
    /// `forall` over rows with an inner `forall` over each full row.
    pub fn rows(order: usize) -> Self {
        Schedule {
            band: 1,
            width: order,
            permute: Permute::Ij,
        }
    }

    /// Untiled 2-D iteration space.
    pub fn nested(order: usize, permute: Permute) -> Self {
        Schedule {
            band: 1,
            width: order,
            permute,
        }
    }

    /// Square `tile x tile` blocks; edge tiles are partial.
    pub fn tiled(tile: usize, permute: Permute) -> Self {
        Schedule {
            band: tile,
            width: tile,
            permute,
        }
    }
}

/// `A[i,j] = i*order + j`, `B = 0`, touched under the same policies as the
/// transpose so pages land where the sweeps will use them.
pub fn initialize<O, I>(order: usize, schedule: &Schedule, a: &mut [f64], b: &mut [f64])
where
    O: OuterPolicy,
    I: InnerPolicy,
{
    assert_eq!(a.len(), order * order);
    assert_eq!(b.len(), order * order);
    if order == 0 {
        return;
    }

    let band_len = schedule.band * order;
    O::for_each_band_pair(a, b, band_len, |k, a_band, b_band| {
        I::iota(a_band, k * band_len);
        I::fill(b_band, 0.0);
    });
}

/// One sweep of `B += A^T; A += 1`.
pub fn transpose<O, I>(order: usize, schedule: &Schedule, a: &mut [f64], b: &mut [f64])
where
    O: OuterPolicy,
    I: InnerPolicy,
{
    assert_eq!(a.len(), order * order);
    assert_eq!(b.len(), order * order);
    if order == 0 {
        return;
    }

    let band_len = schedule.band * order;
    let width = schedule.width.max(1);
    let a_ro: &[f64] = &*a;
    O::for_each_band(b, band_len, |k, b_band| {
        let row0 = k * schedule.band;
        let rows = b_band.len() / order;
        for col0 in (0..order).step_by(width) {
            let cols = width.min(order - col0);
            match schedule.permute {
                // A[j, row0..row0+rows] is contiguous; B is written down a column
                Permute::Ji => {
                    for j in col0..col0 + cols {
                        let src = &a_ro[j * order + row0..j * order + row0 + rows];
                        I::scatter_add(b_band, j, order, src);
                    }
                }
                Permute::Ij | Permute::None => {
                    for (r, bi) in b_band.chunks_exact_mut(order).enumerate() {
                        let i = row0 + r;
                        I::gather_add(&mut bi[col0..col0 + cols], a_ro, col0 * order + i, order);
                    }
                }
            }
        }
    });

    O::for_each_band(a, band_len, |_, a_band| I::increment(a_band));
}

/// Sum of `|B[j,i] - reference(i,j)|` after `iterations + 1` sweeps.
pub fn abs_error(order: usize, iterations: u64, b: &[f64]) -> f64 {
    let iters = iterations as f64;
    let addit = (iters + 1.0) * (iters / 2.0);
    let mut abserr: f64 = 0.0;
    for i in 0..order {
        for j in 0..order {
            let ij = i * order + j;
            let ji = j * order + i;
            let reference: f64 = ij as f64 * (1.0 + iters) + addit;
            abserr += (b[ji] - reference).abs();
        }
    }
    abserr
}
