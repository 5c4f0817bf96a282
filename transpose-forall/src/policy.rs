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

//! Loop execution policies.
//!
//! A transpose is written once against two policy types: an outer policy
//! that decides how the row bands of a matrix are distributed, and an inner policy that decides how one contiguous run of
//! elements inside an item is processed. `dispatch` picks the pair at
//! runtime and the compiler monomorphizes each combination.

#[cfg(feature = "fork-join")]
use rayon::prelude::*;

/// Width of the lane blocks used by [`SimdExec`].
pub const LANES: usize = 8;

pub trait OuterPolicy {
    const NAME: &'static str;

    /// Runs `body(k, band)` for every `band_len`-element band of `data`;
    /// the last band may be short.
    fn for_each_band<F>(data: &mut [f64], band_len: usize, body: F)
    where
        F: Fn(usize, &mut [f64]) + Sync + Send;

    /// Same as [`OuterPolicy::for_each_band`] over two equally long
    /// buffers split at the same offsets.
    fn for_each_band_pair<F>(a: &mut [f64], b: &mut [f64], band_len: usize, body: F)
    where
        F: Fn(usize, &mut [f64], &mut [f64]) + Sync + Send;
}

pub trait InnerPolicy {
    const NAME: &'static str;

    /// `dst[k] += src[offset + k * stride]`
    fn gather_add(dst: &mut [f64], src: &[f64], offset: usize, stride: usize);

    /// `dst[offset + k * stride] += src[k]`
    fn scatter_add(dst: &mut [f64], offset: usize, stride: usize, src: &[f64]);

    /// `dst[k] += 1.0`
    fn increment(dst: &mut [f64]);

    /// `dst[k] = first + k`
    fn iota(dst: &mut [f64], first: usize);

    fn fill(dst: &mut [f64], value: f64);
}

/// Plain loops, both as outer and as inner policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeqExec;

impl OuterPolicy for SeqExec {
    const NAME: &'static str = "seq";

    fn for_each_band<F>(data: &mut [f64], band_len: usize, body: F)
    where
        F: Fn(usize, &mut [f64]) + Sync + Send,
    {
        data.chunks_mut(band_len)
            .enumerate()
            .for_each(|(k, band)| body(k, band));
    }

    fn for_each_band_pair<F>(a: &mut [f64], b: &mut [f64], band_len: usize, body: F)
    where
        F: Fn(usize, &mut [f64], &mut [f64]) + Sync + Send,
    {
        a.chunks_mut(band_len)
            .zip(b.chunks_mut(band_len))
            .enumerate()
            .for_each(|(k, (a_band, b_band))| body(k, a_band, b_band));
    }
}

impl InnerPolicy for SeqExec {
    const NAME: &'static str = "seq";

    fn gather_add(dst: &mut [f64], src: &[f64], offset: usize, stride: usize) {
        for (k, d) in dst.iter_mut().enumerate() {
            *d += src[offset + k * stride];
        }
    }

    fn scatter_add(dst: &mut [f64], offset: usize, stride: usize, src: &[f64]) {
        for (k, s) in src.iter().enumerate() {
            dst[offset + k * stride] += s;
        }
    }

    fn increment(dst: &mut [f64]) {
        for d in dst.iter_mut() {
            *d += 1.0;
        }
    }

    fn iota(dst: &mut [f64], first: usize) {
        for (k, d) in dst.iter_mut().enumerate() {
            *d = (first + k) as f64;
        }
    }

    fn fill(dst: &mut [f64], value: f64) {
        for d in dst.iter_mut() {
            *d = value;
        }
    }
}

/// Inner policy that works in fixed-width lane blocks so the compiler can
/// keep a block in vector registers, with a scalar tail.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimdExec;

impl InnerPolicy for SimdExec {
    const NAME: &'static str = "simd";

    fn gather_add(dst: &mut [f64], src: &[f64], offset: usize, stride: usize) {
        let mut chunks = dst.chunks_exact_mut(LANES);
        let mut base = offset;
        for chunk in &mut chunks {
            let mut lane = [0.0f64; LANES];
            for (l, v) in lane.iter_mut().enumerate() {
                *v = src[base + l * stride];
            }
            for (d, v) in chunk.iter_mut().zip(lane) {
                *d += v;
            }
            base += LANES * stride;
        }
        SeqExec::gather_add(chunks.into_remainder(), src, base, stride);
    }

    fn scatter_add(dst: &mut [f64], offset: usize, stride: usize, src: &[f64]) {
        let chunks = src.chunks_exact(LANES);
        let tail = chunks.remainder();
        let mut base = offset;
        for chunk in chunks {
            let mut lane = [0.0f64; LANES];
            for (l, v) in lane.iter_mut().enumerate() {
                *v = dst[base + l * stride];
            }
            for (v, s) in lane.iter_mut().zip(chunk) {
                *v += s;
            }
            for (l, v) in lane.iter().enumerate() {
                dst[base + l * stride] = *v;
            }
            base += LANES * stride;
        }
        SeqExec::scatter_add(dst, base, stride, tail);
    }

    fn increment(dst: &mut [f64]) {
        let mut chunks = dst.chunks_exact_mut(LANES);
        for chunk in &mut chunks {
            for d in chunk.iter_mut() {
                *d += 1.0;
            }
        }
        SeqExec::increment(chunks.into_remainder());
    }

    fn iota(dst: &mut [f64], first: usize) {
        let mut chunks = dst.chunks_exact_mut(LANES);
        let mut base = first;
        for chunk in &mut chunks {
            for (l, d) in chunk.iter_mut().enumerate() {
                *d = (base + l) as f64;
            }
            base += LANES;
        }
        SeqExec::iota(chunks.into_remainder(), base);
    }

    fn fill(dst: &mut [f64], value: f64) {
        let mut chunks = dst.chunks_exact_mut(LANES);
        for chunk in &mut chunks {
            chunk.copy_from_slice(&[value; LANES]);
        }
        SeqExec::fill(chunks.into_remainder(), value);
    }
}

/// Data-parallel outer policy: rayon splits the bands across the pool,
/// like an OpenMP `parallel for`.
#[cfg(feature = "fork-join")]
#[derive(Debug, Clone, Copy, Default)]
pub struct ForkJoinExec;

#[cfg(feature = "fork-join")]
impl OuterPolicy for ForkJoinExec {
    const NAME: &'static str = "fork-join";

    fn for_each_band<F>(data: &mut [f64], band_len: usize, body: F)
    where
        F: Fn(usize, &mut [f64]) + Sync + Send,
    {
        data.par_chunks_mut(band_len)
            .enumerate()
            .for_each(|(k, band)| body(k, band));
    }

    fn for_each_band_pair<F>(a: &mut [f64], b: &mut [f64], band_len: usize, body: F)
    where
        F: Fn(usize, &mut [f64], &mut [f64]) + Sync + Send,
    {
        a.par_chunks_mut(band_len)
            .zip(b.par_chunks_mut(band_len))
            .enumerate()
            .for_each(|(k, (a_band, b_band))| body(k, a_band, b_band));
    }
}

/// Task-parallel outer policy: one spawned task per band inside a rayon
/// scope, left to work stealing, like a TBB task group.
#[cfg(feature = "task-pool")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskExec;

#[cfg(feature = "task-pool")]
impl OuterPolicy for TaskExec {
    const NAME: &'static str = "task-pool";

    fn for_each_band<F>(data: &mut [f64], band_len: usize, body: F)
    where
        F: Fn(usize, &mut [f64]) + Sync + Send,
    {
        let body = &body;
        rayon::scope(|s| {
            for (k, band) in data.chunks_mut(band_len).enumerate() {
                s.spawn(move |_| body(k, band));
            }
        });
    }

    fn for_each_band_pair<F>(a: &mut [f64], b: &mut [f64], band_len: usize, body: F)
    where
        F: Fn(usize, &mut [f64], &mut [f64]) + Sync + Send,
    {
        let body = &body;
        rayon::scope(|s| {
            for (k, (a_band, b_band)) in a
                .chunks_mut(band_len)
                .zip(b.chunks_mut(band_len))
                .enumerate()
            {
                s.spawn(move |_| body(k, a_band, b_band));
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // lengths around the lane width
    const LENGTHS: [usize; 7] = [0, 1, 7, 8, 9, 16, 23];

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|x| x as f64 * 0.5).collect()
    }

    #[test]
    fn simd_gather_matches_seq() {
        let stride = 5;
        for &n in &LENGTHS {
            let src = ramp(3 + n * stride);
            let mut expected = ramp(n);
            let mut got = ramp(n);
            SeqExec::gather_add(&mut expected, &src, 3, stride);
            SimdExec::gather_add(&mut got, &src, 3, stride);
            assert_eq!(got, expected, "n = {}", n);
        }
    }

    #[test]
    fn seq_gather_reads_strided() {
        let src: Vec<f64> = (0..12).map(|x| x as f64).collect();
        let mut dst = vec![100.0; 3];
        SeqExec::gather_add(&mut dst, &src, 1, 4);
        assert_eq!(dst, vec![101.0, 105.0, 109.0]);
    }

    #[test]
    fn simd_scatter_matches_seq() {
        let stride = 3;
        for &n in &LENGTHS {
            let src = ramp(n);
            let mut expected = ramp(2 + n * stride);
            let mut got = expected.clone();
            SeqExec::scatter_add(&mut expected, 2, stride, &src);
            SimdExec::scatter_add(&mut got, 2, stride, &src);
            assert_eq!(got, expected, "n = {}", n);
        }
    }

    #[test]
    fn seq_scatter_writes_strided() {
        let mut dst = vec![0.0; 7];
        SeqExec::scatter_add(&mut dst, 0, 3, &[1.0, 2.0, 3.0]);
        assert_eq!(dst, vec![1.0, 0.0, 0.0, 2.0, 0.0, 0.0, 3.0]);
    }

    #[test]
    fn increment_iota_fill() {
        for &n in &LENGTHS {
            let mut seq = vec![0.0; n];
            let mut simd = vec![0.0; n];
            SeqExec::iota(&mut seq, 10);
            SimdExec::iota(&mut simd, 10);
            assert_eq!(seq, simd);
            assert_eq!(seq.last().copied(), n.checked_sub(1).map(|k| (10 + k) as f64));

            SeqExec::increment(&mut seq);
            SimdExec::increment(&mut simd);
            assert_eq!(seq, simd);

            SimdExec::fill(&mut simd, -2.0);
            assert!(simd.iter().all(|&v| v == -2.0));
        }
    }

    // 97 elements in bands of 6 leaves a short last band
    fn bands_cover_the_buffer<O: OuterPolicy>() {
        let mut data = vec![-1.0; 97];
        O::for_each_band(&mut data, 6, |k, band| {
            assert!(band.len() == 6 || (k == 16 && band.len() == 1));
            SeqExec::fill(band, k as f64);
        });
        for (i, &v) in data.iter().enumerate() {
            assert_eq!(v, (i / 6) as f64, "element {}", i);
        }

        let mut a = vec![0.0; 97];
        let mut b = vec![0.0; 97];
        O::for_each_band_pair(&mut a, &mut b, 6, |k, a_band, b_band| {
            assert_eq!(a_band.len(), b_band.len());
            SeqExec::iota(a_band, k * 6);
            SimdExec::increment(b_band);
        });
        assert_eq!(a, (0..97).map(|x| x as f64).collect::<Vec<_>>());
        assert!(b.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn seq_outer_covers_every_band() {
        bands_cover_the_buffer::<SeqExec>();
    }

    #[cfg(feature = "fork-join")]
    #[test]
    fn fork_join_outer_covers_every_band() {
        bands_cover_the_buffer::<ForkJoinExec>();
    }

    #[cfg(feature = "task-pool")]
    #[test]
    fn task_outer_covers_every_band() {
        bands_cover_the_buffer::<TaskExec>();
    }
}
