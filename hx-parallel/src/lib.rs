//! Fork-join scheduler (spec §4.5 "Parallel scheduler").
//!
//! Workers are plain OS threads dispatched through
//! [`crossbeam::thread::scope`], not cooperative coroutines; they share no
//! mutable state and the scheduler guarantees every task completes before
//! `run` returns.
#![warn(missing_docs, rust_2018_idioms, trivial_casts, unused_qualifications)]

use hx_core::Error;

/// The platform's reported core count, used as the default worker degree
/// (spec §3 "user-tunable ... preset to a cache-friendly default").
#[must_use]
pub fn degree_for_machine() -> usize {
    num_cpus::get()
}

/// Splits `input`/`output` into `ceil(input.len() / segment_size)`
/// non-overlapping segments and runs `work` on each in its own thread.
///
/// `derive_iv(worker_index)` computes the local IV/counter each worker
/// should use; it runs on the calling thread before dispatch, so it may
/// read from the un-sliced input (e.g. "ciphertext at offset i*S - 16").
///
/// # Errors
/// [`Error::WorkerFailed`] if any worker thread panics.
pub fn run<F, D>(input: &[u8], output: &mut [u8], segment_size: usize, derive_iv: D, work: F) -> Result<(), Error>
where
    F: Fn(usize, &[u8], &mut [u8], &[u8]) + Sync,
    D: Fn(usize) -> Vec<u8>,
{
    let n = input.len();
    assert!(output.len() >= n, "output buffer shorter than input");
    if n == 0 {
        return Ok(());
    }

    let worker_count = (n + segment_size - 1) / segment_size;
    let mut segments = Vec::with_capacity(worker_count);
    let mut offset = 0usize;
    for i in 0..worker_count {
        let len = segment_size.min(n - offset);
        segments.push((i, offset, len, derive_iv(i)));
        offset += len;
    }

    log::debug!(target: "hx-parallel", "dispatching {} workers over {} bytes", worker_count, n);

    let outcome = crossbeam::thread::scope(|scope| {
        let mut out_rest: &mut [u8] = output;
        let mut handles = Vec::with_capacity(worker_count);
        for (i, offset, len, local_iv) in segments {
            let in_slice = &input[offset..offset + len];
            let (out_slice, rest) = out_rest.split_at_mut(len);
            out_rest = rest;
            let work = &work;
            handles.push(scope.spawn(move |_| work(i, in_slice, out_slice, &local_iv)));
        }
        for handle in handles {
            handle.join().map_err(|_| ())?;
        }
        Ok::<(), ()>(())
    });

    outcome
        .map_err(|_| Error::WorkerFailed("worker thread panicked".to_string()))?
        .map_err(|_| Error::WorkerFailed("worker thread panicked".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_and_xors_each_segment_independently() {
        let input = vec![0xAAu8; 64];
        let mut output = vec![0u8; 64];
        run(
            &input,
            &mut output,
            16,
            |i| vec![i as u8; 1],
            |_, inp, out, iv| {
                for (o, b) in out.iter_mut().zip(inp) {
                    *o = b ^ iv[0];
                }
            },
        )
        .unwrap();

        for (chunk_idx, chunk) in output.chunks(16).enumerate() {
            assert!(chunk.iter().all(|&b| b == (0xAA ^ chunk_idx as u8)));
        }
    }

    #[test]
    fn handles_a_final_partial_segment() {
        let input = vec![0x11u8; 40];
        let mut output = vec![0u8; 40];
        run(&input, &mut output, 16, |_| vec![0u8], |_, inp, out, _| out.copy_from_slice(inp)).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn empty_input_is_a_no_op() {
        run(&[], &mut [], 16, |_| vec![0u8], |_, _, _, _| panic!("should not run")).unwrap();
    }
}
