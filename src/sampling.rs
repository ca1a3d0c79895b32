//! Per-call sampling decision
//!
//! Decides whether a given call should also run the new flow. Uses the
//! thread-local RNG so concurrent calls never contend on shared random state
//! and every draw is independent.

use rand::Rng;

/// Decide whether this call should run the shadow path
///
/// Draws a uniform integer in `[0, 100)` and returns true iff it is below
/// `percentage`. A percentage of 0 never samples, 100 always samples.
#[inline]
#[must_use]
pub(crate) fn should_call_new_flow(percentage: u8) -> bool {
    rand::rng().random_range(0..100u8) < percentage
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_percent_never_samples() {
        assert!((0..1_000).all(|_| !should_call_new_flow(0)));
    }

    #[test]
    fn hundred_percent_always_samples() {
        assert!((0..1_000).all(|_| should_call_new_flow(100)));
    }

    #[test]
    fn fifty_percent_converges() {
        let hits = (0..1_000).filter(|_| should_call_new_flow(50)).count();
        // Binomial(1000, 0.5): ~400-600 covers > 6 sigma
        assert!((400..=600).contains(&hits), "observed {hits} hits");
    }

    #[test]
    fn ten_percent_converges() {
        let hits = (0..1_000).filter(|_| should_call_new_flow(10)).count();
        assert!((40..=160).contains(&hits), "observed {hits} hits");
    }

    #[test]
    fn draws_are_independent_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                std::thread::spawn(|| (0..500).filter(|_| should_call_new_flow(50)).count())
            })
            .collect();

        for handle in handles {
            let hits = handle.join().unwrap();
            assert!((150..=350).contains(&hits), "observed {hits} hits");
        }
    }
}
