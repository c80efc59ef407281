use proptest::prelude::*;

use provable_holdem::fairness::Seed;
use provable_holdem::shuffle::shuffle;

proptest! {
    #[test]
    fn shuffle_is_always_a_permutation(bytes in any::<[u8; 32]>()) {
        let deck = shuffle(&Seed::from_bytes(bytes));
        let mut sorted = deck;
        sorted.sort_unstable();
        let expected: Vec<u8> = (0..52).collect();
        prop_assert_eq!(&sorted[..], &expected[..]);
    }

    #[test]
    fn shuffle_is_deterministic(bytes in any::<[u8; 32]>()) {
        let seed = Seed::from_bytes(bytes);
        prop_assert_eq!(shuffle(&seed), shuffle(&seed));
    }

    #[test]
    fn distinct_seeds_rarely_collide(a in any::<[u8; 32]>(), b in any::<[u8; 32]>()) {
        prop_assume!(a != b);
        // Not a cryptographic claim, but any collision here would point at a
        // bug in the accumulator chaining.
        prop_assert_ne!(shuffle(&Seed::from_bytes(a)), shuffle(&Seed::from_bytes(b)));
    }
}
