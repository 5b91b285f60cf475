pub mod mt19937 {
    use std::time::{SystemTime, UNIX_EPOCH};

    use rand::{RngCore, SeedableRng};

    const W: u32 = 32;
    const N: usize = 624;
    const M: usize = 397;
    const R: usize = 31;
    const A: u32 = 0x9908b0df;

    const U: usize = 11;
    const D: u32 = 0xffffffff;

    const S: usize = 7;
    const B: u32 = 0x9d2c5680;

    const T: usize = 15;
    const C: u32 = 0xefc60000;

    const L: usize = 18;
    const F: u32 = 0x6c078965;

    /// MersenneTwister PRNG for 32bit numbers. Fast and predictable, not for keys.
    pub struct MersenneTwister {
        state: [u32; N],
        index: usize,
    }

    impl MersenneTwister {
        /// Seeds the PRNG with a given value.
        pub fn seed(seed: u32) -> Self {
            let mut state = [0; N];
            state[0] = seed;

            for i in 1..N {
                let prev = state[i - 1];
                state[i] = F
                    .wrapping_mul(prev ^ (prev >> (W - 2)))
                    .wrapping_add(i as u32);
            }

            MersenneTwister { state, index: N }
        }

        /// Seeds with the seconds since the UNIX epoch, truncated to 32 bits.
        pub fn from_time() -> Self {
            let secs = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default();
            log::trace!("seeding mt19937 with {secs}");
            Self::seed(secs as u32)
        }

        /// Extracts a 32-bit number from the PRNG
        pub fn extract_number(&mut self) -> u32 {
            if self.index == N {
                self.twist();
            }

            let mut y = self.state[self.index];
            y ^= (y >> U) & D;
            y ^= (y << S) & B;
            y ^= (y << T) & C;
            y ^= y >> L;

            self.index += 1;
            y
        }

        /// Regenerates the whole state vector.
        fn twist(&mut self) {
            let lower_mask = (1 << R) - 1;
            let upper_mask = !lower_mask;

            for i in 0..N {
                let x = (self.state[i] & upper_mask) | (self.state[(i + 1) % N] & lower_mask);

                let mut x_a = x >> 1;
                if x % 2 != 0 {
                    x_a ^= A;
                }

                self.state[i] = self.state[(i + M) % N] ^ x_a;
            }
            self.index = 0;
        }
    }

    impl RngCore for MersenneTwister {
        fn next_u32(&mut self) -> u32 {
            self.extract_number()
        }

        fn next_u64(&mut self) -> u64 {
            rand_core::impls::next_u64_via_u32(self)
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            rand_core::impls::fill_bytes_via_next(self, dest)
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    impl SeedableRng for MersenneTwister {
        type Seed = [u8; 4];

        fn from_seed(seed: Self::Seed) -> Self {
            Self::seed(u32::from_be_bytes(seed))
        }
    }

    #[test]
    fn test_reference_output() {
        // first outputs of the reference implementation for the default seed
        let mut twister = MersenneTwister::seed(5489);
        assert_eq!(twister.extract_number(), 3499211612);
        assert_eq!(twister.extract_number(), 581869302);
        assert_eq!(twister.extract_number(), 3890346734);
    }

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = MersenneTwister::from_seed(1337u32.to_be_bytes());
        let mut b = MersenneTwister::seed(1337);
        for _ in 0..(2 * N) {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }
}

pub mod digits {
    use rand::{Rng, RngCore};

    /// Four decimal digits, each in 0..=9.
    pub type Digits = [u8; 4];

    /// Something that hands out four decimal digits at a time.
    ///
    /// A call draws all four digits, so a shared source never interleaves two draws.
    pub trait DigitSource {
        fn draw_digits(&mut self) -> Digits;
    }

    impl<R: RngCore> DigitSource for R {
        fn draw_digits(&mut self) -> Digits {
            let mut digits = [0; 4];
            for digit in digits.iter_mut() {
                *digit = self.gen_range(0..10);
            }
            digits
        }
    }

    /// Always returns the same digits.
    #[derive(Clone, Copy, Debug)]
    pub struct FixedDigits(Digits);

    impl FixedDigits {
        pub fn new(digits: Digits) -> Self {
            assert!(digits.iter().all(|&d| d < 10), "digits must be in 0..=9");
            Self(digits)
        }
    }

    impl DigitSource for FixedDigits {
        fn draw_digits(&mut self) -> Digits {
            self.0
        }
    }

    #[test]
    fn test_rng_digits_in_range() {
        use rand::{rngs::StdRng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            assert!(rng.draw_digits().iter().all(|&d| d <= 9));
        }
    }

    #[test]
    #[should_panic]
    fn test_fixed_digits_out_of_range() {
        FixedDigits::new([1, 2, 3, 10]);
    }
}

pub mod iv {
    use rand::{CryptoRng, RngCore};

    use super::{
        digits::{DigitSource, Digits},
        mt19937::MersenneTwister,
    };

    pub const IV_LEN: usize = 16;

    /// Number of distinct weak IVs.
    pub const WEAK_IV_SPACE: usize = 10_000;

    pub type Iv = [u8; IV_LEN];

    /// Produces the IV for a single encryption.
    pub trait IvSource {
        fn generate_iv(&mut self) -> Iv;
    }

    /// Formats the digits as a 4 character decimal string and repeats it 4 times.
    pub fn iv_from_digits(digits: Digits) -> Iv {
        let group = digits.map(|d| b'0' + d);
        let mut iv = [0; IV_LEN];
        for chunk in iv.chunks_exact_mut(group.len()) {
            chunk.copy_from_slice(&group);
        }
        iv
    }

    /// True if the IV is one 4-digit ASCII group repeated four times.
    pub fn is_weak_iv(iv: &[u8]) -> bool {
        iv.len() == IV_LEN
            && iv[..4].iter().all(u8::is_ascii_digit)
            && iv.chunks_exact(4).all(|chunk| chunk == &iv[..4])
    }

    /// All weak IVs, "0000..." up to "9999...".
    pub fn candidate_ivs() -> impl Iterator<Item = Iv> {
        (0..WEAK_IV_SPACE as u16).map(|n| {
            iv_from_digits([
                (n / 1000 % 10) as u8,
                (n / 100 % 10) as u8,
                (n / 10 % 10) as u8,
                (n % 10) as u8,
            ])
        })
    }

    /// The challenge IV: four digits repeated, at most 10,000 possible values.
    pub struct DigitIv<D: DigitSource> {
        digits: D,
    }

    impl<D: DigitSource> DigitIv<D> {
        pub fn new(digits: D) -> Self {
            Self { digits }
        }
    }

    impl DigitIv<MersenneTwister> {
        /// Time seeded Mersenne Twister, same class of generator the challenge relies on.
        pub fn from_time() -> Self {
            Self::new(MersenneTwister::from_time())
        }
    }

    impl<D: DigitSource> IvSource for DigitIv<D> {
        fn generate_iv(&mut self) -> Iv {
            let iv = iv_from_digits(self.digits.draw_digits());
            log::debug!("weak iv {}", String::from_utf8_lossy(&iv[..4]));
            iv
        }
    }

    /// Full entropy IV straight from a cryptographic RNG.
    pub struct RandomIv<R: RngCore + CryptoRng> {
        rng: R,
    }

    impl<R: RngCore + CryptoRng> RandomIv<R> {
        pub fn new(rng: R) -> Self {
            Self { rng }
        }
    }

    impl<R: RngCore + CryptoRng> IvSource for RandomIv<R> {
        fn generate_iv(&mut self) -> Iv {
            let mut iv = [0; IV_LEN];
            self.rng.fill_bytes(&mut iv);
            iv
        }
    }

    #[test]
    fn test_fixed_digits_iv() {
        use super::digits::FixedDigits;

        let mut source = DigitIv::new(FixedDigits::new([1, 3, 3, 7]));
        assert_eq!(&source.generate_iv(), b"1337133713371337");

        let mut zeros = DigitIv::new(FixedDigits::new([0, 0, 0, 0]));
        assert_eq!(&zeros.generate_iv(), b"0000000000000000");
    }

    #[test]
    fn test_weak_iv_structure() {
        let mut source = DigitIv::from_time();
        for _ in 0..5000 {
            let iv = source.generate_iv();
            assert_eq!(iv.len(), IV_LEN);
            assert!(iv[..4].iter().all(|v| (0x30..=0x39).contains(v)));
            assert_eq!(&iv[0..4], &iv[4..8]);
            assert_eq!(&iv[4..8], &iv[8..12]);
            assert_eq!(&iv[8..12], &iv[12..16]);
        }
    }

    #[test]
    fn test_entropy_bound() {
        use std::collections::HashSet;

        use rand::{rngs::StdRng, SeedableRng};

        let space: HashSet<Iv> = candidate_ivs().collect();
        assert_eq!(space.len(), WEAK_IV_SPACE);

        let mut source = DigitIv::new(StdRng::seed_from_u64(42));
        let seen: HashSet<Iv> = (0..50_000).map(|_| source.generate_iv()).collect();
        assert!(seen.is_subset(&space));
        assert!(seen.len() <= WEAK_IV_SPACE);
    }

    #[test]
    fn test_candidate_order() {
        let mut candidates = candidate_ivs();
        assert_eq!(&candidates.next().unwrap(), b"0000000000000000");
        assert_eq!(&candidates.next().unwrap(), b"0001000100010001");
        assert_eq!(&candidate_ivs().last().unwrap(), b"9999999999999999");
    }

    #[test]
    fn test_random_iv_is_not_weak() {
        let mut source = RandomIv::new(rand::thread_rng());
        // a full entropy IV hitting the weak space has odds of 10^4 / 2^128
        assert!(!is_weak_iv(&source.generate_iv()));
        assert!(is_weak_iv(b"4242424242424242"));
        assert!(!is_weak_iv(b"4242424242424243"));
        assert!(!is_weak_iv(b"abcdabcdabcdabcd"));
    }
}
