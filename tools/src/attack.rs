//! Recovering the weak IV when only the ciphertext body is known.
//!
//! In CBC the IV only touches the first plaintext block: `P1 = D(C1) ^ IV`.
//! `D(C1)` is computed once and every one of the 10,000 candidate IVs is tried
//! with a single XOR.

use crate::{
    encrypt::{aes::Aes, cipher::CipherCore, xor::fixed_xor},
    error::{Error, Result},
    payload::{decrypt_body, BLOCK_SIZE},
    random::iv::{candidate_ivs, Iv},
};

/// Predicate on the first plaintext block that tells if a guess is right.
pub fn known_prefix(prefix: &[u8]) -> impl Fn(&[u8]) -> bool + '_ {
    let prefix = &prefix[..prefix.len().min(BLOCK_SIZE)];
    move |block: &[u8]| block.starts_with(prefix)
}

/// Tries every weak IV against the first block of `body`.
///
/// The check has to single out one candidate. A known prefix shorter than the
/// 4 digit group lets several IVs through and fails with [`Error::AmbiguousIv`].
pub fn recover_iv(
    key: &[u8],
    body: &[u8],
    is_plaintext: impl Fn(&[u8]) -> bool,
) -> Result<Option<Iv>> {
    if body.len() < BLOCK_SIZE {
        return Err(Error::Truncated(body.len()));
    }

    let decrypted = Aes::init(key)?.decrypt(&body[..BLOCK_SIZE])?;
    let mut block = Vec::with_capacity(BLOCK_SIZE);
    let mut found = None;
    let mut matches = 0;

    for iv in candidate_ivs() {
        block.clear();
        fixed_xor(&decrypted, &iv, &mut block);
        if is_plaintext(&block) {
            matches += 1;
            found.get_or_insert(iv);
        }
    }

    log::debug!("{matches} of the weak IVs pass the plaintext check");
    match (matches, found) {
        (0, _) | (_, None) => Ok(None),
        (1, Some(iv)) => Ok(Some(iv)),
        (n, Some(_)) => Err(Error::AmbiguousIv(n)),
    }
}

/// Recovers the IV and decrypts the whole body with it.
pub fn recover_plaintext(
    key: &[u8],
    body: &[u8],
    is_plaintext: impl Fn(&[u8]) -> bool,
) -> Result<Option<(Iv, Vec<u8>)>> {
    match recover_iv(key, body, is_plaintext)? {
        Some(iv) => Ok(Some((iv, decrypt_body(key, &iv, body)?))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::{
        challenge::DEFAULT_KEY,
        payload::{encrypt, split},
        random::{
            digits::FixedDigits,
            iv::{DigitIv, RandomIv},
        },
    };

    #[test]
    fn test_recover_fixed_iv() {
        let mut ivs = DigitIv::new(FixedDigits::new([8, 6, 7, 5]));
        let payload = encrypt(DEFAULT_KEY, b"flag{n0t_s0_r4nd0m_4ft3r_4ll}", &mut ivs).unwrap();
        let (iv, body) = split(&payload).unwrap();

        let recovered = recover_iv(DEFAULT_KEY, body, known_prefix(b"flag{")).unwrap();
        assert_eq!(recovered.as_ref().map(|v| v.as_slice()), Some(iv));
        assert_eq!(&recovered.unwrap(), b"8675867586758675");
    }

    #[test]
    fn test_recover_plaintext() {
        let mut ivs = DigitIv::new(StdRng::seed_from_u64(99));
        for _ in 0..20 {
            let payload = encrypt(DEFAULT_KEY, b"flag{brute_force_10k}", &mut ivs).unwrap();
            let (iv, body) = split(&payload).unwrap();

            let (found, plaintext) =
                recover_plaintext(DEFAULT_KEY, body, known_prefix(b"flag{brute_force"))
                    .unwrap()
                    .unwrap();
            assert_eq!(&found[..], iv);
            assert_eq!(plaintext, b"flag{brute_force_10k}");
        }
    }

    #[test]
    fn test_strong_iv_not_recovered() {
        let mut ivs = RandomIv::new(rand::thread_rng());
        let payload = encrypt(DEFAULT_KEY, b"flag{real_entropy}", &mut ivs).unwrap();
        let (_, body) = split(&payload).unwrap();

        assert_eq!(
            recover_iv(DEFAULT_KEY, body, known_prefix(b"flag{real_entropy}")).unwrap(),
            None
        );
    }

    #[test]
    fn test_short_prefix_is_ambiguous() {
        let mut ivs = DigitIv::new(FixedDigits::new([9, 4, 2, 1]));
        let payload = encrypt(DEFAULT_KEY, b"flag{this_is_the_real_flag_value}", &mut ivs).unwrap();
        let (_, body) = split(&payload).unwrap();

        for (prefix, count) in [("", 10_000), ("f", 1000), ("fl", 100), ("fla", 10)] {
            assert!(
                matches!(
                    recover_plaintext(DEFAULT_KEY, body, known_prefix(prefix.as_bytes())),
                    Err(Error::AmbiguousIv(n)) if n == count
                ),
                "prefix {prefix:?} should match {count} IVs"
            );
        }

        let (iv, plaintext) = recover_plaintext(DEFAULT_KEY, body, known_prefix(b"flag"))
            .unwrap()
            .unwrap();
        assert_eq!(&iv, b"9421942194219421");
        assert_eq!(plaintext, b"flag{this_is_the_real_flag_value}");
    }

    #[test]
    fn test_recover_errors() {
        assert!(matches!(
            recover_iv(DEFAULT_KEY, &[0; 8], known_prefix(b"x")),
            Err(Error::Truncated(8))
        ));
        assert!(matches!(
            recover_iv(b"1337", &[0; 16], known_prefix(b"x")),
            Err(Error::KeySize(4))
        ));
    }
}
