pub mod xor {

    /// XORs two equally long byte slices into `output`.
    pub fn fixed_xor(bytes1: &[u8], bytes2: &[u8], output: &mut Vec<u8>) {
        assert_eq!(bytes1.len(), bytes2.len());
        output.extend(bytes1.iter().zip(bytes2.iter()).map(|(u, v)| u ^ v));
    }

    #[test]
    fn test_fixed_xor() {
        let mut output = Vec::with_capacity(2);
        fixed_xor(b"17", &[0x01, 0x01], &mut output);
        assert_eq!(output, b"06".to_vec());
    }
}

pub mod cipher {
    use bytes::{Buf, BufMut, BytesMut};

    use super::xor::fixed_xor;
    use crate::error::{Error, Result};

    /// Number of PKCS#7 pad bytes for a text of length `len`. Always in `1..=block`.
    pub fn pkcs7_pad_len(len: usize, block: usize) -> usize {
        block - len % block
    }

    /// Appends PKCS#7 padding to the buffer. A full block is added when it is already aligned.
    pub fn pkcs7padding(buf: &mut BytesMut, block: usize) {
        let pad = pkcs7_pad_len(buf.len(), block);
        buf.put_bytes(pad as u8, pad);
    }

    /// Checks for valid PKCS#7 padding and strips it.
    pub fn strip_pkcs7_padding(padded: &[u8], block: usize) -> Result<&[u8]> {
        let pad = *padded.last().ok_or(Error::Padding)?;
        let n = pad as usize;
        if n == 0 || n > block || n > padded.len() {
            return Err(Error::Padding);
        }

        let (text, tail) = padded.split_at(padded.len() - n);
        if tail.iter().all(|&v| v == pad) {
            Ok(text)
        } else {
            Err(Error::Padding)
        }
    }

    /// Basic trait for block ciphers like AES.
    pub trait CipherCore: Sized {
        const BYTES: usize;

        fn init(key: &[u8]) -> Result<Self>;
        fn encrypt(&self, block: &[u8]) -> Result<Vec<u8>>;
        fn decrypt(&self, block: &[u8]) -> Result<Vec<u8>>;
    }

    /// Modes for Encryption or Decryption.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum CipherMode {
        Encrypt,
        Decrypt,
    }

    /// CBC Mode for a generic block cipher.
    ///
    /// The buffer always starts with the previous ciphertext block (the IV at the
    /// beginning), followed by whatever input has not been processed yet.
    pub struct CBCMode<C: CipherCore> {
        core: C,
        buf: BytesMut,
        cipher_mode: CipherMode,
        consumed: usize,
    }

    impl<C: CipherCore> CBCMode<C> {
        /// Initializes with a given key and iv. The iv must be C::BYTES long.
        pub fn init(key: &[u8], iv: &[u8], cipher_mode: CipherMode) -> Result<Self> {
            Ok(Self::with_core(C::init(key)?, iv, cipher_mode))
        }

        /// Same as init, for an already keyed cipher.
        pub fn with_core(core: C, iv: &[u8], cipher_mode: CipherMode) -> Self {
            assert_eq!(iv.len(), C::BYTES);
            let mut buf = BytesMut::with_capacity(1024);
            buf.put(iv);
            Self {
                core,
                buf,
                cipher_mode,
                consumed: 0,
            }
        }

        /// Feeds more text, every complete block is written to output.
        pub fn update(&mut self, text: &[u8], output: &mut Vec<u8>) -> Result<()> {
            self.buf.put(text);
            self.consumed += text.len();

            while self.buf.len() >= 2 * C::BYTES {
                self.single_block(output)?;
                self.buf.advance(C::BYTES);
            }
            Ok(())
        }

        /// Single block operation. Assumes that there is a whole block after the chaining block.
        fn single_block(&mut self, output: &mut Vec<u8>) -> Result<()> {
            let prev = self.buf[0..C::BYTES].to_owned();
            let curr = &mut self.buf[C::BYTES..2 * C::BYTES];

            let mut xor = Vec::with_capacity(C::BYTES);
            match self.cipher_mode {
                CipherMode::Encrypt => {
                    fixed_xor(&prev, curr, &mut xor);
                    let enc = self.core.encrypt(&xor)?;
                    curr.copy_from_slice(&enc);
                    output.extend(enc);
                }
                CipherMode::Decrypt => {
                    let dec = self.core.decrypt(curr)?;
                    fixed_xor(&dec, &prev, &mut xor);
                    output.extend(xor);
                }
            }
            Ok(())
        }

        /// Consumes self and finishes the stream.
        ///
        /// Encryption pads the remainder and writes the final block. Decryption only
        /// checks that the ciphertext was block aligned; unpadding is up to the caller.
        pub fn end(mut self, output: &mut Vec<u8>) -> Result<()> {
            match self.cipher_mode {
                CipherMode::Encrypt => {
                    pkcs7padding(&mut self.buf, C::BYTES);
                    self.single_block(output)
                }
                CipherMode::Decrypt if self.buf.len() == C::BYTES => Ok(()),
                CipherMode::Decrypt => Err(Error::BlockAlignment(self.consumed)),
            }
        }
    }

    #[test]
    fn test_pkcs7_padding() {
        let mut buf = BytesMut::with_capacity(32);
        buf.put(b"hello".as_slice());
        pkcs7padding(&mut buf, 16);
        assert_eq!(&buf[..], b"hello\x0b\x0b\x0b\x0b\x0b\x0b\x0b\x0b\x0b\x0b\x0b");

        let mut aligned = BytesMut::with_capacity(32);
        aligned.put(b"0123456789abcdef".as_slice());
        pkcs7padding(&mut aligned, 16);
        assert_eq!(aligned.len(), 32);
        assert!(aligned[16..].iter().all(|&v| v == 0x10));

        let mut empty = BytesMut::new();
        pkcs7padding(&mut empty, 16);
        assert_eq!(&empty[..], &[0x10; 16]);
    }

    #[test]
    fn test_pad_len_range() {
        for len in 0..100 {
            let pad = pkcs7_pad_len(len, 16);
            assert!((1..=16).contains(&pad));
            assert_eq!((len + pad) % 16, 0);
        }
    }

    #[test]
    fn padding_validation() {
        assert_eq!(
            strip_pkcs7_padding(b"ICE ICE BABY\x04\x04\x04\x04", 16).ok(),
            Some(b"ICE ICE BABY".as_slice())
        );
        assert_eq!(
            strip_pkcs7_padding(&[0x10; 16], 16).ok(),
            Some(b"".as_slice())
        );
        assert!(strip_pkcs7_padding(b"ICE ICE BABY\x05\x05\x05\x05", 16).is_err());
        assert!(strip_pkcs7_padding(b"ICE ICE BABY\x01\x02\x03\x04", 16).is_err());
        assert!(strip_pkcs7_padding(b"ICE ICE BABY\x00", 16).is_err());
        assert!(strip_pkcs7_padding(&[0x11; 17], 16).is_err());
        assert!(strip_pkcs7_padding(b"", 16).is_err());
    }
}

pub mod aes {
    use openssl::{
        cipher::{Cipher, CipherRef},
        cipher_ctx::CipherCtx,
    };

    use super::cipher::{CBCMode, CipherCore, CipherMode};
    use crate::error::{Error, Result};

    pub type AesCbc = CBCMode<Aes>;

    /// Single block AES, the key length picks AES-128, AES-192 or AES-256.
    pub struct Aes {
        key: Vec<u8>,
        cipher: &'static CipherRef,
    }

    impl Aes {
        fn transform(&self, block: &[u8], mode: CipherMode) -> Result<Vec<u8>> {
            assert_eq!(block.len(), Self::BYTES);

            let mut cipher_ctx = CipherCtx::new()?;
            match mode {
                CipherMode::Encrypt => {
                    cipher_ctx.encrypt_init(Some(self.cipher), Some(&self.key), None)?
                }
                CipherMode::Decrypt => {
                    cipher_ctx.decrypt_init(Some(self.cipher), Some(&self.key), None)?
                }
            }
            cipher_ctx.set_padding(false);

            let mut output = Vec::with_capacity(2 * Self::BYTES);
            cipher_ctx.cipher_update_vec(block, &mut output)?;
            cipher_ctx.cipher_final_vec(&mut output)?;

            Ok(output)
        }
    }

    impl CipherCore for Aes {
        const BYTES: usize = 16;

        fn init(key: &[u8]) -> Result<Self> {
            let cipher = match key.len() {
                16 => Cipher::aes_128_ecb(),
                24 => Cipher::aes_192_ecb(),
                32 => Cipher::aes_256_ecb(),
                len => return Err(Error::KeySize(len)),
            };
            Ok(Self {
                key: key.to_vec(),
                cipher,
            })
        }

        fn encrypt(&self, block: &[u8]) -> Result<Vec<u8>> {
            self.transform(block, CipherMode::Encrypt)
        }

        fn decrypt(&self, block: &[u8]) -> Result<Vec<u8>> {
            self.transform(block, CipherMode::Decrypt)
        }
    }

    #[test]
    fn test_fips197_vectors() {
        let plaintext = hex::decode("00112233445566778899aabbccddeeff").unwrap();
        let key: Vec<u8> = (0u8..32).collect();

        for (len, expected) in [
            (16, "69c4e0d86a7b0430d8cdb78070b4c55a"),
            (24, "dda97ca4864cdfe06eaf70a0ec0d7191"),
            (32, "8ea2b7ca516745bfeafc49904b496089"),
        ] {
            let aes = Aes::init(&key[..len]).unwrap();
            let enc = aes.encrypt(&plaintext).unwrap();
            assert_eq!(hex::encode(&enc), expected);
            assert_eq!(aes.decrypt(&enc).unwrap(), plaintext);
        }
    }

    #[test]
    fn test_key_size() {
        for len in [0, 5, 15, 17, 31, 33] {
            assert!(matches!(Aes::init(&vec![0u8; len]), Err(Error::KeySize(l)) if l == len));
        }
    }

    #[test]
    fn test_cbc_sp800_38a() {
        let key = hex::decode("2b7e151628aed2a6abf7158809cf4f3c").unwrap();
        let iv = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        let plaintext =
            hex::decode("6bc1bee22e409f96e93d7e117393172aae2d8a571e03ac9c9eb76fac45af8e51")
                .unwrap();

        let mut output = Vec::new();
        let mut cbc = AesCbc::init(&key, &iv, CipherMode::Encrypt).unwrap();
        cbc.update(&plaintext, &mut output).unwrap();
        cbc.end(&mut output).unwrap();

        assert_eq!(output.len(), 48);
        assert_eq!(
            hex::encode(&output[..32]),
            "7649abac8119b246cee98e9b12e9197d5086cb9b507219ee95db113a917678b2"
        );

        let mut decrypted = Vec::new();
        let mut cbc = AesCbc::init(&key, &iv, CipherMode::Decrypt).unwrap();
        cbc.update(&output, &mut decrypted).unwrap();
        cbc.end(&mut decrypted).unwrap();
        assert_eq!(&decrypted[..32], plaintext.as_slice());
        assert_eq!(&decrypted[32..], &[0x10; 16]);
    }

    #[test]
    fn test_cbc_chunked_update() {
        let key = b"YELLOW SUBMARINE";
        let iv = [0u8; 16];
        let text = b"feeding the chaining mode a few bytes at a time";

        let mut whole = Vec::new();
        let mut cbc = AesCbc::init(key, &iv, CipherMode::Encrypt).unwrap();
        cbc.update(text, &mut whole).unwrap();
        cbc.end(&mut whole).unwrap();

        let mut chunked = Vec::new();
        let mut cbc = AesCbc::init(key, &iv, CipherMode::Encrypt).unwrap();
        for chunk in text.chunks(7) {
            cbc.update(chunk, &mut chunked).unwrap();
        }
        cbc.end(&mut chunked).unwrap();

        assert_eq!(whole, chunked);
    }

    #[test]
    fn test_cbc_unaligned_ciphertext() {
        let mut output = Vec::new();
        let mut cbc = AesCbc::init(b"YELLOW SUBMARINE", &[0; 16], CipherMode::Decrypt).unwrap();
        cbc.update(&[0xaa; 20], &mut output).unwrap();
        assert!(matches!(cbc.end(&mut output), Err(Error::BlockAlignment(20))));
    }
}
