//! Digest engine
//!
//! One-shot hashing of a word into the lowercase hex string used as the
//! table key.

use digest::{Digest, ExtendableOutput, Update, XofReader};

use crate::algorithm::Algorithm;

/// Output width for extendable-output algorithms, in bytes.
///
/// Changing this invalidates every previously built SHAKE row.
pub const XOF_OUTPUT_LEN: usize = 32;

/// Hash a word's UTF-8 bytes
#[inline]
pub fn digest(word: &str, algorithm: Algorithm) -> String {
    digest_bytes(word.as_bytes(), algorithm)
}

/// Hash raw bytes and render the result as lowercase hex
pub fn digest_bytes(data: &[u8], algorithm: Algorithm) -> String {
    match algorithm {
        Algorithm::Md5 => fixed::<md5::Md5>(data),
        Algorithm::Sha1 => fixed::<sha1::Sha1>(data),
        Algorithm::Sha224 => fixed::<sha2::Sha224>(data),
        Algorithm::Sha256 => fixed::<sha2::Sha256>(data),
        Algorithm::Sha384 => fixed::<sha2::Sha384>(data),
        Algorithm::Sha512 => fixed::<sha2::Sha512>(data),
        Algorithm::Sha512_224 => fixed::<sha2::Sha512_224>(data),
        Algorithm::Sha512_256 => fixed::<sha2::Sha512_256>(data),
        Algorithm::Sha3_224 => fixed::<sha3::Sha3_224>(data),
        Algorithm::Sha3_256 => fixed::<sha3::Sha3_256>(data),
        Algorithm::Sha3_384 => fixed::<sha3::Sha3_384>(data),
        Algorithm::Sha3_512 => fixed::<sha3::Sha3_512>(data),
        Algorithm::Shake128 => extendable::<sha3::Shake128>(data),
        Algorithm::Shake256 => extendable::<sha3::Shake256>(data),
        Algorithm::Blake2b => fixed::<blake2::Blake2b512>(data),
        Algorithm::Blake2s => fixed::<blake2::Blake2s256>(data),
        Algorithm::Ripemd160 => fixed::<ripemd::Ripemd160>(data),
    }
}

fn fixed<D: Digest>(data: &[u8]) -> String {
    hex::encode(D::digest(data))
}

fn extendable<X: Default + Update + ExtendableOutput>(data: &[u8]) -> String {
    let mut hasher = X::default();
    Update::update(&mut hasher, data);

    let mut out = [0u8; XOF_OUTPUT_LEN];
    hasher.finalize_xof().read(&mut out);
    hex::encode(out)
}
