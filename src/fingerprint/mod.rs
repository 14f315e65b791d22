//! Near-duplicate fingerprint generation.
//!
//! A [`Fingerprint`] is a min-hash signature over the set of unique
//! character shingles of stop-word-filtered, lower-cased text. Two
//! signatures approximate the Jaccard similarity of the underlying shingle
//! sets, which is what the duplicate classifier scores.
//!
//! Determinism is a hard guarantee: the same text and stop-word set always
//! produce a byte-identical signature, across calls and process restarts.
//! The permutation family is derived from a fixed seed; no ambient
//! randomness is involved.

use std::collections::{BTreeSet, HashSet};

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

use crate::errors::{LexGraphError, Result};

/// Default signature length (number of hash permutations).
pub const DEFAULT_SIGNATURE_LEN: usize = 256;

/// Default character shingle length.
pub const DEFAULT_SHINGLE_LEN: usize = 5;

/// Default permutation seed.
pub const DEFAULT_SEED: u64 = 1;

/// Signature slot value when no shingle hashes below it. An empty shingle
/// set yields a signature of all [`EMPTY_SLOT`] values — defined, not
/// rejected.
pub const EMPTY_SLOT: u32 = u32::MAX;

/// Modulus for the linear permutation family.
const MERSENNE_PRIME: u64 = (1 << 61) - 1;

/// Delimiter used in the serialized (store attribute) form.
const DELIMITER: char = ';';

/// Default English stop-word set applied before shingling.
pub const DEFAULT_STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "been", "but", "by", "for", "from", "had", "has",
    "have", "he", "her", "his", "i", "if", "in", "into", "is", "it", "its", "may", "must", "no",
    "not", "of", "on", "or", "our", "shall", "she", "should", "so", "such", "that", "the",
    "their", "them", "they", "this", "to", "was", "we", "were", "which", "will", "with", "you",
    "your",
];

/// Tuning parameters for signature generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinHashConfig {
    /// Number of hash permutations (signature length N).
    pub signature_len: usize,
    /// Character shingle length.
    pub shingle_len: usize,
    /// Seed for the permutation family.
    pub seed: u64,
}

impl Default for MinHashConfig {
    fn default() -> Self {
        Self {
            signature_len: DEFAULT_SIGNATURE_LEN,
            shingle_len: DEFAULT_SHINGLE_LEN,
            seed: DEFAULT_SEED,
        }
    }
}

/// An ordered min-hash signature. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint(Vec<u32>);

impl Fingerprint {
    /// Signature length (number of permutation slots).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The raw signature values.
    pub fn values(&self) -> &[u32] {
        &self.0
    }

    /// Serialize to the delimiter-joined form stored as a text attribute.
    pub fn encode(&self) -> String {
        let mut out = String::with_capacity(self.0.len() * 8);
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                out.push(DELIMITER);
            }
            out.push_str(&v.to_string());
        }
        out
    }

    /// Parse the serialized attribute form produced by [`Fingerprint::encode`].
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(LexGraphError::Fingerprint(
                "empty serialized signature".to_string(),
            ));
        }
        let values = s
            .split(DELIMITER)
            .map(|token| {
                token.trim().parse::<u32>().map_err(|_| {
                    LexGraphError::Fingerprint(format!("invalid signature value {token:?}"))
                })
            })
            .collect::<Result<Vec<u32>>>()?;
        Ok(Self(values))
    }
}

/// Generates [`Fingerprint`]s from raw text.
///
/// The permutation family is computed once at construction; `generate` is a
/// pure function of the input text afterwards.
pub struct FingerprintGenerator {
    config: MinHashConfig,
    stopwords: HashSet<String>,
    /// One `(a, b)` pair per signature slot: `h_i(x) = (a·x + b) mod p`.
    permutations: Vec<(u64, u64)>,
}

impl FingerprintGenerator {
    /// Create a generator with the default English stop-word set.
    pub fn new(config: MinHashConfig) -> Self {
        Self::with_stopwords(config, DEFAULT_STOPWORDS.iter().copied())
    }

    /// Create a generator with a caller-supplied stop-word set.
    pub fn with_stopwords<I, S>(config: MinHashConfig, stopwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let stopwords = stopwords.into_iter().map(Into::into).collect();
        let permutations = permutation_family(config.seed, config.signature_len);
        Self {
            config,
            stopwords,
            permutations,
        }
    }

    pub fn config(&self) -> &MinHashConfig {
        &self.config
    }

    /// Compute the min-hash signature of `text`.
    ///
    /// Lower-cases, tokenizes on whitespace, drops stop-words, rejoins with
    /// single spaces, then min-hashes the set of unique character shingles
    /// of the rejoined string. Empty or too-short text yields the defined
    /// empty-set signature.
    pub fn generate(&self, text: &str) -> Fingerprint {
        let normalized = self.normalize(text);
        let shingles = shingle_set(&normalized, self.config.shingle_len);

        let mut signature = vec![EMPTY_SLOT; self.config.signature_len];
        for shingle in &shingles {
            let base = base_hash(shingle);
            for (slot, &(a, b)) in signature.iter_mut().zip(&self.permutations) {
                let permuted = ((u128::from(a) * u128::from(base) + u128::from(b))
                    % u128::from(MERSENNE_PRIME)) as u64;
                let value = (permuted & u64::from(u32::MAX)) as u32;
                if value < *slot {
                    *slot = value;
                }
            }
        }
        Fingerprint(signature)
    }

    fn normalize(&self, text: &str) -> String {
        text.to_lowercase()
            .split_whitespace()
            .filter(|token| !self.stopwords.contains(*token))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Unique character shingles of `text`. Text shorter than `shingle_len`
/// contributes no shingles.
fn shingle_set(text: &str, shingle_len: usize) -> BTreeSet<String> {
    let chars: Vec<char> = text.chars().collect();
    if shingle_len == 0 || chars.len() < shingle_len {
        return BTreeSet::new();
    }
    chars
        .windows(shingle_len)
        .map(|w| w.iter().collect())
        .collect()
}

/// Hash a shingle to a value in `[0, p)`.
fn base_hash(shingle: &str) -> u64 {
    let digest = Md5::digest(shingle.as_bytes());
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes) % MERSENNE_PRIME
}

/// Derive `n` deterministic `(a, b)` permutation pairs from `seed`.
fn permutation_family(seed: u64, n: usize) -> Vec<(u64, u64)> {
    (0..n as u64)
        .map(|i| {
            let mut hasher = Md5::new();
            hasher.update(seed.to_be_bytes());
            hasher.update(i.to_be_bytes());
            let digest = hasher.finalize();

            let mut hi = [0_u8; 8];
            let mut lo = [0_u8; 8];
            hi.copy_from_slice(&digest[..8]);
            lo.copy_from_slice(&digest[8..16]);

            // a must be non-zero for the permutation to be injective.
            let a = u64::from_be_bytes(hi) % (MERSENNE_PRIME - 1) + 1;
            let b = u64::from_be_bytes(lo) % MERSENNE_PRIME;
            (a, b)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::cosine_similarity;

    fn small_generator() -> FingerprintGenerator {
        FingerprintGenerator::new(MinHashConfig {
            signature_len: 64,
            shingle_len: 5,
            seed: 1,
        })
    }

    const SAMPLE: &str = "The Authority hereby issues guidance on the conduct of \
                          regulated firms operating in wholesale markets.";

    #[test]
    fn test_generate_is_deterministic() {
        let generator = small_generator();
        let a = generator.generate(SAMPLE);
        let b = generator.generate(SAMPLE);
        assert_eq!(a, b);

        // A second generator with the same config reproduces the signature.
        let other = small_generator();
        assert_eq!(a, other.generate(SAMPLE));
    }

    #[test]
    fn test_signature_has_configured_length() {
        let generator = small_generator();
        assert_eq!(generator.generate(SAMPLE).len(), 64);
    }

    #[test]
    fn test_empty_text_yields_defined_signature() {
        let generator = small_generator();
        let fp = generator.generate("");
        assert_eq!(fp.len(), 64);
        assert!(fp.values().iter().all(|&v| v == EMPTY_SLOT));
    }

    #[test]
    fn test_stopword_only_text_equals_empty() {
        let generator = small_generator();
        assert_eq!(generator.generate("the and of to"), generator.generate(""));
    }

    #[test]
    fn test_stopwords_do_not_affect_signature() {
        let generator = small_generator();
        // Same content words, different stop-word padding.
        let a = generator.generate("guidance conduct regulated firms");
        let b = generator.generate("the guidance on the conduct of regulated firms");
        assert_eq!(a, b);
    }

    #[test]
    fn test_case_is_normalized() {
        let generator = small_generator();
        assert_eq!(
            generator.generate("Regulated FIRMS"),
            generator.generate("regulated firms")
        );
    }

    #[test]
    fn test_different_seed_changes_signature() {
        let a = small_generator().generate(SAMPLE);
        let b = FingerprintGenerator::new(MinHashConfig {
            signature_len: 64,
            shingle_len: 5,
            seed: 2,
        })
        .generate(SAMPLE);
        assert_ne!(a, b);
    }

    #[test]
    fn test_similar_texts_score_above_distinct_texts() {
        let generator = FingerprintGenerator::new(MinHashConfig {
            signature_len: 128,
            shingle_len: 5,
            seed: 1,
        });
        let original = generator.generate(SAMPLE);
        let revised = generator.generate(
            "The Authority hereby issues guidance on the conduct of \
             regulated firms operating in retail markets.",
        );
        let unrelated = generator.generate(
            "Quarterly statistics bulletin covering payment system volumes \
             and settlement failures.",
        );

        let close = cosine_similarity(original.values(), revised.values());
        let far = cosine_similarity(original.values(), unrelated.values());
        assert!(close > far, "close={close} far={far}");
    }

    #[test]
    fn test_encode_parse_roundtrip() {
        let generator = small_generator();
        let fp = generator.generate(SAMPLE);
        let encoded = fp.encode();
        let parsed = Fingerprint::parse(&encoded).expect("parse should succeed");
        assert_eq!(fp, parsed);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Fingerprint::parse("").is_err());
        assert!(Fingerprint::parse("1;2;banana").is_err());
        assert!(Fingerprint::parse("1;-2;3").is_err());
    }

    #[test]
    fn test_short_text_yields_empty_set_signature() {
        let generator = small_generator();
        // Four chars, below the shingle length of five.
        assert_eq!(generator.generate("hive"), generator.generate(""));
    }
}
