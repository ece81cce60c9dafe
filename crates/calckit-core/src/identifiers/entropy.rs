use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Strength of the randomness behind an identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntropyQuality {
    /// Bytes came from the operating system CSPRNG
    Secure,
    /// The secure source failed and a clock-seeded PRNG was used instead.
    /// Uniqueness is likely but no longer unpredictable.
    Degraded,
}

/// Random byte source that degrades loudly instead of failing.
///
/// Once the primary source has failed the fallback is used for the rest of
/// the source's lifetime, so a batch never mixes qualities silently.
pub struct EntropySource<R: RngCore = OsRng> {
    primary: R,
    fallback: Option<StdRng>,
}

impl EntropySource<OsRng> {
    pub fn os() -> Self {
        EntropySource::new(OsRng)
    }
}

impl Default for EntropySource<OsRng> {
    fn default() -> Self {
        EntropySource::os()
    }
}

impl<R: RngCore> EntropySource<R> {
    pub fn new(primary: R) -> Self {
        EntropySource {
            primary,
            fallback: None,
        }
    }

    pub fn quality(&self) -> EntropyQuality {
        if self.fallback.is_some() {
            EntropyQuality::Degraded
        } else {
            EntropyQuality::Secure
        }
    }

    /// Fill `dest` and report which source produced the bytes.
    pub fn fill(&mut self, dest: &mut [u8]) -> EntropyQuality {
        if self.fallback.is_none() {
            match self.primary.try_fill_bytes(dest) {
                Ok(()) => return EntropyQuality::Secure,
                Err(e) => warn!(
                    error = %e,
                    "secure random source unavailable, falling back to clock-seeded PRNG"
                ),
            }
        }
        self.fallback
            .get_or_insert_with(clock_seeded_rng)
            .fill_bytes(dest);
        EntropyQuality::Degraded
    }
}

fn clock_seeded_rng() -> StdRng {
    let nanos = chrono::Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_default() as u64;
    StdRng::seed_from_u64(nanos ^ u64::from(std::process::id()).rotate_left(32))
}
