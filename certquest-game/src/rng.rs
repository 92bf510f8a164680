//! Seeded RNG streams for question draws. Each draw purpose owns its own
//! stream so a domain session never perturbs the exam shuffle.

use std::cell::{RefCell, RefMut};

use hmac::{Hmac, Mac};
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use sha2::Sha256;

/// Draw purposes with a dedicated stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DrawStream {
    Domain,
    Mixed,
    Exam,
}

impl DrawStream {
    const ALL: [Self; 3] = [Self::Domain, Self::Mixed, Self::Exam];

    const fn tag(self) -> &'static [u8] {
        match self {
            Self::Domain => b"domain-draw",
            Self::Mixed => b"mixed-draw",
            Self::Exam => b"exam-draw",
        }
    }

    const fn slot(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone)]
pub struct RngBundle {
    seed: u64,
    streams: [RefCell<DrawRng>; 3],
}

impl RngBundle {
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            seed,
            streams: DrawStream::ALL.map(|stream| RefCell::new(DrawRng::seeded(seed, stream))),
        }
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub fn domain_draw(&self) -> RefMut<'_, DrawRng> {
        self.stream(DrawStream::Domain)
    }

    #[must_use]
    pub fn mixed_draw(&self) -> RefMut<'_, DrawRng> {
        self.stream(DrawStream::Mixed)
    }

    /// Stream behind the full practice exam's per-domain shuffles.
    #[must_use]
    pub fn exam_draw(&self) -> RefMut<'_, DrawRng> {
        self.stream(DrawStream::Exam)
    }

    fn stream(&self, stream: DrawStream) -> RefMut<'_, DrawRng> {
        self.streams[stream.slot()].borrow_mut()
    }
}

/// A `SmallRng` that tallies how many values it has handed out.
#[derive(Debug, Clone)]
pub struct DrawRng {
    inner: SmallRng,
    draws: u64,
}

impl DrawRng {
    fn seeded(user_seed: u64, stream: DrawStream) -> Self {
        Self {
            inner: SmallRng::seed_from_u64(stream_seed(user_seed, stream)),
            draws: 0,
        }
    }

    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }

    fn tick(&mut self) -> &mut SmallRng {
        self.draws = self.draws.saturating_add(1);
        &mut self.inner
    }
}

impl RngCore for DrawRng {
    fn next_u32(&mut self) -> u32 {
        self.tick().next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.tick().next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.tick().fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.tick().try_fill_bytes(dest)
    }
}

/// HMAC-SHA256 of the stream tag keyed by the user seed, folded to 64 bits.
fn stream_seed(user_seed: u64, stream: DrawStream) -> u64 {
    let mut mac = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(stream.tag());
    let digest = mac.finalize().into_bytes();
    let mut folded = [0u8; 8];
    folded.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(folded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streams_follow_their_hmac_seed() {
        let seed = 0xFEED_CAFE_u64;
        let bundle = RngBundle::from_user_seed(seed);

        let mut domain = bundle.domain_draw();
        let mut reference = SmallRng::seed_from_u64(stream_seed(seed, DrawStream::Domain));
        assert_eq!(domain.next_u32(), reference.next_u32());
        assert_eq!(domain.draws(), 1);

        assert_ne!(
            stream_seed(seed, DrawStream::Domain),
            stream_seed(seed, DrawStream::Exam)
        );
    }

    #[test]
    fn streams_are_independent() {
        let bundle = RngBundle::from_user_seed(3);
        let untouched = RngBundle::from_user_seed(3);
        let _ = bundle.mixed_draw().next_u64();
        assert_eq!(bundle.exam_draw().next_u64(), untouched.exam_draw().next_u64());
        assert_eq!(bundle.exam_draw().draws(), 1);
        assert_eq!(bundle.mixed_draw().draws(), 1);
    }
}
