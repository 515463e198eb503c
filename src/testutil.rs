use bytes::{BufMut, BytesMut};
use itertools::Itertools;
use proptest::{
    collection::vec,
    prelude::{Strategy, any},
    prop_oneof,
};
use rand::{SeedableRng, seq::index};
use roaring::RoaringBitmap;

use crate::{
    Bitmap, SERIAL_COOKIE, SERIAL_COOKIE_NO_RUNCONTAINER,
    codec::header::NO_OFFSET_THRESHOLD,
    container::bitmap::BitmapContainer,
};

/// Decode a `Bitmap` from the reference encoding of `values`.
pub fn mkbitmap(values: impl IntoIterator<Item = u32>) -> Bitmap {
    Bitmap::decode(&encode(values)).unwrap()
}

/// Serialize `values` with the reference encoder, never producing run
/// containers.
pub fn encode(values: impl IntoIterator<Item = u32>) -> Vec<u8> {
    serialize(&values.into_iter().collect())
}

/// Serialize `values` with the reference encoder after converting eligible
/// containers into run containers.
pub fn encode_optimized(values: impl IntoIterator<Item = u32>) -> Vec<u8> {
    let mut bitmap: RoaringBitmap = values.into_iter().collect();
    bitmap.optimize();
    serialize(&bitmap)
}

fn serialize(bitmap: &RoaringBitmap) -> Vec<u8> {
    let mut buf = Vec::with_capacity(bitmap.serialized_size());
    bitmap.serialize_into(&mut buf).unwrap();
    buf
}

/// Returns `encoded` with `prefix` prepended.
pub fn with_prefix(prefix: &[u8], encoded: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(prefix.len() + encoded.len());
    buf.extend_from_slice(prefix);
    buf.extend_from_slice(encoded);
    buf
}

pub struct SetGen {
    rng: rand::rngs::StdRng,
}

impl SetGen {
    pub fn new(seed: u64) -> Self {
        let rng = rand::rngs::StdRng::seed_from_u64(seed);
        Self { rng }
    }

    pub fn random(&mut self, len: usize) -> Vec<u32> {
        index::sample(&mut self.rng, u32::MAX as usize, len)
            .into_iter()
            .map(|i| i as u32)
            .sorted()
            .collect()
    }

    /// `clusters` runs of `run_len` consecutive values, each starting at a
    /// distinct multiple of `2^20`.
    #[track_caller]
    pub fn clustered(&mut self, clusters: usize, run_len: usize) -> Vec<u32> {
        assert!(run_len <= 1 << 20, "runs must not overlap");
        let out: Vec<u32> = index::sample(&mut self.rng, 1 << 12, clusters)
            .into_iter()
            .sorted()
            .flat_map(|cluster| {
                let base = (cluster as u32) << 20;
                (0..run_len as u32).map(move |offset| base + offset)
            })
            .collect();
        assert_eq!(out.len(), clusters * run_len);
        out
    }
}

#[derive(Debug)]
enum FixtureContainer {
    Array(Vec<u16>),
    Bitmap(Vec<u16>),
    /// (start, length) pairs
    Run(Vec<(u16, u16)>),
}

impl FixtureContainer {
    fn cardinality(&self) -> usize {
        match self {
            Self::Array(values) | Self::Bitmap(values) => values.len(),
            Self::Run(runs) => runs.iter().map(|&(_, len)| usize::from(len) + 1).sum(),
        }
    }

    fn encoded_size(&self) -> usize {
        match self {
            Self::Array(values) => values.len() * 2,
            Self::Bitmap(_) => BitmapContainer::ENCODED_SIZE,
            Self::Run(runs) => 2 + runs.len() * 4,
        }
    }

    fn encode(&self, buf: &mut BytesMut) {
        match self {
            Self::Array(values) => values.iter().for_each(|&v| buf.put_u16_le(v)),
            Self::Bitmap(values) => {
                let mut words = [0u64; BitmapContainer::WORDS];
                for &v in values {
                    words[usize::from(v) / 64] |= 1 << (v % 64);
                }
                words.iter().for_each(|&w| buf.put_u64_le(w));
            }
            Self::Run(runs) => {
                buf.put_u16_le(runs.len() as u16);
                for &(start, len) in runs {
                    buf.put_u16_le(start);
                    buf.put_u16_le(len);
                }
            }
        }
    }
}

/// Builds serialized bitmaps container by container, without validating the
/// containers. Useful for producing encodings the reference encoder never
/// emits.
#[derive(Debug, Default)]
pub struct Fixture {
    containers: Vec<(u16, FixtureContainer)>,
    run_cookie: bool,
}

impl Fixture {
    pub fn array(mut self, key: u16, values: impl IntoIterator<Item = u16>) -> Self {
        let values = values.into_iter().collect();
        self.containers.push((key, FixtureContainer::Array(values)));
        self
    }

    pub fn bitmap(mut self, key: u16, values: impl IntoIterator<Item = u16>) -> Self {
        let values = values.into_iter().collect();
        self.containers.push((key, FixtureContainer::Bitmap(values)));
        self
    }

    pub fn run(mut self, key: u16, runs: impl IntoIterator<Item = (u16, u16)>) -> Self {
        let runs = runs.into_iter().collect();
        self.containers.push((key, FixtureContainer::Run(runs)));
        self.run_cookie = true;
        self
    }

    /// Use the run cookie even when no run containers are present.
    pub fn with_run_cookie(mut self) -> Self {
        self.run_cookie = true;
        self
    }

    pub fn encode(&self) -> BytesMut {
        let n = self.containers.len();
        let has_offsets = !self.run_cookie || n >= NO_OFFSET_THRESHOLD;

        let mut buf = BytesMut::new();
        if self.run_cookie {
            let count = n.saturating_sub(1) as u32;
            buf.put_u32_le(u32::from(SERIAL_COOKIE) | (count << 16));

            let mut flags = vec![0u8; n.div_ceil(8)];
            for (i, (_, c)) in self.containers.iter().enumerate() {
                if matches!(c, FixtureContainer::Run(_)) {
                    flags[i / 8] |= 1 << (i % 8);
                }
            }
            buf.put_slice(&flags);
        } else {
            buf.put_u32_le(u32::from(SERIAL_COOKIE_NO_RUNCONTAINER));
            buf.put_u32_le(n as u32);
        }

        for (key, c) in &self.containers {
            buf.put_u16_le(*key);
            buf.put_u16_le(c.cardinality().saturating_sub(1) as u16);
        }

        if has_offsets {
            let mut offset = buf.len() + n * 4;
            for (_, c) in &self.containers {
                buf.put_u32_le(offset as u32);
                offset += c.encoded_size();
            }
        }

        for (_, c) in &self.containers {
            c.encode(&mut buf);
        }
        buf
    }
}

/// Sets of `u32` values mixing sparse, dense and clustered distributions.
pub fn values() -> impl Strategy<Value = Vec<u32>> {
    let clustered = vec((0u32..64, 0u32..(1 << 16), 1u32..6000), 0..4).prop_map(|runs| {
        runs.into_iter()
            .flat_map(|(key, start, len)| {
                let base = (key << 16) | start;
                base..base + len
            })
            .collect::<Vec<u32>>()
    });
    prop_oneof![
        vec(any::<u32>(), 0..256),
        vec(0u32..200_000, 0..2048),
        vec(0u32..(1 << 16), 4000..6000),
        clustered,
    ]
}

/// Bytes which can never contain a cookie, at any offset or boundary.
pub fn noise() -> impl Strategy<Value = Vec<u8>> {
    vec(prop_oneof![0u8..0x30, 0x31u8..=0xFF], 0..64)
}
