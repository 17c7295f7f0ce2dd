//! FNV-1a 64-bit. Output depends only on the input bytes, so derived ids do
//! not shift between toolchains or platforms.

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

#[derive(Debug, Clone, Copy)]
pub struct Fnv1a(u64);

impl Default for Fnv1a {
    fn default() -> Self {
        Self(FNV_OFFSET_BASIS)
    }
}

impl Fnv1a {
    pub fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.0 ^= u64::from(byte);
            self.0 = self.0.wrapping_mul(FNV_PRIME);
        }
    }

    pub fn finish(self) -> u64 {
        self.0
    }
}

pub fn stable_hash_with(f: impl FnOnce(&mut Fnv1a)) -> u64 {
    let mut hasher = Fnv1a::default();
    f(&mut hasher);
    hasher.finish()
}

/// Seed bytes are little-endian, followed by the UTF-8 bytes of `value`.
pub fn stable_hash_str(seed: u64, value: &str) -> u64 {
    stable_hash_with(|hasher| {
        hasher.write(&seed.to_le_bytes());
        hasher.write(value.as_bytes());
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fnv1a(bytes: &[u8]) -> u64 {
        stable_hash_with(|hasher| hasher.write(bytes))
    }

    #[test]
    fn test_reference_vectors() {
        assert_eq!(fnv1a(b""), 0xcbf29ce484222325);
        assert_eq!(fnv1a(b"a"), 0xaf63dc4c8601ec8c);
        assert_eq!(fnv1a(b"foobar"), 0x85944171f73967e8);
    }

    #[test]
    fn test_seed_changes_hash() {
        assert_ne!(stable_hash_str(2020, "Title"), stable_hash_str(2021, "Title"));
        assert_eq!(stable_hash_str(2020, "Title"), stable_hash_str(2020, "Title"));
    }
}
