use core::fmt;

use super::{derive_secret_on, DEFAULT_SECRET_LENGTH, DEFAULT_SECRET_RAW};

/// An implementation of the accumulate and scramble steps used for
/// inputs longer than 240 bytes.
///
/// Every backend computes identical hashes; they differ only in
/// speed. [`Backend::detect`][] picks the widest one the CPU
/// supports.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Backend {
    /// 256-bit AVX2 vectors on x86_64.
    Avx2,
    /// 128-bit SSE2 vectors on x86_64.
    Sse2,
    /// 128-bit NEON vectors on little-endian aarch64.
    Neon,
    /// Portable 64-bit arithmetic. Always available.
    Scalar,
}

impl Backend {
    /// Every backend, widest first.
    pub const ALL: [Backend; 4] = [Backend::Avx2, Backend::Sse2, Backend::Neon, Backend::Scalar];

    /// The backend used by the plain hashing functions.
    ///
    /// With the `std` feature the CPU is probed at runtime the first
    /// time this is called and the answer is cached for the life of
    /// the process. Without it, the target features enabled at
    /// compile time decide.
    #[must_use]
    pub fn detect() -> Self {
        Detected::active().get()
    }

    /// Whether this backend can run on the current CPU.
    #[must_use]
    pub fn is_available(self) -> bool {
        match self {
            Backend::Avx2 => avx2_available(),
            Backend::Sse2 => sse2_available(),
            Backend::Neon => neon_available(),
            Backend::Scalar => true,
        }
    }

    /// A short, lowercase name for the backend.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Backend::Avx2 => "avx2",
            Backend::Sse2 => "sse2",
            Backend::Neon => "neon",
            Backend::Scalar => "scalar",
        }
    }

    /// Derives the seeded secret (see [`derive_secret`][crate::derive_secret])
    /// using this backend.
    pub fn derive_secret(
        self,
        seed: u64,
    ) -> Result<[u8; DEFAULT_SECRET_LENGTH], UnsupportedBackendError> {
        let backend = Detected::new(self)?;
        let mut secret = DEFAULT_SECRET_RAW;
        derive_secret_on(backend, seed, &mut secret);
        Ok(secret)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A backend that is known to be available on the current CPU.
///
/// Holding one of these is what makes it sound to call into the
/// `#[target_feature]` code paths.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Detected(Backend);

impl Detected {
    #[inline]
    pub fn active() -> Self {
        #[cfg(feature = "std")]
        {
            static ACTIVE: std::sync::OnceLock<Backend> = std::sync::OnceLock::new();
            Self(*ACTIVE.get_or_init(probe))
        }

        #[cfg(not(feature = "std"))]
        {
            Self(probe())
        }
    }

    #[inline]
    pub fn new(backend: Backend) -> Result<Self, UnsupportedBackendError> {
        if backend.is_available() {
            Ok(Self(backend))
        } else {
            Err(UnsupportedBackendError(backend))
        }
    }

    #[inline]
    pub fn get(self) -> Backend {
        self.0
    }
}

fn probe() -> Backend {
    if let Some(backend) = forced().filter(|b| b.is_available()) {
        return backend;
    }

    Backend::ALL
        .into_iter()
        .find(|b| b.is_available())
        .unwrap_or(Backend::Scalar)
}

/// Internal cfgs that pin detection, so CI can run the whole suite
/// against each backend.
fn forced() -> Option<Backend> {
    if cfg!(_internal_xxhash3_force_scalar) {
        Some(Backend::Scalar)
    } else if cfg!(_internal_xxhash3_force_neon) {
        Some(Backend::Neon)
    } else if cfg!(_internal_xxhash3_force_avx2) {
        Some(Backend::Avx2)
    } else if cfg!(_internal_xxhash3_force_sse2) {
        Some(Backend::Sse2)
    } else {
        None
    }
}

#[cfg(target_arch = "x86_64")]
fn avx2_available() -> bool {
    #[cfg(feature = "std")]
    {
        std::arch::is_x86_feature_detected!("avx2")
    }

    #[cfg(not(feature = "std"))]
    {
        cfg!(target_feature = "avx2")
    }
}

#[cfg(target_arch = "x86_64")]
fn sse2_available() -> bool {
    #[cfg(feature = "std")]
    {
        std::arch::is_x86_feature_detected!("sse2")
    }

    #[cfg(not(feature = "std"))]
    {
        cfg!(target_feature = "sse2")
    }
}

#[cfg(not(target_arch = "x86_64"))]
fn avx2_available() -> bool {
    false
}

#[cfg(not(target_arch = "x86_64"))]
fn sse2_available() -> bool {
    false
}

#[cfg(all(target_arch = "aarch64", target_endian = "little"))]
fn neon_available() -> bool {
    #[cfg(feature = "std")]
    {
        std::arch::is_aarch64_feature_detected!("neon")
    }

    #[cfg(not(feature = "std"))]
    {
        cfg!(target_feature = "neon")
    }
}

#[cfg(not(all(target_arch = "aarch64", target_endian = "little")))]
fn neon_available() -> bool {
    false
}

/// The requested [`Backend`][] cannot run on this CPU.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct UnsupportedBackendError(Backend);

impl UnsupportedBackendError {
    /// The backend that was requested.
    #[must_use]
    pub fn backend(&self) -> Backend {
        self.0
    }
}

impl core::error::Error for UnsupportedBackendError {}

impl fmt::Display for UnsupportedBackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "the {} backend is not available on this CPU", self.0)
    }
}
