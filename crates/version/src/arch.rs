//! CPU architecture tags as they appear in bundle names.

/// 64-bit x86.
pub const AMD64: &str = "amd64";
/// 32-bit x86.
pub const I386: &str = "i386";
/// 64-bit ARM.
pub const ARM64: &str = "arm64";
/// 32-bit ARM, hard float.
pub const ARMHF: &str = "armhf";
/// 64-bit little-endian POWER.
pub const PPC64EL: &str = "ppc64el";
/// IBM Z.
pub const S390X: &str = "s390x";

/// Tag older installations use for [`PPC64EL`] bundles.
pub const LEGACY_PPC64: &str = "ppc64";

/// Every architecture a bundle may be published for.
pub const ALL: &[&str] = &[AMD64, I386, ARM64, ARMHF, PPC64EL, S390X];

/// Map a Rust target architecture (`std::env::consts::ARCH`) to a bundle tag.
///
/// Unknown architectures pass through unchanged.
#[must_use]
pub fn normalize(arch: &str) -> &str {
    match arch {
        "x86_64" | "amd64" | "x64" => AMD64,
        "x86" | "i686" | "386" => I386,
        "aarch64" | "arm64" => ARM64,
        "arm" | "armv7" | "armhf" => ARMHF,
        "powerpc64" | "powerpc64le" | "ppc64le" | "ppc64el" => PPC64EL,
        "s390x" => S390X,
        other => other,
    }
}

/// Whether `arch` is one of the known bundle tags.
#[must_use]
pub fn is_valid(arch: &str) -> bool {
    ALL.contains(&arch)
}
