//! Object names for tool bundles.
//!
//! Streamed layout: `tools/<stream>/juju-<major>.<minor>.<patch>-<os>-<arch>.<tgz|zip>`.
//! Legacy layout: `tools/juju-<major>.<minor>.<patch>-<series>-<arch>.tgz`.

use super::catalog::FileType;
use super::scan::SkipReason;
use tooldist_version::Binary;

/// Prefix of every legacy bundle name.
pub const LEGACY_PREFIX: &str = "tools/juju-";

/// Length of every recognized suffix, dot included.
///
/// [`decompose`] strips suffixes by index, which is only correct while all
/// suffixes share this length.
pub const SUFFIX_LEN: usize = 4;

const _: () = {
    assert!(FileType::Tgz.suffix().len() == SUFFIX_LEN);
    assert!(FileType::Zip.suffix().len() == SUFFIX_LEN);
};

/// Prefix shared by every bundle name in `stream`.
#[must_use]
pub fn storage_prefix(stream: &str) -> String {
    format!("tools/{stream}/juju-")
}

/// Name under which the given bundle is stored in `stream`.
#[must_use]
pub fn storage_name(stream: &str, version: &Binary, file_type: FileType) -> String {
    format!("{}{version}{}", storage_prefix(stream), file_type.suffix())
}

/// Name under which the given bundle is stored in the legacy layout.
#[must_use]
pub fn legacy_storage_name(version: &Binary) -> String {
    format!("{LEGACY_PREFIX}{version}{}", FileType::Tgz.suffix())
}

/// Split a bundle name into its version and file type.
///
/// Backslashes are treated as `/` before matching, for stores that report
/// host-native separators.
///
/// # Errors
///
/// Returns the reason the name is not a bundle under `prefix`.
pub fn decompose(name: &str, prefix: &str) -> Result<(Binary, FileType), SkipReason> {
    let name = name.replace('\\', "/");
    let Some(rest) = name.strip_prefix(prefix) else {
        return Err(SkipReason::WrongPrefix);
    };
    let file_type = FileType::from_name(rest).ok_or(SkipReason::UnknownSuffix)?;
    let version = &rest[..rest.len() - SUFFIX_LEN];
    let version = Binary::parse(version).map_err(|e| SkipReason::BadVersion(e.to_string()))?;
    Ok((version, file_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tooldist_version::Number;

    #[test]
    fn test_suffix_length_invariant() {
        for file_type in FileType::ALL {
            assert_eq!(file_type.suffix().len(), SUFFIX_LEN);
        }
    }

    #[test]
    fn test_storage_name() {
        let v = Binary::parse("2.0.0-ubuntu-amd64").unwrap();
        assert_eq!(
            storage_name("released", &v, FileType::Tgz),
            "tools/released/juju-2.0.0-ubuntu-amd64.tgz"
        );
        assert_eq!(
            storage_name("devel", &v, FileType::Zip),
            "tools/devel/juju-2.0.0-ubuntu-amd64.zip"
        );
    }

    #[test]
    fn test_legacy_storage_name() {
        let v = Binary::parse("1.2.3-precise-amd64").unwrap();
        assert_eq!(legacy_storage_name(&v), "tools/juju-1.2.3-precise-amd64.tgz");
    }

    #[test]
    fn test_decompose() {
        let (v, t) = decompose(
            "tools/released/juju-1.2.3-ubuntu-arm64.zip",
            "tools/released/juju-",
        )
        .unwrap();
        assert_eq!(v, Binary::new(Number::new(1, 2, 3), "ubuntu", "arm64"));
        assert_eq!(t, FileType::Zip);
    }

    #[test]
    fn test_decompose_backslashes() {
        let (v, _) = decompose(
            "tools\\released\\juju-1.2.3-ubuntu-arm64.tgz",
            "tools/released/juju-",
        )
        .unwrap();
        assert_eq!(v.to_string(), "1.2.3-ubuntu-arm64");
    }

    #[test]
    fn test_decompose_rejects() {
        let prefix = "tools/released/juju-";
        assert_eq!(
            decompose("tools/devel/juju-1.2.3-ubuntu-amd64.tgz", prefix),
            Err(SkipReason::WrongPrefix)
        );
        assert_eq!(
            decompose("tools/released/juju-1.2.3-ubuntu-amd64.tar.gz", prefix),
            Err(SkipReason::UnknownSuffix)
        );
        assert!(matches!(
            decompose("tools/released/juju-1.2-ubuntu-amd64.tgz", prefix),
            Err(SkipReason::BadVersion(_))
        ));
        assert!(matches!(
            decompose("tools/released/juju-.tgz", prefix),
            Err(SkipReason::BadVersion(_))
        ));
    }

    proptest! {
        #[test]
        fn test_name_round_trip(
            stream in "[a-z]{1,10}",
            major in 0u32..100,
            minor in 0u32..100,
            patch in 0u32..100,
            os in "[a-z]{1,8}",
            arch in "[a-z0-9]{1,8}",
            zip in any::<bool>(),
        ) {
            let version = Binary::new(Number::new(major, minor, patch), os, arch);
            let file_type = if zip { FileType::Zip } else { FileType::Tgz };
            let name = storage_name(&stream, &version, file_type);
            prop_assert_eq!(
                decompose(&name, &storage_prefix(&stream)),
                Ok((version, file_type))
            );
        }
    }
}
