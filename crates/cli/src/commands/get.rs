use super::Context;
use std::path::Path;
use tooldist_core::tools::get_tools;
use tracing::instrument;

/// Fetch the best legacy bundle for the configured platform.
#[instrument(skip(ctx), fields(dest = %dest.display()))]
pub fn run(ctx: &Context, major: u32, dest: &Path) -> miette::Result<String> {
    let version = get_tools(&ctx.stores, &ctx.config.platform, major, dest)?;
    Ok(format!("fetched {version} into {}", dest.display()))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::commands::Stores;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;
    use tooldist_core::Config;
    use tooldist_core::tools::put_legacy_tools;
    use tooldist_storage::FileStorage;
    use tooldist_version::Binary;

    #[test]
    fn test_get_from_public() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        std::fs::create_dir(&src).unwrap();
        let path = src.join("jujud");
        std::fs::write(&path, "public").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

        let public = temp.path().join("public");
        put_legacy_tools(
            &FileStorage::new(&public),
            &src,
            &Binary::parse("1.4.0-precise-amd64").unwrap(),
        )
        .unwrap();

        let ctx = Context {
            config: Config::from_toml("platform = \"precise-amd64\"").unwrap(),
            stores: Stores::new(temp.path().join("private"), Some(public)),
        };
        let dest = temp.path().join("dest");
        let out = run(&ctx, 1, &dest).unwrap();
        assert!(out.starts_with("fetched 1.4.0-precise-amd64"));
        assert_eq!(std::fs::read_to_string(dest.join("jujud")).unwrap(), "public");
    }

    #[test]
    fn test_get_nothing() {
        let temp = TempDir::new().unwrap();
        let ctx = Context {
            config: Config::from_toml("platform = \"precise-amd64\"").unwrap(),
            stores: Stores::new(temp.path(), None),
        };
        let err = run(&ctx, 1, &temp.path().join("dest")).unwrap_err();
        assert!(err.to_string().contains("no tools available"));
    }
}
