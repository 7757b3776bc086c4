use super::Context;
use miette::IntoDiagnostic;
use std::path::PathBuf;
use tooldist_core::tools::{put_legacy_tools, put_tools};
use tooldist_version::{Binary, Number, Platform, arch};
use tracing::{instrument, warn};

/// Arguments of `tooldist put`.
#[derive(Debug, Clone, Default)]
pub struct PutArgs {
    pub dir: PathBuf,
    pub stream: Option<String>,
    pub version: Option<String>,
    pub os: Option<String>,
    pub arch: Option<String>,
    pub legacy: bool,
}

/// The binary to stamp: configured values with command-line overrides.
fn binary(ctx: &Context, args: &PutArgs) -> miette::Result<Binary> {
    let number = match &args.version {
        Some(v) => Number::parse(v).map_err(tooldist_core::Error::from)?,
        None => ctx.config.version,
    };
    let platform = Platform::new(
        args.os.as_deref().unwrap_or(&ctx.config.platform.os),
        args.arch.as_deref().unwrap_or(&ctx.config.platform.arch),
    );
    if !arch::is_valid(&platform.arch) {
        warn!(arch = %platform.arch, "Publishing for an architecture outside the known set");
    }
    Ok(Binary::try_new(number, platform.os, platform.arch).map_err(tooldist_core::Error::from)?)
}

/// Upload a bundle and render its catalog entry as JSON.
#[instrument(skip(ctx), fields(dir = %args.dir.display()))]
pub fn run(ctx: &Context, args: &PutArgs) -> miette::Result<String> {
    let version = binary(ctx, args)?;
    let storage = ctx.stores.private();
    let tools = if args.legacy {
        put_legacy_tools(storage, &args.dir, &version)?
    } else {
        put_tools(storage, &args.dir, ctx.stream(args.stream.as_deref()), &version)?
    };
    serde_json::to_string_pretty(&tools).into_diagnostic()
}
