use super::{Context, filter};
use crate::cli::Query;
use std::path::Path;
use tooldist_core::Error;
use tooldist_core::tools::{fetch_tools, read_list};
use tracing::{debug, instrument};

/// Fetch the newest bundle matching `query` for the configured platform.
#[instrument(skip(ctx), fields(dest = %dest.display()))]
pub fn run(ctx: &Context, query: &Query, dest: &Path) -> miette::Result<String> {
    let stream = ctx.stream(query.stream.as_deref());
    let store = ctx.stores.private();
    let list = read_list(store, stream, filter(query.major, query.minor))?;

    let platform = &ctx.config.platform;
    let candidates = list.for_platform(platform);
    debug!(%platform, candidates = candidates.len(), "Narrowed to platform");
    let (_, newest) = candidates.newest().ok_or(Error::NoMatches)?;
    let tools = newest.iter().next().ok_or(Error::NoMatches)?;

    let files = fetch_tools(store, stream, tools, dest)?;
    Ok(format!(
        "fetched {} ({files} files) into {}",
        tools.version,
        dest.display()
    ))
}
