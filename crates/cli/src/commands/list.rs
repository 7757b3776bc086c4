use super::{Context, filter};
use crate::cli::{OutputFormat, Query};
use miette::IntoDiagnostic;
use std::fmt::Write;
use tooldist_core::tools::{ToolsList, read_list};
use tracing::instrument;

/// List the bundles in the private store matching `query`.
#[instrument(skip(ctx))]
pub fn run(ctx: &Context, query: &Query, format: OutputFormat) -> miette::Result<String> {
    let stream = ctx.stream(query.stream.as_deref());
    let list = read_list(ctx.stores.private(), stream, filter(query.major, query.minor))?;
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(&list).into_diagnostic(),
        OutputFormat::Text => Ok(render_text(&list)),
    }
}

fn render_text(list: &ToolsList) -> String {
    let mut out = String::new();
    for tools in list.iter() {
        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{}",
            tools.version,
            tools.file_type.as_str(),
            tools.size,
            tools.url
        );
    }
    out
}
