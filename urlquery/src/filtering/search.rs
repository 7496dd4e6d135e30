use crate::compiler::CompileContext;
use crate::errors::QueryError;
use crate::predicate::Predicate;

/// Wrap a search term for substring matching.
#[must_use]
pub fn contains_pattern(term: &str) -> String {
    format!("%{term}%")
}

/// Search stage.
///
/// `?search=ann&search_by=email` matches a single column. Without `search_by`
/// the term is matched against every allowed column: a `Like` on the first one
/// followed by an `OrLike` for each of the rest.
pub(crate) fn build_search(ctx: &mut CompileContext<'_>) -> Result<(), QueryError> {
    let params = ctx.params;
    let Some(term) = params.text("search") else {
        if params.filled("search") {
            tracing::debug!("Skipping non-scalar search parameter");
        }
        return Ok(());
    };
    let pattern = contains_pattern(&term);

    if let Some(column) = params.text("search_by") {
        if ctx.check_extra_column(&column)? {
            ctx.push(Predicate::like(column, pattern));
        }
        return Ok(());
    }

    let columns = ctx.columns.clone();
    let mut columns = columns.iter();
    if let Some(first) = columns.next() {
        ctx.push(Predicate::like(first.as_str(), pattern.as_str()));
    }
    for column in columns {
        ctx.push(Predicate::or_like(column.as_str(), pattern.as_str()));
    }

    Ok(())
}
