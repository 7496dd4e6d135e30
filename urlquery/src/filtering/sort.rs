use crate::compiler::CompileContext;
use crate::errors::QueryError;
use crate::predicate::{Direction, Predicate};

/// Sort stage, always emits exactly one `OrderBy`.
///
/// `?order_by=Name&order=DESC` sorts by `name desc` (both lowercased); `order`
/// defaults to `asc`. Without `order_by` the configured default column is used
/// in ascending order.
pub(crate) fn build_sort(ctx: &mut CompileContext<'_>) -> Result<(), QueryError> {
    let params = ctx.params;

    let Some(order_by) = params.text("order_by") else {
        push_default(ctx);
        return Ok(());
    };
    let column = order_by.trim().to_lowercase();
    let direction = parse_direction(ctx, params.text("order").as_deref())?;

    if ctx.check_extra_column(&column)? {
        ctx.push(Predicate::order_by(column, direction));
    } else {
        push_default(ctx);
    }
    Ok(())
}

fn push_default(ctx: &mut CompileContext<'_>) {
    let column = ctx.config.default_sort_column.clone();
    ctx.push(Predicate::order_by(column, Direction::Asc));
}

/// Direction from the `order` parameter. Anything but `asc`/`desc` is invalid;
/// lenient mode falls back to `asc`.
fn parse_direction(ctx: &CompileContext<'_>, raw: Option<&str>) -> Result<Direction, QueryError> {
    let Some(raw) = raw else {
        return Ok(Direction::Asc);
    };
    match Direction::parse(raw) {
        Some(direction) => Ok(direction),
        None => {
            ctx.reject(QueryError::invalid_parameter("order"))?;
            Ok(Direction::Asc)
        }
    }
}
