use libcat_dal::Order;

use crate::error::{ApiError, ApiResult};

const MAX_FIELD_NAME: usize = 100;

/// Parses `field1,-field2,+field3`, `-` means descending
pub(super) fn parse_ordering(orderings: &str) -> ApiResult<Vec<Order>> {
    orderings
        .split(',')
        .map(|name| {
            let (field_name, descending) = match name.trim() {
                "" => return Err(ApiError::InvalidQuery("Empty ordering name".to_string())),
                name if name.len() > MAX_FIELD_NAME => {
                    return Err(ApiError::InvalidQuery("Ordering name too long".to_string()))
                }
                name => match name.strip_prefix('-') {
                    Some(name) => (name, true),
                    None => (name.strip_prefix('+').unwrap_or(name), false),
                },
            };

            let order = if descending {
                Order::Desc(field_name.to_string())
            } else {
                Order::Asc(field_name.to_string())
            };

            Ok(order)
        })
        .collect::<Result<Vec<_>, _>>()
}
