use crate::error::ApiResult;
use garde::Validate;
use libcat_dal::{Batch, ListingParams};
use serde::{Deserialize, Serialize};

mod parsers;

#[derive(Debug, Clone, Default, Validate, serde::Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi",into_params(parameter_in = Query))]
pub struct Paging {
    #[garde(range(min = 1))]
    page: Option<u32>,
    #[garde(range(min = 1, max = 1000))]
    page_size: Option<u32>,
    /// Comma separated field names, prefix `-` for descending order
    #[garde(length(max = 255))]
    sort: Option<String>,
}

impl Paging {
    pub fn into_listing_params(self, default_page_size: u32) -> ApiResult<ListingParams> {
        let page = self.page.unwrap_or(1).max(1);
        let page_size = self.page_size(default_page_size);
        let offset = i64::from(page - 1) * i64::from(page_size);
        let order = self
            .sort
            .as_deref()
            .map(parsers::parse_ordering)
            .transpose()?;

        Ok(ListingParams {
            offset,
            limit: page_size.into(),
            order,
        })
    }

    pub fn page_size(&self, default_page_size: u32) -> u32 {
        self.page_size.unwrap_or(default_page_size).max(1)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Page<T> {
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub total: u64,
    pub rows: Vec<T>,
}

impl<T> Page<T>
where
    T: Serialize,
{
    /// Page numbers saturate at `u32::MAX`
    pub fn from_batch(batch: Batch<T>, page_size: u32) -> Self {
        let size = u64::from(page_size.max(1));
        let page = u64::try_from(batch.offset).unwrap_or_default() / size + 1;
        Self {
            page: u32::try_from(page).unwrap_or(u32::MAX),
            page_size,
            total_pages: u32::try_from(batch.total.div_ceil(size)).unwrap_or(u32::MAX),
            total: batch.total,
            rows: batch.rows,
        }
    }
}
