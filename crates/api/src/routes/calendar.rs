//! Calendar endpoints

use axum::{extract::Path, Json};
use igrejas_shared::{brazilian_holidays, Holiday};

use crate::error::ApiResult;

/// National holidays of `year`, sorted by date
pub async fn holidays(Path(year): Path<i32>) -> ApiResult<Json<Vec<Holiday>>> {
    Ok(Json(brazilian_holidays(year)?))
}
