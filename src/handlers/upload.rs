use axum::extract::Multipart;
use bytes::Bytes;

use crate::errors::AppResult;

/// A file taken from a multipart form
pub(crate) struct Upload {
    pub file_name: Option<String>,
    pub data: Bytes,
}

/// Find the file field called `name`, skipping every other field.
pub(crate) async fn read_file_field(
    multipart: &mut Multipart,
    name: &str,
) -> AppResult<Option<Upload>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(name) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let data = field.bytes().await?;
        return Ok(Some(Upload { file_name, data }));
    }
    Ok(None)
}
