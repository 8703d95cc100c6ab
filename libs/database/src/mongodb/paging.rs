use futures_util::TryStreamExt;
use mongodb::{Collection, bson::Document, options::FindOptions};
use serde::de::DeserializeOwned;

/// Fetch one page of `filter` together with the total match count.
pub async fn find_page<T>(
    collection: &Collection<T>,
    filter: Document,
    sort: Document,
    skip: u64,
    limit: i64,
) -> mongodb::error::Result<(Vec<T>, u64)>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    let total = collection.count_documents(filter.clone()).await?;

    let options = FindOptions::builder()
        .sort(sort)
        .skip(skip)
        .limit(limit)
        .build();

    let items = collection
        .find(filter)
        .with_options(options)
        .await?
        .try_collect()
        .await?;

    Ok((items, total))
}
