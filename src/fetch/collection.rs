use crate::{
    config::Data,
    error::Error,
    fetch::fetch_page,
    protocol::helpers::{id_of, to_list},
};
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;
use url::Url;

/// Returns the member ids of a `Collection` or `OrderedCollection`.
///
/// Members are read from `items` and `orderedItems`, and may be bare ids or inline objects with
/// an `id`. Paged collections are followed through `first` and then `next`, where each page can
/// be inline or a link. Linked pages count against the fetch limit of `data`. A page which was
/// already visited ends the walk.
pub async fn collection_items(collection: &Value, data: &Data) -> Result<Vec<Url>, Error> {
    let mut items = vec![];
    let mut visited = HashSet::new();
    let mut page = collection.clone();
    let mut link_field = "first";

    loop {
        for field in ["items", "orderedItems"] {
            for item in to_list(page.get(field)) {
                match id_of(&item).map(Url::parse) {
                    Some(Ok(id)) => items.push(id),
                    _ => debug!("skipping collection item without valid id: {item}"),
                }
            }
        }

        let next = match page.get(link_field) {
            None | Some(Value::Null) => break,
            Some(Value::Object(inline)) => Value::Object(inline.clone()),
            Some(link) => {
                let Some(link) = id_of(link) else {
                    return Err(Error::malformed(format!("invalid page link: {link}")));
                };
                let link = Url::parse(link)?;
                if !visited.insert(link.clone()) {
                    break;
                }
                fetch_page(&link, data).await?
            }
        };
        page = next;
        link_field = "next";
    }
    Ok(items)
}
