use std::future::Future;

use super::{
    direction::Direction,
    page::{KeysetPage, KeysetWindow, Keyed, PageRequest},
};

/// Run one keyset page: fetch `limit + 1` rows through `fetch` and assemble
/// the page from them.
///
/// `fetch` is called exactly once. Its error is returned untouched.
pub async fn paginate<F, T, E, Fut>(
    request: &PageRequest<F>,
    fetch: impl FnOnce(KeysetWindow) -> Fut,
) -> Result<KeysetPage<T>, E>
where
    T: Keyed,
    Fut: Future<Output = Result<Vec<T>, E>>,
{
    let rows = fetch(request.window()).await?;
    Ok(assemble_page(
        rows,
        request.limit,
        request.last_id,
        request.direction,
    ))
}

/// Turn the over-fetched rows of one window into a page.
///
/// `rows` must be in scan order: ascending for [`Direction::Next`],
/// descending for [`Direction::Previous`]. The returned content is always
/// ascending.
pub fn assemble_page<T: Keyed>(
    mut rows: Vec<T>,
    limit: usize,
    last_id: Option<i64>,
    direction: Direction,
) -> KeysetPage<T> {
    let has_more = rows.len() > limit;
    rows.truncate(limit);

    if rows.is_empty() {
        return KeysetPage::empty();
    }

    if direction == Direction::Previous {
        rows.reverse();
    }

    let next_id = rows.last().map(Keyed::key);
    let previous_id = rows.first().map(Keyed::key);
    let came_from_cursor = last_id.is_some();

    let (has_next, has_previous) = match direction {
        Direction::Next => (has_more, came_from_cursor),
        Direction::Previous => (came_from_cursor, has_more),
    };

    KeysetPage {
        content: rows,
        next_id,
        previous_id,
        has_next,
        has_previous,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Row(i64);

    impl Keyed for Row {
        fn key(&self) -> i64 {
            self.0
        }
    }

    /// Ids 1..=5, answered the way a keyset query would.
    fn fetch_from_table(window: KeysetWindow) -> Vec<Row> {
        let table = [1, 2, 3, 4, 5];
        let mut rows: Vec<Row> = match window.direction {
            Direction::Next => table
                .iter()
                .copied()
                .filter(|id| window.last_id.is_none_or(|last| *id > last))
                .map(Row)
                .collect(),
            Direction::Previous => table
                .iter()
                .rev()
                .copied()
                .filter(|id| window.last_id.is_none_or(|last| *id < last))
                .map(Row)
                .collect(),
        };
        rows.truncate(window.fetch_limit);
        rows
    }

    async fn page(
        last_id: Option<i64>,
        limit: i64,
        direction: Direction,
    ) -> KeysetPage<Row> {
        let request =
            PageRequest::new((), last_id, limit, direction, 500).unwrap();
        paginate(&request, |window| async move {
            Ok::<_, Infallible>(fetch_from_table(window))
        })
        .await
        .unwrap()
    }

    fn ids(page: &KeysetPage<Row>) -> Vec<i64> {
        page.content.iter().map(|row| row.0).collect()
    }

    #[tokio::test]
    async fn first_page_detects_more_rows_via_over_fetch() {
        let page = page(None, 2, Direction::Next).await;
        assert_eq!(ids(&page), vec![1, 2]);
        assert_eq!(page.next_id, Some(2));
        assert_eq!(page.previous_id, Some(1));
        assert!(page.has_next);
        assert!(!page.has_previous);
    }

    #[tokio::test]
    async fn continuation_has_both_neighbours() {
        let page = page(Some(2), 2, Direction::Next).await;
        assert_eq!(ids(&page), vec![3, 4]);
        assert!(page.has_next);
        assert!(page.has_previous);
    }

    #[tokio::test]
    async fn backward_page_is_ascending() {
        let page = page(Some(4), 2, Direction::Previous).await;
        assert_eq!(ids(&page), vec![2, 3]);
        assert_eq!(page.next_id, Some(3));
        assert_eq!(page.previous_id, Some(2));
        assert!(page.has_next);
        assert!(page.has_previous);
    }

    #[tokio::test]
    async fn last_page_forward_has_no_next() {
        let page = page(Some(4), 2, Direction::Next).await;
        assert_eq!(ids(&page), vec![5]);
        assert!(!page.has_next);
        assert!(page.has_previous);
    }

    #[tokio::test]
    async fn first_page_backward_has_no_previous() {
        let page = page(Some(3), 2, Direction::Previous).await;
        assert_eq!(ids(&page), vec![1, 2]);
        assert!(page.has_next);
        assert!(!page.has_previous);
    }

    #[tokio::test]
    async fn empty_result_has_no_cursors() {
        let page = page(Some(5), 2, Direction::Next).await;
        assert_eq!(page, KeysetPage::empty());
    }

    #[tokio::test]
    async fn fetch_sees_limit_plus_one_and_errors_pass_through() {
        let request =
            PageRequest::new((), None, 3, Direction::Next, 500).unwrap();
        let result: Result<KeysetPage<Row>, &str> =
            paginate(&request, |window| async move {
                assert_eq!(window.fetch_limit, 4);
                Err("backend down")
            })
            .await;
        assert_eq!(result, Err("backend down"));
    }

    #[tokio::test]
    async fn content_ids_strictly_increase_in_every_window() {
        for limit in 1..=6 {
            for last_id in [None, Some(0), Some(2), Some(3), Some(6)] {
                for direction in [Direction::Next, Direction::Previous] {
                    let page = page(last_id, limit, direction).await;
                    let ids = ids(&page);
                    assert!(ids.len() <= limit as usize);
                    assert!(
                        ids.windows(2).all(|pair| pair[0] < pair[1]),
                        "{ids:?} for {last_id:?}/{limit}/{direction}"
                    );
                }
            }
        }
    }
}
