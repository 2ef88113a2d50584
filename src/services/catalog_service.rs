//! Listing pipeline: fetch children from the provider, then filter, rank,
//! sort and partition them. Pure over the provider response and the query.
//!
//! Ordering rules:
//! - Folders always precede files, whatever the sort or keyword settings.
//! - A keyword filters files case-insensitively and ranks them (prefix
//!   match over substring match, earlier occurrence wins). Folders are
//!   never filtered or ranked by keyword; the folder partition passes
//!   through in provider order.
//! - `createdTime` sorts both partitions; `size` sorts files only, since
//!   folders carry no size. All sorts are stable, so provider order breaks
//!   ties.

use crate::{
    errors::GatewayResult,
    models::{
        entry::FileEntry,
        listing::{ListingQuery, SortBy, SortOrder},
    },
};
use crate::services::drive_client::DriveApi;
use chrono::{DateTime, Utc};

/// Fetch and organize the entries under `query.parent_id`.
pub async fn list(api: &dyn DriveApi, query: &ListingQuery) -> GatewayResult<Vec<FileEntry>> {
    let entries = api.list_children(&query.parent_id).await?;
    Ok(organize(entries, query))
}

/// Apply keyword filtering, ranking, sorting and folder-first partitioning
/// to a raw provider listing.
pub fn organize(entries: Vec<FileEntry>, query: &ListingQuery) -> Vec<FileEntry> {
    let (mut folders, mut files): (Vec<_>, Vec<_>) =
        entries.into_iter().partition(FileEntry::is_folder);

    if let Some(keyword) = query.keyword.as_deref() {
        let keyword = keyword.to_lowercase();
        files.retain(|entry| entry.name.to_lowercase().contains(&keyword));
        rank_by_relevance(&mut files, &keyword);
    }

    match query.sort_by {
        SortBy::None => {}
        SortBy::CreatedTime => {
            sort_by_created(&mut folders, query.sort_order);
            sort_by_created(&mut files, query.sort_order);
        }
        // Size is meaningless for folders; their order is left untouched.
        SortBy::Size => sort_by_size(&mut files, query.sort_order),
    }

    folders.extend(files);
    folders
}

/// Rank keyword matches: exact-prefix matches first, then by the leftmost
/// occurrence of the keyword in the name. Stable for equal ranks.
fn rank_by_relevance(files: &mut [FileEntry], keyword: &str) {
    files.sort_by_key(|entry| {
        let name = entry.name.to_lowercase();
        let prefix = name.starts_with(keyword);
        let index = name.find(keyword).unwrap_or(usize::MAX);
        (!prefix, index)
    });
}

fn sort_by_created(entries: &mut [FileEntry], order: SortOrder) {
    // Missing timestamps sort as the epoch.
    let key = |entry: &FileEntry| entry.created_time.unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    match order {
        SortOrder::Asc => entries.sort_by_key(key),
        SortOrder::Desc => {
            entries.sort_by(|a, b| key(b).cmp(&key(a)));
        }
    }
}

fn sort_by_size(files: &mut [FileEntry], order: SortOrder) {
    match order {
        SortOrder::Asc => files.sort_by_key(FileEntry::size_bytes),
        SortOrder::Desc => {
            files.sort_by(|a, b| b.size_bytes().cmp(&a.size_bytes()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::entry::FOLDER_MIME_TYPE;
    use chrono::NaiveDateTime;

    fn file(name: &str, size: Option<&str>) -> FileEntry {
        FileEntry {
            id: format!("file-{name}"),
            name: name.into(),
            mime_type: "application/octet-stream".into(),
            size: size.map(str::to_string),
            created_time: None,
            web_view_link: None,
            parents: vec!["root".into()],
        }
    }

    fn folder(name: &str) -> FileEntry {
        FileEntry {
            id: format!("folder-{name}"),
            name: name.into(),
            mime_type: FOLDER_MIME_TYPE.into(),
            size: None,
            created_time: None,
            web_view_link: None,
            parents: vec!["root".into()],
        }
    }

    fn at(entry: FileEntry, ts: &str) -> FileEntry {
        FileEntry {
            created_time: Some(
                NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S")
                    .expect("timestamp")
                    .and_utc(),
            ),
            ..entry
        }
    }

    fn query(keyword: Option<&str>, sort_by: SortBy, sort_order: SortOrder) -> ListingQuery {
        ListingQuery {
            parent_id: "root".into(),
            keyword: keyword.map(str::to_string),
            sort_by,
            sort_order,
        }
    }

    fn names(entries: &[FileEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn folders_precede_files_without_any_query() {
        let entries = vec![file("b.txt", None), folder("Docs"), file("a.txt", None)];
        let result = organize(entries, &query(None, SortBy::None, SortOrder::Asc));
        assert_eq!(names(&result), ["Docs", "b.txt", "a.txt"]);
    }

    #[test]
    fn keyword_keeps_non_matching_folders_ahead_of_matching_files() {
        // "Docs" does not match "ap" but folders are never filtered by
        // keyword; Apple and apricot both prefix-match case-insensitively
        // at index 0, so provider order is preserved between them.
        let entries = vec![file("Apple", None), file("apricot", None), folder("Docs")];
        let result = organize(entries, &query(Some("ap"), SortBy::None, SortOrder::Asc));
        assert_eq!(names(&result), ["Docs", "Apple", "apricot"]);
    }

    #[test]
    fn matching_folder_stays_ahead_of_ranked_files() {
        let entries = vec![
            file("grape.txt", None),
            folder("apricots"),
            file("apple.txt", None),
        ];
        let result = organize(entries, &query(Some("ap"), SortBy::None, SortOrder::Asc));
        assert_eq!(names(&result), ["apricots", "apple.txt", "grape.txt"]);
    }

    #[test]
    fn prefix_matches_rank_ahead_of_substring_matches() {
        let entries = vec![
            file("pineapple", None),
            file("apple pie", None),
            file("snap", None),
        ];
        let result = organize(entries, &query(Some("ap"), SortBy::None, SortOrder::Asc));
        // "apple pie" is a prefix match; "snap" matches at index 2,
        // "pineapple" at index 4.
        assert_eq!(names(&result), ["apple pie", "snap", "pineapple"]);
    }

    #[test]
    fn size_desc_treats_missing_size_as_zero_and_leaves_folders_alone() {
        let entries = vec![
            folder("zfolder"),
            file("hundred", Some("100")),
            file("missing", None),
            file("fifty", Some("50")),
            folder("afolder"),
        ];
        let result = organize(entries, &query(None, SortBy::Size, SortOrder::Desc));
        assert_eq!(
            names(&result),
            ["zfolder", "afolder", "hundred", "fifty", "missing"]
        );
    }

    #[test]
    fn size_asc_orders_files_only() {
        let entries = vec![
            file("big", Some("1000")),
            file("small", Some("1")),
            file("mid", Some("10")),
        ];
        let result = organize(entries, &query(None, SortBy::Size, SortOrder::Asc));
        assert_eq!(names(&result), ["small", "mid", "big"]);
    }

    #[test]
    fn created_time_sorts_both_partitions() {
        let entries = vec![
            at(folder("new-folder"), "2024-06-01 00:00:00"),
            at(folder("old-folder"), "2024-01-01 00:00:00"),
            at(file("new.txt", None), "2024-06-01 00:00:00"),
            at(file("old.txt", None), "2024-01-01 00:00:00"),
        ];
        let result = organize(entries, &query(None, SortBy::CreatedTime, SortOrder::Asc));
        assert_eq!(
            names(&result),
            ["old-folder", "new-folder", "old.txt", "new.txt"]
        );

        let entries = vec![
            at(folder("new-folder"), "2024-06-01 00:00:00"),
            at(folder("old-folder"), "2024-01-01 00:00:00"),
            at(file("new.txt", None), "2024-06-01 00:00:00"),
            at(file("old.txt", None), "2024-01-01 00:00:00"),
        ];
        let result = organize(entries, &query(None, SortBy::CreatedTime, SortOrder::Desc));
        assert_eq!(
            names(&result),
            ["new-folder", "old-folder", "new.txt", "old.txt"]
        );
    }

    #[test]
    fn created_time_ties_keep_provider_order() {
        let entries = vec![
            at(file("first", None), "2024-03-01 00:00:00"),
            at(file("second", None), "2024-03-01 00:00:00"),
            at(file("third", None), "2024-03-01 00:00:00"),
        ];
        let result = organize(entries, &query(None, SortBy::CreatedTime, SortOrder::Asc));
        assert_eq!(names(&result), ["first", "second", "third"]);
    }

    #[test]
    fn keyword_and_sort_compose() {
        // "banana" drops out of the file partition; both folders survive
        // the keyword untouched and keep provider order.
        let entries = vec![
            file("apple-large", Some("300")),
            file("apple-small", Some("10")),
            file("banana", Some("999")),
            folder("apples"),
            folder("misc"),
        ];
        let result = organize(entries, &query(Some("apple"), SortBy::Size, SortOrder::Desc));
        assert_eq!(
            names(&result),
            ["apples", "misc", "apple-large", "apple-small"]
        );
    }
}
