use std::path::Path;

use log::{info, warn};

use super::upload::split_key;
use super::ObjectStore;
use crate::error::{BucketError, BucketResult};

/// Rank of `key` in the `base_N.ext` sequence under `prefix`.
///
/// The trailing integer between the last `_` and the extension is the rank. A key whose
/// stem is the prefix itself (minus a trailing `_`) is the un-suffixed base object and
/// ranks 0; it is only listed when `prefix` has no trailing `_`. Anything else has no rank.
pub fn suffix_rank(key: &str, prefix: &str) -> Option<u64> {
    let (stem, _) = split_key(key);
    if stem == prefix.trim_end_matches('_') {
        return Some(0);
    }
    let (_, tail) = stem.rsplit_once('_')?;
    if tail.is_empty() || !tail.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    tail.parse().ok()
}

/// Picks the key with the largest suffix.
pub fn select_latest(keys: &[String], prefix: &str) -> BucketResult<String> {
    let mut latest: Option<(u64, &String)> = None;
    for key in keys {
        match suffix_rank(key, prefix) {
            Some(rank) => {
                if latest.map_or(true, |(best, _)| rank > best) {
                    latest = Some((rank, key));
                }
            }
            None => warn!("ignoring {}: no numeric suffix", key),
        }
    }
    latest
        .map(|(_, key)| key.clone())
        .ok_or_else(|| BucketError::NotFound {
            prefix: prefix.to_string(),
        })
}

/// Downloads the newest object under `prefix` to `local` and returns its key.
pub async fn download_latest<S>(store: &S, prefix: &str, local: &Path) -> BucketResult<String>
where
    S: ObjectStore + ?Sized,
{
    let keys = store.list_keys(prefix).await?;
    if keys.is_empty() {
        return Err(BucketError::NotFound {
            prefix: prefix.to_string(),
        });
    }
    let latest = select_latest(&keys, prefix)?;
    info!("Latest file found: {}", latest);

    store.download(&latest, local).await?;
    info!("Downloaded {} to {}", latest, local.display());
    Ok(latest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStore;

    const PREFIX: &str = "nba_filtered_game_logs_";

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn rank_reads_trailing_integer() {
        assert_eq!(suffix_rank("nba_filtered_game_logs_12.csv", PREFIX), Some(12));
        assert_eq!(suffix_rank("nba_filtered_game_logs_3", PREFIX), Some(3));
        assert_eq!(suffix_rank("nba_filtered_game_logs.csv", PREFIX), Some(0));
        assert_eq!(suffix_rank("nba_filtered_game_logs_backup.csv", PREFIX), None);
        assert_eq!(suffix_rank("nba_filtered_game_logs_.csv", PREFIX), None);
    }

    #[test]
    fn numeric_not_lexicographic_order() {
        let listing = keys(&[
            "nba_filtered_game_logs_9.csv",
            "nba_filtered_game_logs_10.csv",
            "nba_filtered_game_logs_2.csv",
        ]);
        assert_eq!(select_latest(&listing, PREFIX).unwrap(), "nba_filtered_game_logs_10.csv");
    }

    #[test]
    fn malformed_keys_are_skipped() {
        let listing = keys(&["nba_filtered_game_logs_old.csv", "nba_filtered_game_logs_1.csv"]);
        assert_eq!(select_latest(&listing, PREFIX).unwrap(), "nba_filtered_game_logs_1.csv");

        let only_malformed = keys(&["nba_filtered_game_logs_old.csv"]);
        assert!(matches!(
            select_latest(&only_malformed, PREFIX),
            Err(BucketError::NotFound { .. })
        ));
    }

    #[test]
    fn unsuffixed_base_loses_to_any_suffix() {
        let listing = keys(&["data.csv", "data_1.csv"]);
        assert_eq!(select_latest(&listing, "data").unwrap(), "data_1.csv");
        assert_eq!(select_latest(&keys(&["data.csv"]), "data").unwrap(), "data.csv");
    }

    #[tokio::test]
    async fn underscore_prefix_never_lists_the_base_object() {
        let store = MemoryStore::default();
        store.insert("nba_filtered_game_logs.csv", b"first export");
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("out.csv");

        let err = download_latest(&store, PREFIX, &local).await.unwrap_err();
        assert!(matches!(err, BucketError::NotFound { .. }));

        let key = download_latest(&store, "nba_filtered_game_logs", &local).await.unwrap();
        assert_eq!(key, "nba_filtered_game_logs.csv");
    }

    #[tokio::test]
    async fn empty_listing_is_not_found() {
        let store = MemoryStore::with_keys(&["unrelated.csv"]);
        let dir = tempfile::tempdir().unwrap();
        let err = download_latest(&store, PREFIX, &dir.path().join("out.csv"))
            .await
            .unwrap_err();
        assert!(matches!(err, BucketError::NotFound { ref prefix } if prefix == PREFIX));
    }

    #[tokio::test]
    async fn downloads_newest_over_existing_local_copy() {
        let store = MemoryStore::default();
        store.insert("nba_filtered_game_logs_1.csv", b"old");
        store.insert("nba_filtered_game_logs_2.csv", b"new");
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("nba_filtered_game_logs.csv");
        std::fs::write(&local, b"stale local copy").unwrap();

        let key = download_latest(&store, PREFIX, &local).await.unwrap();
        assert_eq!(key, "nba_filtered_game_logs_2.csv");
        assert_eq!(std::fs::read(&local).unwrap(), b"new");
    }

    #[tokio::test]
    async fn listing_failure_is_a_storage_error() {
        let store = MemoryStore::default().break_key(PREFIX);
        let dir = tempfile::tempdir().unwrap();
        let err = download_latest(&store, PREFIX, &dir.path().join("out.csv"))
            .await
            .unwrap_err();
        assert!(matches!(err, BucketError::Storage { op: "list", .. }));
    }
}
