use std::path::Path;

use log::{debug, info};

use super::ObjectStore;
use crate::error::BucketResult;

/// Splits `key` at its last `.`; the extension keeps the dot.
pub fn split_key(key: &str) -> (&str, &str) {
    match key.rfind('.') {
        Some(dot) => key.split_at(dot),
        None => (key, ""),
    }
}

/// `base_{n}{ext}`
pub fn suffixed_key(base: &str, n: u64, ext: &str) -> String {
    format!("{}_{}{}", base, n, ext)
}

/// Uploads `local` under `key`, or under the first free `base_N.ext` when `key` is taken.
///
/// The free slot is found by probing existence in order, so two uploaders racing on
/// the same base key can both land on the same suffix.
pub async fn upload_with_increment<S>(store: &S, local: &Path, key: &str) -> BucketResult<String>
where
    S: ObjectStore + ?Sized,
{
    let (base, ext) = split_key(key);
    let mut new_key = key.to_string();
    let mut counter = 1;
    while store.exists(&new_key).await? {
        debug!("{} already exists", new_key);
        new_key = suffixed_key(base, counter, ext);
        counter += 1;
    }

    store.put_file(local, &new_key).await?;
    info!("Uploaded {} as {}", local.display(), new_key);
    Ok(new_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BucketError;
    use crate::storage::memory::MemoryStore;
    use std::io::Write;

    fn local_csv() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Player,PTS\nA,30").unwrap();
        file
    }

    #[test]
    fn split_key_at_last_dot() {
        assert_eq!(split_key("data.csv"), ("data", ".csv"));
        assert_eq!(split_key("logs.2025.csv"), ("logs.2025", ".csv"));
        assert_eq!(split_key("data"), ("data", ""));
    }

    #[tokio::test]
    async fn free_key_is_used_verbatim() {
        let store = MemoryStore::with_keys(&["other.csv"]);
        let file = local_csv();
        let key = upload_with_increment(&store, file.path(), "data.csv").await.unwrap();
        assert_eq!(key, "data.csv");
        assert_eq!(store.body("data.csv").unwrap(), b"Player,PTS\nA,30\n");
        assert_eq!(*store.probes.lock().unwrap(), vec!["data.csv"]);
    }

    #[tokio::test]
    async fn taken_key_gets_next_suffix() {
        let store = MemoryStore::with_keys(&["data.csv", "data_1.csv"]);
        let file = local_csv();
        let key = upload_with_increment(&store, file.path(), "data.csv").await.unwrap();
        assert_eq!(key, "data_2.csv");
        assert_eq!(store.keys(), vec!["data.csv", "data_1.csv", "data_2.csv"]);
    }

    #[tokio::test]
    async fn probes_in_order_without_gaps() {
        let existing = ["logs.csv", "logs_1.csv", "logs_2.csv", "logs_3.csv", "logs_4.csv"];
        let store = MemoryStore::with_keys(&existing);
        let file = local_csv();
        let key = upload_with_increment(&store, file.path(), "logs.csv").await.unwrap();
        assert_eq!(key, "logs_5.csv");
        assert_eq!(
            *store.probes.lock().unwrap(),
            vec!["logs.csv", "logs_1.csv", "logs_2.csv", "logs_3.csv", "logs_4.csv", "logs_5.csv"]
        );
    }

    #[tokio::test]
    async fn key_without_extension_gets_bare_suffix() {
        let store = MemoryStore::with_keys(&["data"]);
        let file = local_csv();
        assert_eq!(upload_with_increment(&store, file.path(), "data").await.unwrap(), "data_1");
        assert_eq!(upload_with_increment(&store, file.path(), "data").await.unwrap(), "data_2");
    }

    #[tokio::test]
    async fn failed_existence_check_is_not_absence() {
        let store = MemoryStore::with_keys(&["data.csv"]).break_key("data_1.csv");
        let file = local_csv();
        let err = upload_with_increment(&store, file.path(), "data.csv").await.unwrap_err();
        assert!(matches!(err, BucketError::Storage { op: "head", ref key, .. } if key == "data_1.csv"));
        assert_eq!(store.keys(), vec!["data.csv"]);
    }
}
