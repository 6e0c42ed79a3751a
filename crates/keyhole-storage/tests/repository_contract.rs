use std::sync::Arc;

use jiff::Timestamp;
use keyhole_core::{Record, Secret, ShortId};
use keyhole_storage::{InMemoryRepository, RedbRepository, Repository, StorageError};
use tempfile::TempDir;

fn id(value: &str) -> ShortId {
    ShortId::new_unchecked(value)
}

fn record(code: &str, url: &str) -> Record {
    Record {
        id: id(code),
        secret: Secret::new_unchecked("s3cret"),
        target_url: url.to_string(),
        created_at: Timestamp::now(),
    }
}

/// Behaviour every backend must share.
async fn exercise_contract<R: Repository>(repo: Arc<R>) {
    assert_eq!(repo.len().await.unwrap(), 0);

    repo.insert(record("first", "https://example.com/1"))
        .await
        .unwrap();
    assert!(matches!(
        repo.insert(record("first", "https://example.com/2")).await,
        Err(StorageError::Conflict(_))
    ));

    let found = repo.find_by_username("first").await.unwrap().unwrap();
    assert_eq!(found.target_url, "https://example.com/1");
    assert!(found.secret.verify("s3cret"));
    assert!(repo.find_by_username("second").await.unwrap().is_none());

    let updated = repo
        .update(
            &id("first"),
            Box::new(|r: &mut Record| {
                r.secret = Secret::new_unchecked("stolen");
                r.target_url = "https://example.com/updated".to_string();
            }),
        )
        .await
        .unwrap();
    assert_eq!(updated.target_url, "https://example.com/updated");
    assert!(updated.secret.verify("s3cret"));

    assert!(matches!(
        repo.update(&id("missing"), Box::new(|_: &mut Record| {})).await,
        Err(StorageError::NotFound(_))
    ));

    assert!(repo.delete(&id("first")).await.unwrap());
    assert!(!repo.delete(&id("first")).await.unwrap());
    assert!(repo.get(&id("first")).await.unwrap().is_none());
    repo.insert(record("second", "https://example.com/2"))
        .await
        .unwrap();
    assert!(!repo
        .delete_if(&id("second"), Box::new(|r: &Record| r.target_url.ends_with("/3")))
        .await
        .unwrap());
    assert!(repo
        .delete_if(&id("second"), Box::new(|r: &Record| r.target_url.ends_with("/2")))
        .await
        .unwrap());
    assert!(!repo
        .delete_if(&id("second"), Box::new(|_: &Record| true))
        .await
        .unwrap());
    assert_eq!(repo.len().await.unwrap(), 0);
}

/// Concurrent writers never lose a record or tear one.
async fn exercise_concurrency<R: Repository>(repo: Arc<R>) {
    let mut handles = Vec::new();
    for i in 0..32u32 {
        let repo = Arc::clone(&repo);
        handles.push(tokio::spawn(async move {
            let code = format!("id{i}");
            repo.insert(record(&code, &format!("https://example.com/{i}")))
                .await
                .unwrap();
            repo.update(
                &id(&code),
                Box::new(move |r: &mut Record| r.target_url = format!("https://updated.com/{i}")),
            )
            .await
            .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let mut urls = Vec::new();
    repo.for_each(&mut |r: &Record| urls.push(r.target_url.clone()))
        .await
        .unwrap();
    assert_eq!(urls.len(), 32);
    assert!(urls.iter().all(|u| u.starts_with("https://updated.com/")));
}

#[tokio::test]
async fn in_memory_repository_contract() {
    exercise_contract(Arc::new(InMemoryRepository::new())).await;
}

#[tokio::test]
async fn redb_repository_contract() {
    let tmp = TempDir::new().unwrap();
    let repo = RedbRepository::open(tmp.path().join("contract.redb")).unwrap();
    exercise_contract(Arc::new(repo)).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn in_memory_repository_concurrency() {
    exercise_concurrency(Arc::new(InMemoryRepository::new())).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn redb_repository_concurrency() {
    let tmp = TempDir::new().unwrap();
    let repo = RedbRepository::open(tmp.path().join("concurrency.redb")).unwrap();
    exercise_concurrency(Arc::new(repo)).await;
}
