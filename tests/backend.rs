#![cfg(feature = "worker")]

use toolsearch::prelude::*;

fn catalog() -> CatalogSnapshot<CatalogEntry> {
  CatalogSnapshot::new(vec![
    CatalogEntry::new("base64")
      .with_tags(["encoding", "text"])
      .with_meta("en", LocalizedMeta::new("Base64 Encoder", "Encode text as base64"))
      .with_meta("fr", LocalizedMeta::new("Encodeur Base64", "Encoder du texte en base64")),
    CatalogEntry::new("hash")
      .with_tags(["crypto", "text"])
      .with_meta("en", LocalizedMeta::new("Hash Text", "Compute digests of text")),
    CatalogEntry::new("uuid")
      .with_tag("random")
      .with_meta("en", LocalizedMeta::new("UUID Generator", "Generate random identifiers")),
  ])
}

fn request(id: u64, text: &str, locale: &str) -> SearchRequest {
  SearchRequest {
    request_id: RequestId::new(id),
    query: Query::new(text, locale),
  }
}

#[tokio::test]
async fn test_worker_matches_inline() {
  let worker = WorkerBackend::spawn("toolsearch-parity", ScoringRules::default()).unwrap();
  let remote = ExecutionBackend::with_worker(worker, ScoringRules::default());
  let inline = ExecutionBackend::inline(ScoringRules::default());
  let catalog = catalog();

  let queries = [("", "en"), ("text", "en"), ("encodeur", "fr"), ("random id", "en"), ("zzz", "en")];
  for (id, (text, locale)) in queries.into_iter().enumerate() {
    let request = request(id as u64 + 1, text, locale);

    let expected = inline.search(&catalog, &request).await;
    let actual = remote.search(&catalog, &request).await;
    assert_eq!(actual, expected, "query {text:?}");

    let projected = remote.search_projected(&catalog, &request).await;
    assert_eq!(projected, expected.items, "query {text:?}");
  }

  assert_eq!(remote.kind(), BackendKind::Worker);
}

#[tokio::test]
async fn test_new_snapshot_reseeds_worker() {
  let worker = WorkerBackend::spawn("toolsearch-reseed", ScoringRules::default()).unwrap();
  let backend = ExecutionBackend::with_worker(worker, ScoringRules::default());

  let first = catalog();
  let result = backend.search(&first, &request(1, "uuid", "en")).await;
  assert_eq!(result.items.len(), 1);

  let second = CatalogSnapshot::new(vec![CatalogEntry::new("other").with_tag("uuid")]);
  let result = backend.search(&second, &request(2, "uuid", "en")).await;
  assert_eq!(result.items, vec![second.entries()[0].clone()]);
  assert_eq!(backend.kind(), BackendKind::Worker);
}

#[tokio::test]
async fn test_dead_worker_downgrades_and_retries_inline() {
  let worker = WorkerBackend::spawn("toolsearch-dead", ScoringRules::default()).unwrap();
  worker.shutdown();
  let backend = ExecutionBackend::with_worker(worker, ScoringRules::default());
  assert_eq!(backend.kind(), BackendKind::Worker);

  let result = backend.search(&catalog(), &request(9, "random", "en")).await;
  assert_eq!(result.request_id, RequestId::new(9));
  assert_eq!(result.items, vec![catalog().entries()[2].clone()]);
  assert_eq!(backend.kind(), BackendKind::Inline);

  // Later searches stay inline.
  let result = backend.search(&catalog(), &request(10, "", "en")).await;
  assert_eq!(result.items.len(), 3);
  assert_eq!(backend.kind(), BackendKind::Inline);
}

#[tokio::test]
async fn test_duplicate_ids_hydrate_alike() {
  let catalog = CatalogSnapshot::new(vec![
    CatalogEntry::new("dup")
      .with_tag("alpha")
      .with_meta("en", LocalizedMeta::named("First")),
    CatalogEntry::new("other").with_tag("alpha"),
    CatalogEntry::new("dup")
      .with_tag("alpha")
      .with_meta("en", LocalizedMeta::named("Second Alpha")),
  ]);
  let worker = WorkerBackend::spawn("toolsearch-dup", ScoringRules::default()).unwrap();
  let remote = ExecutionBackend::with_worker(worker, ScoringRules::default());
  let inline = ExecutionBackend::inline(ScoringRules::default());

  for (id, text) in ["alpha", ""].into_iter().enumerate() {
    let request = request(id as u64 + 1, text, "en");
    let expected = inline.search(&catalog, &request).await;
    assert_eq!(remote.search(&catalog, &request).await, expected, "query {text:?}");
    assert_eq!(
      remote.search_projected(&catalog, &request).await,
      inline.search_projected(&catalog, &request).await,
      "query {text:?}"
    );
    assert!(expected.items.iter().all(|entry| entry.id != "dup" || entry == &catalog.entries()[0]));
  }
  assert_eq!(remote.kind(), BackendKind::Worker);
}
