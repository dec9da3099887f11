mod common;

use deptrack::{
    crawl, prepare_repositories, DiscoveredRepository, FailureKind, FetchError, ManifestFetcher,
    ManifestFormat, OutputTarget, Progress, RawContentFetcher, ReportWriter, RepositoryRef,
    RunnerConfig,
};
use std::sync::Arc;
use url::Url;

const VENDOR_XY: &str = r#"{
    "package": [
        {"path": "github.com/x/y", "revision": "4a1f2b"}
    ]
}"#;

fn fetcher(base: &str) -> Arc<RawContentFetcher> {
    Arc::new(RawContentFetcher::new(Url::parse(base).unwrap(), None).unwrap())
}

fn repo(name: &str) -> RepositoryRef {
    RepositoryRef::new("org", name, "master")
}

#[tokio::test]
async fn shared_dependency_maps_to_both_repositories() {
    let base = common::serve(vec![
        ("/org/beta/master/vendor/vendor.json", 200, VENDOR_XY),
        ("/org/alpha/master/vendor/vendor.json", 200, VENDOR_XY),
    ])
    .await;

    let aggregate = crawl(
        fetcher(&base),
        ManifestFormat::VendorJson,
        2,
        vec![repo("beta"), repo("alpha")],
        &Progress::hidden(),
    )
    .await;

    assert_eq!(aggregate.len(), 1);
    let entry = aggregate.get("github.com/x/y_4a1f2b").unwrap();
    assert_eq!(
        entry.repositories().collect::<Vec<_>>(),
        vec!["org/alpha", "org/beta"]
    );
    assert_eq!(aggregate.failed(), 0);
}

#[tokio::test]
async fn missing_manifest_is_recorded_as_not_found() {
    let base = common::serve(vec![(
        "/org/present/master/vendor/vendor.json",
        200,
        VENDOR_XY,
    )])
    .await;
    let progress = Progress::hidden();

    let aggregate = crawl(
        fetcher(&base),
        ManifestFormat::VendorJson,
        3,
        vec![repo("present"), repo("absent")],
        &progress,
    )
    .await;

    assert_eq!(progress.completed(), 2);
    assert_eq!(aggregate.succeeded(), 1);
    assert_eq!(aggregate.failed(), 1);
    assert_eq!(aggregate.failures_of(FailureKind::NotFound), 1);
    assert_eq!(aggregate.failures()[0].repository.full_name, "org/absent");
    assert!(aggregate
        .entries()
        .all(|e| e.repositories().all(|r| r != "org/absent")));
}

#[tokio::test]
async fn go_mod_inline_require_block() {
    let base = common::serve(vec![(
        "/org/svc/master/go.mod",
        200,
        "module org/svc\n\nrequire ( \"a.b/c\" v1.2.3 )\n",
    )])
    .await;

    let aggregate = crawl(
        fetcher(&base),
        ManifestFormat::GoMod,
        1,
        vec![repo("svc")],
        &Progress::hidden(),
    )
    .await;

    let entries: Vec<_> = aggregate.entries().collect();
    assert_eq!(entries.len(), 1);
    let key = entries[0].key();
    assert_eq!(key.path(), "a.b/c");
    assert_eq!(key.version(), "v1.2.3");
    assert!(key.revision().is_empty());
    assert!(key.version_exact().is_empty());
}

#[tokio::test]
async fn limit_restricts_crawled_repositories() {
    let routes: Vec<(String, u16, &str)> = (0..5)
        .map(|i| (format!("/org/repo-{i}/master/vendor/vendor.json"), 200, VENDOR_XY))
        .collect();
    let base = common::serve(
        routes
            .iter()
            .map(|(path, status, body)| (path.as_str(), *status, *body))
            .collect(),
    )
    .await;
    let discovered: Vec<_> = (0..5)
        .map(|i| DiscoveredRepository::new("org", format!("repo-{i}")))
        .collect();
    let config = RunnerConfig::new(vec!["org".to_string()], Vec::new()).with_limit(1);
    let progress = Progress::hidden();

    let repositories = prepare_repositories(discovered, &config);
    let aggregate = crawl(
        fetcher(&base),
        config.format(),
        config.concurrency(),
        repositories,
        &progress,
    )
    .await;

    assert_eq!(progress.completed(), 1);
    assert_eq!(aggregate.processed(), 1);
    assert_eq!(
        aggregate
            .get("github.com/x/y_4a1f2b")
            .unwrap()
            .repositories()
            .collect::<Vec<_>>(),
        vec!["org/repo-0"]
    );
}

#[tokio::test]
async fn malformed_manifest_is_a_parse_failure() {
    let base = common::serve(vec![(
        "/org/broken/master/vendor/vendor.json",
        200,
        "{\"package\": [",
    )])
    .await;

    let aggregate = crawl(
        fetcher(&base),
        ManifestFormat::VendorJson,
        1,
        vec![repo("broken")],
        &Progress::hidden(),
    )
    .await;

    assert_eq!(aggregate.failures_of(FailureKind::Parse), 1);
    assert!(aggregate.is_empty());
}

#[tokio::test]
async fn connection_failure_is_a_network_error() {
    let base = common::closed_port().await;

    let result = fetcher(&base)
        .fetch(&repo("any"), ManifestFormat::GoMod)
        .await;

    assert!(matches!(result, Err(FetchError::Network { .. })));
}

#[tokio::test]
async fn server_error_is_classified_as_not_found() {
    let base = common::serve(vec![("/org/flaky/master/go.mod", 500, "boom")]).await;

    let result = fetcher(&base)
        .fetch(&repo("flaky"), ManifestFormat::GoMod)
        .await;

    assert!(matches!(
        result,
        Err(FetchError::NotFound { status: 500, .. })
    ));
}

#[tokio::test]
async fn report_of_crawl_is_sorted_and_deduplicated() {
    let base = common::serve(vec![
        (
            "/org/a/master/go.mod",
            200,
            "module a\nrequire (\n z.z/z v1.0.0\n a.a/a v2.0.0\n)\n",
        ),
        ("/org/b/master/go.mod", 200, "module b\nrequire a.a/a v2.0.0\n"),
    ])
    .await;
    let temp = tempfile::TempDir::new().unwrap();
    let target = OutputTarget::File(temp.path().join("dep_result.csv"));

    let aggregate = crawl(
        fetcher(&base),
        ManifestFormat::GoMod,
        4,
        vec![repo("b"), repo("a"), repo("c")],
        &Progress::hidden(),
    )
    .await;
    ReportWriter::for_target(ManifestFormat::GoMod, &target)
        .write_to(&target, &aggregate)
        .unwrap();

    let text = std::fs::read_to_string(temp.path().join("dep_result.csv")).unwrap();
    assert_eq!(
        text,
        "Package,Version,Count,Repositories\n\
         a.a/a,v2.0.0,2,org/a;org/b\n\
         z.z/z,v1.0.0,1,org/a\n"
    );
    assert_eq!(aggregate.failures_of(FailureKind::NotFound), 1);
}

#[tokio::test]
async fn branch_with_reserved_characters_is_fetched() {
    let base = common::serve(vec![(
        "/org/svc/release%232%2541/go.mod",
        200,
        "module org/svc\nrequire a.b/c v1.2.3\n",
    )])
    .await;

    let aggregate = crawl(
        fetcher(&base),
        ManifestFormat::GoMod,
        1,
        vec![RepositoryRef::new("org", "svc", "release#2%41")],
        &Progress::hidden(),
    )
    .await;

    assert_eq!(aggregate.failed(), 0);
    assert!(aggregate.get("a.b/c_v1.2.3").is_some());
}
