use std::sync::{Arc, Mutex};

use assetweave::callback::{LifecycleCallback, LifecycleEvent, ProcessingReport};
use assetweave::core::AssetError;
use assetweave::hash::{HashStrategy, Sha256Hash};
use assetweave::manager::ManagerFactory;
use assetweave::test_utils::{RecordingCallback, TestWebapp};

use crate::common::{basic_webapp, factory_for, serve};

fn factory_with_callback(
    webapp: &TestWebapp,
    callback: Arc<dyn LifecycleCallback>,
) -> Arc<ManagerFactory> {
    ManagerFactory::builder(webapp.config().unwrap())
        .with_callback(callback)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_processes_script_group() {
    let webapp = basic_webapp().unwrap();
    let factory = factory_for(&webapp).unwrap();

    let (content, name) = serve(&factory, "/wro/all.js").await.unwrap();
    assert_eq!(content, "var a = 1;\nvar b = 2;");
    assert_eq!(name.as_deref(), Some("all.js"));
}

#[tokio::test]
async fn test_processes_stylesheets_from_context_and_classpath() {
    let webapp = basic_webapp().unwrap();
    let factory = factory_for(&webapp).unwrap();

    let (content, _) = serve(&factory, "/all.css").await.unwrap();
    assert_eq!(content, "body{color:red}.lib{margin:0}");
}

#[tokio::test]
async fn test_sets_response_headers() {
    let webapp = basic_webapp().unwrap();
    let factory = factory_for(&webapp).unwrap();

    let scope = factory.establish("/all.js").unwrap();
    let manager = factory.create(&scope).unwrap();
    let bytes = manager.process("/all.js").await.unwrap();

    let response = scope.context().response();
    assert_eq!(
        response.header("ETag"),
        Some(format!("\"{}\"", Sha256Hash.get_hash(&bytes)))
    );
    assert_eq!(response.header("Content-Type").as_deref(), Some("application/javascript"));
}

#[tokio::test]
async fn test_request_can_disable_minimization() {
    let webapp = basic_webapp().unwrap();
    let factory = factory_for(&webapp).unwrap();

    let (minimized, _) = serve(&factory, "/all.js").await.unwrap();
    let (raw, _) = serve(&factory, "/all.js?minimize=false").await.unwrap();
    assert!(!minimized.contains("// first"));
    assert!(raw.contains("// first"));
    assert!(raw.contains("var b = 2;"));
}

#[tokio::test]
async fn test_second_request_is_served_from_cache() {
    let webapp = basic_webapp().unwrap();
    let reports: Arc<Mutex<Vec<ProcessingReport>>> = Arc::default();
    let sink = Arc::clone(&reports);
    let factory = factory_with_callback(
        &webapp,
        Arc::new(move |event: &LifecycleEvent<'_>| -> anyhow::Result<()> {
            if let LifecycleEvent::ProcessingComplete(report) = event {
                sink.lock().unwrap().push((*report).clone());
            }
            Ok(())
        }),
    );

    let (first, _) = serve(&factory, "/all.js").await.unwrap();
    let (second, _) = serve(&factory, "/all.js").await.unwrap();
    assert_eq!(first, second);

    let reports = reports.lock().unwrap();
    assert_eq!(reports.len(), 2);
    assert!(reports[0].computed);
    assert!(!reports[1].computed);
    assert_eq!(reports[0].hash, reports[1].hash);
    assert_eq!(reports[0].size, first.len());
}

#[tokio::test]
async fn test_changed_resource_is_recomputed() {
    let webapp = basic_webapp().unwrap();
    let factory = factory_for(&webapp).unwrap();

    let (before, _) = serve(&factory, "/all.js").await.unwrap();
    webapp.write_file("js/b.js", "var b = 3").unwrap();
    let (after, _) = serve(&factory, "/all.js").await.unwrap();

    assert!(before.contains("var b = 2;"));
    assert!(after.contains("var b = 3;"));
}

#[tokio::test]
async fn test_lifecycle_events_fire_in_order() {
    let webapp = basic_webapp().unwrap();
    let recorder = Arc::new(RecordingCallback::new());
    let factory = factory_with_callback(&webapp, Arc::clone(&recorder) as Arc<dyn LifecycleCallback>);

    serve(&factory, "/all.js").await.unwrap();
    assert_eq!(
        recorder.events(),
        vec![
            "before-pre-process",
            "after-pre-process",
            "before-pre-process",
            "after-pre-process",
            "before-merge",
            "after-merge",
            "before-post-process",
            "after-post-process",
            "processing-complete",
        ]
    );

    serve(&factory, "/all.js").await.unwrap();
    assert_eq!(recorder.events().last().map(String::as_str), Some("processing-complete"));
    assert_eq!(recorder.events().len(), 10);
}

#[tokio::test]
async fn test_group_without_resources_of_type_is_empty() {
    let webapp = basic_webapp().unwrap();
    let recorder = Arc::new(RecordingCallback::new());
    let factory = factory_with_callback(&webapp, Arc::clone(&recorder) as Arc<dyn LifecycleCallback>);

    let (content, _) = serve(&factory, "/admin.css").await.unwrap();
    assert!(content.is_empty());
    assert!(!recorder.events().iter().any(|event| event == "before-post-process"));
}

#[tokio::test]
async fn test_unknown_group_fails() {
    let webapp = basic_webapp().unwrap();
    let factory = factory_for(&webapp).unwrap();

    let err = serve(&factory, "/missing.js").await.unwrap_err();
    assert!(matches!(err, AssetError::GroupNotFound { ref name } if name == "missing"));

    let err = serve(&factory, "/all.html").await.unwrap_err();
    assert!(err.is_configuration());
}

#[tokio::test]
async fn test_context_is_released_after_failure() {
    let webapp = basic_webapp().unwrap();
    let factory = factory_for(&webapp).unwrap();

    assert!(serve(&factory, "/missing.js").await.is_err());
    serve(&factory, "/admin.js").await.unwrap();
}

#[tokio::test]
async fn test_only_one_context_at_a_time() {
    let webapp = basic_webapp().unwrap();
    let factory = factory_for(&webapp).unwrap();

    let scope = factory.establish("/all.js").unwrap();
    let err = factory.establish("/all.css").unwrap_err();
    assert!(err.is_precondition());
    drop(scope);
    assert!(factory.establish("/all.css").is_ok());
}

#[test]
fn test_independent_threads_share_one_factory() {
    let webapp = basic_webapp().unwrap();
    let factory = factory_for(&webapp).unwrap();
    let both_active = std::sync::Barrier::new(2);

    std::thread::scope(|threads| {
        for request in ["/all.js", "/all.css"] {
            let factory = &factory;
            let both_active = &both_active;
            threads.spawn(move || {
                let scope = factory.establish(request).unwrap();
                both_active.wait();
                assert_eq!(scope.context().request().uri, request);
            });
        }
    });
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_compute_once() {
    let webapp = basic_webapp().unwrap();
    let reports: Arc<Mutex<Vec<ProcessingReport>>> = Arc::default();
    let sink = Arc::clone(&reports);
    let factory = factory_with_callback(
        &webapp,
        Arc::new(move |event: &LifecycleEvent<'_>| -> anyhow::Result<()> {
            if let LifecycleEvent::ProcessingComplete(report) = event {
                sink.lock().unwrap().push((*report).clone());
            }
            Ok(())
        }),
    );

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let factory = Arc::clone(&factory);
            tokio::spawn(async move { serve(&factory, "/all.js").await })
        })
        .collect();
    for task in tasks {
        let (content, _) = task.await.unwrap().unwrap();
        assert_eq!(content, "var a = 1;\nvar b = 2;");
    }

    let reports = reports.lock().unwrap();
    assert_eq!(reports.len(), 8);
    assert_eq!(reports.iter().filter(|report| report.computed).count(), 1);
}

fn webapp_with_missing_script() -> TestWebapp {
    TestWebapp::builder()
        .unwrap()
        .with_file("js/a.js", "var a = 1;")
        .with_group("all", &["/js/a.js", "/js/gone.js", "nowhere:x.js"], &[])
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_missing_resource_fails_the_group() {
    let webapp = webapp_with_missing_script();
    let factory = factory_for(&webapp).unwrap();

    let err = serve(&factory, "/all.js").await.unwrap_err();
    assert!(matches!(err, AssetError::Io { ref uri, .. } if uri == "/js/gone.js"));
}

#[tokio::test]
async fn test_unclaimed_uri_is_not_found() {
    let webapp = TestWebapp::builder()
        .unwrap()
        .with_group("all", &["nowhere:x.js"], &[])
        .build()
        .unwrap();
    let factory = factory_for(&webapp).unwrap();

    let err = serve(&factory, "/all.js").await.unwrap_err();
    assert!(matches!(err, AssetError::NotFound { ref uri } if uri == "nowhere:x.js"));
}

#[tokio::test]
async fn test_ignore_missing_resources_skips_them() {
    let webapp = webapp_with_missing_script();
    let mut config = webapp.config().unwrap();
    config.set("ignore-missing-resources", "true").unwrap();
    let factory = ManagerFactory::from_config(config).unwrap();

    let (content, _) = serve(&factory, "/all.js").await.unwrap();
    assert_eq!(content, "var a = 1;");
}

#[tokio::test]
async fn test_hash_encoder_names_output() {
    let webapp = TestWebapp::builder()
        .unwrap()
        .with_file("js/a.js", "var a = 1;")
        .with_group("all", &["/js/a.js"], &[])
        .with_setting("naming-strategy", "hashEncoder")
        .build()
        .unwrap();
    let factory = factory_for(&webapp).unwrap();

    let (content, name) = serve(&factory, "/all.js").await.unwrap();
    let expected = format!("all-{}.js", Sha256Hash.get_hash(content.as_bytes()));
    assert_eq!(name, Some(expected));
}
